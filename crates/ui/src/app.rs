use std::path::PathBuf;
use std::sync::mpsc::TrySendError;
use std::time::{Duration, Instant};

use iced::keyboard;
use iced::widget::{button, canvas, column, row, slider, text, text_editor, text_input};
use iced::{Element, Length, Subscription, Task, Theme};
use slot_engine::store::SaveRequestSender;
use slot_engine::{
    Command, DragPayload, Editor, EditorConfig, EditorErrorEvent, EditorKey, Event,
    JsonFileStore, SaveResult, SaveStatus, SlotStore, format_timecode,
};
use tracing::{info, warn};

use crate::bridge::{BridgeEvent, persistence_subscription, store_root};
use crate::player::SimulatedPlayer;
use crate::widgets::track::{self, TrackInput, TrackInputKind};

const CONFIG_ENV: &str = "SLOT_EDITOR_CONFIG";
const TICK_INTERVAL: Duration = Duration::from_millis(40);

/// UI messages handled by the iced app update loop.
#[derive(Debug, Clone)]
pub enum Message {
    VideoIdChanged(String),
    MediaSecondsChanged(String),
    LoadPressed,
    PlayToggled,
    Tick(Instant),
    Seek(f64),
    ChipPressed(DragPayload),
    Track(TrackInput),
    KeyPressed { key: EditorKey, modifier: bool },
    BulkEdited(text_editor::Action),
    ImportPressed,
    ExportPressed,
    SavePressed,
    Bridge(BridgeEvent),
}

/// Root UI state: one editing session plus the panels around it.
pub struct AppState {
    editor: Editor<SimulatedPlayer>,
    save_tx: Option<SaveRequestSender>,
    armed: Option<DragPayload>,
    video_id: String,
    media_seconds: String,
    bulk: text_editor::Content,
    track_cache: canvas::Cache,
    status: String,
}

impl AppState {
    /// Boots the app with the config named by `SLOT_EDITOR_CONFIG`, if any.
    pub fn boot() -> (Self, Task<Message>) {
        let config = match std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
            Some(path) => EditorConfig::load(&path).unwrap_or_else(|error| {
                warn!(%error, "falling back to default editor config");
                EditorConfig::default()
            }),
            None => EditorConfig::default(),
        };
        (Self::with_config(config), Task::none())
    }

    fn with_config(config: EditorConfig) -> Self {
        Self {
            editor: Editor::new(SimulatedPlayer::default(), "untitled", config),
            save_tx: None,
            armed: None,
            video_id: String::from("untitled"),
            media_seconds: String::from("60"),
            bulk: text_editor::Content::new(),
            track_cache: canvas::Cache::new(),
            status: String::from("starting persistence bridge"),
        }
    }

    /// Handles one UI message.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::VideoIdChanged(video_id) => self.video_id = video_id,
            Message::MediaSecondsChanged(seconds) => self.media_seconds = seconds,
            Message::LoadPressed => self.load(),
            Message::PlayToggled => {
                self.editor.player_mut().toggle();
                self.dispatch(Command::PlaybackTick);
            }
            Message::Tick(now) => {
                self.editor.player_mut().advance(now);
                self.dispatch(Command::PlaybackTick);
            }
            Message::Seek(t) => {
                self.dispatch(Command::Seek { t });
            }
            Message::ChipPressed(payload) => {
                self.armed = if self.armed.as_ref() == Some(&payload) {
                    None
                } else {
                    Some(payload)
                };
            }
            Message::Track(input) => self.apply_track_input(input),
            Message::KeyPressed { key, modifier } => {
                self.dispatch(Command::Key { key, modifier });
            }
            Message::BulkEdited(action) => self.bulk.perform(action),
            Message::ImportPressed => {
                let text = self.bulk.text();
                if self.dispatch(Command::Import { text }) {
                    self.status = format!("imported {} slots", self.editor.slots().len());
                }
            }
            Message::ExportPressed => {
                self.dispatch(Command::Export);
            }
            Message::SavePressed => {
                self.dispatch(Command::RequestSave);
            }
            Message::Bridge(BridgeEvent::Ready(sender)) => {
                self.save_tx = Some(sender);
                self.status = format!("saving to {}", store_root().display());
            }
            Message::Bridge(BridgeEvent::Finished(result)) => {
                self.dispatch(Command::SaveFinished(result));
            }
            Message::Bridge(BridgeEvent::Disconnected) => {
                self.status = String::from("persistence channel closed");
                self.save_tx = None;
            }
        }

        Task::none()
    }

    /// Opens `video_id` with media of the typed length and restores its
    /// stored slots.
    fn load(&mut self) {
        let video_id = self.video_id.trim().to_owned();
        let Ok(seconds) = self.media_seconds.trim().parse::<f64>() else {
            self.status = String::from("media length must be a number of seconds");
            return;
        };
        let slots = match JsonFileStore::new(store_root()).load(&video_id) {
            Ok(slots) => slots,
            Err(error) => {
                self.status = EditorErrorEvent::from_error(&error).message;
                return;
            }
        };

        let mut player = SimulatedPlayer::default();
        player.load(seconds);
        let width = self.editor.geometry().pixel_width;
        self.editor = Editor::new(player, video_id.clone(), self.editor.config().clone());
        self.armed = None;
        self.dispatch(Command::ResizeTrack { pixel_width: width });
        self.dispatch(Command::Restore { slots });
        info!(video_id, seconds, slot_count = self.editor.slots().len(), "video opened");
        self.status = format!("opened {video_id}");
    }

    fn apply_track_input(&mut self, input: TrackInput) {
        if input.width != self.editor.geometry().pixel_width {
            self.dispatch(Command::ResizeTrack {
                pixel_width: input.width,
            });
        }
        let x = input.x;
        let command = match input.kind {
            TrackInputKind::Press => Command::PointerDown { x },
            TrackInputKind::Move => Command::PointerMove { x },
            TrackInputKind::Release => Command::PointerUp { x },
            TrackInputKind::Leave => Command::DragLeave,
            TrackInputKind::Hover => {
                let Some(payload) = self.armed.clone() else {
                    return;
                };
                Command::DragOver { x, payload }
            }
            // A chip is armed for one drop.
            TrackInputKind::Drop => {
                let Some(payload) = self.armed.take() else {
                    return;
                };
                Command::Drop { x, payload }
            }
        };
        self.dispatch(command);
    }

    /// Runs one editor command. Returns false when the editor rejected it.
    fn dispatch(&mut self, command: Command) -> bool {
        match self.editor.handle_command(command) {
            Ok(events) => {
                for event in events {
                    self.apply_editor_event(event);
                }
                self.track_cache.clear();
                true
            }
            Err(error) => {
                self.apply_editor_event(Event::Error(EditorErrorEvent::from_error(&error)));
                false
            }
        }
    }

    fn apply_editor_event(&mut self, event: Event) {
        match event {
            Event::SaveRequested(request) => {
                let revision = request.revision;
                let sent = self.save_tx.as_ref().map(|sender| sender.try_send(request));
                let failure = match sent {
                    Some(Ok(())) => None,
                    Some(Err(TrySendError::Full(_))) => Some("save queue is full"),
                    Some(Err(TrySendError::Disconnected(_))) => {
                        self.save_tx = None;
                        Some("persistence channel closed")
                    }
                    None => Some("persistence is not ready"),
                };
                if let Some(message) = failure {
                    self.dispatch(Command::SaveFinished(SaveResult {
                        revision,
                        result: Err(message.to_owned()),
                    }));
                }
            }
            // A failed hand-off settles the status before the queued
            // `Saving` event arrives, so always show the current one.
            Event::SaveStatusChanged(_) => {
                self.status = match self.editor.save_status() {
                    SaveStatus::Idle => String::new(),
                    SaveStatus::Saving { .. } => String::from("saving..."),
                    SaveStatus::Saved { revision, .. } if *revision == self.editor.revision() => {
                        String::from("saved")
                    }
                    SaveStatus::Saved { .. } => String::from("saved; newer edits not yet saved"),
                    SaveStatus::Failed { message } => format!("save failed: {message}"),
                };
            }
            Event::Exported { text } => {
                self.bulk = text_editor::Content::with_text(&text);
                self.status = format!("exported {} slots", self.editor.slots().len());
            }
            Event::DurationChanged { duration } => {
                self.status = format!("media length {}", format_timecode(duration));
            }
            Event::Error(error) => {
                warn!(kind = ?error.kind, message = %error.message, "editor command failed");
                self.status = format!("error: {}", error.message);
            }
            Event::SlotsChanged { .. }
            | Event::SelectionChanged { .. }
            | Event::ActiveChanged { .. }
            | Event::SeekApplied { .. } => {}
        }
    }

    /// Renders the UI tree.
    pub fn view(&self) -> Element<'_, Message> {
        let duration = self.editor.geometry().duration;
        let playing = self.editor.player().is_playing();

        let media_row = row![
            text_input("video id", &self.video_id).on_input(Message::VideoIdChanged),
            text_input("seconds", &self.media_seconds)
                .on_input(Message::MediaSecondsChanged)
                .width(Length::Fixed(90.0)),
            button("Open").on_press(Message::LoadPressed),
            button(if playing { "Pause" } else { "Play" }).on_press(Message::PlayToggled),
            button("Save").on_press(Message::SavePressed),
            text(format!(
                "{} / {}",
                format_timecode(self.editor.playhead()),
                format_timecode(duration)
            )),
        ]
        .spacing(12);

        let chips = self.editor.palette().chips().into_iter().fold(
            row![].spacing(8),
            |chips, chip| {
                let payload = chip.payload();
                let style: fn(&Theme, button::Status) -> button::Style =
                    if self.armed.as_ref() == Some(&payload) {
                    button::primary
                } else {
                    button::secondary
                };
                chips.push(
                    button(text(chip.label().to_owned()))
                        .style(style)
                        .on_press(Message::ChipPressed(payload)),
                )
            },
        );

        let selection = match self.editor.selected().and_then(|id| self.editor.model().get(id)) {
            Some(slot) => format!(
                "Selected: {} [{} - {}] {} {}",
                slot.label,
                format_timecode(slot.start),
                format_timecode(slot.end),
                slot.category.as_str(),
                slot.participants.as_slice().join(", ")
            ),
            None => String::from("Selected: none"),
        };
        let active = self
            .editor
            .active()
            .iter()
            .filter_map(|id| self.editor.model().get(*id))
            .map(|slot| slot.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        column![
            media_row,
            chips,
            track::view(
                &self.editor,
                self.armed.is_some(),
                &self.track_cache,
                Message::Track
            ),
            slider(0.0..=duration, self.editor.playhead(), Message::Seek).step(0.05),
            text(selection),
            text(format!("Active: {active}")),
            text_editor(&self.bulk)
                .placeholder("paste JSON or CSV (start,end,label,participants,category)")
                .on_action(Message::BulkEdited)
                .height(Length::Fixed(160.0)),
            row![
                button("Import").on_press(Message::ImportPressed),
                button("Export").on_press(Message::ExportPressed),
            ]
            .spacing(12),
            text(format!("Status: {}", self.status)),
        ]
        .spacing(12)
        .padding(16)
        .into()
    }

    /// Persistence results, keyboard editing and, while playing, the
    /// playback clock.
    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            persistence_subscription().map(Message::Bridge),
            keyboard::on_key_press(key_message),
        ];
        if self.editor.player().is_playing() {
            subscriptions.push(iced::time::every(TICK_INTERVAL).map(Message::Tick));
        }
        Subscription::batch(subscriptions)
    }

    #[cfg(test)]
    fn from_sender_for_test(save_tx: Option<SaveRequestSender>) -> Self {
        let mut player = SimulatedPlayer::default();
        player.load(10.0);
        let mut app = Self::with_config(EditorConfig::default());
        app.editor = Editor::new(player, "clip", EditorConfig::default());
        app.save_tx = save_tx;
        app.dispatch(Command::ResizeTrack {
            pixel_width: 1_000.0,
        });
        app
    }
}

fn key_message(pressed: keyboard::Key, modifiers: keyboard::Modifiers) -> Option<Message> {
    use keyboard::key::Named;

    let key = match pressed {
        keyboard::Key::Named(Named::ArrowLeft) => EditorKey::ArrowLeft,
        keyboard::Key::Named(Named::ArrowRight) => EditorKey::ArrowRight,
        keyboard::Key::Named(Named::Delete) => EditorKey::Delete,
        keyboard::Key::Named(Named::Backspace) => EditorKey::Backspace,
        _ => return None,
    };
    Some(Message::KeyPressed {
        key,
        modifier: modifiers.shift(),
    })
}
