use tracing::{debug, info, warn};

use crate::codec;
use crate::config::EditorConfig;
use crate::error::{EngineError, Result};
use crate::gesture::{EditorKey, GestureController, GestureOutcome, GestureState};
use crate::palette::{ColorCycle, DragPayload, Palette};
use crate::playback::{MediaPlayer, PlaybackSync, clamp_seek};
use crate::slot::{Slot, SlotDraft, SlotId};
use crate::store::{SaveRequest, SaveResult};
use crate::time::TrackGeometry;
use crate::timeline::SlotModel;

/// Commands accepted by the editor. Pointer coordinates are track-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ResizeTrack {
        pixel_width: f64,
    },
    PointerDown {
        x: f64,
    },
    PointerMove {
        x: f64,
    },
    PointerUp {
        x: f64,
    },
    DragOver {
        x: f64,
        payload: DragPayload,
    },
    DragLeave,
    Drop {
        x: f64,
        payload: DragPayload,
    },
    Select {
        id: Option<SlotId>,
    },
    Key {
        key: EditorKey,
        modifier: bool,
    },
    /// Reads time and duration from the media player and refreshes the
    /// active set.
    PlaybackTick,
    Seek {
        t: f64,
    },
    /// Replaces every slot with the decoded text. Fails without touching
    /// the slots when the text is neither JSON nor CSV.
    Import {
        text: String,
    },
    Export,
    /// Replaces every slot with a persisted snapshot, keeping its ids.
    Restore {
        slots: Vec<Slot>,
    },
    RequestSave,
    SaveFinished(SaveResult),
}

/// Events emitted by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SlotsChanged { revision: u64, slot_count: usize },
    SelectionChanged { id: Option<SlotId> },
    ActiveChanged { ids: Vec<SlotId> },
    DurationChanged { duration: f64 },
    SeekApplied { t: f64 },
    Exported { text: String },
    /// A snapshot to hand to the slot store. The editor does not wait for it.
    SaveRequested(SaveRequest),
    SaveStatusChanged(SaveStatus),
    Error(EditorErrorEvent),
}

/// Transient persistence indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving {
        revision: u64,
    },
    Saved {
        revision: u64,
        saved_at_ms: u64,
    },
    Failed {
        message: String,
    },
}

/// Category of a user-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorErrorKind {
    ImportFormat,
    SlotNotFound,
    Store,
    Other,
}

impl From<&EngineError> for EditorErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::ImportFormat { .. } => Self::ImportFormat,
            EngineError::SlotNotFound { .. } => Self::SlotNotFound,
            EngineError::InvalidVideoId { .. }
            | EngineError::StoreIo { .. }
            | EngineError::StoreSerialization { .. } => Self::Store,
            _ => Self::Other,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorErrorEvent {
    pub kind: EditorErrorKind,
    pub message: String,
}

impl EditorErrorEvent {
    pub fn from_error(error: &EngineError) -> Self {
        Self {
            kind: EditorErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// One editing session over the slots of a single video.
///
/// All slot mutations go through [`Editor::handle_command`] on the caller's
/// thread. Saving is handed off through [`Event::SaveRequested`] and
/// reconciled when [`Command::SaveFinished`] comes back.
#[derive(Debug)]
pub struct Editor<P> {
    player: P,
    video_id: String,
    config: EditorConfig,
    geometry: TrackGeometry,
    model: SlotModel,
    gestures: GestureController,
    colors: ColorCycle,
    palette: Palette,
    playback: PlaybackSync,
    revision: u64,
    save_status: SaveStatus,
}

impl<P> Editor<P>
where
    P: MediaPlayer,
{
    /// Creates an editor for `video_id` reading time from `player`.
    pub fn new(player: P, video_id: impl Into<String>, config: EditorConfig) -> Self {
        let geometry = TrackGeometry::new(0.0, player.duration());
        let mut model = SlotModel::new(config.grid());
        model.set_duration(geometry.duration);
        Self {
            video_id: video_id.into(),
            geometry,
            model,
            gestures: GestureController::new(&config),
            colors: ColorCycle::new(),
            palette: config.palette(),
            playback: PlaybackSync::default(),
            revision: 0,
            save_status: SaveStatus::Idle,
            config,
            player,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        self.model.slots()
    }

    pub fn model(&self) -> &SlotModel {
        &self.model
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Bumped on every local change to the slot set.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn selected(&self) -> Option<SlotId> {
        self.gestures.selected()
    }

    pub fn active(&self) -> &[SlotId] {
        self.playback.active()
    }

    pub fn playhead(&self) -> f64 {
        self.playback.time()
    }

    /// The in-progress creation, if a blank-area drag is open.
    pub fn provisional(&self) -> Option<SlotDraft> {
        self.gestures.provisional(&self.model)
    }

    /// Pixel extent of the palette drag preview, if a drag hovers the track.
    pub fn drop_preview(&self) -> Option<(f64, f64)> {
        self.gestures.drop_preview()
    }

    /// Applies one command and returns emitted events.
    pub fn handle_command(&mut self, command: Command) -> Result<Vec<Event>> {
        match command {
            Command::ResizeTrack { pixel_width } => {
                self.geometry = TrackGeometry::new(pixel_width, self.geometry.duration);
                Ok(Vec::new())
            }
            Command::PointerDown { x } => {
                let before = self.selected();
                let outcome = self.gestures.pointer_down(&self.model, &self.geometry, x);
                Ok(self.after_gesture(outcome, before))
            }
            Command::PointerMove { x } => {
                let before = self.selected();
                let creating = matches!(self.gestures.state(), GestureState::CreatingBlank { .. });
                let outcome = self
                    .gestures
                    .pointer_move(&mut self.model, &self.geometry, x);
                if creating {
                    return Ok(Vec::new());
                }
                Ok(self.after_gesture(outcome, before))
            }
            Command::PointerUp { x } => {
                let before = self.selected();
                let outcome = self
                    .gestures
                    .pointer_up(&mut self.model, &self.geometry, x);
                Ok(self.after_gesture(outcome, before))
            }
            // Hover only moves the preview; the slot set is untouched.
            Command::DragOver { x, payload } => {
                self.gestures.drag_over(&self.geometry, x, payload);
                Ok(Vec::new())
            }
            Command::DragLeave => {
                self.gestures.drag_leave();
                Ok(Vec::new())
            }
            Command::Drop { x, payload } => {
                let before = self.selected();
                let outcome = self.gestures.drop(
                    &mut self.model,
                    &self.geometry,
                    x,
                    &payload,
                    &mut self.colors,
                );
                Ok(self.after_gesture(outcome, before))
            }
            Command::Select { id } => self.select(id),
            Command::Key { key, modifier } => {
                let before = self.selected();
                let outcome = self.gestures.key(&mut self.model, key, modifier);
                Ok(self.after_gesture(outcome, before))
            }
            Command::PlaybackTick => Ok(self.playback_tick()),
            Command::Seek { t } => Ok(self.seek(t)),
            Command::Import { text } => self.import(&text),
            Command::Export => {
                let text = codec::encode(self.model.slots())?;
                debug!(slot_count = self.model.len(), "slots exported");
                Ok(vec![Event::Exported { text }])
            }
            Command::Restore { slots } => Ok(self.restore(slots)),
            Command::RequestSave => Ok(self.request_save()),
            Command::SaveFinished(result) => Ok(self.save_finished(result)),
        }
    }

    fn after_gesture(&mut self, outcome: GestureOutcome, selected_before: Option<SlotId>) -> Vec<Event> {
        let mut events = Vec::new();
        match outcome {
            GestureOutcome::Ignored | GestureOutcome::Updated => {}
            _ => debug!(?outcome, state = ?self.gestures.state(), "gesture step"),
        }
        if outcome.touches_model() {
            events.extend(self.slots_changed());
        }
        if let GestureOutcome::Committed(id) = outcome {
            info!(id, revision = self.revision, "slot edit committed");
        }
        let selected = self.selected();
        if selected != selected_before {
            events.push(Event::SelectionChanged { id: selected });
        }
        events
    }

    fn select(&mut self, id: Option<SlotId>) -> Result<Vec<Event>> {
        if let Some(id) = id {
            self.model.get(id).ok_or(EngineError::SlotNotFound { id })?;
        }
        if self.selected() == id {
            return Ok(Vec::new());
        }
        self.gestures.select(id);
        Ok(vec![Event::SelectionChanged { id }])
    }

    fn playback_tick(&mut self) -> Vec<Event> {
        let mut events = self.sync_duration();
        let t = self.player.current_time();
        if self.playback.update(t, self.model.slots()) {
            events.push(Event::ActiveChanged {
                ids: self.playback.active().to_vec(),
            });
        }
        events
    }

    fn sync_duration(&mut self) -> Vec<Event> {
        let duration = TrackGeometry::new(0.0, self.player.duration()).duration;
        if duration == self.geometry.duration {
            return Vec::new();
        }
        self.geometry = TrackGeometry::new(self.geometry.pixel_width, duration);
        let dropped = self.model.set_duration(duration);
        info!(duration, dropped, "media duration changed");
        let mut events = vec![Event::DurationChanged { duration }];
        events.extend(self.slots_changed());
        events
    }

    fn seek(&mut self, t: f64) -> Vec<Event> {
        let t = clamp_seek(t, self.geometry.duration);
        self.player.seek(t);
        let mut events = vec![Event::SeekApplied { t }];
        if self.playback.update(t, self.model.slots()) {
            events.push(Event::ActiveChanged {
                ids: self.playback.active().to_vec(),
            });
        }
        events
    }

    fn import(&mut self, text: &str) -> Result<Vec<Event>> {
        let drafts = codec::decode(text, &mut self.colors).inspect_err(|error| {
            warn!(%error, "import rejected");
        })?;
        let decoded = drafts.len();
        let selected_before = self.selected();
        self.gestures.reset();
        let dropped = self.model.replace_all(drafts);
        info!(decoded, dropped, kept = self.model.len(), "slots imported");

        let mut events = self.slots_changed();
        if selected_before.is_some() {
            events.push(Event::SelectionChanged { id: None });
        }
        Ok(events)
    }

    fn restore(&mut self, slots: Vec<Slot>) -> Vec<Event> {
        let selected_before = self.selected();
        self.gestures.reset();
        let dropped = self.model.restore(slots);
        info!(dropped, kept = self.model.len(), "slots restored");

        let mut events = self.slots_changed();
        if selected_before.is_some() {
            events.push(Event::SelectionChanged { id: None });
        }
        events
    }

    fn request_save(&mut self) -> Vec<Event> {
        let request = SaveRequest {
            video_id: self.video_id.clone(),
            revision: self.revision,
            slots: self.model.slots().to_vec(),
        };
        self.save_status = SaveStatus::Saving {
            revision: self.revision,
        };
        debug!(revision = self.revision, slot_count = request.slots.len(), "save requested");
        vec![
            Event::SaveRequested(request),
            Event::SaveStatusChanged(self.save_status.clone()),
        ]
    }

    fn save_finished(&mut self, result: SaveResult) -> Vec<Event> {
        let mut events = Vec::new();
        match result.result {
            Ok(stored) => {
                if result.revision == self.revision && self.gestures.is_idle() {
                    let selected = self.selected();
                    self.model.restore(stored.slots);
                    if selected.is_some_and(|id| self.model.get(id).is_none()) {
                        self.gestures.select(None);
                        events.push(Event::SelectionChanged { id: None });
                    }
                    events.push(Event::SlotsChanged {
                        revision: self.revision,
                        slot_count: self.model.len(),
                    });
                    if self.playback.refresh(self.model.slots()) {
                        events.push(Event::ActiveChanged {
                            ids: self.playback.active().to_vec(),
                        });
                    }
                } else {
                    debug!(
                        saved_revision = result.revision,
                        revision = self.revision,
                        "newer local edits kept over saved snapshot"
                    );
                }
                self.save_status = SaveStatus::Saved {
                    revision: result.revision,
                    saved_at_ms: stored.saved_at_ms,
                };
            }
            Err(message) => {
                warn!(revision = result.revision, %message, "save failed; slots kept in memory");
                self.save_status = SaveStatus::Failed { message };
            }
        }
        events.push(Event::SaveStatusChanged(self.save_status.clone()));
        events
    }

    fn slots_changed(&mut self) -> Vec<Event> {
        self.revision += 1;
        let mut events = vec![Event::SlotsChanged {
            revision: self.revision,
            slot_count: self.model.len(),
        }];
        if self.playback.refresh(self.model.slots()) {
            events.push(Event::ActiveChanged {
                ids: self.playback.active().to_vec(),
            });
        }
        events
    }
}
