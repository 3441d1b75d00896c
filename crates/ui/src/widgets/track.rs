use iced::widget::canvas::{self, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Length, Pixels, Point, Rectangle, Size, Theme, mouse};
use slot_engine::{Editor, MediaPlayer, PressTarget, Slot, TrackGeometry};

const TRACK_HEIGHT: f32 = 72.0;
const SLOT_INSET: f32 = 10.0;

/// Pointer activity on the track, in track-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackInput {
    pub kind: TrackInputKind,
    pub x: f64,
    /// Track width when the input happened.
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackInputKind {
    Press,
    Move,
    Release,
    /// A palette chip is armed and the pointer drags over the track.
    Hover,
    Leave,
    Drop,
}

/// Parses `#RRGGBB`.
pub fn hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Horizontal extent of `slot` on a track of `width` pixels.
fn slot_span(slot_start: f64, slot_end: f64, geometry: &TrackGeometry) -> (f32, f32) {
    let left = geometry.to_pixel(slot_start) as f32;
    let right = geometry.to_pixel(slot_end) as f32;
    (left, (right - left).max(1.0))
}

#[derive(Debug, Default)]
struct TrackState {
    pressed: bool,
}

struct TrackProgram<'a, P, Message> {
    editor: &'a Editor<P>,
    armed: bool,
    cache: &'a canvas::Cache,
    on_input: fn(TrackInput) -> Message,
}

impl<P, Message> TrackProgram<'_, P, Message>
where
    P: MediaPlayer,
{
    fn geometry(&self, bounds: Rectangle) -> TrackGeometry {
        TrackGeometry::new(f64::from(bounds.width), self.editor.geometry().duration)
    }

    fn input(&self, kind: TrackInputKind, x: f32, bounds: Rectangle) -> Option<Message> {
        Some((self.on_input)(TrackInput {
            kind,
            x: f64::from(x),
            width: f64::from(bounds.width),
        }))
    }

    fn draw_slot(&self, frame: &mut canvas::Frame, slot: &Slot, geometry: &TrackGeometry) {
        let (x, width) = slot_span(slot.start, slot.end, geometry);
        let height = (frame.height() - 2.0 * SLOT_INSET).max(1.0);
        let rect = Path::rectangle(Point::new(x, SLOT_INSET), Size::new(width, height));
        let color = hex_color(slot.display_color()).unwrap_or(Color::from_rgb8(74, 158, 255));
        let active = self.editor.active().contains(&slot.id);
        frame.fill(
            &rect,
            Color {
                a: if active { 0.95 } else { 0.6 },
                ..color
            },
        );

        if self.editor.selected() == Some(slot.id) {
            frame.stroke(&rect, Stroke::default().with_width(2.0).with_color(Color::WHITE));
        }

        let label = if slot.label.is_empty() {
            slot.participants.as_slice().join(", ")
        } else {
            slot.label.clone()
        };
        if !label.is_empty() && width > 16.0 {
            frame.fill_text(canvas::Text {
                content: label,
                position: Point::new(x + 4.0, SLOT_INSET + 4.0),
                color: Color::from_rgb8(16, 18, 22),
                size: Pixels(12.0),
                ..canvas::Text::default()
            });
        }
    }
}

impl<P, Message> canvas::Program<Message> for TrackProgram<'_, P, Message>
where
    P: MediaPlayer,
{
    type State = TrackState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let cursor_x = cursor.position().map(|position| position.x - bounds.x);
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(x) = cursor.position_in(bounds).map(|position| position.x) else {
                    return (canvas::event::Status::Ignored, None);
                };
                state.pressed = true;
                let kind = if self.armed {
                    TrackInputKind::Hover
                } else {
                    TrackInputKind::Press
                };
                (canvas::event::Status::Captured, self.input(kind, x, bounds))
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) if state.pressed => {
                let Some(x) = cursor_x else {
                    return (canvas::event::Status::Ignored, None);
                };
                let kind = match (self.armed, cursor.is_over(bounds)) {
                    (false, _) => TrackInputKind::Move,
                    (true, true) => TrackInputKind::Hover,
                    (true, false) => TrackInputKind::Leave,
                };
                (canvas::event::Status::Captured, self.input(kind, x, bounds))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if state.pressed =>
            {
                state.pressed = false;
                let x = cursor_x.unwrap_or(0.0);
                let kind = match (self.armed, cursor.is_over(bounds)) {
                    (false, _) => TrackInputKind::Release,
                    (true, true) => TrackInputKind::Drop,
                    (true, false) => TrackInputKind::Leave,
                };
                (canvas::event::Status::Captured, self.input(kind, x, bounds))
            }
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let geometry = self.geometry(bounds);

        let slots = self.cache.draw(renderer, bounds.size(), |frame| {
            let background = Path::rectangle(Point::ORIGIN, frame.size());
            frame.fill(&background, Color::from_rgb8(22, 24, 29));

            if !geometry.has_duration() {
                return;
            }
            for slot in self.editor.slots() {
                self.draw_slot(frame, slot, &geometry);
            }
        });

        let mut overlay = canvas::Frame::new(renderer, bounds.size());
        if let Some(draft) = self.editor.provisional() {
            let (x, width) = slot_span(draft.start, draft.end, &geometry);
            let rect = Path::rectangle(
                Point::new(x, SLOT_INSET),
                Size::new(width, (bounds.height - 2.0 * SLOT_INSET).max(1.0)),
            );
            overlay.fill(&rect, Color::from_rgba8(255, 255, 255, 0.25));
            overlay.stroke(&rect, Stroke::default().with_width(1.0).with_color(Color::WHITE));
        }
        if let Some((left, right)) = self.editor.drop_preview() {
            let rect = Path::rectangle(
                Point::new(left as f32, 2.0),
                Size::new(((right - left) as f32).max(2.0), (bounds.height - 4.0).max(1.0)),
            );
            overlay.fill(&rect, Color::from_rgba8(122, 214, 110, 0.3));
        }
        if geometry.has_duration() {
            let x = geometry.to_pixel(self.editor.playhead()) as f32;
            let line = Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
            overlay.stroke(
                &line,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb8(255, 94, 77)),
            );
        }

        vec![slots, overlay.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        let Some(position) = cursor.position_in(bounds) else {
            return mouse::Interaction::None;
        };
        if self.armed {
            return mouse::Interaction::Crosshair;
        }
        let geometry = self.geometry(bounds);
        let target = self.editor.gestures().hit_target(
            self.editor.model(),
            &geometry,
            f64::from(position.x),
        );
        match target {
            PressTarget::LeftEdge(_) | PressTarget::RightEdge(_) => {
                mouse::Interaction::ResizingHorizontally
            }
            PressTarget::Body(_) if state.pressed => mouse::Interaction::Grabbing,
            PressTarget::Body(_) => mouse::Interaction::Grab,
            PressTarget::Blank => mouse::Interaction::Crosshair,
        }
    }
}

/// Renders the interactive slot track.
pub fn view<'a, P, Message>(
    editor: &'a Editor<P>,
    armed: bool,
    cache: &'a canvas::Cache,
    on_input: fn(TrackInput) -> Message,
) -> Element<'a, Message>
where
    P: MediaPlayer + 'a,
    Message: 'a,
{
    container(
        canvas::Canvas::new(TrackProgram {
            editor,
            armed,
            cache,
            on_input,
        })
        .width(Length::Fill)
        .height(Length::Fixed(TRACK_HEIGHT)),
    )
    .width(Length::Fill)
    .into()
}
