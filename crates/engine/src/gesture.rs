//! Pointer, drag-and-drop and keyboard interaction on the slot track.
//!
//! The controller turns pixel-space input into [`SlotModel`] mutations. At
//! most one gesture is open at a time; input that would start a second one
//! is ignored. Boundaries during a move or resize are always recomputed from
//! the snapshot taken when the gesture started plus the total pointer delta.

use tracing::debug;

use crate::config::EditorConfig;
use crate::palette::{ColorCycle, DragPayload};
use crate::slot::{Slot, SlotDraft, SlotId};
use crate::time::TrackGeometry;
use crate::timeline::{Boundary, DropOutcome, SlotModel};

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Blank,
    Body(SlotId),
    LeftEdge(SlotId),
    RightEdge(SlotId),
}

/// Keys the track reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    ArrowLeft,
    ArrowRight,
    Delete,
    Backspace,
}

/// The open gesture, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// A press on empty track. The slot is provisional until release.
    CreatingBlank { anchor: f64, current: f64 },
    /// A palette drag hovering the track.
    DragHover {
        origin_x: f64,
        current_x: f64,
        payload: DragPayload,
    },
    Moving {
        id: SlotId,
        origin: Slot,
        pointer_offset_px: f64,
    },
    ResizingLeft {
        id: SlotId,
        origin: Slot,
        pointer_offset_px: f64,
    },
    ResizingRight {
        id: SlotId,
        origin: Slot,
        pointer_offset_px: f64,
    },
}

/// Result of feeding one input into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Ignored,
    Started,
    Updated,
    /// A created slot was finalized, or a move/resize was released with the
    /// slot somewhere else than where it started.
    Committed(SlotId),
    /// A move/resize was released with the slot back at its starting bounds.
    Released(SlotId),
    /// A provisional slot was released below the minimum length.
    Discarded,
    Dropped(DropOutcome),
    Nudged(SlotId),
    Deleted(SlotId),
}

impl GestureOutcome {
    /// True when the slot set may have changed.
    pub fn touches_model(&self) -> bool {
        match self {
            Self::Updated | Self::Committed(_) | Self::Nudged(_) | Self::Deleted(_) => true,
            Self::Dropped(outcome) => *outcome != DropOutcome::Rejected,
            Self::Ignored | Self::Started | Self::Released(_) | Self::Discarded => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tuning {
    edge_handle_px: f64,
    min_preview_px: f64,
    default_slot_seconds: f64,
    nudge_step: f64,
    nudge_coarse_step: f64,
}

/// Interaction state machine for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureController {
    state: GestureState,
    selected: Option<SlotId>,
    tuning: Tuning,
}

impl GestureController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: GestureState::Idle,
            selected: None,
            tuning: Tuning {
                edge_handle_px: config.edge_handle_px,
                min_preview_px: config.min_preview_px,
                default_slot_seconds: config.default_slot_seconds,
                nudge_step: config.nudge_step,
                nudge_coarse_step: config.nudge_coarse_step,
            },
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    pub fn selected(&self) -> Option<SlotId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<SlotId>) {
        self.selected = id;
    }

    /// Drops any open gesture and the selection. Used before the slot set is
    /// replaced wholesale.
    pub fn reset(&mut self) {
        if !self.is_idle() {
            debug!(state = ?self.state, "open gesture abandoned");
        }
        self.state = GestureState::Idle;
        self.selected = None;
    }

    /// Classifies a press at `x`: edge handles win over the body, and the
    /// first slot in start order wins over later overlapping ones.
    pub fn hit_target(&self, model: &SlotModel, geometry: &TrackGeometry, x: f64) -> PressTarget {
        let handle = self.tuning.edge_handle_px;
        for slot in model.slots() {
            let left = geometry.to_pixel(slot.start);
            let right = geometry.to_pixel(slot.end);
            if x < left || x > right {
                continue;
            }
            if x - left <= handle {
                return PressTarget::LeftEdge(slot.id);
            }
            if right - x <= handle {
                return PressTarget::RightEdge(slot.id);
            }
            return PressTarget::Body(slot.id);
        }
        PressTarget::Blank
    }

    /// Starts a gesture at `x`, hit-testing the track to pick its kind.
    pub fn pointer_down(
        &mut self,
        model: &SlotModel,
        geometry: &TrackGeometry,
        x: f64,
    ) -> GestureOutcome {
        let target = self.hit_target(model, geometry, x);
        self.pointer_down_on(model, geometry, x, target)
    }

    /// Starts a gesture at `x` on a target the caller already resolved.
    pub fn pointer_down_on(
        &mut self,
        model: &SlotModel,
        geometry: &TrackGeometry,
        x: f64,
        target: PressTarget,
    ) -> GestureOutcome {
        if !self.is_idle() {
            debug!(?target, state = ?self.state, "press ignored: gesture already open");
            return GestureOutcome::Ignored;
        }
        let x = geometry.clamp_x(x);

        let (id, origin) = match target {
            PressTarget::Blank => {
                let anchor = geometry.to_seconds(x);
                self.selected = None;
                self.state = GestureState::CreatingBlank {
                    anchor,
                    current: anchor,
                };
                debug!(anchor, "blank creation started");
                return GestureOutcome::Started;
            }
            PressTarget::Body(id) | PressTarget::LeftEdge(id) | PressTarget::RightEdge(id) => {
                let Some(origin) = model.get(id).cloned() else {
                    return GestureOutcome::Ignored;
                };
                (id, origin)
            }
        };

        self.selected = Some(id);
        self.state = match target {
            PressTarget::LeftEdge(_) => GestureState::ResizingLeft {
                id,
                pointer_offset_px: x - geometry.to_pixel(origin.start),
                origin,
            },
            PressTarget::RightEdge(_) => GestureState::ResizingRight {
                id,
                pointer_offset_px: x - geometry.to_pixel(origin.end),
                origin,
            },
            _ => GestureState::Moving {
                id,
                pointer_offset_px: x - geometry.to_pixel(origin.start),
                origin,
            },
        };
        debug!(id, ?target, "slot gesture started");
        GestureOutcome::Started
    }

    pub fn pointer_move(
        &mut self,
        model: &mut SlotModel,
        geometry: &TrackGeometry,
        x: f64,
    ) -> GestureOutcome {
        let x = geometry.clamp_x(x);
        if let GestureState::CreatingBlank { current, .. } = &mut self.state {
            *current = geometry.to_seconds(x);
            return GestureOutcome::Updated;
        }
        let Some(id) = self.gesture_slot() else {
            return GestureOutcome::Ignored;
        };
        let before = bounds(model, id);
        match self.apply_pointer(model, geometry, x) {
            Some(id) if bounds(model, id) != before => GestureOutcome::Updated,
            _ => GestureOutcome::Ignored,
        }
    }

    /// Ends the open gesture. Positions outside the track are clamped to it,
    /// so releasing off-track behaves like releasing at the nearest edge.
    pub fn pointer_up(
        &mut self,
        model: &mut SlotModel,
        geometry: &TrackGeometry,
        x: f64,
    ) -> GestureOutcome {
        let x = geometry.clamp_x(x);
        match std::mem::take(&mut self.state) {
            GestureState::Idle => GestureOutcome::Ignored,
            state @ GestureState::DragHover { .. } => {
                self.state = state;
                GestureOutcome::Ignored
            }
            GestureState::CreatingBlank { anchor, .. } => {
                let current = geometry.to_seconds(x);
                let draft = SlotDraft::new(anchor.min(current), anchor.max(current));
                match model.insert(draft) {
                    Some(id) => {
                        self.selected = Some(id);
                        GestureOutcome::Committed(id)
                    }
                    None => {
                        debug!(anchor, current, "provisional slot discarded");
                        GestureOutcome::Discarded
                    }
                }
            }
            state => {
                self.state = state;
                let origin = self
                    .gesture_origin()
                    .map(|origin| (origin.start, origin.end));
                let id = self.apply_pointer(model, geometry, x);
                self.state = GestureState::Idle;
                match id {
                    Some(id) if bounds(model, id) == origin => GestureOutcome::Released(id),
                    Some(id) => GestureOutcome::Committed(id),
                    None => GestureOutcome::Ignored,
                }
            }
        }
    }

    /// Tracks a palette drag over the track. The first hover fixes the
    /// preview origin.
    pub fn drag_over(
        &mut self,
        geometry: &TrackGeometry,
        x: f64,
        payload: DragPayload,
    ) -> GestureOutcome {
        let x = geometry.clamp_x(x);
        if let GestureState::DragHover {
            current_x,
            payload: hovering,
            ..
        } = &mut self.state
        {
            *current_x = x;
            *hovering = payload;
            return GestureOutcome::Updated;
        }
        if !self.is_idle() {
            return GestureOutcome::Ignored;
        }
        self.state = GestureState::DragHover {
            origin_x: x,
            current_x: x,
            payload,
        };
        GestureOutcome::Started
    }

    pub fn drag_leave(&mut self) -> GestureOutcome {
        if matches!(self.state, GestureState::DragHover { .. }) {
            self.state = GestureState::Idle;
            return GestureOutcome::Updated;
        }
        GestureOutcome::Ignored
    }

    /// Applies a palette drop at `x` and returns to idle.
    ///
    /// With a hover preview at least `min_preview_px` wide the new slot spans
    /// the preview; otherwise a default-width slot is anchored at the drop
    /// point. A drop onto an existing slot merges metadata instead.
    pub fn drop(
        &mut self,
        model: &mut SlotModel,
        geometry: &TrackGeometry,
        x: f64,
        payload: &DragPayload,
        colors: &mut ColorCycle,
    ) -> GestureOutcome {
        let x = geometry.clamp_x(x);
        let preview = match &self.state {
            GestureState::Idle => None,
            GestureState::DragHover { origin_x, .. } => Some((origin_x.min(x), origin_x.max(x))),
            _ => {
                debug!(state = ?self.state, "drop ignored: pointer gesture open");
                return GestureOutcome::Ignored;
            }
        };
        self.state = GestureState::Idle;

        let span = match preview {
            Some((left, right)) if right - left >= self.tuning.min_preview_px => {
                (geometry.to_seconds(left), geometry.to_seconds(right))
            }
            _ => self.default_span(geometry, geometry.to_seconds(x)),
        };
        let outcome = model.merge_at_drop(geometry, x, payload, span, colors);
        match outcome {
            DropOutcome::Merged(id) | DropOutcome::Inserted(id) => self.selected = Some(id),
            DropOutcome::Rejected => {}
        }
        GestureOutcome::Dropped(outcome)
    }

    /// Arrow keys nudge the selection; Delete and Backspace remove it.
    /// Ignored while a pointer or drag gesture is open.
    pub fn key(&mut self, model: &mut SlotModel, key: EditorKey, modifier: bool) -> GestureOutcome {
        if !self.is_idle() {
            return GestureOutcome::Ignored;
        }
        let Some(id) = self.selected else {
            return GestureOutcome::Ignored;
        };
        if model.get(id).is_none() {
            self.selected = None;
            return GestureOutcome::Ignored;
        }

        let step = if modifier {
            self.tuning.nudge_coarse_step
        } else {
            self.tuning.nudge_step
        };
        match key {
            EditorKey::ArrowLeft | EditorKey::ArrowRight => {
                let delta = if key == EditorKey::ArrowLeft {
                    -step
                } else {
                    step
                };
                match model.move_by(id, delta) {
                    Ok(()) => GestureOutcome::Nudged(id),
                    Err(_) => GestureOutcome::Ignored,
                }
            }
            EditorKey::Delete | EditorKey::Backspace => {
                model.delete_by_id(id);
                self.selected = None;
                GestureOutcome::Deleted(id)
            }
        }
    }

    /// The in-progress creation, widened to the minimum length so it stays
    /// visible. Not part of the model.
    pub fn provisional(&self, model: &SlotModel) -> Option<SlotDraft> {
        let GestureState::CreatingBlank { anchor, current } = self.state else {
            return None;
        };
        let min_len = model.grid().min_len();
        let start = anchor.min(current);
        let end = anchor.max(current).max(start + min_len);
        let (start, end) = model
            .normalize_span(start, end)
            .or_else(|| model.normalize_span(end - min_len, end))?;
        Some(SlotDraft::new(start, end))
    }

    /// Pixel extent `(left, right)` of the hover preview.
    pub fn drop_preview(&self) -> Option<(f64, f64)> {
        match self.state {
            GestureState::DragHover {
                origin_x,
                current_x,
                ..
            } => Some((origin_x.min(current_x), origin_x.max(current_x))),
            _ => None,
        }
    }

    fn default_span(&self, geometry: &TrackGeometry, at: f64) -> (f64, f64) {
        let width = self.tuning.default_slot_seconds;
        let start = if geometry.has_duration() {
            crate::time::clamp(at, 0.0, (geometry.duration - width).max(0.0))
        } else {
            at
        };
        (start, start + width)
    }

    fn gesture_origin(&self) -> Option<&Slot> {
        match &self.state {
            GestureState::Moving { origin, .. }
            | GestureState::ResizingLeft { origin, .. }
            | GestureState::ResizingRight { origin, .. } => Some(origin),
            _ => None,
        }
    }

    fn gesture_slot(&self) -> Option<SlotId> {
        self.gesture_origin().map(|origin| origin.id)
    }

    fn apply_pointer(
        &self,
        model: &mut SlotModel,
        geometry: &TrackGeometry,
        x: f64,
    ) -> Option<SlotId> {
        let result = match &self.state {
            GestureState::Moving {
                id,
                origin,
                pointer_offset_px,
            } => {
                let press_x = geometry.to_pixel(origin.start) + pointer_offset_px;
                let start = origin.start + geometry.to_seconds(x - press_x);
                model.move_to(*id, start).map(|()| *id)
            }
            GestureState::ResizingLeft {
                id,
                origin,
                pointer_offset_px,
            } => {
                let press_x = geometry.to_pixel(origin.start) + pointer_offset_px;
                let start = origin.start + geometry.to_seconds(x - press_x);
                model
                    .resize_boundary(*id, Boundary::Start, start)
                    .map(|()| *id)
            }
            GestureState::ResizingRight {
                id,
                origin,
                pointer_offset_px,
            } => {
                let press_x = geometry.to_pixel(origin.end) + pointer_offset_px;
                let end = origin.end + geometry.to_seconds(x - press_x);
                model.resize_boundary(*id, Boundary::End, end).map(|()| *id)
            }
            _ => return None,
        };
        result.ok()
    }
}

fn bounds(model: &SlotModel, id: SlotId) -> Option<(f64, f64)> {
    model.get(id).map(|slot| (slot.start, slot.end))
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorKey, GestureController, GestureOutcome, GestureState, PressTarget};
    use crate::palette::{ColorCycle, DragPayload};
    use crate::slot::{Category, SlotDraft};
    use crate::time::TrackGeometry;
    use crate::timeline::{DropOutcome, SlotModel};

    // 100 px per second over a 10 second clip.
    fn setup(spans: &[(f64, f64)]) -> (GestureController, SlotModel, TrackGeometry) {
        let mut model = SlotModel::default();
        model.set_duration(10.0);
        for &(start, end) in spans {
            model
                .insert(SlotDraft::new(start, end))
                .expect("fixture span should be valid");
        }
        (
            GestureController::default(),
            model,
            TrackGeometry::new(1_000.0, 10.0),
        )
    }

    #[test]
    fn blank_drag_creates_snapped_slot_in_either_direction() {
        let (mut controller, mut model, geometry) = setup(&[]);

        controller.pointer_down(&model, &geometry, 412.0);
        controller.pointer_move(&mut model, &geometry, 300.0);
        assert!(model.is_empty(), "provisional slot must stay out of the model");
        let outcome = controller.pointer_up(&mut model, &geometry, 203.0);

        let GestureOutcome::Committed(id) = outcome else {
            panic!("release must commit the slot, got {outcome:?}");
        };
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (2.05, 4.1));
        assert_eq!(controller.selected(), Some(id));
        assert!(controller.is_idle());
    }

    #[test]
    fn short_blank_drag_is_discarded() {
        let (mut controller, mut model, geometry) = setup(&[]);

        controller.pointer_down(&model, &geometry, 500.0);
        controller.pointer_move(&mut model, &geometry, 505.0);
        let provisional = controller
            .provisional(&model)
            .expect("creation shows a provisional slot");
        assert!((provisional.length() - 0.1).abs() < 1e-9);

        assert_eq!(
            controller.pointer_up(&mut model, &geometry, 507.0),
            GestureOutcome::Discarded
        );
        assert!(model.is_empty());
        assert!(controller.provisional(&model).is_none());
    }

    #[test]
    fn press_classifies_edges_and_body() {
        let (controller, model, geometry) = setup(&[(2.0, 4.0)]);
        let id = model.slots()[0].id;

        assert_eq!(
            controller.hit_target(&model, &geometry, 203.0),
            PressTarget::LeftEdge(id)
        );
        assert_eq!(
            controller.hit_target(&model, &geometry, 398.0),
            PressTarget::RightEdge(id)
        );
        assert_eq!(
            controller.hit_target(&model, &geometry, 300.0),
            PressTarget::Body(id)
        );
        assert_eq!(
            controller.hit_target(&model, &geometry, 100.0),
            PressTarget::Blank
        );
    }

    #[test]
    fn move_follows_total_pointer_delta_from_origin() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;

        controller.pointer_down(&model, &geometry, 250.0);
        for x in [251.0, 252.3, 249.1, 262.2, 258.7, 253.9] {
            controller.pointer_move(&mut model, &geometry, x);
        }
        controller.pointer_up(&mut model, &geometry, 270.0);

        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (2.2, 3.2));
    }

    #[test]
    fn move_released_off_track_clamps_to_track_end() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;

        controller.pointer_down(&model, &geometry, 250.0);
        let outcome = controller.pointer_up(&mut model, &geometry, 5_000.0);

        assert_eq!(outcome, GestureOutcome::Committed(id));
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (9.0, 10.0));
    }

    #[test]
    fn release_without_movement_leaves_slot_untouched() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;

        controller.pointer_down(&model, &geometry, 250.0);
        assert_eq!(
            controller.pointer_move(&mut model, &geometry, 251.0),
            GestureOutcome::Ignored
        );
        let outcome = controller.pointer_up(&mut model, &geometry, 250.0);

        assert_eq!(outcome, GestureOutcome::Released(id));
        assert!(!outcome.touches_model());
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (2.0, 3.0));
        assert!(controller.is_idle());
        assert_eq!(controller.selected(), Some(id));
    }

    #[test]
    fn move_back_to_origin_is_released_not_committed() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;

        controller.pointer_down(&model, &geometry, 250.0);
        assert_eq!(
            controller.pointer_move(&mut model, &geometry, 350.0),
            GestureOutcome::Updated
        );
        let outcome = controller.pointer_up(&mut model, &geometry, 250.0);

        assert_eq!(outcome, GestureOutcome::Released(id));
    }

    #[test]
    fn left_resize_stops_at_minimum_length() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;

        controller.pointer_down(&model, &geometry, 201.0);
        assert!(matches!(
            controller.state(),
            GestureState::ResizingLeft { .. }
        ));
        controller.pointer_move(&mut model, &geometry, 900.0);
        controller.pointer_up(&mut model, &geometry, 900.0);

        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (2.9, 3.0));
    }

    #[test]
    fn right_resize_extends_end() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;

        controller.pointer_down(&model, &geometry, 299.0);
        controller.pointer_move(&mut model, &geometry, 451.0);
        controller.pointer_up(&mut model, &geometry, 451.0);

        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (2.0, 4.5));
    }

    #[test]
    fn second_press_during_gesture_is_ignored() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);

        controller.pointer_down(&model, &geometry, 700.0);
        assert_eq!(
            controller.pointer_down(&model, &geometry, 250.0),
            GestureOutcome::Ignored
        );
        assert!(matches!(
            controller.state(),
            GestureState::CreatingBlank { .. }
        ));
        assert_eq!(
            controller.drop(
                &mut model,
                &geometry,
                250.0,
                &DragPayload::participant("Ana"),
                &mut ColorCycle::new(),
            ),
            GestureOutcome::Ignored
        );
    }

    #[test]
    fn drag_preview_is_order_independent_and_sizes_the_drop() {
        let (mut controller, mut model, geometry) = setup(&[]);
        let payload = DragPayload::category(Category::Sfx);

        controller.drag_over(&geometry, 600.0, payload.clone());
        controller.drag_over(&geometry, 420.0, payload.clone());
        assert_eq!(controller.drop_preview(), Some((420.0, 600.0)));
        assert!(model.is_empty());

        let outcome =
            controller.drop(&mut model, &geometry, 420.0, &payload, &mut ColorCycle::new());

        let GestureOutcome::Dropped(DropOutcome::Inserted(id)) = outcome else {
            panic!("drop must insert, got {outcome:?}");
        };
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (4.2, 6.0));
        assert_eq!(slot.category, Category::Sfx);
        assert!(controller.is_idle());
        assert_eq!(controller.drop_preview(), None);
    }

    #[test]
    fn collapsed_preview_falls_back_to_default_width() {
        let (mut controller, mut model, geometry) = setup(&[]);
        let payload = DragPayload::participant("Ana");

        controller.drag_over(&geometry, 300.0, payload.clone());
        controller.drag_over(&geometry, 303.0, payload.clone());
        let outcome =
            controller.drop(&mut model, &geometry, 303.0, &payload, &mut ColorCycle::new());

        let GestureOutcome::Dropped(DropOutcome::Inserted(id)) = outcome else {
            panic!("drop must insert, got {outcome:?}");
        };
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (3.05, 4.05));
    }

    #[test]
    fn drop_without_preview_near_end_stays_inside_track() {
        let (mut controller, mut model, geometry) = setup(&[]);
        let outcome = controller.drop(
            &mut model,
            &geometry,
            995.0,
            &DragPayload::participant("Ana"),
            &mut ColorCycle::new(),
        );

        let GestureOutcome::Dropped(DropOutcome::Inserted(id)) = outcome else {
            panic!("drop must insert, got {outcome:?}");
        };
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (9.0, 10.0));
    }

    #[test]
    fn drag_leave_clears_preview() {
        let (mut controller, _model, geometry) = setup(&[]);
        controller.drag_over(&geometry, 300.0, DragPayload::participant("Ana"));
        controller.drag_leave();
        assert!(controller.is_idle());
    }

    #[test]
    fn arrow_keys_nudge_selected_slot() {
        let (mut controller, mut model, _geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;
        controller.select(Some(id));

        assert_eq!(
            controller.key(&mut model, EditorKey::ArrowLeft, false),
            GestureOutcome::Nudged(id)
        );
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (1.9, 2.9));

        controller.key(&mut model, EditorKey::ArrowRight, true);
        let slot = model.get(id).expect("slot exists");
        assert_eq!((slot.start, slot.end), (2.4, 3.4));
    }

    #[test]
    fn delete_removes_selection() {
        let (mut controller, mut model, _geometry) = setup(&[(2.0, 3.0)]);
        let id = model.slots()[0].id;
        controller.select(Some(id));

        assert_eq!(
            controller.key(&mut model, EditorKey::Backspace, false),
            GestureOutcome::Deleted(id)
        );
        assert!(model.is_empty());
        assert_eq!(controller.selected(), None);
        assert_eq!(
            controller.key(&mut model, EditorKey::Delete, false),
            GestureOutcome::Ignored
        );
    }

    #[test]
    fn keys_are_ignored_during_pointer_gesture() {
        let (mut controller, mut model, geometry) = setup(&[(2.0, 3.0)]);
        controller.pointer_down(&model, &geometry, 250.0);

        assert_eq!(
            controller.key(&mut model, EditorKey::ArrowLeft, false),
            GestureOutcome::Ignored
        );
    }
}
