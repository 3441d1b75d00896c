use crate::error::{EngineError, Result};
use crate::palette::{ColorCycle, DragPayload};
use crate::slot::{Category, Participants, Slot, SlotDraft, SlotId};
use crate::time::{SnapGrid, TrackGeometry};
use tracing::{debug, warn};

/// Which edge of a slot a resize writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

/// What a palette drop did to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Metadata merged into an existing slot.
    Merged(SlotId),
    /// No slot under the drop point; a new slot was inserted.
    Inserted(SlotId),
    /// The drop span was shorter than the minimum length after clamping.
    Rejected,
}

/// The slot set of one editing session, kept sorted by start.
///
/// Every boundary write goes through the snap grid and the `[0, duration]`
/// clamp, so slots always satisfy `0 <= start`, `start + min_len <= end`
/// and `end <= duration`. While the duration is unknown (zero) the upper
/// clamp is disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotModel {
    slots: Vec<Slot>,
    grid: SnapGrid,
    duration: f64,
    next_id: SlotId,
}

impl SlotModel {
    pub fn new(grid: SnapGrid) -> Self {
        Self {
            slots: Vec::new(),
            grid,
            duration: 0.0,
            next_id: 1,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn grid(&self) -> &SnapGrid {
        &self.grid
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Updates the media duration and re-clamps every slot into the new
    /// bounds. Returns how many slots were dropped for falling below the
    /// minimum length.
    pub fn set_duration(&mut self, duration: f64) -> usize {
        self.duration = TrackGeometry::new(0.0, duration).duration;
        let before = self.slots.len();
        let slots = std::mem::take(&mut self.slots);
        for mut slot in slots {
            let Some((start, end)) = self.normalize_span(slot.start, slot.end) else {
                debug!(id = slot.id, start = slot.start, end = slot.end, "slot dropped by duration change");
                continue;
            };
            slot.start = start;
            slot.end = end;
            self.slots.push(slot);
        }
        self.sort();
        before - self.slots.len()
    }

    /// Snaps and clamps `[start, end]`, returning `None` when the result is
    /// inverted or shorter than the minimum length.
    pub fn normalize_span(&self, start: f64, end: f64) -> Option<(f64, f64)> {
        let (lo, hi) = self.step_bounds();
        let start = clamp_steps(self.grid.steps(start), lo, hi);
        let end = clamp_steps(self.grid.steps(end), lo, hi);
        if end.saturating_sub(start) < self.grid.min_steps() {
            return None;
        }
        Some((self.grid.seconds(start), self.grid.seconds(end)))
    }

    /// Inserts a new slot with a fresh id.
    ///
    /// Returns `None` when the clamped, snapped span is below the minimum
    /// length; the caller has to pick a longer span.
    pub fn insert(&mut self, draft: SlotDraft) -> Option<SlotId> {
        let Some((start, end)) = self.normalize_span(draft.start, draft.end) else {
            debug!(start = draft.start, end = draft.end, "insert rejected: below minimum length");
            return None;
        };
        let id = self.allocate_id();
        self.slots.push(SlotDraft { start, end, ..draft }.into_slot(id));
        self.sort();
        debug!(id, start, end, slot_count = self.slots.len(), "slot inserted");
        Some(id)
    }

    /// Moves a slot so it starts at `new_start`, keeping its length.
    pub fn move_to(&mut self, id: SlotId, new_start: f64) -> Result<()> {
        let (lo, hi) = self.step_bounds();
        let grid = self.grid;
        let slot = self.slot_mut(id)?;
        let start = grid.steps(slot.start);
        let length = grid.steps(slot.end) - start;
        let latest_start = hi.saturating_sub(length);
        let start = clamp_steps(grid.steps(new_start), lo, latest_start);
        slot.start = grid.seconds(start);
        slot.end = grid.seconds(start.saturating_add(length));
        self.sort();
        Ok(())
    }

    /// Shifts both boundaries by the same clamped delta.
    pub fn move_by(&mut self, id: SlotId, delta: f64) -> Result<()> {
        let start = self.get(id).ok_or(EngineError::SlotNotFound { id })?.start;
        self.move_to(id, start + delta)
    }

    /// Sets one boundary. The value is clamped so the slot never inverts,
    /// never gets shorter than the minimum length and stays inside the track.
    pub fn resize_boundary(&mut self, id: SlotId, which: Boundary, value: f64) -> Result<()> {
        let (lo, hi) = self.step_bounds();
        let grid = self.grid;
        let slot = self.slot_mut(id)?;
        let start = grid.steps(slot.start);
        let end = grid.steps(slot.end);
        let target = grid.steps(value);
        match which {
            Boundary::Start => {
                let start = clamp_steps(target, lo, end - grid.min_steps());
                slot.start = grid.seconds(start);
            }
            Boundary::End => {
                let end = clamp_steps(target, start + grid.min_steps(), hi);
                slot.end = grid.seconds(end);
            }
        }
        self.sort();
        Ok(())
    }

    pub fn delete_by_id(&mut self, id: SlotId) -> Option<Slot> {
        let index = self.slots.iter().position(|slot| slot.id == id)?;
        let removed = self.slots.remove(index);
        debug!(id, slot_count = self.slots.len(), "slot deleted");
        Some(removed)
    }

    /// First slot, in start order, whose pixel extent contains `x`.
    pub fn hit_test(&self, geometry: &TrackGeometry, x: f64) -> Option<SlotId> {
        self.slots
            .iter()
            .find(|slot| geometry.to_pixel(slot.start) <= x && x <= geometry.to_pixel(slot.end))
            .map(|slot| slot.id)
    }

    /// Applies a palette drop at track position `x`.
    ///
    /// A drop onto an existing slot merges metadata: the participant is added
    /// to the slot's set and a category overwrites the slot's category and
    /// color. A drop onto empty track inserts `[start, end]` as a new slot.
    pub fn merge_at_drop(
        &mut self,
        geometry: &TrackGeometry,
        x: f64,
        payload: &DragPayload,
        span: (f64, f64),
        colors: &mut ColorCycle,
    ) -> DropOutcome {
        if let Some(id) = self.hit_test(geometry, x) {
            if let Ok(slot) = self.slot_mut(id) {
                if let Some(name) = &payload.participant {
                    slot.participants.insert(name);
                }
                if let Some(category) = payload.category {
                    slot.category = category;
                    slot.color = Some(category.color().to_owned());
                }
                debug!(id, ?payload, "drop merged into slot");
            }
            return DropOutcome::Merged(id);
        }

        if self.normalize_span(span.0, span.1).is_none() {
            debug!(start = span.0, end = span.1, "drop rejected: below minimum length");
            return DropOutcome::Rejected;
        }
        let participants: Participants = payload.participant.iter().collect();
        let label = payload
            .participant
            .clone()
            .or_else(|| payload.category.map(|category| category.as_str().to_owned()))
            .unwrap_or_default();
        let color = match payload.category {
            Some(category) => category.color().to_owned(),
            None => colors.next_color(),
        };
        let draft = SlotDraft {
            start: span.0,
            end: span.1,
            label,
            participants,
            category: payload.category.unwrap_or(Category::Dialogue),
            color: Some(color),
        };
        match self.insert(draft) {
            Some(id) => DropOutcome::Inserted(id),
            None => DropOutcome::Rejected,
        }
    }

    /// Replaces every slot with `drafts`, assigning fresh ids. Drafts that
    /// fall below the minimum length after clamping are dropped. Returns the
    /// number of dropped drafts.
    pub fn replace_all(&mut self, drafts: Vec<SlotDraft>) -> usize {
        let total = drafts.len();
        self.slots.clear();
        for draft in drafts {
            let Some((start, end)) = self.normalize_span(draft.start, draft.end) else {
                continue;
            };
            let id = self.allocate_id();
            self.slots.push(SlotDraft { start, end, ..draft }.into_slot(id));
        }
        self.sort();
        let dropped = total - self.slots.len();
        if dropped > 0 {
            warn!(dropped, kept = self.slots.len(), "replace dropped invalid slots");
        }
        dropped
    }

    /// Replaces every slot with a persisted snapshot, keeping ids.
    ///
    /// Zero or duplicate ids are reassigned. The id allocator moves past the
    /// largest id seen, wrapping when that is `SlotId::MAX`.
    pub fn restore(&mut self, slots: Vec<Slot>) -> usize {
        let total = slots.len();
        let highest = slots.iter().map(|slot| slot.id).max().unwrap_or(0);
        if highest >= self.next_id {
            self.next_id = highest.wrapping_add(1);
        }
        self.slots.clear();
        for mut slot in slots {
            let Some((start, end)) = self.normalize_span(slot.start, slot.end) else {
                continue;
            };
            if slot.id == 0 || self.slots.iter().any(|existing| existing.id == slot.id) {
                slot.id = self.allocate_id();
            }
            slot.start = start;
            slot.end = end;
            self.slots.push(slot);
        }
        self.sort();
        total - self.slots.len()
    }

    fn step_bounds(&self) -> (i64, i64) {
        let geometry = TrackGeometry::new(0.0, self.duration);
        (0, geometry.max_steps(&self.grid).unwrap_or(i64::MAX))
    }

    fn slot_mut(&mut self, id: SlotId) -> Result<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .ok_or(EngineError::SlotNotFound { id })
    }

    fn sort(&mut self) {
        self.slots.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    /// Hands out the next free id. Past `SlotId::MAX` the counter wraps and
    /// skips ids still in use, so ids stay unique within the set.
    fn allocate_id(&mut self) -> SlotId {
        let mut id = self.next_id;
        while id == 0 || self.slots.iter().any(|slot| slot.id == id) {
            id = id.wrapping_add(1);
        }
        self.next_id = id.wrapping_add(1);
        id
    }
}

impl Default for SlotModel {
    fn default() -> Self {
        Self::new(SnapGrid::default())
    }
}

fn clamp_steps(value: i64, lo: i64, hi: i64) -> i64 {
    value.min(hi).max(lo)
}
