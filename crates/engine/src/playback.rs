use crate::slot::{Slot, SlotId};
use crate::time::clamp;

/// Playback operations the editor needs from the media player.
///
/// The editor only reads time and duration and issues seeks; it never owns
/// playback state.
pub trait MediaPlayer {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Media duration in seconds, zero until metadata is available.
    fn duration(&self) -> f64;

    /// Moves playback to `t` seconds.
    fn seek(&mut self, t: f64);
}

/// Ids of the slots whose range contains `t`, boundaries included, in list order.
///
/// A linear scan: slot lists stay in the tens to hundreds.
pub fn active_at(slots: &[Slot], t: f64) -> Vec<SlotId> {
    slots
        .iter()
        .filter(|slot| slot.contains(t))
        .map(|slot| slot.id)
        .collect()
}

/// Clamps a seek target into `[0, duration]`.
pub fn clamp_seek(t: f64, duration: f64) -> f64 {
    let upper = if duration > 0.0 { duration } else { 0.0 };
    clamp(t, 0.0, upper)
}

/// Tracks the active slot set against playback time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSync {
    time: f64,
    active: Vec<SlotId>,
}

impl PlaybackSync {
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn active(&self) -> &[SlotId] {
        &self.active
    }

    pub fn is_active(&self, id: SlotId) -> bool {
        self.active.contains(&id)
    }

    /// Recomputes the active set at `t`. Returns true when it changed.
    pub fn update(&mut self, t: f64, slots: &[Slot]) -> bool {
        self.time = t;
        self.refresh(slots)
    }

    /// Recomputes the active set at the last known time, after the slot
    /// list changed. Returns true when it changed.
    pub fn refresh(&mut self, slots: &[Slot]) -> bool {
        let active = active_at(slots, self.time);
        if active == self.active {
            return false;
        }
        self.active = active;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{PlaybackSync, active_at, clamp_seek};
    use crate::slot::SlotDraft;

    #[test]
    fn active_set_includes_both_boundaries() {
        let slots = vec![
            SlotDraft::new(1.0, 2.0).into_slot(1),
            SlotDraft::new(2.0, 3.0).into_slot(2),
            SlotDraft::new(5.0, 6.0).into_slot(3),
        ];

        assert_eq!(active_at(&slots, 2.0), vec![1, 2]);
        assert_eq!(active_at(&slots, 6.0), vec![3]);
        assert!(active_at(&slots, 4.0).is_empty());
    }

    #[test]
    fn update_reports_changes_only() {
        let slots = vec![SlotDraft::new(1.0, 2.0).into_slot(1)];
        let mut sync = PlaybackSync::default();

        assert!(!sync.update(0.5, &slots));
        assert!(sync.update(1.5, &slots));
        assert!(!sync.update(1.7, &slots));
        assert!(sync.is_active(1));
        assert!(sync.update(2.01, &slots));
        assert!(sync.active().is_empty());
    }

    #[test]
    fn seek_is_clamped_to_media() {
        assert_eq!(clamp_seek(-3.0, 10.0), 0.0);
        assert_eq!(clamp_seek(12.0, 10.0), 10.0);
        assert_eq!(clamp_seek(4.0, 0.0), 0.0);
    }
}
