use std::time::Instant;

use slot_engine::MediaPlayer;

/// Clock-driven stand-in for a media element: it has a duration and a
/// position that advances while playing, but decodes nothing.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlayer {
    position: f64,
    duration: f64,
    playing: bool,
    last_tick: Option<Instant>,
}

impl SimulatedPlayer {
    /// Loads media of `duration` seconds and rewinds.
    pub fn load(&mut self, duration: f64) {
        self.duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        self.position = 0.0;
        self.playing = false;
        self.last_tick = None;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.playing = false;
        } else if self.duration > 0.0 {
            if self.position >= self.duration {
                self.position = 0.0;
            }
            self.playing = true;
        }
        self.last_tick = None;
    }

    /// Moves the position forward by the wall time since the previous tick.
    /// Stops at the end of the media.
    pub fn advance(&mut self, now: Instant) {
        if !self.playing {
            return;
        }
        if let Some(last) = self.last_tick {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            self.position = (self.position + elapsed).min(self.duration);
            if self.position >= self.duration {
                self.playing = false;
            }
        }
        self.last_tick = Some(now);
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek(&mut self, t: f64) {
        self.position = t.clamp(0.0, self.duration);
    }
}
