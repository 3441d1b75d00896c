//! Pixel/second mapping and the snap grid every slot boundary is written through.

/// Snap granularity in seconds.
pub const SNAP_STEP: f64 = 0.05;
/// Shortest slot the editor keeps, in seconds.
pub const MIN_LEN: f64 = 0.1;

/// Rounds `t` to the nearest multiple of `step`.
///
/// # Example
/// ```
/// use slot_engine::time::snap;
///
/// assert_eq!(snap(1.93, 0.05), 1.95);
/// assert_eq!(snap(2.01, 0.05), 2.0);
/// ```
pub fn snap(t: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return t;
    }
    let per_second = 1.0 / step;
    (t * per_second).round() / per_second
}

/// Clamps `t` into `[lo, hi]`.
///
/// Unlike [`f64::clamp`] this never panics: NaN maps to `lo` and an empty
/// range collapses onto `lo`.
pub fn clamp(t: f64, lo: f64, hi: f64) -> f64 {
    if t.is_nan() || hi < lo {
        return lo;
    }
    t.max(lo).min(hi)
}

/// Integer grid used for slot boundaries.
///
/// Boundaries are stored in seconds but computed in whole grid steps so that
/// moves preserve length exactly and repeated snapping never drifts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapGrid {
    per_second: f64,
    min_steps: i64,
}

impl SnapGrid {
    /// Builds a grid with `step` seconds per cell and a minimum length of
    /// `min_len` rounded to at least one cell.
    pub fn new(step: f64, min_len: f64) -> Self {
        let step = if step > 0.0 && step.is_finite() {
            step
        } else {
            SNAP_STEP
        };
        let per_second = 1.0 / step;
        let min_steps = ((min_len * per_second).round() as i64).max(1);
        Self {
            per_second,
            min_steps,
        }
    }

    pub fn step(&self) -> f64 {
        1.0 / self.per_second
    }

    pub fn min_steps(&self) -> i64 {
        self.min_steps
    }

    pub fn min_len(&self) -> f64 {
        self.seconds(self.min_steps)
    }

    /// Nearest grid step for `t`. Saturates for infinities, NaN maps to 0.
    pub fn steps(&self, t: f64) -> i64 {
        (t * self.per_second).round() as i64
    }

    /// Last grid step not past `t`.
    pub fn floor_steps(&self, t: f64) -> i64 {
        (t * self.per_second + 1e-9).floor() as i64
    }

    pub fn seconds(&self, steps: i64) -> f64 {
        steps as f64 / self.per_second
    }

    pub fn snap(&self, t: f64) -> f64 {
        self.seconds(self.steps(t))
    }
}

impl Default for SnapGrid {
    fn default() -> Self {
        Self::new(SNAP_STEP, MIN_LEN)
    }
}

/// Track width in pixels and media duration in seconds.
///
/// A duration of zero means the media metadata has not loaded yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackGeometry {
    pub pixel_width: f64,
    pub duration: f64,
}

impl TrackGeometry {
    pub fn new(pixel_width: f64, duration: f64) -> Self {
        Self {
            pixel_width: pixel_width.max(0.0),
            duration: if duration.is_finite() {
                duration.max(0.0)
            } else {
                0.0
            },
        }
    }

    pub fn has_duration(&self) -> bool {
        self.duration > 0.0
    }

    /// Pixels per second across the whole track.
    ///
    /// The whole media always spans the track width, so a track narrower in
    /// pixels than the media is long in seconds gets a scale below one.
    pub fn pixels_per_second(&self) -> f64 {
        if !self.has_duration() {
            return 0.0;
        }
        self.pixel_width / self.duration
    }

    /// Maps seconds to a track x coordinate.
    ///
    /// # Example
    /// ```
    /// use slot_engine::time::TrackGeometry;
    ///
    /// let geometry = TrackGeometry::new(800.0, 10.0);
    /// assert_eq!(geometry.to_pixel(2.5), 200.0);
    /// assert_eq!(geometry.to_seconds(200.0), 2.5);
    /// ```
    pub fn to_pixel(&self, t: f64) -> f64 {
        if !self.has_duration() {
            return 0.0;
        }
        t * self.pixels_per_second()
    }

    /// Maps a track x coordinate to seconds, the exact inverse of
    /// [`to_pixel`](Self::to_pixel). Returns 0 while the duration or the
    /// width is unknown.
    pub fn to_seconds(&self, x: f64) -> f64 {
        let scale = self.pixels_per_second();
        if scale <= 0.0 {
            return 0.0;
        }
        x / scale
    }

    /// Clamps a pointer x coordinate to the track bounds.
    pub fn clamp_x(&self, x: f64) -> f64 {
        clamp(x, 0.0, self.pixel_width)
    }

    /// Largest boundary step allowed on `grid`, or `None` while the duration is unknown.
    pub fn max_steps(&self, grid: &SnapGrid) -> Option<i64> {
        self.has_duration().then(|| grid.floor_steps(self.duration))
    }
}

/// Formats seconds as `MM:SS.ss` for slot labels and status lines.
///
/// ```
/// use slot_engine::time::format_timecode;
/// assert_eq!(format_timecode(0.0), "00:00.00");
/// assert_eq!(format_timecode(61.5), "01:01.50");
/// ```
pub fn format_timecode(seconds: f64) -> String {
    let hundredths = (seconds.max(0.0) * 100.0).round() as u64;
    let minutes = hundredths / 6_000;
    let secs = (hundredths % 6_000) / 100;
    let frac = hundredths % 100;
    format!("{minutes:02}:{secs:02}.{frac:02}")
}

#[cfg(test)]
mod tests {
    use super::{SnapGrid, TrackGeometry, clamp, snap};

    #[test]
    fn snap_rounds_to_nearest_step() {
        assert_eq!(snap(0.024, 0.05), 0.0);
        assert_eq!(snap(0.026, 0.05), 0.05);
        assert_eq!(snap(1.9, 0.05), 1.9);
    }

    #[test]
    fn clamp_absorbs_nan_and_empty_ranges() {
        assert_eq!(clamp(f64::NAN, 0.0, 5.0), 0.0);
        assert_eq!(clamp(3.0, 2.0, 1.0), 2.0);
        assert_eq!(clamp(-4.0, 0.0, 5.0), 0.0);
        assert_eq!(clamp(9.0, 0.0, 5.0), 5.0);
    }

    #[test]
    fn grid_seconds_match_decimal_literals() {
        let grid = SnapGrid::default();
        assert_eq!(grid.min_steps(), 2);
        assert_eq!(grid.seconds(38), 1.9);
        assert_eq!(grid.seconds(grid.steps(2.0) - 2), 1.9);
        assert_eq!(grid.snap(3.4), 3.4);
    }

    #[test]
    fn grid_steps_saturate_on_infinite_input() {
        let grid = SnapGrid::default();
        assert_eq!(grid.steps(f64::INFINITY), i64::MAX);
        assert_eq!(grid.steps(f64::NAN), 0);
    }

    #[test]
    fn to_seconds_is_zero_before_duration_is_known() {
        let geometry = TrackGeometry::new(800.0, 0.0);
        assert_eq!(geometry.to_seconds(400.0), 0.0);
        assert_eq!(geometry.to_pixel(3.0), 0.0);
        assert_eq!(geometry.max_steps(&SnapGrid::default()), None);
    }

    #[test]
    fn narrow_track_still_spans_the_whole_media() {
        let geometry = TrackGeometry::new(100.0, 1_000.0);
        assert_eq!(geometry.pixels_per_second(), 0.1);
        assert_eq!(geometry.to_pixel(1_000.0), 100.0);
        assert_eq!(geometry.to_seconds(100.0), 1_000.0);
    }

    #[test]
    fn zero_width_track_maps_to_origin() {
        let geometry = TrackGeometry::new(0.0, 10.0);
        assert_eq!(geometry.to_pixel(4.0), 0.0);
        assert_eq!(geometry.to_seconds(30.0), 0.0);
    }

    #[test]
    fn max_steps_floors_partial_steps() {
        let geometry = TrackGeometry::new(100.0, 10.03);
        assert_eq!(geometry.max_steps(&SnapGrid::default()), Some(200));
    }
}
