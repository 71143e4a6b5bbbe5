//! Transport time to musical time conversion.

/// Fixed export resolution.
pub const TICKS_PER_BEAT: u32 = 480;

/// One bar is always four beats, whatever the polygon's side count.
pub const BEATS_PER_MEASURE: u32 = 4;

/// Converts elapsed transport seconds into beats at a fixed tempo.
///
/// The only state is the tempo itself. Tempo is clamped to at least
/// 1 BPM on construction, so every conversion is well defined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeBase {
    bpm: f64,
}

impl TimeBase {
    /// Lowest accepted tempo.
    pub const MIN_BPM: f64 = 1.0;

    /// Create a time base, clamping the tempo to `MIN_BPM` (NaN becomes `MIN_BPM`).
    pub fn new(bpm: f64) -> Self {
        let bpm = if bpm.is_nan() { Self::MIN_BPM } else { bpm.max(Self::MIN_BPM) };
        Self { bpm }
    }

    /// Tempo in beats per minute.
    pub const fn bpm(self) -> f64 {
        self.bpm
    }

    /// Beats elapsed after `seconds` of transport time.
    ///
    /// Negative time (the short pre-roll after a reset) yields zero beats.
    pub fn beats_elapsed(self, seconds: f64) -> f64 {
        seconds.max(0.0) * self.bpm / 60.0
    }

    /// Length of `beats` beats in seconds.
    pub fn beats_to_seconds(self, beats: f64) -> f64 {
        beats / self.bpm * 60.0
    }

    /// Round a beat position to the nearest tick at `TICKS_PER_BEAT`.
    pub fn beats_to_ticks(beats: f64) -> u64 {
        libm::round(beats.max(0.0) * TICKS_PER_BEAT as f64) as u64
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new(120.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn one_second_at_120_is_two_beats() {
        assert_eq!(TimeBase::new(120.0).beats_elapsed(1.0), 2.0);
    }

    #[test_case(-0.1 ; "reset pre-roll")]
    #[test_case(-10.0 ; "far negative")]
    #[test_case(0.0 ; "origin")]
    fn non_positive_time_is_zero_beats(t: f64) {
        assert_eq!(TimeBase::new(90.0).beats_elapsed(t), 0.0);
    }

    #[test_case(0.0, 1.0 ; "zero")]
    #[test_case(-5.0, 1.0 ; "negative")]
    #[test_case(f64::NAN, 1.0 ; "nan")]
    #[test_case(140.0, 140.0 ; "valid")]
    fn tempo_is_clamped(input: f64, expected: f64) {
        assert_eq!(TimeBase::new(input).bpm(), expected);
    }

    #[test]
    fn beats_to_seconds_inverts_beats_elapsed() {
        let tb = TimeBase::new(100.0);
        let beats = tb.beats_elapsed(3.0);
        assert!((tb.beats_to_seconds(beats) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn beats_to_ticks_rounds() {
        assert_eq!(TimeBase::beats_to_ticks(1.0), 480);
        assert_eq!(TimeBase::beats_to_ticks(4.0 / 3.0), 640);
        assert_eq!(TimeBase::beats_to_ticks(-2.0), 0);
    }
}
