//! Play/pause transport clock.

/// Elapsed time after a reset. The short pre-roll lets the first frame
/// land before beat zero, so corner 0 fires on the downbeat.
pub const RESET_OFFSET_SECONDS: f64 = -0.1;

/// Transport clock in seconds.
///
/// Time only moves while playing; pausing freezes it and resuming
/// continues from the same value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transport {
    elapsed: f64,
    playing: bool,
}

impl Transport {
    /// A transport that is playing from the reset offset.
    pub fn new() -> Self {
        Self { elapsed: RESET_OFFSET_SECONDS, playing: true }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advance by `dt` seconds of wall time. Returns the new elapsed time.
    ///
    /// Ignored while paused and for non-finite or non-positive steps.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.playing && dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.elapsed
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flip between playing and paused. Returns whether it is now playing.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Jump back to the reset offset; the play state is unchanged.
    pub fn rewind(&mut self) {
        self.elapsed = RESET_OFFSET_SECONDS;
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
