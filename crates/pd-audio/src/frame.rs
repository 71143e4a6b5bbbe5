//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Same value on both channels.
    pub const fn mono(value: i16) -> Self {
        Self { left: value, right: value }
    }

    /// Mono frame from a float sample in `[-1, 1]` (clamped).
    pub fn from_sample(sample: f32) -> Self {
        let value = (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        Self::mono(value)
    }

    /// Mix another frame into this one, saturating at the i16 range.
    pub fn mix(&mut self, other: Frame) {
        self.left = self.left.saturating_add(other.left);
        self.right = self.right.saturating_add(other.right);
    }

    /// Both channels as floats in `[-1, 1)`.
    pub fn to_f32(self) -> (f32, f32) {
        (self.left as f32 / 32768.0, self.right as f32 / 32768.0)
    }
}
