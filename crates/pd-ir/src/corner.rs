//! Polygon corners: the note each vertex plays.

/// Note a freshly built corner plays (C4, in Hz).
pub const BASE_NOTE: f64 = 261.63;

/// Fraction of the corner's time slot a freshly built corner sounds for.
pub const BASE_LENGTH_FACTOR: f64 = 0.2;

const MIN_LENGTH_FACTOR: f64 = 0.1;
const MAX_LENGTH_FACTOR: f64 = 1.0;

/// Clamp a note length factor into `[0.1, 1.0]`.
pub fn clamp_length_factor(factor: f64) -> f64 {
    if factor.is_nan() {
        return BASE_LENGTH_FACTOR;
    }
    factor.clamp(MIN_LENGTH_FACTOR, MAX_LENGTH_FACTOR)
}

/// A single vertex of a pattern configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Corner {
    /// Position around the polygon, 0 is the top vertex at t = 0
    pub index: u32,
    /// Frequency in Hz (0 = rest)
    pub note: f64,
    /// Fraction of the corner's time slot that sounds, 0.1..=1.0
    pub length_factor: f64,
}

impl Corner {
    /// A corner at `index` with the base note and length.
    pub const fn new(index: u32) -> Self {
        Self {
            index,
            note: BASE_NOTE,
            length_factor: BASE_LENGTH_FACTOR,
        }
    }

    /// True if this corner is a rest.
    pub fn is_rest(&self) -> bool {
        self.note == 0.0
    }

    /// Set the note frequency. Negative or non-finite values become a rest.
    pub fn set_note(&mut self, hz: f64) {
        self.note = if hz.is_finite() && hz > 0.0 { hz } else { 0.0 };
    }

    /// Set the length factor, clamped into `[0.1, 1.0]`.
    pub fn set_length_factor(&mut self, factor: f64) {
        self.length_factor = clamp_length_factor(factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, 0.1 ; "below range")]
    #[test_case(0.5, 0.5 ; "in range")]
    #[test_case(3.0, 1.0 ; "above range")]
    #[test_case(f64::NAN, BASE_LENGTH_FACTOR ; "nan")]
    fn length_factor_clamps(input: f64, expected: f64) {
        let mut corner = Corner::new(0);
        corner.set_length_factor(input);
        assert_eq!(corner.length_factor, expected);
    }

    #[test]
    fn invalid_notes_become_rests() {
        let mut corner = Corner::new(2);
        corner.set_note(-440.0);
        assert!(corner.is_rest());
        corner.set_note(f64::INFINITY);
        assert!(corner.is_rest());
        corner.set_note(440.0);
        assert_eq!(corner.note, 440.0);
    }
}
