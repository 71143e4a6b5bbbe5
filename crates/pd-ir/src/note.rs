//! Pitches, note names and timed note events.

use core::fmt;

/// A named pitch from the editor's note palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteName {
    pub name: &'static str,
    pub freq: f64,
}

/// The editor palette: one octave from C4 to C5, plus a rest.
pub const NOTE_TABLE: [NoteName; 14] = [
    NoteName { name: "C", freq: 261.63 },
    NoteName { name: "C#", freq: 277.18 },
    NoteName { name: "D", freq: 293.66 },
    NoteName { name: "D#", freq: 311.13 },
    NoteName { name: "E", freq: 329.63 },
    NoteName { name: "F", freq: 349.23 },
    NoteName { name: "F#", freq: 369.99 },
    NoteName { name: "G", freq: 392.00 },
    NoteName { name: "G#", freq: 415.30 },
    NoteName { name: "A", freq: 440.00 },
    NoteName { name: "A#", freq: 466.16 },
    NoteName { name: "B", freq: 493.88 },
    NoteName { name: "C", freq: 523.25 },
    NoteName { name: "pause", freq: 0.0 },
];

/// Closest palette name for a frequency, or "?" if nothing is within 2 Hz.
pub fn note_label(freq: f64) -> &'static str {
    NOTE_TABLE
        .iter()
        .map(|n| (n, libm::fabs(n.freq - freq)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, diff)| *diff < 2.0)
        .map_or("?", |(n, _)| n.name)
}

/// Frequency bound to a mini-keyboard key (`"c4"`, `"c#"`, ... `"c5"`).
pub fn keyboard_note(key: &str) -> Option<f64> {
    let freq = match key {
        "c4" => 261.63,
        "c#" => 277.18,
        "d" => 293.66,
        "d#" => 311.13,
        "e" => 329.63,
        "f" => 349.23,
        "f#" => 369.99,
        "g" => 392.00,
        "g#" => 415.30,
        "a" => 440.00,
        "a#" => 466.16,
        "b" => 493.88,
        "c5" => 523.25,
        _ => return None,
    };
    Some(freq)
}

/// Octave-shift a corner note by polygon size: smaller polygons sound higher.
pub fn effective_frequency(note: f64, radius: f64) -> f64 {
    if radius < 20.0 {
        note * 4.0
    } else if radius < 50.0 {
        note * 2.0
    } else if radius < 100.0 {
        note
    } else if radius < 200.0 {
        note / 2.0
    } else if radius < 250.0 {
        note / 4.0
    } else {
        note / 8.0
    }
}

/// Nearest MIDI note for a frequency (A4 = 440 Hz = 69), clamped to 0..=127.
///
/// Returns `None` for rests and anything that is not a positive frequency.
pub fn freq_to_midi(freq: f64) -> Option<u8> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    let midi = libm::round(69.0 + 12.0 * libm::log2(freq / 440.0));
    Some(midi.clamp(0.0, 127.0) as u8)
}

/// A timed note at 480 ticks per beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    /// Tick the note starts on (field order gives time ordering)
    pub start_tick: u64,
    /// MIDI note number, 0..=127
    pub pitch: u8,
    /// Length in ticks, at least 1
    pub duration_ticks: u32,
}

impl NoteEvent {
    /// Create a note event. Pitch is clamped to 127 and duration to at least one tick.
    pub fn new(pitch: u8, start_tick: u64, duration_ticks: u32) -> Self {
        Self {
            start_tick,
            pitch: pitch.min(127),
            duration_ticks: duration_ticks.max(1),
        }
    }

    /// Tick the note releases on.
    pub fn end_tick(&self) -> u64 {
        self.start_tick + self.duration_ticks as u64
    }

    /// Duration in the `T<ticks>` notation.
    pub fn duration(&self) -> TickDuration {
        TickDuration(self.duration_ticks)
    }
}

/// A duration in ticks, displayed as `T<ticks>` (e.g. `T320`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickDuration(pub u32);

impl fmt::Display for TickDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
