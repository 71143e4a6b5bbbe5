//! Turning corner hits into tones and recorded notes.

use alloc::vec::Vec;

use pd_ir::{effective_frequency, freq_to_midi, Corner, NoteEvent, PatternConfig, TimeBase, TICKS_PER_BEAT};

/// Fixed output level of every triggered tone.
pub const TONE_AMPLITUDE: f32 = 0.2;

/// Lowest audible frequency (inclusive).
pub const MIN_AUDIBLE_HZ: f64 = 20.0;

/// Highest audible frequency (exclusive).
pub const MAX_AUDIBLE_HZ: f64 = 10_000.0;

/// Shortest tone ever sent to the audio side.
pub const MIN_TONE_SECONDS: f64 = 0.01;

/// A fire-and-forget request to play one tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneTrigger {
    pub frequency: f64,
    pub amplitude: f32,
    /// Seconds
    pub duration: f64,
}

/// Receiver of triggered tones (the audio collaborator).
pub trait ToneSink {
    fn play_tone(&mut self, tone: ToneTrigger);
}

/// Discards every tone.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ToneSink for NullSink {
    fn play_tone(&mut self, _tone: ToneTrigger) {}
}

/// Collects tones, mostly for tests and offline inspection.
impl ToneSink for Vec<ToneTrigger> {
    fn play_tone(&mut self, tone: ToneTrigger) {
        self.push(tone);
    }
}

impl<S: ToneSink + ?Sized> ToneSink for &mut S {
    fn play_tone(&mut self, tone: ToneTrigger) {
        (**self).play_tone(tone);
    }
}

/// Seconds between two adjacent corners crossing the line.
pub fn note_duration_seconds(period_beats: f64, side_count: u32, time_base: TimeBase) -> f64 {
    if side_count == 0 {
        return 0.0;
    }
    time_base.beats_to_seconds(period_beats / side_count as f64)
}

fn audible(freq: f64) -> bool {
    (MIN_AUDIBLE_HZ..MAX_AUDIBLE_HZ).contains(&freq)
}

/// The tone a corner plays when it crosses, or `None` for rests and
/// frequencies outside the audible window.
pub fn tone_for_corner(
    corner: &Corner,
    config: &PatternConfig,
    period_beats: f64,
    time_base: TimeBase,
) -> Option<ToneTrigger> {
    if corner.is_rest() {
        return None;
    }
    let frequency = effective_frequency(corner.note, config.radius());
    if !audible(frequency) {
        return None;
    }
    let step = note_duration_seconds(period_beats, config.side_count(), time_base);
    Some(ToneTrigger {
        frequency,
        amplitude: TONE_AMPLITUDE,
        duration: (step * corner.length_factor).max(MIN_TONE_SECONDS),
    })
}

/// The note recorded for a corner crossing at `beats`.
///
/// Pitch comes from the sounding (radius-shifted) frequency, the same
/// rule the export uses, so a live recording lines up with an export of
/// the same cycles.
pub fn live_note_event(
    corner: &Corner,
    config: &PatternConfig,
    period_beats: f64,
    beats: f64,
) -> Option<NoteEvent> {
    if corner.is_rest() || config.side_count() == 0 {
        return None;
    }
    let pitch = freq_to_midi(effective_frequency(corner.note, config.radius()))?;
    let ticks = period_beats / config.side_count() as f64 * TICKS_PER_BEAT as f64 * corner.length_factor;
    let duration = libm::round(ticks).max(1.0) as u32;
    Some(NoteEvent::new(pitch, TimeBase::beats_to_ticks(beats), duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_ir::Color;
    use test_case::test_case;

    fn triangle(note: f64, length: f64) -> PatternConfig {
        let mut config = PatternConfig::new(3, 80.0, Color::CYAN);
        for i in 0..3 {
            if let Some(c) = config.corner_mut(i) {
                c.set_note(note);
                c.set_length_factor(length);
            }
        }
        config
    }

    #[test]
    fn triangle_at_120_bpm() {
        let config = triangle(440.0, 0.5);
        let tb = TimeBase::new(120.0);

        let step = note_duration_seconds(4.0, 3, tb);
        assert!((step - 2.0 / 3.0).abs() < 1e-9);

        let tone = tone_for_corner(&config.corners()[0], &config, 4.0, tb).unwrap();
        assert_eq!(tone.frequency, 440.0);
        assert_eq!(tone.amplitude, TONE_AMPLITUDE);
        assert!((tone.duration - 1.0 / 3.0).abs() < 1e-9);

        let note = live_note_event(&config.corners()[0], &config, 4.0, 0.0).unwrap();
        assert_eq!(note, NoteEvent::new(69, 0, 320));
    }

    #[test]
    fn rests_are_silent() {
        let config = triangle(0.0, 0.5);
        let tb = TimeBase::default();
        assert_eq!(tone_for_corner(&config.corners()[1], &config, 4.0, tb), None);
        assert_eq!(live_note_event(&config.corners()[1], &config, 4.0, 1.0), None);
    }

    #[test_case(19.9, false ; "below window")]
    #[test_case(20.0, true ; "lower edge")]
    #[test_case(9_999.0, true ; "just inside")]
    #[test_case(10_000.0, false ; "upper edge")]
    fn audible_window(freq: f64, expected: bool) {
        let config = triangle(freq, 0.2);
        let tone = tone_for_corner(&config.corners()[0], &config, 4.0, TimeBase::default());
        assert_eq!(tone.is_some(), expected);
    }

    #[test]
    fn very_short_notes_are_floored() {
        let mut config = PatternConfig::new(64, 80.0, Color::CYAN);
        config.corner_mut(0).unwrap().set_length_factor(0.1);
        let tb = TimeBase::new(10_000.0);
        let tone = tone_for_corner(&config.corners()[0], &config, 4.0, tb).unwrap();
        assert_eq!(tone.duration, MIN_TONE_SECONDS);

        let note = live_note_event(&config.corners()[0], &config, 4.0, 0.0).unwrap();
        assert_eq!(note.duration_ticks, 3);
    }

    #[test]
    fn sinks_receive_tones() {
        fn feed(mut sink: impl ToneSink, tone: ToneTrigger) {
            sink.play_tone(tone);
        }

        let mut tones: Vec<ToneTrigger> = Vec::new();
        let tone = ToneTrigger { frequency: 440.0, amplitude: 0.2, duration: 0.1 };
        feed(&mut tones, tone);
        feed(NullSink, tone);
        assert_eq!(tones, vec![tone]);
    }
}
