//! Offline expansion of every polygon's sequence into note timelines.
//!
//! The export length is the least common multiple of all polygons'
//! cycle spans (sequence length times measure count), capped at 128
//! measures. Each polygon is replayed one rotation at a time from its
//! stored pattern slots, never from the live view, and the planner
//! only ever sees an immutable [`ExportSnapshot`].

use alloc::vec::Vec;
use arrayvec::ArrayString;

use pd_ir::{
    effective_frequency, freq_to_midi, NoteEvent, PatternStore, Polygon, PolygonKey, Sequence,
    BEATS_PER_MEASURE, TICKS_PER_BEAT,
};

use crate::timeline::NoteTimeline;

/// Upper bound on the exported length.
pub const MAX_EXPORT_MEASURES: u64 = 128;

/// Frozen copy of one polygon's sequencing state.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonSnapshot {
    pub id: PolygonKey,
    pub name: ArrayString<32>,
    pub measure_count: u32,
    pub sequence: Sequence,
    pub store: PatternStore,
}

impl PolygonSnapshot {
    /// Measures before this polygon's sequence repeats.
    pub fn cycle_span(&self) -> u64 {
        self.sequence.len() as u64 * self.measure_count as u64
    }
}

impl From<&Polygon> for PolygonSnapshot {
    fn from(polygon: &Polygon) -> Self {
        Self {
            id: polygon.id(),
            name: polygon.name,
            measure_count: polygon.measure_count(),
            sequence: polygon.sequence().clone(),
            store: polygon.store().clone(),
        }
    }
}

/// Everything the planner reads: tempo plus the polygons in track order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportSnapshot {
    pub bpm: f64,
    pub polygons: Vec<PolygonSnapshot>,
}

impl ExportSnapshot {
    pub fn capture<'a>(bpm: f64, polygons: impl IntoIterator<Item = &'a Polygon>) -> Self {
        Self {
            bpm,
            polygons: polygons.into_iter().map(PolygonSnapshot::from).collect(),
        }
    }
}

/// One polygon's exported notes.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportTrack {
    pub polygon: PolygonKey,
    pub name: ArrayString<32>,
    pub notes: NoteTimeline,
}

/// The expanded performance handed to a serializer.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportPlan {
    pub bpm: f64,
    pub total_measures: u64,
    pub tracks: Vec<ExportTrack>,
}

impl ExportPlan {
    pub fn total_beats(&self) -> u64 {
        self.total_measures * BEATS_PER_MEASURE as u64
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Greatest common divisor (Euclid).
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Least common multiple, `None` on overflow. `lcm(0, n)` is 0.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Export length in measures: lcm of all spans, at most 128.
///
/// An empty set gives 1. Stops folding as soon as the running lcm
/// passes the cap.
pub fn total_measures(spans: impl IntoIterator<Item = u64>) -> u64 {
    let mut acc = 1u64;
    for span in spans {
        match lcm(acc, span.max(1)) {
            Some(next) if next <= MAX_EXPORT_MEASURES => acc = next,
            _ => return MAX_EXPORT_MEASURES,
        }
    }
    acc
}

/// Expand every polygon of `snapshot` over the export length.
pub fn plan_export(snapshot: &ExportSnapshot) -> ExportPlan {
    let total = total_measures(snapshot.polygons.iter().map(PolygonSnapshot::cycle_span));
    let total_beats = total * BEATS_PER_MEASURE as u64;

    let tracks: Vec<ExportTrack> = snapshot
        .polygons
        .iter()
        .map(|polygon| ExportTrack {
            polygon: polygon.id,
            name: polygon.name,
            notes: expand(polygon, total_beats),
        })
        .collect();

    let plan = ExportPlan { bpm: snapshot.bpm, total_measures: total, tracks };
    log::info!(
        target: "export",
        "planned {} measures, {} tracks, {} notes",
        plan.total_measures,
        plan.tracks.len(),
        plan.note_count()
    );
    plan
}

fn expand(polygon: &PolygonSnapshot, total_beats: u64) -> NoteTimeline {
    let mut notes = NoteTimeline::new();
    let period = BEATS_PER_MEASURE as u64 * polygon.measure_count as u64;
    if period == 0 {
        log::warn!(target: "export", "{}: zero-length rotation, skipped", polygon.name);
        return notes;
    }

    let ticks = TICKS_PER_BEAT as f64;
    let period_f = period as f64;
    let mut cycle = 0u64;
    while cycle * period < total_beats {
        let beat = (cycle * period) as f64;
        let config = polygon.store.slot(polygon.sequence.key_for_cycle(cycle));
        let sides = config.side_count() as f64;

        for corner in config.corners().iter().filter(|c| !c.is_rest()) {
            let Some(pitch) = freq_to_midi(effective_frequency(corner.note, config.radius())) else {
                continue;
            };
            let offset = corner.index as f64 / sides * period_f;
            let start = libm::round((beat + offset) * ticks) as u64;
            let duration = libm::round(period_f / sides * ticks * corner.length_factor) as u32;
            notes.push(NoteEvent::new(pitch, start, duration));
        }
        cycle += 1;
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_ir::{Color, PatternConfig, PatternKey, Position};
    use pretty_assertions::assert_eq;
    use slotmap::KeyData;
    use test_case::test_case;

    fn polygon(n: u64, sides: u32, seq: &str, measures: u32) -> Polygon {
        let mut p = Polygon::new(
            PolygonKey::from(KeyData::from_ffi(n)),
            n as u32,
            Position::new(400.0, 400.0),
            PatternConfig::new(sides, 80.0, Color::CYAN),
        );
        p.set_sequence(Sequence::parse(seq));
        p.set_measure_count(measures);
        p
    }

    #[test_case(&[], 1 ; "empty set")]
    #[test_case(&[2, 3], 6 ; "coprime")]
    #[test_case(&[4, 6], 12 ; "shared factor")]
    #[test_case(&[7, 11, 13], 128 ; "capped")]
    #[test_case(&[128, 127], 128 ; "capped at second")]
    #[test_case(&[u64::MAX, 3], 128 ; "overflow")]
    fn export_length(spans: &[u64], expected: u64) {
        assert_eq!(total_measures(spans.iter().copied()), expected);
    }

    #[test]
    fn gcd_and_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(lcm(4, 6), Some(12));
        assert_eq!(lcm(0, 5), Some(0));
        assert_eq!(lcm(u64::MAX, 2), None);
    }

    #[test]
    fn triangle_one_measure() {
        let mut p = polygon(1, 3, "A", 1);
        for i in 0..3 {
            p.set_corner_note(i, 440.0);
            p.set_corner_length(i, 0.5);
        }
        let plan = plan_export(&ExportSnapshot::capture(120.0, [&p]));

        assert_eq!(plan.total_measures, 1);
        assert_eq!(plan.total_beats(), 4);
        let notes: Vec<NoteEvent> = plan.tracks[0].notes.iter().copied().collect();
        assert_eq!(
            notes,
            vec![NoteEvent::new(69, 0, 320), NoteEvent::new(69, 640, 320), NoteEvent::new(69, 1280, 320)]
        );
        assert_eq!(notes[0].duration().to_string(), "T320");
    }

    #[test]
    fn spans_two_and_three_give_six_measures() {
        let a = polygon(1, 4, "AB", 1);
        let b = polygon(2, 3, "ABC", 1);
        let plan = plan_export(&ExportSnapshot::capture(90.0, [&a, &b]));

        assert_eq!(plan.total_measures, 6);
        assert_eq!(plan.bpm, 90.0);
        assert_eq!(plan.tracks.len(), 2);
        // every corner plays the base note, six rotations each
        assert_eq!(plan.tracks[0].notes.len(), 24);
        assert_eq!(plan.tracks[1].notes.len(), 18);
        assert_eq!(plan.tracks[0].notes.end_tick(), 5 * 1920 + 3 * 480 + 96);
    }

    #[test]
    fn stored_slots_are_used_per_cycle() {
        let mut p = polygon(1, 4, "AB", 1);
        p.slot_mut(PatternKey::B).set_side_count(5);
        // the live slot is A; B is never loaded before the export
        let plan = plan_export(&ExportSnapshot::capture(120.0, [&p]));

        let starts: Vec<u64> = plan.tracks[0].notes.iter().map(|n| n.start_tick).collect();
        assert_eq!(starts, vec![0, 480, 960, 1440, 1920, 2304, 2688, 3072, 3456]);
    }

    #[test]
    fn rests_are_skipped() {
        let mut p = polygon(1, 4, "A", 1);
        p.set_corner_note(1, 0.0);
        p.set_corner_note(3, 0.0);
        let plan = plan_export(&ExportSnapshot::capture(120.0, [&p]));
        assert_eq!(plan.note_count(), 2);
    }

    #[test]
    fn radius_shifts_exported_pitch() {
        let mut p = polygon(1, 3, "A", 1);
        p.slot_mut(PatternKey::A).set_radius(150.0);
        let plan = plan_export(&ExportSnapshot::capture(120.0, [&p]));
        // C4 an octave down
        assert!(plan.tracks[0].notes.iter().all(|n| n.pitch == 48));
    }

    #[test]
    fn longer_measures_play_fewer_rotations() {
        let a = polygon(1, 4, "A", 2);
        let b = polygon(2, 4, "A", 3);
        let plan = plan_export(&ExportSnapshot::capture(120.0, [&a, &b]));
        assert_eq!(plan.total_measures, 6);
        assert_eq!(plan.tracks[0].notes.len(), 12);
        assert_eq!(plan.tracks[1].notes.len(), 8);
    }

    #[test]
    fn snapshot_is_detached_from_live_polygon() {
        let mut p = polygon(1, 4, "A", 1);
        let snapshot = ExportSnapshot::capture(120.0, [&p]);
        p.set_side_count(8);
        assert_eq!(plan_export(&snapshot).note_count(), 4);
    }

    #[test]
    fn empty_session_exports_nothing() {
        let plan = plan_export(&ExportSnapshot { bpm: 120.0, polygons: Vec::new() });
        assert!(plan.is_empty());
        assert_eq!(plan.note_count(), 0);
    }
}
