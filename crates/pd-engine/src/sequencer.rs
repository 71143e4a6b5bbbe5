//! Per-polygon pattern sequencing at rotation-cycle boundaries.

use pd_ir::{PatternKey, Polygon, Surface, TimeBase};

/// A processed cycle boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Rotation cycle that just started
    pub cycle: i64,
    pub from: PatternKey,
    pub to: PatternKey,
}

impl Transition {
    /// True when the boundary switched to a different slot.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Index of the rotation cycle in progress, `floor(beats / period)`.
pub fn current_cycle(polygon: &Polygon, time_base: TimeBase, seconds: f64) -> Option<i64> {
    let period = polygon.rotation_period_beats();
    if period <= 0.0 {
        return None;
    }
    let beats = time_base.beats_elapsed(seconds);
    Some(libm::floor(beats / period) as i64)
}

/// Advance the sequencer of one polygon to `seconds`.
///
/// Acts only when the cycle index has strictly grown since the last
/// call. The outgoing slot already holds every live edit, because the
/// live configuration is that slot; the next key from the sequence is
/// then loaded if it differs from the current one.
pub fn advance(
    polygon: &mut Polygon,
    surface: &Surface,
    time_base: TimeBase,
    seconds: f64,
) -> Option<Transition> {
    let current = current_cycle(polygon, time_base, seconds)?;
    if current <= polygon.last_cycle_index {
        return None;
    }
    polygon.last_cycle_index = current;

    let from = polygon.active_key();
    let to = polygon.sequence().key_for_cycle(current as u64);
    polygon.save_to(from);
    if to != from {
        polygon.load(to, surface);
        log::debug!(
            target: "sequencer",
            "{}: cycle {} switches pattern {} -> {}",
            polygon.name, current, from, to
        );
    }
    Some(Transition { cycle: current, from, to })
}

/// Re-derive the processed cycle after a period change, so the next
/// `advance` does not see a jump in the cycle index.
pub fn resync(polygon: &mut Polygon, time_base: TimeBase, seconds: f64) {
    if let Some(current) = current_cycle(polygon, time_base, seconds) {
        if polygon.last_cycle_index >= 0 {
            polygon.last_cycle_index = current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_ir::{Color, PatternConfig, PolygonKey, Position, Sequence, CYCLE_SENTINEL};
    use slotmap::KeyData;

    fn polygon(seq: &str) -> Polygon {
        let mut p = Polygon::new(
            PolygonKey::from(KeyData::from_ffi(1)),
            1,
            Position::new(400.0, 400.0),
            PatternConfig::new(4, 80.0, Color::CYAN),
        );
        p.slot_mut(PatternKey::B).set_side_count(5);
        p.slot_mut(PatternKey::C).set_side_count(7);
        p.set_sequence(Sequence::parse(seq));
        p
    }

    #[test]
    fn first_update_processes_cycle_zero() {
        let mut p = polygon("A");
        let t = advance(&mut p, &Surface::default(), TimeBase::new(120.0), -0.1).unwrap();
        assert_eq!(t, Transition { cycle: 0, from: PatternKey::A, to: PatternKey::A });
        assert!(!t.changed());
        assert_eq!(p.last_cycle_index, 0);
    }

    #[test]
    fn repeated_updates_in_same_cycle_do_nothing() {
        let mut p = polygon("AB");
        let tb = TimeBase::new(120.0);
        let surface = Surface::default();
        assert!(advance(&mut p, &surface, tb, 0.0).is_some());
        assert!(advance(&mut p, &surface, tb, 0.5).is_none());
        assert!(advance(&mut p, &surface, tb, 1.99).is_none());
    }

    #[test]
    fn active_slot_follows_sequence() {
        let mut p = polygon("AABC");
        let tb = TimeBase::new(120.0);
        let surface = Surface::default();
        // one rotation is two seconds at 120 bpm
        let expected = [PatternKey::A, PatternKey::A, PatternKey::B, PatternKey::C, PatternKey::A];
        for (cycle, key) in expected.iter().enumerate() {
            advance(&mut p, &surface, tb, cycle as f64 * 2.0 + 0.01);
            assert_eq!(p.active_key(), *key);
            assert_eq!(p.live(), p.store().slot(*key));
        }
        assert_eq!(p.live().side_count(), 4);
    }

    #[test]
    fn skipped_cycles_jump_to_current_entry() {
        let mut p = polygon("ABC");
        let tb = TimeBase::new(120.0);
        advance(&mut p, &Surface::default(), tb, 0.0);
        // a long stall lands in cycle 5, which is C
        let t = advance(&mut p, &Surface::default(), tb, 10.5).unwrap();
        assert_eq!(t.cycle, 5);
        assert_eq!(p.active_key(), PatternKey::C);
    }

    #[test]
    fn live_edits_survive_a_round_trip() {
        let mut p = polygon("AB");
        let tb = TimeBase::new(120.0);
        let surface = Surface::default();
        advance(&mut p, &surface, tb, 0.0);
        p.set_corner_note(1, 440.0);

        advance(&mut p, &surface, tb, 2.0);
        assert_eq!(p.active_key(), PatternKey::B);
        advance(&mut p, &surface, tb, 4.0);
        assert_eq!(p.active_key(), PatternKey::A);
        assert_eq!(p.live().corners()[1].note, 440.0);
    }

    #[test]
    fn resync_after_measure_change_suppresses_jump() {
        let mut p = polygon("AB");
        let tb = TimeBase::new(120.0);
        let surface = Surface::default();
        advance(&mut p, &surface, tb, 3.0);
        assert_eq!(p.last_cycle_index, 1);

        // 12 seconds is cycle 6 at one measure, cycle 1 at six measures
        p.set_measure_count(6);
        resync(&mut p, tb, 12.0);
        assert_eq!(p.last_cycle_index, 1);
        assert!(advance(&mut p, &surface, tb, 12.5).is_none());
    }

    #[test]
    fn resync_leaves_sentinel_alone() {
        let mut p = polygon("A");
        resync(&mut p, TimeBase::default(), 50.0);
        assert_eq!(p.last_cycle_index, CYCLE_SENTINEL);
    }
}
