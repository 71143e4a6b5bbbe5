//! The polygon aggregate: position, pattern slots, sequence and latches.

use arrayvec::ArrayString;
use core::fmt::Write;

use crate::color::Color;
use crate::corner::Corner;
use crate::pattern::{PatternConfig, PatternKey};
use crate::sequence::Sequence;
use crate::store::PatternStore;
use crate::time::BEATS_PER_MEASURE;

slotmap::new_key_type! {
    /// Stable identity of a polygon within a session.
    pub struct PolygonKey;
}

/// `last_cycle_index` value meaning "no cycle processed yet".
pub const CYCLE_SENTINEL: i64 = -1;

/// Centre of a polygon on the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the drawing surface polygons must stay inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Surface centre.
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a centre so a circle of `radius` stays on the surface.
    pub fn clamp(&self, pos: Position, radius: f64) -> Position {
        Position {
            x: pos.x.min(self.width - radius).max(radius),
            y: pos.y.min(self.height - radius).max(radius),
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(800.0, 800.0)
    }
}

/// A rotating polygon.
///
/// The live shape is always the active slot of the pattern store, so
/// there is exactly one copy of each configuration. The sequencer and
/// trigger latches are public; the engine drives them directly.
#[derive(Clone, Debug)]
pub struct Polygon {
    id: PolygonKey,
    /// Display name, e.g. "Polygon #3"
    pub name: ArrayString<32>,
    /// Centre on the drawing surface
    pub position: Position,
    measure_count: u32,
    store: PatternStore,
    sequence: Sequence,
    /// Last rotation cycle the sequencer processed
    pub last_cycle_index: i64,
    /// Edge-detection latch for the trigger line
    pub was_triggering: bool,
    /// Corner highlighted in the editor
    pub selected_corner: Option<usize>,
}

impl Polygon {
    /// Create a polygon with `config` replicated into all four slots.
    pub fn new(id: PolygonKey, number: u32, position: Position, config: PatternConfig) -> Self {
        let mut name = ArrayString::new();
        let _ = write!(name, "Polygon #{}", number);
        Self {
            id,
            name,
            position,
            measure_count: 1,
            store: PatternStore::replicated(config),
            sequence: Sequence::default(),
            last_cycle_index: CYCLE_SENTINEL,
            was_triggering: false,
            selected_corner: None,
        }
    }

    pub fn id(&self) -> PolygonKey {
        self.id
    }

    /// The live configuration (the active slot).
    pub fn live(&self) -> &PatternConfig {
        self.store.active()
    }

    pub fn active_key(&self) -> PatternKey {
        self.store.active_key()
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// Mutable access to a stored slot without changing the active one.
    ///
    /// Changing the active slot's radius this way does not re-clamp the
    /// position; call [`Polygon::clamp_inside`] afterwards.
    pub fn slot_mut(&mut self, key: PatternKey) -> &mut PatternConfig {
        self.store.slot_mut(key)
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Replace the cycle sequence and re-arm the sequencer.
    pub fn set_sequence(&mut self, sequence: Sequence) {
        self.sequence = sequence;
        self.last_cycle_index = CYCLE_SENTINEL;
    }

    pub fn measure_count(&self) -> u32 {
        self.measure_count
    }

    /// Set the measure count (at least 1).
    ///
    /// The sequencer cycle index is left alone; the engine re-derives it
    /// from the transport time.
    pub fn set_measure_count(&mut self, measures: u32) {
        self.measure_count = measures.max(1);
    }

    /// Beats per full rotation: one 4-beat bar per measure.
    pub fn rotation_period_beats(&self) -> f64 {
        (BEATS_PER_MEASURE * self.measure_count) as f64
    }

    /// Measures before this polygon's sequence repeats.
    pub fn cycle_span(&self) -> u64 {
        self.sequence.len() as u64 * self.measure_count as u64
    }

    /// Rebuild the live corners for a new side count.
    pub fn set_side_count(&mut self, side_count: u32) {
        self.store.active_mut().set_side_count(side_count);
        self.selected_corner = None;
    }

    /// Set the live radius and keep the polygon on the surface.
    pub fn set_radius(&mut self, radius: f64, surface: &Surface) {
        self.store.active_mut().set_radius(radius);
        self.clamp_inside(surface);
    }

    pub fn set_stroke(&mut self, stroke: Color) {
        self.store.active_mut().set_stroke(stroke);
    }

    /// Set a live corner's note. Returns false for an unknown corner.
    pub fn set_corner_note(&mut self, index: usize, hz: f64) -> bool {
        self.edit_corner(index, |c| c.set_note(hz))
    }

    /// Set a live corner's length factor. Returns false for an unknown corner.
    pub fn set_corner_length(&mut self, index: usize, factor: f64) -> bool {
        self.edit_corner(index, |c| c.set_length_factor(factor))
    }

    fn edit_corner(&mut self, index: usize, edit: impl FnOnce(&mut Corner)) -> bool {
        match self.store.active_mut().corner_mut(index) {
            Some(corner) => {
                edit(corner);
                true
            }
            None => false,
        }
    }

    /// Copy the live configuration into slot `key`.
    pub fn save_to(&mut self, key: PatternKey) {
        self.store.save(key);
    }

    /// Make slot `key` live, then re-clamp for its radius.
    pub fn load(&mut self, key: PatternKey, surface: &Surface) {
        self.store.load(key);
        if self
            .selected_corner
            .is_some_and(|i| i >= self.live().corners().len())
        {
            self.selected_corner = None;
        }
        self.clamp_inside(surface);
    }

    /// Keep the whole polygon inside the surface.
    pub fn clamp_inside(&mut self, surface: &Surface) {
        self.position = surface.clamp(self.position, self.live().radius());
    }

    /// Rewind for a transport reset: re-arm both latches and load the
    /// first sequence entry.
    pub fn rewind(&mut self, surface: &Surface) {
        self.was_triggering = false;
        self.last_cycle_index = CYCLE_SENTINEL;
        let first = self.sequence.first();
        self.load(first, surface);
    }
}
