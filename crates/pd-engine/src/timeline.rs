//! Time-ordered note events.

use alloc::vec::Vec;
use pd_ir::NoteEvent;

/// Note events kept sorted by start tick.
///
/// Notes with the same start tick keep their insertion order, so the
/// corners of one crossing stay in corner order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteTimeline {
    notes: Vec<NoteEvent>,
}

impl NoteTimeline {
    pub fn new() -> Self {
        Self { notes: Vec::new() }
    }

    /// Insert a note, after any note that starts on the same tick.
    pub fn push(&mut self, note: NoteEvent) {
        let pos = self.notes.partition_point(|n| n.start_tick <= note.start_tick);
        self.notes.insert(pos, note);
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEvent> {
        self.notes.iter()
    }

    pub fn as_slice(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn get(&self, index: usize) -> Option<&NoteEvent> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Tick the last note releases on, or 0 when empty.
    pub fn end_tick(&self) -> u64 {
        self.notes.iter().map(NoteEvent::end_tick).max().unwrap_or(0)
    }
}

impl Extend<NoteEvent> for NoteTimeline {
    fn extend<I: IntoIterator<Item = NoteEvent>>(&mut self, iter: I) {
        for note in iter {
            self.push(note);
        }
    }
}
