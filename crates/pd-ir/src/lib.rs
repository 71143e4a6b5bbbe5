//! Core data model for polydaw.
//!
//! This crate defines the polygons, their four pattern slots, the
//! cycle sequence, and the note events that the engine produces.
//! The engine and the export path both read these types; nothing in
//! here knows about wall-clock time beyond the `TimeBase` conversion.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod color;
mod corner;
mod note;
mod pattern;
mod polygon;
mod sequence;
mod store;
mod time;

pub use color::{Color, ParseColorError};
pub use corner::{clamp_length_factor, Corner, BASE_LENGTH_FACTOR, BASE_NOTE};
pub use note::{
    effective_frequency, freq_to_midi, keyboard_note, note_label, NoteEvent, NoteName,
    TickDuration, NOTE_TABLE,
};
pub use pattern::{PatternConfig, PatternKey, MAX_RADIUS, MAX_SIDES, MIN_RADIUS, MIN_SIDES};
pub use polygon::{Polygon, PolygonKey, Position, Surface, CYCLE_SENTINEL};
pub use sequence::Sequence;
pub use store::PatternStore;
pub use time::{TimeBase, BEATS_PER_MEASURE, TICKS_PER_BEAT};
