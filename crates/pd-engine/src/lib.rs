//! Timing and sequencing engine for polydaw.
//!
//! Turns transport time into polygon rotation, fires each corner once
//! as it crosses the trigger line, cycles pattern slots per rotation,
//! and replays the same rules offline to plan a note export.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod engine;
pub mod export;
mod radius;
pub mod rotation;
pub mod sequencer;
mod timeline;
mod transport;
mod trigger;
mod view;

pub use engine::{Engine, Onset, PolygonOptions, TickReport, DEFAULT_SIDES};
pub use export::{
    plan_export, ExportPlan, ExportSnapshot, ExportTrack, PolygonSnapshot, MAX_EXPORT_MEASURES,
};
pub use radius::RadiusAllocator;
pub use rotation::{Crossing, Hit, Rotation, TRIGGER_ANGLE, TRIGGER_TOLERANCE};
pub use sequencer::Transition;
pub use timeline::NoteTimeline;
pub use transport::{Transport, RESET_OFFSET_SECONDS};
pub use trigger::{NullSink, ToneSink, ToneTrigger, MAX_AUDIBLE_HZ, MIN_AUDIBLE_HZ, TONE_AMPLITUDE};
pub use view::{CornerView, PolygonView};
