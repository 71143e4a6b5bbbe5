//! Audio side of polydaw.
//!
//! A small triangle-wave synthesizer plays the tones the engine
//! triggers. Tones reach the audio thread through a lock-free queue;
//! the CPAL backend is behind the `cpal` feature.

#[cfg(feature = "cpal")]
mod cpal_backend;
mod frame;
mod synth;
mod tone_queue;
mod traits;

#[cfg(feature = "cpal")]
pub use cpal_backend::CpalOutput;
pub use frame::Frame;
pub use synth::{ToneSynth, Voice, ATTACK_SECONDS, MAX_VOICES};
pub use tone_queue::{tone_queue, ToneReceiver, ToneSender};
pub use traits::{AudioError, AudioOutput, NullOutput};
