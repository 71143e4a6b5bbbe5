//! File formats for polydaw.
//!
//! Writes an export plan as a format 1 Standard MIDI File and reads one
//! back into a summary for inspection.

mod midi_reader;
mod midi_writer;
mod smf;

pub use midi_reader::{read_smf, SmfSummary, SmfTrack};
pub use midi_writer::{export_to_smf, tempo_micros, write_smf, NOTE_VELOCITY};
pub use smf::{read_vlq, write_vlq, DIVISION};

/// Error type for format reading and writing.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    #[error("invalid header")]
    InvalidHeader,
    /// Unexpected end of file
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// Unsupported format version or timing mode
    #[error("unsupported format version")]
    UnsupportedVersion,
    #[error("binary layout error: {0}")]
    Binary(#[from] binrw::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
