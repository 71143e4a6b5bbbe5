//! Standard MIDI File encoding of an export plan.

use std::io::{Cursor, Seek, Write};

use binrw::BinWrite;
use pd_engine::{ExportPlan, ExportTrack};

use crate::smf::{
    write_vlq, Chunk, HeaderChunk, META, META_END_OF_TRACK, META_TEMPO, META_TIME_SIGNATURE,
    META_TRACK_NAME, NOTE_OFF, NOTE_ON,
};
use crate::FormatError;

/// Velocity of every exported note-on.
pub const NOTE_VELOCITY: u8 = 64;

/// Microseconds per quarter note for `bpm`, as stored in the tempo meta event.
pub fn tempo_micros(bpm: f64) -> u32 {
    if !bpm.is_finite() || bpm <= 0.0 {
        return 500_000;
    }
    (60_000_000.0 / bpm).round().clamp(1.0, 0xFF_FFFF as f64) as u32
}

// --- Writing ---

/// Write `plan` as a format 1 file: a tempo track, then one track per polygon.
pub fn write_smf<W: Write + Seek>(w: &mut W, plan: &ExportPlan) -> Result<(), FormatError> {
    let track_count = u16::try_from(plan.tracks.len() + 1).map_err(|_| FormatError::UnsupportedVersion)?;
    HeaderChunk::new(track_count).write_be(w)?;
    Chunk::track(tempo_track(plan.bpm)).write_be(w)?;
    for track in &plan.tracks {
        Chunk::track(note_track(track)).write_be(w)?;
    }
    log::debug!(
        target: "export",
        "wrote {} tracks, {} notes at {} us/quarter",
        track_count,
        plan.note_count(),
        tempo_micros(plan.bpm)
    );
    Ok(())
}

/// Encode `plan` into an in-memory file.
pub fn export_to_smf(plan: &ExportPlan) -> Result<Vec<u8>, FormatError> {
    let mut cursor = Cursor::new(Vec::new());
    write_smf(&mut cursor, plan)?;
    Ok(cursor.into_inner())
}

fn tempo_track(bpm: f64) -> Vec<u8> {
    let mut data = Vec::new();
    let tempo = tempo_micros(bpm).to_be_bytes();
    meta(&mut data, 0, META_TEMPO, &tempo[1..]);
    // 4/4, 24 clocks per click, 8 32nds per quarter
    meta(&mut data, 0, META_TIME_SIGNATURE, &[4, 2, 24, 8]);
    meta(&mut data, 0, META_END_OF_TRACK, &[]);
    data
}

/// A channel message at an absolute tick. Offs sort before ons on the
/// same tick so back-to-back notes of one pitch do not cut each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct TimedMessage {
    tick: u64,
    is_on: bool,
    pitch: u8,
}

fn note_track(track: &ExportTrack) -> Vec<u8> {
    let mut messages: Vec<TimedMessage> = track
        .notes
        .iter()
        .flat_map(|n| {
            [
                TimedMessage { tick: n.start_tick, is_on: true, pitch: n.pitch },
                TimedMessage { tick: n.end_tick(), is_on: false, pitch: n.pitch },
            ]
        })
        .collect();
    messages.sort();

    let mut data = Vec::new();
    meta(&mut data, 0, META_TRACK_NAME, track.name.as_bytes());

    let mut last = 0u64;
    for msg in &messages {
        write_delta(&mut data, msg.tick - last);
        last = msg.tick;
        if msg.is_on {
            data.extend_from_slice(&[NOTE_ON, msg.pitch, NOTE_VELOCITY]);
        } else {
            data.extend_from_slice(&[NOTE_OFF, msg.pitch, 0]);
        }
    }
    meta(&mut data, 0, META_END_OF_TRACK, &[]);
    data
}

fn write_delta(out: &mut Vec<u8>, delta: u64) {
    write_vlq(out, u32::try_from(delta).unwrap_or(u32::MAX));
}

fn meta(out: &mut Vec<u8>, delta: u64, kind: u8, payload: &[u8]) {
    write_delta(out, delta);
    out.extend_from_slice(&[META, kind]);
    write_vlq(out, payload.len() as u32);
    out.extend_from_slice(payload);
}
