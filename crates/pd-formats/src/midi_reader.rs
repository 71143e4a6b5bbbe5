//! Standard MIDI File decoding into a note summary.

use std::io::{Cursor, Seek, SeekFrom};

use binrw::BinRead;
use pd_ir::NoteEvent;

use crate::smf::{
    read_vlq, Chunk, HeaderChunk, META, META_END_OF_TRACK, META_TEMPO, META_TIME_SIGNATURE,
    META_TRACK_NAME, NOTE_OFF, NOTE_ON, SYSEX, SYSEX_ESCAPE,
};
use crate::FormatError;

/// One decoded track.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmfTrack {
    pub name: Option<String>,
    /// Paired note-on/note-off messages, ordered by start tick
    pub notes: Vec<NoteEvent>,
    pub tempo_micros: Option<u32>,
    /// Numerator and denominator
    pub time_signature: Option<(u8, u8)>,
    /// Tick of the end-of-track event (or of the last event)
    pub end_tick: u64,
}

/// What `inspect` reports about a file.
#[derive(Clone, Debug, PartialEq)]
pub struct SmfSummary {
    pub format: u16,
    pub division: u16,
    /// First tempo found in any track
    pub tempo_micros: Option<u32>,
    pub tracks: Vec<SmfTrack>,
}

impl SmfSummary {
    pub fn bpm(&self) -> Option<f64> {
        self.tempo_micros.filter(|t| *t > 0).map(|t| 60_000_000.0 / t as f64)
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    pub fn end_tick(&self) -> u64 {
        self.tracks.iter().map(|t| t.end_tick).max().unwrap_or(0)
    }
}

// --- Reading ---

/// Parse a whole file from raw bytes.
pub fn read_smf(data: &[u8]) -> Result<SmfSummary, FormatError> {
    if data.len() < 4 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"MThd" {
        return Err(FormatError::InvalidHeader);
    }

    let mut cursor = Cursor::new(data);
    let header = HeaderChunk::read_be(&mut cursor).map_err(classify)?;
    if header.length < 6 {
        return Err(FormatError::InvalidHeader);
    }
    if header.format > 2 || header.division & 0x8000 != 0 {
        return Err(FormatError::UnsupportedVersion);
    }
    cursor.seek(SeekFrom::Start(8 + header.length as u64))?;

    let mut tracks = Vec::new();
    while (cursor.position() as usize) < data.len() {
        let chunk = Chunk::read_be(&mut cursor).map_err(classify)?;
        if chunk.id != Chunk::TRACK {
            log::debug!(target: "formats", "skipping {:?} chunk", chunk.id);
            continue;
        }
        tracks.push(parse_track(&chunk.data)?);
    }
    if tracks.len() != header.tracks as usize {
        log::warn!(
            target: "formats",
            "header announces {} tracks, found {}",
            header.tracks,
            tracks.len()
        );
    }

    Ok(SmfSummary {
        format: header.format,
        division: header.division,
        tempo_micros: tracks.iter().find_map(|t| t.tempo_micros),
        tracks,
    })
}

fn classify(err: binrw::Error) -> FormatError {
    if err.is_eof() {
        FormatError::UnexpectedEof
    } else if matches!(err.root_cause(), binrw::Error::BadMagic { .. }) {
        FormatError::InvalidHeader
    } else {
        FormatError::Binary(err)
    }
}

fn byte_at(data: &[u8], pos: usize) -> Result<u8, FormatError> {
    data.get(pos).copied().ok_or(FormatError::UnexpectedEof)
}

fn slice_at(data: &[u8], pos: usize, len: usize) -> Result<&[u8], FormatError> {
    data.get(pos..pos + len).ok_or(FormatError::UnexpectedEof)
}

fn parse_track(data: &[u8]) -> Result<SmfTrack, FormatError> {
    let mut track = SmfTrack::default();
    let mut pos = 0;
    let mut tick = 0u64;
    let mut running: Option<u8> = None;
    // (pitch, start tick) of notes still sounding, oldest first
    let mut open: Vec<(u8, u64)> = Vec::new();

    while pos < data.len() {
        tick += read_vlq(data, &mut pos)? as u64;
        let mut status = byte_at(data, pos)?;
        if status & 0x80 != 0 {
            pos += 1;
        } else {
            status = running.ok_or(FormatError::InvalidHeader)?;
        }

        match status {
            META => {
                let kind = byte_at(data, pos)?;
                pos += 1;
                let len = read_vlq(data, &mut pos)? as usize;
                let payload = slice_at(data, pos, len)?;
                pos += len;
                running = None;
                match kind {
                    META_TRACK_NAME => {
                        track.name = Some(String::from_utf8_lossy(payload).into_owned())
                    }
                    META_TEMPO if len == 3 => {
                        track.tempo_micros =
                            Some(u32::from_be_bytes([0, payload[0], payload[1], payload[2]]))
                    }
                    META_TIME_SIGNATURE if len >= 2 => {
                        track.time_signature = Some((payload[0], 1u8 << payload[1].min(7)))
                    }
                    META_END_OF_TRACK => break,
                    _ => {}
                }
            }
            SYSEX | SYSEX_ESCAPE => {
                let len = read_vlq(data, &mut pos)? as usize;
                slice_at(data, pos, len)?;
                pos += len;
                running = None;
            }
            0x80..=0xEF => {
                running = Some(status);
                let kind = status & 0xF0;
                let len = if kind == 0xC0 || kind == 0xD0 { 1 } else { 2 };
                let args = slice_at(data, pos, len)?;
                pos += len;
                match kind {
                    NOTE_ON if args[1] > 0 => open.push((args[0], tick)),
                    NOTE_ON | NOTE_OFF => close_note(&mut open, &mut track.notes, args[0], tick),
                    _ => {}
                }
            }
            _ => return Err(FormatError::InvalidHeader),
        }
    }

    track.end_tick = tick;
    if !open.is_empty() {
        log::warn!(target: "formats", "{} notes never released", open.len());
    }
    track.notes.sort_by_key(|n| n.start_tick);
    Ok(track)
}

fn close_note(open: &mut Vec<(u8, u64)>, notes: &mut Vec<NoteEvent>, pitch: u8, tick: u64) {
    if let Some(i) = open.iter().position(|(p, _)| *p == pitch) {
        let (_, start) = open.remove(i);
        let length = u32::try_from(tick - start).unwrap_or(u32::MAX);
        notes.push(NoteEvent::new(pitch, start, length));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(tracks: &[&[u8]]) -> Vec<u8> {
        let mut bytes = b"MThd\x00\x00\x00\x06\x00\x01".to_vec();
        bytes.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&[0x01, 0xE0]);
        for data in tracks {
            bytes.extend_from_slice(b"MTrk");
            bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
            bytes.extend_from_slice(data);
        }
        bytes
    }

    #[test]
    fn running_status_and_zero_velocity_off() {
        let track: &[u8] = &[
            0x00, 0x90, 60, 100, // on
            0x60, 64, 100, // running status on, 96 ticks later
            0x60, 60, 0, // running status, velocity 0 = off
            0x20, 0x80, 64, 0, // off
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let summary = read_smf(&file(&[track])).unwrap();

        assert_eq!(summary.format, 1);
        assert_eq!(summary.division, 480);
        assert_eq!(
            summary.tracks[0].notes,
            vec![NoteEvent::new(60, 0, 192), NoteEvent::new(64, 96, 128)]
        );
        assert_eq!(summary.tracks[0].end_tick, 224);
    }

    #[test]
    fn meta_events_are_collected() {
        let track: &[u8] = &[
            0x00, 0xFF, 0x03, 0x03, b'a', b'b', b'c',
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20,
            0x00, 0xFF, 0x58, 0x04, 0x03, 0x03, 0x18, 0x08,
            0x00, 0xF0, 0x02, 0x7E, 0xF7, // sysex is skipped
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let summary = read_smf(&file(&[track])).unwrap();

        assert_eq!(summary.tracks[0].name.as_deref(), Some("abc"));
        assert_eq!(summary.tempo_micros, Some(500_000));
        assert_eq!(summary.bpm(), Some(120.0));
        assert_eq!(summary.tracks[0].time_signature, Some((3, 8)));
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let mut bytes = file(&[&[0x00, 0xFF, 0x2F, 0x00]]);
        bytes.extend_from_slice(b"XFIH\x00\x00\x00\x02\xAA\xBB");
        let summary = read_smf(&bytes).unwrap();
        assert_eq!(summary.tracks.len(), 1);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(read_smf(b""), Err(FormatError::UnexpectedEof)));
        assert!(matches!(read_smf(b"RIFF\x00\x00\x00\x06"), Err(FormatError::InvalidHeader)));
        assert!(matches!(read_smf(b"MThd\x00\x00"), Err(FormatError::UnexpectedEof)));

        let mut smpte = file(&[]);
        smpte[12] = 0xE7;
        assert!(matches!(read_smf(&smpte), Err(FormatError::UnsupportedVersion)));

        let mut truncated = file(&[&[0x00, 0xFF, 0x2F, 0x00]]);
        truncated.truncate(truncated.len() - 2);
        assert!(matches!(read_smf(&truncated), Err(FormatError::UnexpectedEof)));
    }

    #[test]
    fn data_byte_without_status_is_invalid() {
        let track: &[u8] = &[0x00, 0x3C, 0x40];
        assert!(matches!(read_smf(&file(&[track])), Err(FormatError::InvalidHeader)));
    }
}
