//! Standard MIDI File chunk layout and variable-length quantities.

use binrw::binrw;

use crate::FormatError;

/// Ticks per quarter note written into every header (0x01E0).
pub const DIVISION: u16 = 480;

/// Multiple tracks, played together.
pub const FORMAT_MULTI_TRACK: u16 = 1;

pub(crate) const NOTE_OFF: u8 = 0x80;
pub(crate) const NOTE_ON: u8 = 0x90;
pub(crate) const META: u8 = 0xFF;
pub(crate) const SYSEX: u8 = 0xF0;
pub(crate) const SYSEX_ESCAPE: u8 = 0xF7;

pub(crate) const META_TRACK_NAME: u8 = 0x03;
pub(crate) const META_END_OF_TRACK: u8 = 0x2F;
pub(crate) const META_TEMPO: u8 = 0x51;
pub(crate) const META_TIME_SIGNATURE: u8 = 0x58;

/// Largest value a four-byte quantity can hold.
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// `MThd` chunk. The length is 6 for every file this crate writes.
#[binrw]
#[brw(big, magic = b"MThd")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeaderChunk {
    pub length: u32,
    pub format: u16,
    pub tracks: u16,
    pub division: u16,
}

impl HeaderChunk {
    pub fn new(tracks: u16) -> Self {
        Self { length: 6, format: FORMAT_MULTI_TRACK, tracks, division: DIVISION }
    }
}

/// Any chunk after the header: four-byte id, length, payload.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Chunk {
    pub id: [u8; 4],
    #[br(temp)]
    #[bw(calc = data.len() as u32)]
    length: u32,
    #[br(count = length)]
    pub data: Vec<u8>,
}

impl Chunk {
    pub const TRACK: [u8; 4] = *b"MTrk";

    pub fn track(data: Vec<u8>) -> Self {
        Self { id: Self::TRACK, data }
    }
}

/// Append `value` as a variable-length quantity, clamped to four bytes.
pub fn write_vlq(out: &mut Vec<u8>, value: u32) {
    let value = value.min(VLQ_MAX);
    let mut buf = [0u8; 4];
    let mut i = buf.len() - 1;
    buf[i] = (value & 0x7F) as u8;
    let mut rest = value >> 7;
    while rest > 0 {
        i -= 1;
        buf[i] = (rest & 0x7F) as u8 | 0x80;
        rest >>= 7;
    }
    out.extend_from_slice(&buf[i..]);
}

/// Read a variable-length quantity at `*pos`, advancing it.
pub fn read_vlq(data: &[u8], pos: &mut usize) -> Result<u32, FormatError> {
    let mut value = 0u32;
    for _ in 0..4 {
        let byte = *data.get(*pos).ok_or(FormatError::UnexpectedEof)?;
        *pos += 1;
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(FormatError::InvalidHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::{BinRead, BinWrite};
    use std::io::Cursor;
    use test_case::test_case;

    #[test_case(0, &[0x00] ; "zero")]
    #[test_case(0x40, &[0x40] ; "one byte")]
    #[test_case(0x7F, &[0x7F] ; "largest one byte")]
    #[test_case(0x80, &[0x81, 0x00] ; "smallest two bytes")]
    #[test_case(0x2000, &[0xC0, 0x00] ; "two bytes")]
    #[test_case(0x3FFF, &[0xFF, 0x7F] ; "largest two bytes")]
    #[test_case(0x4000, &[0x81, 0x80, 0x00] ; "three bytes")]
    #[test_case(0x0FFF_FFFF, &[0xFF, 0xFF, 0xFF, 0x7F] ; "largest")]
    fn vlq_encoding(value: u32, expected: &[u8]) {
        let mut out = Vec::new();
        write_vlq(&mut out, value);
        assert_eq!(out, expected);

        let mut pos = 0;
        assert_eq!(read_vlq(&out, &mut pos).unwrap(), value);
        assert_eq!(pos, expected.len());
    }

    #[test]
    fn vlq_clamps_oversized_values() {
        let mut out = Vec::new();
        write_vlq(&mut out, u32::MAX);
        assert_eq!(out, vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn vlq_rejects_truncated_and_overlong_input() {
        let mut pos = 0;
        assert!(matches!(read_vlq(&[0x81], &mut pos), Err(FormatError::UnexpectedEof)));
        let mut pos = 0;
        assert!(matches!(
            read_vlq(&[0x81, 0x81, 0x81, 0x81, 0x01], &mut pos),
            Err(FormatError::InvalidHeader)
        ));
    }

    #[test]
    fn header_layout() {
        let mut cursor = Cursor::new(Vec::new());
        HeaderChunk::new(3).write_be(&mut cursor).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(
            bytes,
            vec![b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 3, 0x01, 0xE0]
        );

        let parsed = HeaderChunk::read_be(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed, HeaderChunk::new(3));
    }

    #[test]
    fn chunk_length_is_computed() {
        let mut cursor = Cursor::new(Vec::new());
        Chunk::track(vec![0x00, 0xFF, 0x2F, 0x00]).write_be(&mut cursor).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(&bytes[..8], b"MTrk\x00\x00\x00\x04");

        let parsed = Chunk::read_be(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed.id, Chunk::TRACK);
        assert_eq!(parsed.data, vec![0x00, 0xFF, 0x2F, 0x00]);
    }
}
