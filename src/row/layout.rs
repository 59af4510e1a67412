//! Shared wire-layout constants and integrity checksums.
//!
//! The writer ([`assembler`](super::assembler)) and the reader
//! ([`view`](super::view)) implement the same deterministic layout; the
//! framing facts they share live here so neither side can drift.
//!
//! All integers are little-endian. The checksum is CRC-32/Castagnoli over
//! every row byte preceding the 4-byte trailer.

use crc::{Crc, CRC_32_ISCSI};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Header flag: the row carries no value columns (lookup/delete template).
pub(crate) const FLAG_KEY_ONLY: u8 = 0x01;

/// Size of the [`RowHeader`] prefix.
pub(crate) const ROW_HEADER_SIZE: usize = 3;

/// Size of one chunk length field.
pub(crate) const CHUNK_LEN_SIZE: usize = 4;

/// Size of the checksum trailer.
pub(crate) const CHECKSUM_SIZE: usize = 4;

/// Size of one varlen offset table entry.
pub(crate) const VARLEN_ENTRY_SIZE: usize = 4;

/// Smallest buffer that can frame a row: header, two chunk length fields
/// and the checksum. Chunk bodies are validated against the schema
/// separately.
pub(crate) const MIN_ROW_SIZE: usize = ROW_HEADER_SIZE + 2 * CHUNK_LEN_SIZE + CHECKSUM_SIZE;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Fixed prefix of every encoded row.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
pub(crate) struct RowHeader {
    pub version: U16,
    pub flags: u8,
}

impl RowHeader {
    pub(crate) fn new(version: u16, flags: u8) -> Self {
        Self {
            version: U16::new(version),
            flags,
        }
    }

    pub(crate) fn is_key_only(&self) -> bool {
        self.flags & FLAG_KEY_ONLY != 0
    }
}

/// Little-endian `u32` used for chunk length fields and varlen offset
/// table entries; unaligned so tables can be viewed in place.
pub(crate) type WireU32 = U32;

pub(crate) fn compute_checksum(payload: &[u8]) -> u32 {
    CRC32.checksum(payload)
}

pub(crate) fn validate_checksum(payload: &[u8], expected: u32) -> bool {
    compute_checksum(payload) == expected
}

/// Reads the chunk length field at `offset`, if the buffer holds one.
pub(crate) fn chunk_len_at(data: &[u8], offset: usize) -> Option<usize> {
    let bytes: [u8; CHUNK_LEN_SIZE] = data.get(offset..offset + CHUNK_LEN_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::IntoBytes;

    #[test]
    fn header_layout_is_three_bytes() {
        assert_eq!(std::mem::size_of::<RowHeader>(), ROW_HEADER_SIZE);
        let header = RowHeader::new(0x0102, FLAG_KEY_ONLY);
        assert_eq!(header.as_bytes(), &[0x02, 0x01, 0x01]);
    }

    #[test]
    fn checksum_detects_flips() {
        let mut payload = vec![1u8, 2, 3, 4, 5];
        let crc = compute_checksum(&payload);
        assert!(validate_checksum(&payload, crc));
        payload[2] ^= 0x40;
        assert!(!validate_checksum(&payload, crc));
    }

    #[test]
    fn chunk_len_reads_little_endian() {
        let data = [0xFF, 0x10, 0x00, 0x00, 0x00, 0xFF];
        assert_eq!(chunk_len_at(&data, 1), Some(16));
        assert_eq!(chunk_len_at(&data, 3), None);
    }
}
