//! SARC top-level header.

use sarc_common::Endian;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// On-disk layout of the SARC header.
///
/// Integer fields are kept as raw bytes because their byte order is only
/// known once the byte-order mark has been inspected.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub(crate) struct RawSarcHeader {
    pub magic: [u8; 4],
    pub header_size: [u8; 2],
    pub bom: [u8; 2],
    pub file_size: [u8; 4],
    pub data_offset: [u8; 4],
    pub reserved: [u8; 4],
}

/// Decoded SARC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SarcHeader {
    /// Signature bytes, `SARC` in a well-formed archive.
    pub magic: [u8; 4],
    /// Declared header size (0x14).
    pub header_size: u16,
    /// Byte-order mark as read in the detected byte order.
    pub bom: u16,
    /// Byte order of every multi-byte field in the archive.
    pub endian: Endian,
    /// Declared total archive size. Informational only.
    pub file_size: u32,
    /// Base offset of the data region. Entry data offsets are relative to this.
    pub data_offset: u32,
    /// Reserved word (version in most producers).
    pub reserved: u32,
}

impl SarcHeader {
    /// The magic bytes at the start of a SARC archive.
    pub const MAGIC: [u8; 4] = *b"SARC";

    /// Size of the header on disk.
    pub const SIZE: usize = std::mem::size_of::<RawSarcHeader>();

    /// Check if data starts with the SARC magic.
    pub fn is_sarc(data: &[u8]) -> bool {
        data.len() >= 4 && data[..4] == Self::MAGIC
    }

    /// Whether the signature equals `SARC`.
    #[inline]
    pub fn magic_matches(&self) -> bool {
        self.magic == Self::MAGIC
    }

    pub(crate) fn decode(raw: &RawSarcHeader, endian: Endian) -> Self {
        Self {
            magic: raw.magic,
            header_size: endian.read_u16(&raw.header_size),
            bom: endian.read_u16(&raw.bom),
            endian,
            file_size: endian.read_u32(&raw.file_size),
            data_offset: endian.read_u32(&raw.data_offset),
            reserved: endian.read_u32(&raw.reserved),
        }
    }
}
