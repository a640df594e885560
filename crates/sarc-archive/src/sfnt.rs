//! SFNT name table.

use std::borrow::Cow;

use sarc_common::BinaryReader;

use crate::error::Section;
use crate::{Entry, Error, Result};

/// The name table header and the location of its string region.
///
/// Names are not parsed up front. [`NameTable::resolve_name`] looks each one
/// up on demand from an entry's word offset.
#[derive(Debug, Clone, Copy)]
pub struct NameTable {
    magic: [u8; 4],
    header_size: u16,
    reserved: u16,
    /// Absolute offset of the table in the source.
    section_offset: usize,
    /// Offset of the string region, relative to `section_offset`.
    string_offset: usize,
}

impl NameTable {
    /// The magic bytes at the start of the table.
    pub const MAGIC: [u8; 4] = *b"SFNT";

    /// Parse the table header at the reader's position.
    ///
    /// The string region is taken to begin right after the header.
    pub fn parse(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let eof = |e| Error::in_section(Section::NameTable, e);
        let section_offset = reader.position();

        let magic = reader.read_array::<4>().map_err(eof)?;
        let header_size = reader.read_u16().map_err(eof)?;
        let reserved = reader.read_u16().map_err(eof)?;

        Ok(Self {
            magic,
            header_size,
            reserved,
            section_offset,
            string_offset: reader.position() - section_offset,
        })
    }

    /// Get the signature bytes.
    #[inline]
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    /// Whether the signature equals `SFNT`.
    #[inline]
    pub fn magic_matches(&self) -> bool {
        self.magic == Self::MAGIC
    }

    /// Get the declared header size.
    #[inline]
    pub fn header_size(&self) -> u16 {
        self.header_size
    }

    /// Get the reserved field.
    #[inline]
    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    /// Get the absolute offset of the table in the source.
    #[inline]
    pub fn section_offset(&self) -> usize {
        self.section_offset
    }

    /// Get the string region offset relative to the start of the table.
    #[inline]
    pub fn string_offset(&self) -> usize {
        self.string_offset
    }

    /// Get the absolute offset of the string region in the source.
    #[inline]
    pub fn string_start(&self) -> usize {
        self.section_offset + self.string_offset
    }

    /// Resolve the name referenced by `entry`.
    ///
    /// `data` must be the same source the table was parsed from. Bytes that
    /// are not valid UTF-8 are replaced with U+FFFD; use
    /// [`NameTable::resolve_bytes`] for the stored bytes.
    pub fn resolve<'a>(&self, data: &'a [u8], entry: &Entry) -> Result<Cow<'a, str>> {
        self.resolve_name(data, entry.name_table_offset())
    }

    /// Resolve a name from a raw name table field, decoding it lossily.
    pub fn resolve_name<'a>(
        &self,
        data: &'a [u8],
        name_table_offset: u32,
    ) -> Result<Cow<'a, str>> {
        self.resolve_bytes(data, name_table_offset)
            .map(String::from_utf8_lossy)
    }

    /// Resolve the stored bytes of a name from a raw name table field.
    ///
    /// The low 24 bits give the offset in 4-byte words from the start of the
    /// string region; the flag byte is ignored. Bytes are read up to the first
    /// NUL. Resolving the same field twice always yields the same bytes.
    pub fn resolve_bytes<'a>(&self, data: &'a [u8], name_table_offset: u32) -> Result<&'a [u8]> {
        let words = u64::from(name_table_offset & Entry::NAME_OFFSET_MASK);
        let start = self.string_start() as u64 + words * 4;

        if start >= data.len() as u64 {
            return Err(Error::OutOfBounds {
                offset: start,
                length: 1,
                available: data.len() as u64,
            });
        }

        BinaryReader::new_at(data, start as usize)
            .read_cstring_bytes()
            .map_err(|_| Error::InvalidName(format!("unterminated name at offset {start:#x}")))
    }
}
