//! SFAT allocation table.

use sarc_common::{BinaryReader, ByteView};

use crate::error::Section;
use crate::{Entry, Error, Result};

/// The decoded allocation table.
///
/// Entries are kept in on-disk order, which is the canonical order for
/// enumeration and bulk export.
#[derive(Debug, Clone)]
pub struct AllocationTable {
    magic: [u8; 4],
    header_size: u16,
    hash_key: u32,
    entries: Vec<Entry>,
}

impl AllocationTable {
    /// The magic bytes at the start of the table.
    pub const MAGIC: [u8; 4] = *b"SFAT";

    /// Size of the table header preceding the records.
    pub const HEADER_SIZE: usize = 12;

    /// Parse the table at the reader's position.
    ///
    /// The whole record array is bounds-checked before any record is decoded,
    /// so a count that runs past the end of the source fails without producing
    /// a partial table. The magic is recorded but not checked here.
    pub fn parse(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let eof = |e| Error::in_section(Section::AllocationTable, e);

        let magic = reader.read_array::<4>().map_err(eof)?;
        let header_size = reader.read_u16().map_err(eof)?;
        let entry_count = reader.read_u16().map_err(eof)? as usize;
        let hash_key = reader.read_u32().map_err(eof)?;

        let records = reader
            .read_bytes(entry_count * Entry::SIZE)
            .map_err(eof)?;
        let view = ByteView::with_endian(records, reader.endian());

        let entries = (0..entry_count)
            .map(|i| Entry::decode(&view, i * Entry::SIZE))
            .collect();

        Ok(Self {
            magic,
            header_size,
            hash_key,
            entries,
        })
    }

    /// Get the signature bytes.
    #[inline]
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    /// Whether the signature equals `SFAT`.
    #[inline]
    pub fn magic_matches(&self) -> bool {
        self.magic == Self::MAGIC
    }

    /// Get the declared header size.
    #[inline]
    pub fn header_size(&self) -> u16 {
        self.header_size
    }

    /// Get the name hash multiplier.
    #[inline]
    pub fn hash_key(&self) -> u32 {
        self.hash_key
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Get the entries in on-disk order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}
