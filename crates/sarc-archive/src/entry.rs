//! SARC allocation table entry.

use sarc_common::ByteView;

/// An entry (file) within a SARC archive.
///
/// This is a plain snapshot of one allocation table record. It carries no
/// reference back to the archive; pass it to [`SarcArchive::name_of`] or
/// [`SarcArchive::data_of`] to resolve its name or contents.
///
/// [`SarcArchive::name_of`]: crate::SarcArchive::name_of
/// [`SarcArchive::data_of`]: crate::SarcArchive::data_of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Entry {
    /// Hash of the entry name.
    name_hash: u32,
    /// Name table word offset (low 24 bits) and flags (high 8 bits).
    name_table_offset: u32,
    /// Data start, relative to the header's data offset.
    data_start: u32,
    /// Data length in bytes.
    data_length: u32,
}

impl Entry {
    /// Size of one record on disk.
    pub const SIZE: usize = 16;

    /// Mask selecting the word offset from the name table field.
    pub const NAME_OFFSET_MASK: u32 = 0x00FF_FFFF;

    /// Create a new entry.
    pub fn new(name_hash: u32, name_table_offset: u32, data_start: u32, data_length: u32) -> Self {
        Self {
            name_hash,
            name_table_offset,
            data_start,
            data_length,
        }
    }

    /// Decode the record at `offset`.
    ///
    /// The caller guarantees that `offset + Entry::SIZE` lies inside the view.
    pub(crate) fn decode(view: &ByteView<'_>, offset: usize) -> Self {
        Self {
            name_hash: view.u32_at(offset),
            name_table_offset: view.u32_at(offset + 4),
            data_start: view.u32_at(offset + 8),
            data_length: view.u32_at(offset + 12),
        }
    }

    /// Get the name hash.
    #[inline]
    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    /// Get the raw name table field, flags included.
    #[inline]
    pub fn name_table_offset(&self) -> u32 {
        self.name_table_offset
    }

    /// Get the name offset in 4-byte words from the start of the string region.
    #[inline]
    pub fn name_offset(&self) -> u32 {
        self.name_table_offset & Self::NAME_OFFSET_MASK
    }

    /// Get the name offset in bytes from the start of the string region.
    #[inline]
    pub fn name_byte_offset(&self) -> u64 {
        u64::from(self.name_offset()) * 4
    }

    /// Get the flag byte stored above the name offset.
    #[inline]
    pub fn flags(&self) -> u8 {
        (self.name_table_offset >> 24) as u8
    }

    /// Check if the producer marked this entry as named.
    #[inline]
    pub fn has_name(&self) -> bool {
        self.flags() != 0
    }

    /// Get the data start, relative to the data region.
    #[inline]
    pub fn data_start(&self) -> u32 {
        self.data_start
    }

    /// Get the data length in bytes.
    #[inline]
    pub fn data_length(&self) -> u32 {
        self.data_length
    }
}
