//! Offset-indexed integer reads over a fixed buffer.

use crate::Endian;

/// A read-only view over a byte buffer that reads fixed-width integers at
/// arbitrary offsets.
///
/// Unlike [`BinaryReader`](crate::BinaryReader) there is no cursor: every
/// read is a pure function of the buffer and the offset. The `*_at` methods
/// expect the caller to have validated the range already (table decoders know
/// their record sizes up front) and panic on an out-of-range offset. Use
/// [`ByteView::contains`] or the `get_*` variants when the range is unchecked.
///
/// # Example
///
/// ```
/// use sarc_common::ByteView;
///
/// let data = [0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
/// let view = ByteView::new(&data);
///
/// assert_eq!(view.i16_at(0), 1);
/// assert_eq!(view.i32_at(2), -1);
/// assert_eq!(view.get_u32(4), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
    endian: Endian,
}

impl<'a> ByteView<'a> {
    /// Create a little-endian view.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            endian: Endian::Little,
        }
    }

    /// Create a view reading in the given byte order.
    #[inline]
    pub const fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self { data, endian }
    }

    /// Byte order used by this view.
    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Whether `[offset, offset + len)` lies inside the buffer.
    #[inline]
    pub fn contains(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.data.len())
    }

    /// Read an i16 at `offset`.
    #[inline]
    pub fn i16_at(&self, offset: usize) -> i16 {
        self.endian.read_i16(&self.data[offset..offset + 2])
    }

    /// Read an i32 at `offset`.
    #[inline]
    pub fn i32_at(&self, offset: usize) -> i32 {
        self.endian.read_i32(&self.data[offset..offset + 4])
    }

    /// Read a u16 at `offset`.
    #[inline]
    pub fn u16_at(&self, offset: usize) -> u16 {
        self.endian.read_u16(&self.data[offset..offset + 2])
    }

    /// Read a u32 at `offset`.
    #[inline]
    pub fn u32_at(&self, offset: usize) -> u32 {
        self.endian.read_u32(&self.data[offset..offset + 4])
    }

    /// Checked u16 read.
    #[inline]
    pub fn get_u16(&self, offset: usize) -> Option<u16> {
        self.contains(offset, 2).then(|| self.u16_at(offset))
    }

    /// Checked u32 read.
    #[inline]
    pub fn get_u32(&self, offset: usize) -> Option<u32> {
        self.contains(offset, 4).then(|| self.u32_at(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_at_offsets() {
        let data = [0xAA, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let view = ByteView::new(&data);

        assert_eq!(view.u16_at(1), 0x1234);
        assert_eq!(view.u32_at(3), 0x12345678);
        assert_eq!(view.i16_at(1), 0x1234);
    }

    #[test]
    fn test_big_endian_view() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let view = ByteView::with_endian(&data, Endian::Big);

        assert_eq!(view.u32_at(0), 0x12345678);
        assert_eq!(view.i16_at(2), 0x5678);
    }

    #[test]
    fn test_contains_guards_overflow() {
        let data = [0u8; 8];
        let view = ByteView::new(&data);

        assert!(view.contains(4, 4));
        assert!(!view.contains(5, 4));
        assert!(!view.contains(usize::MAX, 2));
        assert_eq!(view.get_u16(7), None);
        assert_eq!(view.get_u16(6), Some(0));
    }
}
