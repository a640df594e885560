//! Byte order handling.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of the multi-byte integers in an archive.
///
/// SARC headers carry a byte-order mark (`0xFEFF`) whose on-disk byte
/// sequence tells which order every other field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Endian {
    /// Little-endian (Switch, 3DS).
    #[default]
    Little,
    /// Big-endian (Wii U).
    Big,
}

impl Endian {
    /// Detect the byte order from the two raw bytes of a byte-order mark.
    ///
    /// Returns `None` if the bytes are not a valid mark.
    #[inline]
    pub const fn from_bom(bom: [u8; 2]) -> Option<Self> {
        match bom {
            [0xFF, 0xFE] => Some(Self::Little),
            [0xFE, 0xFF] => Some(Self::Big),
            _ => None,
        }
    }

    /// Read a u16 from the first two bytes of `bytes`.
    ///
    /// Panics if `bytes` is shorter than two bytes.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            Self::Little => LittleEndian::read_u16(bytes),
            Self::Big => BigEndian::read_u16(bytes),
        }
    }

    /// Read an i16 from the first two bytes of `bytes`.
    #[inline]
    pub fn read_i16(self, bytes: &[u8]) -> i16 {
        match self {
            Self::Little => LittleEndian::read_i16(bytes),
            Self::Big => BigEndian::read_i16(bytes),
        }
    }

    /// Read a u32 from the first four bytes of `bytes`.
    ///
    /// Panics if `bytes` is shorter than four bytes.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            Self::Little => LittleEndian::read_u32(bytes),
            Self::Big => BigEndian::read_u32(bytes),
        }
    }

    /// Read an i32 from the first four bytes of `bytes`.
    #[inline]
    pub fn read_i32(self, bytes: &[u8]) -> i32 {
        match self {
            Self::Little => LittleEndian::read_i32(bytes),
            Self::Big => BigEndian::read_i32(bytes),
        }
    }
}

impl std::fmt::Display for Endian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Little => f.write_str("little"),
            Self::Big => f.write_str("big"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bom() {
        assert_eq!(Endian::from_bom([0xFF, 0xFE]), Some(Endian::Little));
        assert_eq!(Endian::from_bom([0xFE, 0xFF]), Some(Endian::Big));
        assert_eq!(Endian::from_bom([0x00, 0x00]), None);
    }

    #[test]
    fn test_read_both_orders() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(Endian::Little.read_u32(&bytes), 0x78563412);
        assert_eq!(Endian::Big.read_u32(&bytes), 0x12345678);
        assert_eq!(Endian::Little.read_u16(&bytes), 0x3412);
        assert_eq!(Endian::Big.read_u16(&bytes), 0x1234);
    }

    #[test]
    fn test_signed_reads() {
        let bytes = [0xFE, 0xFF, 0xFF, 0xFF];
        assert_eq!(Endian::Little.read_i16(&bytes), -2);
        assert_eq!(Endian::Little.read_i32(&bytes), -2);
        assert_eq!(Endian::Big.read_i16(&bytes), -257);
    }
}
