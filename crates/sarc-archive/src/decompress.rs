//! Payload decompression.
//!
//! The archive reader never decompresses entries itself. Callers that know a
//! payload is compressed pass the raw bytes through a [`Decompressor`].

use std::io::Read;

use crate::{Error, Result};

/// Zstandard frame magic.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// A block codec turning compressed bytes into plain bytes.
///
/// Plain functions and closures with the matching signature implement this too.
pub trait Decompressor {
    /// Decompress `data` into a new buffer.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

impl<F> Decompressor for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>>,
{
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self(data)
    }
}

/// Zstandard codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zstd;

impl Decompressor for Zstd {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len() * 2);
        decompress_zstd(data, &mut output)?;
        Ok(output)
    }
}

/// Check if data starts with a Zstandard frame.
#[inline]
pub fn is_zstd(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZSTD_MAGIC
}

/// Decompress Zstandard-compressed data.
pub fn decompress_zstd(data: &[u8], output: &mut Vec<u8>) -> Result<()> {
    let mut decoder = zstd::Decoder::new(data).map_err(|e| Error::Decompression(e.to_string()))?;

    output.clear();
    decoder
        .read_to_end(output)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip() {
        let original = b"Hello, World! This is a test of Zstandard compression.";

        let compressed = zstd::encode_all(&original[..], 3).unwrap();
        assert!(is_zstd(&compressed));

        let decompressed = Zstd.decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(!is_zstd(b"not zstd"));
        assert!(matches!(
            Zstd.decompress(b"not zstd at all"),
            Err(Error::Decompression(_))
        ));
    }

    #[test]
    fn test_closure_codec() {
        let reverse = |data: &[u8]| -> Result<Vec<u8>> { Ok(data.iter().rev().copied().collect()) };
        assert_eq!(reverse.decompress(b"abc").unwrap(), b"cba");
    }
}
