//! Error types for the SARC archive crate.

use std::fmt;

use thiserror::Error;

/// Section of the archive a structural error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The top-level `SARC` header.
    Header,
    /// The `SFAT` allocation table.
    AllocationTable,
    /// The `SFNT` name table.
    NameTable,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("SARC header"),
            Self::AllocationTable => f.write_str("SFAT allocation table"),
            Self::NameTable => f.write_str("SFNT name table"),
        }
    }
}

/// Errors that can occur when working with SARC archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] sarc_common::Error),

    /// Section signature did not match.
    #[error("invalid {section} magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        section: Section,
        expected: [u8; 4],
        actual: [u8; 4],
    },

    /// A section ends before its declared contents.
    #[error("truncated {section}: needed {needed} bytes but only {available} available")]
    Truncated {
        section: Section,
        needed: usize,
        available: usize,
    },

    /// Header field holds an unusable value.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A computed data or string range lies outside the source.
    #[error("{length} bytes at offset {offset} out of bounds (source length: {available})")]
    OutOfBounds {
        offset: u64,
        length: u64,
        available: u64,
    },

    /// Resolved name is empty or unusable as an export path.
    #[error("invalid entry name: {0}")]
    InvalidName(String),

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The archive has been closed.
    #[error("archive is closed")]
    Closed,
}

impl Error {
    /// Wrap a reader error raised while parsing `section`.
    ///
    /// Running out of bytes becomes [`Error::Truncated`]; anything else is
    /// passed through.
    pub(crate) fn in_section(section: Section, err: sarc_common::Error) -> Self {
        match err {
            sarc_common::Error::UnexpectedEof { needed, available } => Self::Truncated {
                section,
                needed,
                available,
            },
            other => Self::Common(other),
        }
    }

    /// Whether this error reports a malformed archive layout.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. } | Self::Truncated { .. } | Self::InvalidHeader(_)
        )
    }
}

/// Result type for SARC operations.
pub type Result<T> = std::result::Result<T, Error>;
