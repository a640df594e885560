//! Common utilities for SARC tooling.
//!
//! This crate provides the low-level reading primitives shared by the SARC crates:
//!
//! - [`BinaryReader`] - Cursor-style reading from byte slices
//! - [`ByteView`] - Offset-indexed fixed-width integer reads
//! - [`Endian`] - Byte order selected by an archive's byte-order mark

mod endian;
mod error;
mod reader;
mod view;

pub use endian::Endian;
pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use view::ByteView;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
