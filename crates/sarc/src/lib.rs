//! Sarc - SARC bundle archive reading library.
//!
//! This crate provides a unified interface to the SARC crates.
//!
//! # Crates
//!
//! - [`sarc_common`] - Binary reading primitives (cursor reader, byte view, byte order)
//! - [`sarc_archive`] - Archive parsing, name resolution and extraction
//!
//! # Example
//!
//! ```no_run
//! use sarc::prelude::*;
//!
//! let archive = SarcArchive::open("Layout.sarc")?;
//!
//! let entry = archive.find("timg/icon.bntx.zs")?;
//! let raw = archive.data_of(&entry)?;
//! let texture = if is_zstd(raw) { Zstd.decompress(raw)? } else { raw.to_vec() };
//! println!("{} bytes", texture.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use sarc_archive as archive;
pub use sarc_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sarc_archive::{
        is_zstd, Decompressor, Entry, ErrorPolicy, ExportOptions, ExportSink, FsSink,
        MagicPolicy, OpenOptions, SarcArchive, Zstd,
    };
    pub use sarc_common::{BinaryReader, ByteView, Endian};
}

// Re-export commonly used types at the crate root
pub use sarc_archive::{Error, Result, SarcArchive};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
