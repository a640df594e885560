//! SARC bundle archive reader.
//!
//! SARC is a simple container packing many named blobs into one file:
//!
//! - a `SARC` header giving the byte order and the base of the data region
//! - an `SFAT` allocation table with one 16-byte record per entry
//! - an `SFNT` name table holding NUL-terminated, word-aligned names
//! - the data region itself
//!
//! This crate parses the structure, resolves names and data ranges, and
//! writes entries out. It never decompresses payloads; callers that know an
//! entry is compressed run it through a [`Decompressor`] such as [`Zstd`].
//!
//! # Example
//!
//! ```no_run
//! use sarc_archive::{ExportOptions, SarcArchive};
//!
//! let archive = SarcArchive::open("Layout.sarc")?;
//!
//! for item in archive.iter()? {
//!     let (name, entry) = item?;
//!     println!("{name}: {} bytes", entry.data_length());
//! }
//!
//! // Dump everything next to the archive, one file at a time.
//! for path in archive.export_all(None, &ExportOptions::new())? {
//!     println!("wrote {}", path?.display());
//! }
//! # Ok::<(), sarc_archive::Error>(())
//! ```

mod archive;
mod decompress;
mod entry;
mod error;
mod export;
mod hash;
mod header;
mod sfat;
mod sfnt;

#[cfg(test)]
mod test_util;

pub use archive::{Iter, MagicPolicy, OpenOptions, SarcArchive};
pub use decompress::{decompress_zstd, is_zstd, Decompressor, Zstd, ZSTD_MAGIC};
pub use entry::Entry;
pub use error::{Error, Result, Section};
pub use export::{
    entry_path, ErrorPolicy, ExportAll, ExportOptions, ExportSink, FsSink, DEFAULT_FOLDER,
};
pub use hash::{name_hash, DEFAULT_HASH_KEY};
pub use header::SarcHeader;
pub use sfat::AllocationTable;
pub use sfnt::NameTable;
