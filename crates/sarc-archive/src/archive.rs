//! SARC archive reader.
//!
//! The reader owns its byte source for its whole lifetime and never moves a
//! cursor over it: names and data are read at computed offsets, so queries can
//! run in any order (or from several threads) without interfering.

use std::borrow::Cow;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use sarc_common::{BinaryReader, Endian};
use tracing::{debug, warn};

use crate::error::Section;
use crate::hash::name_hash;
use crate::header::RawSarcHeader;
use crate::{AllocationTable, Entry, Error, NameTable, Result, SarcHeader};

/// How a signature mismatch is treated while opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagicPolicy {
    /// Reject the archive.
    #[default]
    Strict,
    /// Keep parsing and report the archive through [`SarcArchive::is_valid`].
    ///
    /// Truncation is still fatal.
    Permissive,
}

/// Options for opening an archive.
///
/// ```no_run
/// use sarc_archive::{MagicPolicy, OpenOptions};
///
/// let archive = OpenOptions::new()
///     .magic_policy(MagicPolicy::Permissive)
///     .open("Layout.sarc")?;
/// println!("valid: {}", archive.is_valid());
/// # Ok::<(), sarc_archive::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    magic_policy: MagicPolicy,
}

impl OpenOptions {
    /// Create default options (strict magic checking).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the magic mismatch policy.
    pub fn magic_policy(mut self, policy: MagicPolicy) -> Self {
        self.magic_policy = policy;
        self
    }

    /// Open an archive file, memory-mapping it.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<SarcArchive> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let label = path
            .file_stem()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        let location = path.parent().map(|p| {
            if p.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                p.to_path_buf()
            }
        });

        SarcArchive::from_source(Source::Mapped(mmap), label, location, self.magic_policy)
    }

    /// Open an archive held in memory.
    pub fn from_bytes(&self, data: Vec<u8>) -> Result<SarcArchive> {
        SarcArchive::from_source(Source::Owned(data), None, None, self.magic_policy)
    }
}

/// Random-access byte source backing an archive.
enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Source {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => &mmap[..],
            Self::Owned(data) => &data[..],
        }
    }
}

/// Parsed header and tables.
struct Layout {
    header: SarcHeader,
    sfat: AllocationTable,
    sfnt: NameTable,
    valid: bool,
}

/// A SARC archive reader.
///
/// The header, allocation table and name table header are parsed when the
/// archive is opened; names and data are resolved on demand.
///
/// # Example
///
/// ```no_run
/// use sarc_archive::SarcArchive;
///
/// let archive = SarcArchive::open("Layout.sarc")?;
///
/// for item in archive.iter()? {
///     let (name, entry) = item?;
///     println!("{name}: {} bytes", entry.data_length());
/// }
/// # Ok::<(), sarc_archive::Error>(())
/// ```
pub struct SarcArchive {
    /// Byte source, `None` once closed
    source: Option<Source>,
    /// Archive file stem
    label: Option<String>,
    /// Directory holding the archive file
    location: Option<PathBuf>,
    header: SarcHeader,
    sfat: AllocationTable,
    sfnt: NameTable,
    valid: bool,
}

impl SarcArchive {
    /// Open an archive file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        OpenOptions::new().open(path)
    }

    /// Open an archive held in memory with default options.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        OpenOptions::new().from_bytes(data)
    }

    fn from_source(
        source: Source,
        label: Option<String>,
        location: Option<PathBuf>,
        policy: MagicPolicy,
    ) -> Result<Self> {
        let Layout {
            header,
            sfat,
            sfnt,
            valid,
        } = parse_layout(source.as_bytes(), policy)?;

        debug!(
            label = label.as_deref().unwrap_or("<memory>"),
            entries = sfat.entry_count(),
            data_offset = header.data_offset,
            endian = %header.endian,
            valid,
            "opened SARC archive"
        );

        Ok(Self {
            source: Some(source),
            label,
            location,
            header,
            sfat,
            sfnt,
            valid,
        })
    }

    /// Get the archive label (file stem), if opened from a path.
    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the directory containing the archive file, if opened from a path.
    #[inline]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Get the parsed header.
    #[inline]
    pub fn header(&self) -> &SarcHeader {
        &self.header
    }

    /// Get the allocation table.
    #[inline]
    pub fn sfat(&self) -> &AllocationTable {
        &self.sfat
    }

    /// Get the name table.
    #[inline]
    pub fn sfnt(&self) -> &NameTable {
        &self.sfnt
    }

    /// Check whether every signature and the byte-order mark were well-formed.
    ///
    /// Always true for archives opened with [`MagicPolicy::Strict`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Check whether [`SarcArchive::close`] has been called.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.sfat.entry_count()
    }

    /// Get the number of entries; same as [`SarcArchive::entry_count`].
    #[inline]
    pub fn len(&self) -> usize {
        self.sfat.entry_count()
    }

    /// Check whether the archive has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sfat.entry_count() == 0
    }

    /// Get the entries in on-disk order.
    pub fn entries(&self) -> Result<&[Entry]> {
        self.data()?;
        Ok(self.sfat.entries())
    }

    /// Iterate over `(name, entry)` pairs in on-disk order.
    ///
    /// Names are resolved as the iterator advances.
    pub fn iter(&self) -> Result<Iter<'_>> {
        Ok(Iter {
            names: self.sfnt,
            data: self.data()?,
            entries: self.sfat.entries().iter(),
        })
    }

    /// Resolve the name of an entry.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn name_of(&self, entry: &Entry) -> Result<Cow<'_, str>> {
        self.sfnt.resolve(self.data()?, entry)
    }

    /// Resolve the name of an entry as stored, without decoding.
    pub fn raw_name_of(&self, entry: &Entry) -> Result<&[u8]> {
        self.sfnt.resolve_bytes(self.data()?, entry.name_table_offset())
    }

    /// Get the raw bytes of an entry without copying.
    ///
    /// The range is `data_offset + data_start` for `data_length` bytes; a range
    /// reaching past the end of the source is an [`Error::OutOfBounds`].
    pub fn data_of(&self, entry: &Entry) -> Result<&[u8]> {
        let data = self.data()?;
        let start = u64::from(self.header.data_offset) + u64::from(entry.data_start());
        let length = u64::from(entry.data_length());

        if start + length > data.len() as u64 {
            return Err(Error::OutOfBounds {
                offset: start,
                length,
                available: data.len() as u64,
            });
        }

        Ok(&data[start as usize..(start + length) as usize])
    }

    /// Read entry contents into an owned buffer.
    pub fn read(&self, entry: &Entry) -> Result<Vec<u8>> {
        self.data_of(entry).map(<[u8]>::to_vec)
    }

    /// Open a readable, seekable stream over an entry's contents.
    pub fn open_entry(&self, entry: &Entry) -> Result<Cursor<&[u8]>> {
        self.data_of(entry).map(Cursor::new)
    }

    /// Find an entry by exact name.
    ///
    /// Entries whose stored hash matches are tried first; if none of them
    /// carries the name, every entry is compared by name.
    pub fn find(&self, name: &str) -> Result<Entry> {
        let data = self.data()?;
        let hash = name_hash(name, self.sfat.hash_key());
        let entries = self.sfat.entries();

        entries
            .iter()
            .filter(|e| e.name_hash() == hash)
            .chain(entries.iter())
            .find(|e| {
                self.sfnt
                    .resolve_bytes(data, e.name_table_offset())
                    .is_ok_and(|stored| stored == name.as_bytes())
            })
            .copied()
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))
    }

    /// Release the byte source.
    ///
    /// Afterwards every query fails with [`Error::Closed`]. Closing an already
    /// closed archive does nothing.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            debug!(label = self.label.as_deref().unwrap_or("<memory>"), "closed SARC archive");
        }
    }

    #[inline]
    fn data(&self) -> Result<&[u8]> {
        self.source
            .as_ref()
            .map(Source::as_bytes)
            .ok_or(Error::Closed)
    }
}

impl std::fmt::Debug for SarcArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SarcArchive")
            .field("label", &self.label)
            .field("entries", &self.sfat.entry_count())
            .field("valid", &self.valid)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Iterator over `(name, entry)` pairs, created by [`SarcArchive::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    names: NameTable,
    data: &'a [u8],
    entries: std::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<(Cow<'a, str>, Entry)>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(self.names.resolve(self.data, entry).map(|name| (name, *entry)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Compare a section signature, returning whether it matched.
fn check_magic(
    section: Section,
    expected: [u8; 4],
    actual: [u8; 4],
    policy: MagicPolicy,
) -> Result<bool> {
    if actual == expected {
        return Ok(true);
    }
    match policy {
        MagicPolicy::Strict => Err(Error::InvalidMagic {
            section,
            expected,
            actual,
        }),
        MagicPolicy::Permissive => {
            warn!(%section, ?actual, "signature mismatch ignored");
            Ok(false)
        }
    }
}

fn parse_layout(data: &[u8], policy: MagicPolicy) -> Result<Layout> {
    let mut reader = BinaryReader::new(data);
    let raw: RawSarcHeader = reader
        .read_struct()
        .map_err(|e| Error::in_section(Section::Header, e))?;
    let mut valid = check_magic(Section::Header, SarcHeader::MAGIC, raw.magic, policy)?;

    let endian = match (Endian::from_bom(raw.bom), policy) {
        (Some(endian), _) => endian,
        (None, MagicPolicy::Permissive) => {
            warn!(bom = ?raw.bom, "invalid byte-order mark, assuming little-endian");
            valid = false;
            Endian::Little
        }
        (None, MagicPolicy::Strict) => {
            return Err(Error::InvalidHeader(format!(
                "invalid byte-order mark {:02X?}",
                raw.bom
            )));
        }
    };
    let header = SarcHeader::decode(&raw, endian);
    reader.set_endian(endian);

    if header.file_size as usize != data.len() {
        debug!(
            declared = header.file_size,
            actual = data.len(),
            "file size field does not match source length"
        );
    }

    let sfat = AllocationTable::parse(&mut reader)?;
    valid &= check_magic(Section::AllocationTable, AllocationTable::MAGIC, sfat.magic(), policy)?;

    let sfnt = NameTable::parse(&mut reader)?;
    valid &= check_magic(Section::NameTable, NameTable::MAGIC, sfnt.magic(), policy)?;

    Ok(Layout {
        header,
        sfat,
        sfnt,
        valid,
    })
}
