//! Writing entries out to a destination.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{trace, warn};

use crate::{Entry, Error, Result, SarcArchive};

/// Destination for exported entries.
pub trait ExportSink {
    /// Create `path` and any missing parents.
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;

    /// Write `data` to `path`, replacing any existing file.
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Map a destination root to the directory the dump folder goes in.
    fn resolve_root(&self, root: &Path) -> PathBuf {
        root.to_path_buf()
    }
}

impl<S: ExportSink + ?Sized> ExportSink for &S {
    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        (**self).ensure_dir(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        (**self).write_file(path, data)
    }

    fn resolve_root(&self, root: &Path) -> PathBuf {
        (**self).resolve_root(root)
    }
}

/// Sink writing to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl ExportSink for FsSink {
    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(path, data)
    }

    /// An existing file stands for the directory holding it.
    fn resolve_root(&self, root: &Path) -> PathBuf {
        match root.parent() {
            Some(parent) if root.is_file() => parent.to_path_buf(),
            _ => root.to_path_buf(),
        }
    }
}

/// What a bulk export does when one entry fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Yield the error, then end the sequence.
    #[default]
    Abort,
    /// Yield the error and carry on with the next entry.
    Skip,
}

/// Options for [`SarcArchive::export_all`].
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Name of the dump folder created under the destination root.
    ///
    /// Defaults to the archive label, or `"sarc"` for archives without one.
    pub folder: Option<String>,
    /// Failure handling for individual entries.
    pub error_policy: ErrorPolicy,
}

impl ExportOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dump folder name.
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Set the per-entry failure handling.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

/// Fallback dump folder name for archives without a label.
pub const DEFAULT_FOLDER: &str = "sarc";

/// Build the output path of an archive name under `root`.
///
/// The in-archive name is `/`-separated; each segment becomes one path
/// component, so the host separator is applied here and nowhere else. Names
/// that are not valid UTF-8 are rejected.
pub fn entry_path(root: &Path, name: impl AsRef<[u8]>) -> Result<PathBuf> {
    let bytes = name.as_ref();
    let name = std::str::from_utf8(bytes).map_err(|e| {
        Error::InvalidName(format!("{:?}: not UTF-8: {e}", String::from_utf8_lossy(bytes)))
    })?;
    let invalid = |reason: &str| Error::InvalidName(format!("{name:?}: {reason}"));

    if name.is_empty() {
        return Err(invalid("empty name"));
    }
    if name.ends_with('/') {
        return Err(invalid("no file component"));
    }
    if name.contains('\0') {
        return Err(invalid("contains NUL"));
    }

    let mut path = root.to_path_buf();
    let mut pushed = 0usize;

    for segment in name.split('/').filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => {
                path.push(part);
                pushed += 1;
            }
            _ => return Err(invalid("unsafe path segment")),
        }
    }

    if pushed == 0 {
        return Err(invalid("no file component"));
    }

    Ok(path)
}

/// Check that a dump folder name is a single plain path component.
fn validate_folder(folder: &str) -> Result<()> {
    let mut components = Path::new(folder).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidName(format!(
            "{folder:?}: dump folder must be a single path component"
        ))),
    }
}

/// Lazy bulk export returned by [`SarcArchive::export_all`].
///
/// Each call to `next` exports one entry in on-disk order and yields the
/// written path. Dropping the iterator early leaves the remaining entries
/// unwritten.
pub struct ExportAll<'a, S> {
    archive: &'a SarcArchive,
    sink: S,
    dir: PathBuf,
    entries: std::slice::Iter<'a, Entry>,
    policy: ErrorPolicy,
    done: bool,
}

impl<'a, S: ExportSink> ExportAll<'a, S> {
    /// The dump directory entries are written under.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl<'a, S: ExportSink> Iterator for ExportAll<'a, S> {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let entry = self.entries.next()?;
        match self.archive.export_entry_to(entry, &self.dir, &self.sink) {
            Ok(path) => Some(Ok(path)),
            Err(e) => {
                match self.policy {
                    ErrorPolicy::Abort => self.done = true,
                    ErrorPolicy::Skip => warn!(error = %e, "skipping entry"),
                }
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.entries.len()))
        }
    }
}

impl SarcArchive {
    /// Export one entry to `root/<name>` on the local filesystem.
    pub fn export_entry(&self, entry: &Entry, root: impl AsRef<Path>) -> Result<PathBuf> {
        self.export_entry_to(entry, root.as_ref(), &FsSink)
    }

    /// Export one entry through `sink`.
    ///
    /// The name's directory part becomes a subdirectory of `root`, which is
    /// created through the sink before the data is written. Names without a
    /// directory part are written straight into `root`.
    pub fn export_entry_to<S: ExportSink + ?Sized>(
        &self,
        entry: &Entry,
        root: &Path,
        sink: &S,
    ) -> Result<PathBuf> {
        let name = self.raw_name_of(entry)?;
        let path = entry_path(root, name)?;
        let data = self.data_of(entry)?;

        if let Some(parent) = path.parent() {
            sink.ensure_dir(parent)?;
        }
        sink.write_file(&path, data)?;

        trace!(
            entry = %String::from_utf8_lossy(name),
            bytes = data.len(),
            path = %path.display(),
            "exported entry"
        );
        Ok(path)
    }

    /// Export every entry under `root/<folder>` on the local filesystem.
    ///
    /// With `root` set to `None` the directory containing the archive file is
    /// used. See [`SarcArchive::export_all_to`].
    pub fn export_all(
        &self,
        root: Option<&Path>,
        options: &ExportOptions,
    ) -> Result<ExportAll<'_, FsSink>> {
        self.export_all_to(root, options, FsSink)
    }

    /// Export every entry through `sink`.
    ///
    /// The dump directory is created immediately; entries are then written one
    /// at a time as the returned iterator is consumed. Existing files are
    /// overwritten. Calling this again starts a fresh export.
    pub fn export_all_to<S: ExportSink>(
        &self,
        root: Option<&Path>,
        options: &ExportOptions,
        sink: S,
    ) -> Result<ExportAll<'_, S>> {
        let entries = self.entries()?;
        let dir = self.dump_dir(root, options, &sink)?;
        sink.ensure_dir(&dir)?;

        Ok(ExportAll {
            archive: self,
            sink,
            dir,
            entries: entries.iter(),
            policy: options.error_policy,
            done: false,
        })
    }

    /// Export every entry in parallel.
    ///
    /// Reads go straight to the immutable source buffer, so workers share the
    /// archive without locking. Every entry is attempted regardless of
    /// [`ExportOptions::error_policy`]; results come back in entry order.
    #[cfg(feature = "parallel")]
    pub fn export_all_parallel<S: ExportSink + Sync>(
        &self,
        root: Option<&Path>,
        options: &ExportOptions,
        sink: &S,
    ) -> Result<Vec<Result<PathBuf>>> {
        use rayon::prelude::*;

        let entries = self.entries()?;
        let dir = self.dump_dir(root, options, sink)?;
        sink.ensure_dir(&dir)?;

        Ok(entries
            .par_iter()
            .map(|entry| self.export_entry_to(entry, &dir, sink))
            .collect())
    }

    fn dump_dir<S: ExportSink + ?Sized>(
        &self,
        root: Option<&Path>,
        options: &ExportOptions,
        sink: &S,
    ) -> Result<PathBuf> {
        let root = match root {
            Some(root) => sink.resolve_root(root),
            None => self.location().map(Path::to_path_buf).ok_or_else(|| {
                Error::InvalidName(
                    "no destination root given and the archive has no file location".into(),
                )
            })?,
        };

        let folder = options
            .folder
            .as_deref()
            .or_else(|| self.label())
            .unwrap_or(DEFAULT_FOLDER);
        validate_folder(folder)?;

        Ok(root.join(folder))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use super::*;
    use crate::test_util::TestArchive;

    /// Sink that records writes in memory.
    #[derive(Default)]
    struct MemorySink {
        dirs: RefCell<Vec<PathBuf>>,
        files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    }

    impl ExportSink for MemorySink {
        fn ensure_dir(&self, path: &Path) -> io::Result<()> {
            self.dirs.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), data.to_vec());
            Ok(())
        }
    }

    fn archive() -> SarcArchive {
        let bytes = TestArchive::new()
            .file("a/b.bin", [0x11u8; 16])
            .file("c.bin", [0x22u8; 4])
            .build();
        SarcArchive::from_bytes(bytes).unwrap()
    }

    #[test]
    fn test_entry_path() {
        let root = Path::new("out");
        assert_eq!(
            entry_path(root, "a/b.bin").unwrap(),
            Path::new("out").join("a").join("b.bin")
        );
        assert_eq!(entry_path(root, "c.bin").unwrap(), root.join("c.bin"));
        assert_eq!(
            entry_path(root, "a//b.bin").unwrap(),
            Path::new("out").join("a").join("b.bin")
        );
    }

    #[test]
    fn test_entry_path_rejects_bad_names() {
        let root = Path::new("out");
        for name in ["", "dir/", "/", "../escape.bin", "a/../../b", "a/./b", "a\0b"] {
            assert!(
                matches!(entry_path(root, name), Err(Error::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_entry_path_rejects_non_utf8() {
        let result = entry_path(Path::new("out"), b"tex/\xE9col.bin");
        assert!(matches!(result, Err(Error::InvalidName(_))));
    }

    #[test]
    fn test_non_utf8_name_fails_only_its_export() {
        let bytes = TestArchive::new()
            .file(b"tex/\xE9col.bin", [1u8; 4])
            .file("ok.bin", [2u8; 4])
            .build();
        let archive = SarcArchive::from_bytes(bytes).unwrap();
        let sink = MemorySink::default();
        let options = ExportOptions::new().error_policy(ErrorPolicy::Skip);

        let results: Vec<_> = archive
            .export_all_to(Some(Path::new("root")), &options, &sink)
            .unwrap()
            .collect();

        assert!(matches!(results[0], Err(Error::InvalidName(_))));
        assert_eq!(
            results[1].as_ref().unwrap(),
            &Path::new("root").join(DEFAULT_FOLDER).join("ok.bin")
        );
    }

    #[test]
    fn test_sink_decides_root() {
        let archive = archive();
        let sink = MemorySink::default();
        // An existing file on disk is still just a path to a non-filesystem sink.
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");

        let export = archive
            .export_all_to(Some(&root), &ExportOptions::new(), &sink)
            .unwrap();
        assert_eq!(export.dir(), root.join(DEFAULT_FOLDER));

        assert_eq!(FsSink.resolve_root(&root), Path::new(env!("CARGO_MANIFEST_DIR")));
    }

    #[test]
    fn test_export_entry_to_sink() {
        let archive = archive();
        let sink = MemorySink::default();
        let root = Path::new("dump");

        let entry = archive.entries().unwrap()[0];
        let path = archive.export_entry_to(&entry, root, &sink).unwrap();

        assert_eq!(path, root.join("a").join("b.bin"));
        assert_eq!(sink.dirs.borrow().as_slice(), &[root.join("a")]);
        assert_eq!(sink.files.borrow()[&path], vec![0x11u8; 16]);
    }

    #[test]
    fn test_export_all_to_sink() {
        let archive = archive();
        let sink = MemorySink::default();
        let options = ExportOptions::new().folder("bundle");

        let paths: Vec<_> = archive
            .export_all_to(Some(Path::new("root")), &options, &sink)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        let dir = Path::new("root").join("bundle");
        assert_eq!(paths, vec![dir.join("a").join("b.bin"), dir.join("c.bin")]);
        assert_eq!(sink.dirs.borrow()[0], dir);
        assert_eq!(sink.files.borrow()[&paths[0]].len(), 16);
        assert_eq!(sink.files.borrow()[&paths[1]].len(), 4);
    }

    #[test]
    fn test_export_all_is_lazy() {
        let archive = archive();
        let sink = MemorySink::default();

        let mut export = archive
            .export_all_to(Some(Path::new("root")), &ExportOptions::new(), &sink)
            .unwrap();
        assert_eq!(export.dir(), Path::new("root").join(DEFAULT_FOLDER));
        assert!(sink.files.borrow().is_empty());

        export.next().unwrap().unwrap();
        assert_eq!(sink.files.borrow().len(), 1);
    }

    #[test]
    fn test_abort_policy_stops_after_error() {
        let bytes = TestArchive::new()
            .file("bad/../name", [1u8; 4])
            .file("good.bin", [2u8; 4])
            .build();
        let archive = SarcArchive::from_bytes(bytes).unwrap();
        let sink = MemorySink::default();

        let results: Vec<_> = archive
            .export_all_to(Some(Path::new("root")), &ExportOptions::new(), &sink)
            .unwrap()
            .collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::InvalidName(_))));
        assert!(sink.files.borrow().is_empty());
    }

    #[test]
    fn test_skip_policy_continues() {
        let bytes = TestArchive::new()
            .file("bad/../name", [1u8; 4])
            .file("good.bin", [2u8; 4])
            .build();
        let archive = SarcArchive::from_bytes(bytes).unwrap();
        let sink = MemorySink::default();
        let options = ExportOptions::new().error_policy(ErrorPolicy::Skip);

        let results: Vec<_> = archive
            .export_all_to(Some(Path::new("root")), &options, &sink)
            .unwrap()
            .collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
        assert_eq!(sink.files.borrow().len(), 1);
    }

    #[test]
    fn test_export_all_without_location_needs_root() {
        let archive = archive();
        let result = archive.export_all_to(None, &ExportOptions::new(), MemorySink::default());
        assert!(matches!(result, Err(Error::InvalidName(_))));
    }

    #[test]
    fn test_folder_must_be_single_component() {
        let archive = archive();
        let options = ExportOptions::new().folder("../up");
        let result =
            archive.export_all_to(Some(Path::new("root")), &options, MemorySink::default());
        assert!(matches!(result, Err(Error::InvalidName(_))));
    }
}
