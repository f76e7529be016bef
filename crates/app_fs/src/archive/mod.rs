//! Virtual file system over compressed containers
//!
//! Every supported container is opened into an [`ArchiveHandler`] that owns the
//! underlying file handle until [`ArchiveHandler::close`] is called. The handler
//! keeps no navigation state: callers pass the virtual directory explicitly on
//! each listing.

mod error;
mod index;
mod registry;
mod sevenz_backend;
mod tar_backend;
mod zip_backend;
#[cfg(feature = "rar")]
mod rar_backend;

pub use error::{ExtractError, OpenError, ReadError};
pub use index::{sort_entries, EntryIndex};
pub use registry::{is_split_archive_part, ArchiveRegistry, Probe};

use crate::encoding::EncodingHint;
use crate::virtual_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One logical member of an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Leaf name for display
    pub name: String,

    /// Full virtual path, the addressing key for read/extract
    pub path: String,

    pub is_dir: bool,

    /// Uncompressed size in bytes
    pub size: u64,

    /// Stored size in bytes, when the format exposes it per member
    pub compressed_size: Option<u64>,

    /// Last modified timestamp (Unix epoch seconds)
    pub modified: Option<i64>,
}

impl ArchiveEntry {
    pub(crate) fn directory(path: &str) -> Self {
        Self {
            name: virtual_path::file_name(path).to_string(),
            path: path.to_string(),
            is_dir: true,
            size: 0,
            compressed_size: None,
            modified: None,
        }
    }
}

const ZIP_LOCAL_SIG: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_SIG: &[u8] = b"PK\x05\x06";
const SEVENZ_SIG: &[u8] = &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];
const USTAR_SIG: &[u8] = b"ustar";
const GZIP_SIG: &[u8] = &[0x1F, 0x8B];
// RAR4 and RAR5 share the first six bytes
const RAR_SIG: &[u8] = b"Rar!\x1A\x07";

/// Container formats with a compiled-in backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Zip,
    SevenZip,
    Tar,
    TarGz,
    Rar,
}

impl ArchiveFormat {
    /// Every format this build can open, in probing order
    pub fn available() -> Vec<ArchiveFormat> {
        let mut formats = vec![
            ArchiveFormat::Zip,
            ArchiveFormat::SevenZip,
            ArchiveFormat::TarGz,
            ArchiveFormat::Tar,
        ];
        if cfg!(feature = "rar") {
            formats.push(ArchiveFormat::Rar);
        }
        formats
    }

    /// Lowercase file name suffixes, without the leading dot
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ArchiveFormat::Zip => &["zip", "cbz"],
            ArchiveFormat::SevenZip => &["7z", "cb7"],
            ArchiveFormat::Tar => &["tar"],
            ArchiveFormat::TarGz => &["tar.gz", "tgz"],
            ArchiveFormat::Rar => &["rar", "cbr"],
        }
    }

    /// Signatures as (offset, bytes)
    pub(crate) fn signatures(self) -> &'static [(usize, &'static [u8])] {
        match self {
            ArchiveFormat::Zip => &[(0, ZIP_LOCAL_SIG), (0, ZIP_EMPTY_SIG)],
            ArchiveFormat::SevenZip => &[(0, SEVENZ_SIG)],
            ArchiveFormat::Tar => &[(257, USTAR_SIG)],
            ArchiveFormat::TarGz => &[(0, GZIP_SIG)],
            ArchiveFormat::Rar => &[(0, RAR_SIG)],
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "ZIP",
            ArchiveFormat::SevenZip => "7Z",
            ArchiveFormat::Tar => "TAR",
            ArchiveFormat::TarGz => "TAR.GZ",
            ArchiveFormat::Rar => "RAR",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Options applied when opening any archive
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Preferred legacy encoding for non-UTF-8 member names
    pub encoding_hint: EncodingHint,
}

/// Concrete format backend
enum Backend {
    Zip(zip_backend::ZipBackend),
    SevenZip(sevenz_backend::SevenZipBackend),
    Tar(tar_backend::TarBackend),
    #[cfg(feature = "rar")]
    Rar(rar_backend::RarBackend),
}

impl Backend {
    fn open(format: ArchiveFormat, path: &Path, options: &OpenOptions) -> Result<Self, OpenError> {
        match format {
            ArchiveFormat::Zip => zip_backend::ZipBackend::open(path, options).map(Backend::Zip),
            ArchiveFormat::SevenZip => sevenz_backend::SevenZipBackend::open(path).map(Backend::SevenZip),
            ArchiveFormat::Tar => tar_backend::TarBackend::open(path, false).map(Backend::Tar),
            ArchiveFormat::TarGz => tar_backend::TarBackend::open(path, true).map(Backend::Tar),
            #[cfg(feature = "rar")]
            ArchiveFormat::Rar => rar_backend::RarBackend::open(path).map(Backend::Rar),
            #[cfg(not(feature = "rar"))]
            ArchiveFormat::Rar => Err(OpenError::Unsupported(path.to_path_buf())),
        }
    }

    fn index(&self) -> &EntryIndex {
        match self {
            Backend::Zip(b) => b.index(),
            Backend::SevenZip(b) => b.index(),
            Backend::Tar(b) => b.index(),
            #[cfg(feature = "rar")]
            Backend::Rar(b) => b.index(),
        }
    }

    fn copy_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64, ReadError> {
        match self {
            Backend::Zip(b) => b.copy_member(path, out),
            Backend::SevenZip(b) => b.copy_member(path, out),
            Backend::Tar(b) => b.copy_member(path, out),
            #[cfg(feature = "rar")]
            Backend::Rar(b) => b.copy_member(path, out),
        }
    }
}

/// An open archive session
///
/// Not safe for concurrent use; callers serialize access to one handler.
pub struct ArchiveHandler {
    archive_path: PathBuf,
    format: ArchiveFormat,
    backend: Option<Backend>,
}

impl ArchiveHandler {
    /// Open with a specific backend, skipping probing
    pub fn open_as(
        path: impl AsRef<Path>,
        format: ArchiveFormat,
        options: &OpenOptions,
    ) -> Result<Self, OpenError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OpenError::NotFound(path.to_path_buf()));
        }

        let backend = Backend::open(format, path, options)?;
        tracing::debug!(
            archive = %path.display(),
            format = %format,
            entries = backend.index().len(),
            "Archive opened"
        );

        Ok(Self {
            archive_path: path.to_path_buf(),
            format,
            backend: Some(backend),
        })
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    fn backend(&self) -> Result<&Backend, ReadError> {
        self.backend.as_ref().ok_or(ReadError::Closed)
    }

    /// Full member index
    pub fn index(&self) -> Result<&EntryIndex, ReadError> {
        self.backend().map(Backend::index)
    }

    /// Immediate children of `virtual_dir`; `""` is the archive root
    pub fn list_entries(&self, virtual_dir: &str) -> Result<Vec<ArchiveEntry>, ReadError> {
        self.index()?.children(virtual_dir)
    }

    /// Look up a single member
    pub fn entry(&self, internal_path: &str) -> Result<ArchiveEntry, ReadError> {
        self.index()?
            .get(internal_path)
            .cloned()
            .ok_or_else(|| ReadError::NotFound(virtual_path::normalize(internal_path)))
    }

    fn file_entry(&self, internal_path: &str) -> Result<ArchiveEntry, ReadError> {
        let entry = self.entry(internal_path)?;
        if entry.is_dir {
            return Err(ReadError::IsDirectory(entry.path));
        }
        Ok(entry)
    }

    /// Decompress one member fully into memory
    pub fn read_file(&mut self, internal_path: &str) -> Result<Vec<u8>, ReadError> {
        let entry = self.file_entry(internal_path)?;
        let mut buffer = Vec::with_capacity(entry.size.min(64 * 1024 * 1024) as usize);
        self.backend
            .as_mut()
            .ok_or(ReadError::Closed)?
            .copy_member(&entry.path, &mut buffer)?;
        Ok(buffer)
    }

    /// Decompress one member to `destination/<internal path>`
    ///
    /// Intermediate directories are created. A directory member creates the
    /// directory itself. Returns the path written.
    pub fn extract(
        &mut self,
        internal_path: &str,
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf, ExtractError> {
        let entry = self.entry(internal_path)?;
        let relative = virtual_path::to_relative_fs_path(&entry.path)
            .ok_or_else(|| ExtractError::UnsafePath(entry.path.clone()))?;
        let target = destination.as_ref().join(relative);

        if entry.is_dir {
            fs::create_dir_all(&target).map_err(|source| ExtractError::Io {
                path: target.clone(),
                source,
            })?;
            return Ok(target);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ExtractError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = fs::File::create(&target).map_err(|source| ExtractError::Io {
            path: target.clone(),
            source,
        })?;
        let mut writer = TrackedWriter::new(io::BufWriter::new(file));

        let copied = self
            .backend
            .as_mut()
            .ok_or(ReadError::Closed)?
            .copy_member(&entry.path, &mut writer);

        // Write-side failures (permissions, disk full) are reported against the
        // target; everything else is a read failure of the member.
        let flushed = writer.flush();
        if let Some(source) = writer.take_error() {
            return Err(ExtractError::Io { path: target, source });
        }
        copied?;
        flushed.map_err(|source| ExtractError::Io {
            path: target.clone(),
            source,
        })?;

        tracing::debug!(member = %entry.path, target = %target.display(), "Extracted");
        Ok(target)
    }

    /// Extract every file member, continuing past per-entry failures
    pub fn extract_all(&mut self, destination: impl AsRef<Path>) -> Result<ExtractReport, ReadError> {
        let destination = destination.as_ref();
        let paths: Vec<String> = self.index()?.files().map(|e| e.path.clone()).collect();

        let mut report = ExtractReport::default();
        for path in paths {
            match self.extract(&path, destination) {
                Ok(target) => report.extracted.push(target),
                Err(e) => {
                    tracing::warn!(member = %path, "Extraction failed: {}", e);
                    report.failed.push((path, e));
                }
            }
        }

        tracing::info!(
            archive = %self.archive_path.display(),
            extracted = report.extracted.len(),
            failed = report.failed.len(),
            "Extract all finished"
        );
        Ok(report)
    }

    /// Release the container handle; safe to call repeatedly
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            tracing::debug!(archive = %self.archive_path.display(), "Archive closed");
        }
    }
}

impl Drop for ArchiveHandler {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ArchiveHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveHandler")
            .field("archive_path", &self.archive_path)
            .field("format", &self.format)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Outcome of a bulk extraction
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub extracted: Vec<PathBuf>,
    pub failed: Vec<(String, ExtractError)>,
}

impl ExtractReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writer that remembers the first error it produced
struct TrackedWriter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> TrackedWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn record<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if let Err(e) = &result {
            if self.error.is_none() {
                self.error = Some(io::Error::new(e.kind(), e.to_string()));
            }
        }
        result
    }
}

impl<W: Write> Write for TrackedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buf);
        self.record(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.inner.flush();
        self.record(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use sevenz_rust::{SeqReader, SevenZArchiveEntry, SevenZWriter, SourceReader};

    const A_TXT: &[u8] = b"alpha contents\n";
    const B_TXT: &[u8] = b"bravo \x00\x01\x02 binary-ish\n";

    fn build_zip(dir: &Path, name: &str, explicit_dirs: bool) -> PathBuf {
        let path = dir.join(name);
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();

        if explicit_dirs {
            writer.add_directory("dir/", options).unwrap();
        }
        writer.start_file("a.txt", options).unwrap();
        writer.write_all(A_TXT).unwrap();
        writer.start_file("dir/b.txt", options).unwrap();
        writer.write_all(B_TXT).unwrap();
        writer.finish().unwrap();
        path
    }

    fn append(builder: &mut tar::Builder<impl Write>, name: &str, data: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(1_600_000_000);
        builder.append_data(&mut header, name, data).unwrap();
    }

    fn build_tar(dir: &Path, name: &str, gzip: bool) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        if gzip {
            let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
            append(&mut builder, "a.txt", A_TXT);
            append(&mut builder, "dir/b.txt", B_TXT);
            builder.into_inner().unwrap().finish().unwrap();
        } else {
            let mut builder = tar::Builder::new(file);
            append(&mut builder, "a.txt", A_TXT);
            append(&mut builder, "dir/b.txt", B_TXT);
            builder.finish().unwrap();
        }
        path
    }

    /// Loose copies of the fixture files, laid out as they appear in the archives
    fn fixture_tree(dir: &Path) -> PathBuf {
        let root = dir.join("tree");
        std::fs::create_dir_all(root.join("dir")).unwrap();
        std::fs::write(root.join("a.txt"), A_TXT).unwrap();
        std::fs::write(root.join("dir").join("b.txt"), B_TXT).unwrap();
        root
    }

    /// One block per member
    fn build_7z(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        sevenz_rust::compress_to_path(fixture_tree(dir), &path).unwrap();
        path
    }

    /// Every member packed into a single solid block
    fn build_solid_7z(dir: &Path, name: &str) -> PathBuf {
        let root = fixture_tree(dir);
        let members = [("a.txt", root.join("a.txt")), ("dir/b.txt", root.join("dir").join("b.txt"))];

        let path = dir.join(name);
        let mut writer = SevenZWriter::create(&path).unwrap();
        let entries: Vec<SevenZArchiveEntry> = members
            .iter()
            .map(|(name, src)| SevenZArchiveEntry::from_path(src, name.to_string()))
            .collect();
        let sources: Vec<SourceReader<File>> = members
            .iter()
            .map(|(_, src)| SourceReader::new(File::open(src).unwrap()))
            .collect();
        writer.push_archive_entries(entries, SeqReader::new(sources)).unwrap();
        writer.finish().unwrap();
        path
    }

    fn names(entries: &[ArchiveEntry]) -> Vec<(&str, bool)> {
        entries.iter().map(|e| (e.name.as_str(), e.is_dir)).collect()
    }

    fn assert_tree(handler: &mut ArchiveHandler) {
        let root = handler.list_entries("").unwrap();
        assert_eq!(names(&root), vec![("dir", true), ("a.txt", false)]);
        assert_eq!(root[1].size, A_TXT.len() as u64);

        let dir = handler.list_entries("dir").unwrap();
        assert_eq!(names(&dir), vec![("b.txt", false)]);
        assert_eq!(dir[0].path, "dir/b.txt");

        assert_eq!(handler.read_file("dir/b.txt").unwrap(), B_TXT);
        assert_eq!(handler.read_file("a.txt").unwrap(), A_TXT);
    }

    #[test]
    fn test_zip_listing_and_read() {
        let tmp = TempDir::new().unwrap();
        let path = build_zip(tmp.path(), "sample.zip", true);

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        assert_eq!(handler.format(), ArchiveFormat::Zip);
        assert_tree(&mut handler);

        let b = handler.entry("dir/b.txt").unwrap();
        assert!(b.compressed_size.is_some());
        assert!(b.modified.is_some());
    }

    #[test]
    fn test_zip_without_directory_records() {
        let tmp = TempDir::new().unwrap();
        let path = build_zip(tmp.path(), "flat.cbz", false);

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        assert_tree(&mut handler);
    }

    #[test]
    fn test_listing_is_stable() {
        let tmp = TempDir::new().unwrap();
        let path = build_zip(tmp.path(), "sample.zip", true);
        let handler = ArchiveRegistry::default().open(&path).unwrap();

        let first = handler.list_entries("").unwrap();
        let second = handler.list_entries("").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_errors() {
        let tmp = TempDir::new().unwrap();
        let path = build_zip(tmp.path(), "sample.zip", true);
        let mut handler = ArchiveRegistry::default().open(&path).unwrap();

        assert!(matches!(handler.read_file("dir"), Err(ReadError::IsDirectory(_))));
        assert!(matches!(handler.read_file("missing.txt"), Err(ReadError::NotFound(_))));
        assert!(matches!(handler.list_entries("a.txt"), Err(ReadError::NotADirectory(_))));
        assert!(matches!(handler.list_entries("nowhere"), Err(ReadError::NotFound(_))));
    }

    #[test]
    fn test_tar_and_tar_gz() {
        let tmp = TempDir::new().unwrap();
        let registry = ArchiveRegistry::default();

        let mut tar = registry.open(build_tar(tmp.path(), "plain.tar", false)).unwrap();
        assert_eq!(tar.format(), ArchiveFormat::Tar);
        assert_tree(&mut tar);
        assert_eq!(tar.entry("a.txt").unwrap().modified, Some(1_600_000_000));

        let mut tgz = registry.open(build_tar(tmp.path(), "packed.tgz", true)).unwrap();
        assert_eq!(tgz.format(), ArchiveFormat::TarGz);
        assert_tree(&mut tgz);
        // Repeated reads rescan from the start
        assert_eq!(tgz.read_file("dir/b.txt").unwrap(), B_TXT);
    }

    #[test]
    fn test_7z_listing_and_read() {
        let tmp = TempDir::new().unwrap();
        let path = build_7z(tmp.path(), "sample.7z");

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        assert_eq!(handler.format(), ArchiveFormat::SevenZip);
        assert_tree(&mut handler);
        assert!(handler.entry("dir/b.txt").unwrap().compressed_size.is_some());
    }

    #[test]
    fn test_solid_7z_reads_every_member() {
        let tmp = TempDir::new().unwrap();
        let path = build_solid_7z(tmp.path(), "solid.cb7");

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        assert_eq!(handler.format(), ArchiveFormat::SevenZip);
        // The second member sits behind the first in the shared stream
        assert_eq!(handler.read_file("dir/b.txt").unwrap(), B_TXT);
        assert_tree(&mut handler);

        // One packed size covers the whole block, so none is reported per member
        assert_eq!(handler.entry("a.txt").unwrap().compressed_size, None);
        assert_eq!(handler.entry("dir/b.txt").unwrap().compressed_size, None);
    }

    #[test]
    fn test_solid_7z_extract_all() {
        let tmp = TempDir::new().unwrap();
        let path = build_solid_7z(tmp.path(), "solid.7z");
        let dest = tmp.path().join("out");

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        let report = handler.extract_all(&dest).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.extracted.len(), 2);
        assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), A_TXT);
        assert_eq!(std::fs::read(dest.join("dir").join("b.txt")).unwrap(), B_TXT);

        let single = tmp.path().join("single");
        let written = handler.extract("dir/b.txt", &single).unwrap();
        assert_eq!(std::fs::read(written).unwrap(), B_TXT);
    }

    #[test]
    fn test_extract_all_reproduces_tree() {
        let tmp = TempDir::new().unwrap();
        let path = build_zip(tmp.path(), "sample.zip", true);
        let dest = tmp.path().join("out");
        std::fs::create_dir(&dest).unwrap();

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        let report = handler.extract_all(&dest).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.extracted.len(), 2);
        assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), A_TXT);
        assert_eq!(std::fs::read(dest.join("dir").join("b.txt")).unwrap(), B_TXT);
    }

    #[test]
    fn test_extract_single_member_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = build_tar(tmp.path(), "plain.tar", false);
        let dest = tmp.path().join("deep").join("target");

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        let written = handler.extract("dir/b.txt", &dest).unwrap();

        assert_eq!(written, dest.join("dir").join("b.txt"));
        assert_eq!(std::fs::read(written).unwrap(), B_TXT);

        let dir = handler.extract("dir", &dest).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_extract_all_continues_after_failure() {
        let tmp = TempDir::new().unwrap();
        let path = build_zip(tmp.path(), "sample.zip", true);
        let dest = tmp.path().join("out");
        std::fs::create_dir(&dest).unwrap();
        // A regular file where the "dir" directory should go
        std::fs::write(dest.join("dir"), b"in the way").unwrap();

        let mut handler = ArchiveRegistry::default().open(&path).unwrap();
        let report = handler.extract_all(&dest).unwrap();

        assert_eq!(report.extracted, vec![dest.join("a.txt")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "dir/b.txt");
        assert!(matches!(report.failed[0].1, ExtractError::Io { .. }));
    }

    #[test]
    fn test_close_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = build_zip(tmp.path(), "sample.zip", true);
        let mut handler = ArchiveRegistry::default().open(&path).unwrap();

        handler.close();
        handler.close();
        assert!(handler.is_closed());
        assert!(matches!(handler.list_entries(""), Err(ReadError::Closed)));
        assert!(matches!(handler.read_file("a.txt"), Err(ReadError::Closed)));
        assert!(matches!(
            handler.extract("a.txt", tmp.path()),
            Err(ExtractError::Read(ReadError::Closed))
        ));

        // The backing file is free again
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_errors() {
        let tmp = TempDir::new().unwrap();
        let registry = ArchiveRegistry::default();

        assert!(matches!(
            registry.open(tmp.path().join("missing.zip")),
            Err(OpenError::NotFound(_))
        ));

        let garbage = tmp.path().join("broken.zip");
        std::fs::write(&garbage, b"definitely not a zip archive").unwrap();
        assert!(matches!(
            registry.open(&garbage),
            Err(OpenError::Corrupt { format: ArchiveFormat::Zip, .. })
        ));

        let text = tmp.path().join("notes.txt");
        std::fs::write(&text, b"plain text").unwrap();
        assert!(matches!(registry.open(&text), Err(OpenError::Unsupported(_))));
    }

    #[test]
    fn test_magic_sniff_without_extension() {
        let tmp = TempDir::new().unwrap();
        let zipped = build_zip(tmp.path(), "sample.zip", true);
        let renamed = tmp.path().join("download.bin");
        std::fs::rename(&zipped, &renamed).unwrap();

        let mut handler = ArchiveRegistry::default().open(&renamed).unwrap();
        assert_eq!(handler.format(), ArchiveFormat::Zip);
        assert_tree(&mut handler);
    }
}
