//! Format registry: picks the backend for a file by magic bytes or extension

use super::{ArchiveFormat, ArchiveHandler, OpenError, OpenOptions};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header bytes read for magic sniffing (covers the ustar field at 257)
const SNIFF_LEN: usize = 512;

/// How strongly a format claims a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Content signature matched
    Magic,
    /// Only the file name suffix matched
    Extension,
    None,
}

impl ArchiveFormat {
    /// Does this format claim the file, given its name and leading bytes?
    pub fn probe(self, path: &Path, header: &[u8]) -> Probe {
        let magic = self.signatures().iter().any(|(offset, sig)| {
            header
                .get(*offset..*offset + sig.len())
                .is_some_and(|window| window == *sig)
        });
        if magic {
            return Probe::Magic;
        }

        let name = lowercase_name(path);
        if self
            .extensions()
            .iter()
            .any(|ext| name.strip_suffix(ext).is_some_and(|stem| stem.ends_with('.')))
        {
            Probe::Extension
        } else {
            Probe::None
        }
    }
}

/// The set of enabled format backends, in probing order
#[derive(Debug, Clone)]
pub struct ArchiveRegistry {
    formats: Vec<ArchiveFormat>,
    options: OpenOptions,
}

impl Default for ArchiveRegistry {
    fn default() -> Self {
        Self::new(ArchiveFormat::available(), OpenOptions::default())
    }
}

impl ArchiveRegistry {
    /// Build a registry; formats this build cannot open are dropped
    pub fn new(formats: Vec<ArchiveFormat>, options: OpenOptions) -> Self {
        let available = ArchiveFormat::available();
        let mut enabled: Vec<ArchiveFormat> = Vec::with_capacity(formats.len());
        for format in formats {
            if !available.contains(&format) {
                tracing::warn!(format = %format, "Archive format not compiled in, ignoring");
            } else if !enabled.contains(&format) {
                enabled.push(format);
            }
        }
        Self {
            formats: enabled,
            options,
        }
    }

    pub fn formats(&self) -> &[ArchiveFormat] {
        &self.formats
    }

    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    /// Pick the format for a file: first signature match, else first
    /// extension match
    pub fn detect(&self, path: &Path) -> std::io::Result<Option<ArchiveFormat>> {
        let mut header = Vec::with_capacity(SNIFF_LEN);
        File::open(path)?
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut header)?;
        Ok(self.detect_with_header(path, &header))
    }

    fn detect_with_header(&self, path: &Path, header: &[u8]) -> Option<ArchiveFormat> {
        let probes: Vec<(ArchiveFormat, Probe)> = self
            .formats
            .iter()
            .map(|f| (*f, f.probe(path, header)))
            .collect();

        probes
            .iter()
            .find(|(_, p)| *p == Probe::Magic)
            .or_else(|| probes.iter().find(|(_, p)| *p == Probe::Extension))
            .map(|(f, _)| *f)
    }

    /// Open an archive with the first backend that accepts it
    pub fn open(&self, path: impl AsRef<Path>) -> Result<ArchiveHandler, OpenError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OpenError::NotFound(path.to_path_buf()));
        }

        let format = self
            .detect(path)?
            .ok_or_else(|| OpenError::Unsupported(path.to_path_buf()))?;

        ArchiveHandler::open_as(path, format, &self.options)
    }

    /// Should this file be offered as a browsable archive?
    ///
    /// Name-based only; non-first volumes of split sets are excluded.
    pub fn is_archive(&self, path: &Path) -> bool {
        !is_split_archive_part(path)
            && self
                .formats
                .iter()
                .any(|f| f.probe(path, &[]) == Probe::Extension)
    }

    /// Suffixes of every enabled format
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.formats
            .iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect()
    }
}

/// Is this a non-first volume of a split RAR set (to be hidden in listings)?
///
/// Matches `name.partN.rar` with N > 1 and old-style `name.r00`, `name.r01`...
pub fn is_split_archive_part(path: &Path) -> bool {
    let name = lowercase_name(path);

    if let Some(stem) = name.strip_suffix(".rar") {
        if let Some((_, volume)) = stem.rsplit_once(".part") {
            if !volume.is_empty() && volume.bytes().all(|b| b.is_ascii_digit()) {
                return volume.parse::<u32>().map(|n| n > 1).unwrap_or(true);
            }
        }
        return false;
    }

    match name.rsplit_once('.') {
        Some((_, ext)) => {
            ext.len() >= 3
                && ext.starts_with('r')
                && ext[1..].bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn lowercase_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
