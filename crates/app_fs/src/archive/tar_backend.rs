//! TAR backend, optionally gzip-compressed

use super::index::EntryIndex;
use super::{ArchiveFormat, OpenError, ReadError};
use crate::virtual_path;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// TAR has no central directory, so every read rescans from the start of the
/// held file handle.
pub(super) struct TarBackend {
    file: File,
    gzip: bool,
    index: EntryIndex,
}

impl TarBackend {
    pub(super) fn open(path: &Path, gzip: bool) -> Result<Self, OpenError> {
        let format = if gzip {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Tar
        };

        let mut backend = Self {
            file: File::open(path)?,
            gzip,
            index: EntryIndex::new(),
        };
        backend.index = backend
            .build_index()
            .map_err(|e| OpenError::corrupt(format, e))?;

        Ok(backend)
    }

    fn reader(&self) -> io::Result<Box<dyn Read + '_>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        Ok(if self.gzip {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        })
    }

    fn build_index(&self) -> io::Result<EntryIndex> {
        let mut index = EntryIndex::new();
        let mut archive = tar::Archive::new(self.reader()?);

        for entry in archive.entries()? {
            let entry = entry?;
            let kind = entry.header().entry_type();
            if !kind.is_file() && !kind.is_dir() {
                tracing::debug!(kind = ?kind, "Skipping special tar member");
                continue;
            }

            let name = entry.path()?.to_string_lossy().into_owned();
            let modified = entry.header().mtime().ok().and_then(|t| i64::try_from(t).ok());
            index.insert(&name, kind.is_dir(), entry.size(), None, modified);
        }

        Ok(index)
    }

    pub(super) fn index(&self) -> &EntryIndex {
        &self.index
    }

    pub(super) fn copy_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64, ReadError> {
        let mut archive = tar::Archive::new(self.reader()?);

        for entry in archive.entries()? {
            let mut entry = entry.map_err(|e| ReadError::Corrupt(e.to_string()))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = entry.path()?.to_string_lossy().into_owned();
            if virtual_path::normalize(&name) == path {
                return Ok(io::copy(&mut entry, out)?);
            }
        }

        Err(ReadError::NotFound(path.to_string()))
    }
}
