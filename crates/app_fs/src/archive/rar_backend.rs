//! RAR backend (also CBR and the first volume of split sets), via libunrar

use super::index::{dos_to_unix, EntryIndex};
use super::{ArchiveFormat, OpenError, ReadError};
use crate::virtual_path;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use unrar::Archive;

/// libunrar works on paths and reopens per operation. The session still holds
/// a handle on the first volume so the archive is pinned until `close`.
pub(super) struct RarBackend {
    path: PathBuf,
    _handle: File,
    index: EntryIndex,
}

impl RarBackend {
    pub(super) fn open(path: &Path) -> Result<Self, OpenError> {
        let handle = File::open(path)?;

        let listing = Archive::new(path)
            .open_for_listing()
            .map_err(|e| OpenError::corrupt(ArchiveFormat::Rar, e))?;

        let mut index = EntryIndex::new();
        for header in listing {
            let header = header.map_err(|e| OpenError::corrupt(ArchiveFormat::Rar, e))?;
            let name = header.filename.to_string_lossy().into_owned();
            let modified = dos_to_unix((header.file_time >> 16) as u16, (header.file_time & 0xFFFF) as u16);
            // Split members repeat their header in every volume
            if index.get(&name).is_some() && !header.is_directory() {
                continue;
            }
            index.insert(&name, header.is_directory(), header.unpacked_size, None, modified);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _handle: handle,
            index,
        })
    }

    pub(super) fn index(&self) -> &EntryIndex {
        &self.index
    }

    pub(super) fn copy_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64, ReadError> {
        let mut cursor = Archive::new(&self.path)
            .open_for_processing()
            .map_err(|e| ReadError::Corrupt(e.to_string()))?;

        while let Some(header) = cursor
            .read_header()
            .map_err(|e| ReadError::Corrupt(e.to_string()))?
        {
            let name = header.entry().filename.to_string_lossy().into_owned();
            if !header.entry().is_directory() && virtual_path::normalize(&name) == path {
                let (data, _rest) = header.read().map_err(|e| ReadError::Corrupt(e.to_string()))?;
                out.write_all(&data)?;
                return Ok(data.len() as u64);
            }
            cursor = header.skip().map_err(|e| ReadError::Corrupt(e.to_string()))?;
        }

        Err(ReadError::NotFound(path.to_string()))
    }
}
