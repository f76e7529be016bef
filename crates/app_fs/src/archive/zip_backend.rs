//! ZIP backend (also CBZ)

use super::index::{civil_to_unix, EntryIndex};
use super::{ArchiveFormat, OpenError, OpenOptions, ReadError};
use crate::encoding;
use ::zip::result::ZipError;
use ::zip::ZipArchive;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub(super) struct ZipBackend {
    archive: ZipArchive<File>,
    index: EntryIndex,
    /// Virtual path -> position in the central directory. Names decoded from a
    /// legacy code page cannot be looked up with `by_name`.
    members: HashMap<String, usize>,
}

impl ZipBackend {
    pub(super) fn open(path: &Path, options: &OpenOptions) -> Result<Self, OpenError> {
        let file = File::open(path)?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| open_error(e, ArchiveFormat::Zip))?;

        let mut index = EntryIndex::new();
        let mut members = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let file = archive
                .by_index_raw(i)
                .map_err(|e| open_error(e, ArchiveFormat::Zip))?;

            let (name, lossy) = encoding::decode_bytes(file.name_raw(), options.encoding_hint);
            if lossy {
                tracing::warn!(member = %name, "Member name decoded with replacement characters");
            }

            let modified = file.last_modified().and_then(|dt| {
                civil_to_unix(
                    i32::from(dt.year()),
                    u32::from(dt.month()),
                    u32::from(dt.day()),
                    u32::from(dt.hour()),
                    u32::from(dt.minute()),
                    u32::from(dt.second()),
                )
            });

            let is_dir = file.is_dir() || name.ends_with('/') || name.ends_with('\\');
            if let Some(path) = index.insert(
                &name,
                is_dir,
                file.size(),
                Some(file.compressed_size()),
                modified,
            ) {
                if !is_dir {
                    members.entry(path).or_insert(i);
                }
            }
        }

        Ok(Self {
            archive,
            index,
            members,
        })
    }

    pub(super) fn index(&self) -> &EntryIndex {
        &self.index
    }

    pub(super) fn copy_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64, ReadError> {
        let position = *self
            .members
            .get(path)
            .ok_or_else(|| ReadError::NotFound(path.to_string()))?;

        let mut member = self.archive.by_index(position).map_err(read_error)?;
        Ok(io::copy(&mut member, out)?)
    }
}

fn open_error(e: ZipError, format: ArchiveFormat) -> OpenError {
    match e {
        ZipError::Io(io) => OpenError::Io(io),
        other => OpenError::corrupt(format, other),
    }
}

fn read_error(e: ZipError) -> ReadError {
    match e {
        ZipError::Io(io) => ReadError::Io(io),
        other => ReadError::Corrupt(other.to_string()),
    }
}
