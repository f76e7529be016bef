//! 7z backend (also CB7)

use super::index::EntryIndex;
use super::{ArchiveFormat, OpenError, ReadError};
use sevenz_rust::{Password, SevenZReader};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub(super) struct SevenZipBackend {
    reader: SevenZReader<File>,
    index: EntryIndex,
    /// Virtual path -> name as stored in the archive header
    members: HashMap<String, String>,
}

impl SevenZipBackend {
    pub(super) fn open(path: &Path) -> Result<Self, OpenError> {
        let reader = SevenZReader::open(path, Password::empty())
            .map_err(|e| OpenError::corrupt(ArchiveFormat::SevenZip, e))?;

        let mut index = EntryIndex::new();
        let mut members = HashMap::new();

        let archive = reader.archive();
        for (i, entry) in archive.files.iter().enumerate() {
            let is_dir = entry.is_directory();
            // A solid block has one packed size for all of its members; only
            // report it when the member is alone in its block.
            let alone = archive
                .stream_map
                .file_folder_index
                .get(i)
                .copied()
                .flatten()
                .and_then(|folder| archive.folders.get(folder))
                .is_some_and(|folder| folder.num_unpack_sub_streams == 1);
            let compressed = (alone && entry.has_stream() && entry.compressed_size > 0)
                .then_some(entry.compressed_size);

            if let Some(path) = index.insert(entry.name(), is_dir, entry.size(), compressed, None) {
                if !is_dir {
                    members.entry(path).or_insert_with(|| entry.name().to_string());
                }
            }
        }

        Ok(Self {
            reader,
            index,
            members,
        })
    }

    pub(super) fn index(&self) -> &EntryIndex {
        &self.index
    }

    pub(super) fn copy_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64, ReadError> {
        let stored = self
            .members
            .get(path)
            .ok_or_else(|| ReadError::NotFound(path.to_string()))?
            .clone();

        let mut copied: Option<u64> = None;
        self.reader
            .for_each_entries(|entry, reader| {
                if entry.name() == stored {
                    copied = Some(io::copy(reader, &mut *out)?);
                    Ok(false)
                } else {
                    // Members of a solid block share one stream; the next
                    // member starts where this one ends.
                    io::copy(reader, &mut io::sink())?;
                    Ok(true)
                }
            })
            .map_err(|e| ReadError::Corrupt(e.to_string()))?;

        copied.ok_or_else(|| ReadError::NotFound(path.to_string()))
    }
}
