//! Per-archive directory tree built once at open time

use super::{ArchiveEntry, ReadError};
use crate::natural::natural_cmp;
use crate::virtual_path;
use std::collections::BTreeMap;

/// Index of every member of one archive, keyed by normalized virtual path
///
/// Many archivers only store file members; parent directories are synthesized
/// so that every level of the tree can be listed.
#[derive(Debug, Default, Clone)]
pub struct EntryIndex {
    entries: BTreeMap<String, ArchiveEntry>,
}

impl EntryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one stored member; returns its normalized path
    ///
    /// Members whose name normalizes to the root are ignored.
    pub fn insert(
        &mut self,
        raw_name: &str,
        is_dir: bool,
        size: u64,
        compressed_size: Option<u64>,
        modified: Option<i64>,
    ) -> Option<String> {
        let path = virtual_path::normalize(raw_name);
        if path.is_empty() {
            return None;
        }

        self.add_parents(&path);

        match self.entries.get(&path) {
            // Only a directory record may replace an existing entry, and only
            // another directory. Everything else keeps the first one.
            Some(existing) if !existing.is_dir || !is_dir => {
                tracing::warn!(path = %path, "Duplicate member name, keeping first");
            }
            _ => {
                self.entries.insert(
                    path.clone(),
                    ArchiveEntry {
                        name: virtual_path::file_name(&path).to_string(),
                        path: path.clone(),
                        is_dir,
                        size: if is_dir { 0 } else { size },
                        compressed_size,
                        modified,
                    },
                );
            }
        }

        Some(path)
    }

    fn add_parents(&mut self, path: &str) {
        let mut parent = virtual_path::parent(path);
        while !parent.is_empty() && !self.entries.contains_key(&parent) {
            self.entries.insert(parent.clone(), ArchiveEntry::directory(&parent));
            parent = virtual_path::parent(&parent);
        }
    }

    /// Look up a member by virtual path
    pub fn get(&self, path: &str) -> Option<&ArchiveEntry> {
        self.entries.get(&virtual_path::normalize(path))
    }

    /// Immediate children of a virtual directory
    ///
    /// Directories come first, then natural case-insensitive name order.
    pub fn children(&self, dir: &str) -> Result<Vec<ArchiveEntry>, ReadError> {
        let dir = virtual_path::normalize(dir);

        if !dir.is_empty() {
            match self.entries.get(&dir) {
                None => return Err(ReadError::NotFound(dir)),
                Some(entry) if !entry.is_dir => return Err(ReadError::NotADirectory(dir)),
                Some(_) => {}
            }
        }

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut children: Vec<ArchiveEntry> = self
            .entries
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .map(|(_, entry)| entry.clone())
            .collect();

        sort_entries(&mut children);
        Ok(children)
    }

    /// Every file member (directories excluded), in path order
    pub fn files(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.values().filter(|e| !e.is_dir)
    }

    /// Every member including synthesized directories, in path order
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sort a listing: directories first, then natural name order
pub fn sort_entries(entries: &mut [ArchiveEntry]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| natural_cmp(&a.name, &b.name)));
}

/// Convert an MS-DOS packed date/time (ZIP, RAR) to Unix seconds
pub(crate) fn dos_to_unix(date: u16, time: u16) -> Option<i64> {
    let year = i32::from((date >> 9) & 0x7F) + 1980;
    let month = u32::from((date >> 5) & 0x0F);
    let day = u32::from(date & 0x1F);
    let hour = u32::from((time >> 11) & 0x1F);
    let minute = u32::from((time >> 5) & 0x3F);
    let second = u32::from(time & 0x1F) * 2;

    civil_to_unix(year, month, day, hour, minute, second)
}

pub(crate) fn civil_to_unix(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<i64> {
    chrono::NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)
        .map(|dt| dt.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntryIndex {
        let mut index = EntryIndex::new();
        index.insert("a.txt", false, 5, Some(5), None);
        index.insert("dir/b.txt", false, 3, Some(3), None);
        index.insert("dir/sub/page10.png", false, 1, None, None);
        index.insert("dir/sub/page2.png", false, 1, None, None);
        index.insert("Zeta/", true, 0, None, None);
        index
    }

    fn names(entries: &[ArchiveEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_root_listing_synthesizes_directories() {
        let index = sample();
        let root = index.children("").unwrap();
        assert_eq!(names(&root), vec!["dir", "Zeta", "a.txt"]);
        assert!(root[0].is_dir);
        assert!(root[1].is_dir);
        assert!(!root[2].is_dir);
    }

    #[test]
    fn test_immediate_children_only() {
        let index = sample();
        let dir = index.children("dir").unwrap();
        assert_eq!(names(&dir), vec!["sub", "b.txt"]);
        assert_eq!(dir[1].path, "dir/b.txt");

        let sub = index.children("/dir/sub/").unwrap();
        assert_eq!(names(&sub), vec!["page2.png", "page10.png"]);
    }

    #[test]
    fn test_listing_errors() {
        let index = sample();
        assert!(matches!(index.children("missing"), Err(ReadError::NotFound(_))));
        assert!(matches!(index.children("a.txt"), Err(ReadError::NotADirectory(_))));
        assert!(index.children("Zeta").unwrap().is_empty());
    }

    #[test]
    fn test_explicit_directory_replaces_synthesized() {
        let mut index = EntryIndex::new();
        index.insert("dir/b.txt", false, 3, None, None);
        index.insert("dir/", true, 0, None, Some(42));
        assert_eq!(index.get("dir").unwrap().modified, Some(42));
        assert_eq!(index.files().count(), 1);
    }

    #[test]
    fn test_file_record_does_not_shadow_directory() {
        let mut index = EntryIndex::new();
        index.insert("dir/b.txt", false, 3, None, None);
        index.insert("dir", false, 7, None, None);

        let dir = index.get("dir").unwrap();
        assert!(dir.is_dir);
        assert_eq!(dir.size, 0);
        assert_eq!(names(&index.children("dir").unwrap()), vec!["b.txt"]);

        index.insert("a.txt", false, 1, None, None);
        index.insert("a.txt/", true, 0, None, None);
        assert!(!index.get("a.txt").unwrap().is_dir);
    }

    #[test]
    fn test_dos_time() {
        // 2020-01-02 03:04:06
        let date = ((2020 - 1980) << 9) | (1 << 5) | 2;
        let time = (3 << 11) | (4 << 5) | 3;
        assert_eq!(dos_to_unix(date, time), Some(1_577_934_246));
        assert_eq!(dos_to_unix(0, 0), None);
    }
}
