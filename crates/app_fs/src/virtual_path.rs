//! Forward-slash paths addressing locations inside an archive
//!
//! The archive root is the empty string. Paths never carry a leading or
//! trailing slash once normalized, and "up" navigation is plain string
//! manipulation that never touches the host filesystem.

use crate::sanitize::{is_valid_filename, sanitize_filename, SanitizeMode};
use std::path::PathBuf;

/// Normalize a raw member name or user-supplied virtual path
///
/// Backslashes are treated as separators, empty and `.` segments are dropped.
/// `..` segments are kept verbatim; they are rejected when mapped to the host.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for segment in path.split(['/', '\\']) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// Is this the archive root?
pub fn is_root(path: &str) -> bool {
    normalize(path).is_empty()
}

/// Parent of a virtual path; the parent of a top-level member is the root
pub fn parent(path: &str) -> String {
    let path = normalize(path);
    match path.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

/// Leaf name of a virtual path
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

/// Join a child name onto a virtual directory
pub fn join(dir: &str, name: &str) -> String {
    normalize(&format!("{}/{}", dir, name))
}

/// Map a virtual path to a host path relative to an extraction root
///
/// Returns `None` for paths that would escape the root: `..` segments, drive
/// prefixes, or an empty path. Components the host cannot represent are
/// sanitized.
pub fn to_relative_fs_path(path: &str) -> Option<PathBuf> {
    let normalized = normalize(path);
    if normalized.is_empty() {
        return None;
    }

    let mut out = PathBuf::new();
    for (i, segment) in normalized.split('/').enumerate() {
        if segment == ".." {
            return None;
        }
        // "C:" as first component would make the joined path absolute on Windows
        if i == 0 && segment.len() == 2 && segment.ends_with(':') {
            return None;
        }
        if is_valid_filename(segment) {
            out.push(segment);
        } else {
            out.push(sanitize_filename(segment, SanitizeMode::FullWidth));
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize("dir/"), "dir");
        assert_eq!(normalize("./dir//sub/./a.txt"), "dir/sub/a.txt");
        assert_eq!(normalize("dir\\sub\\a.txt"), "dir/sub/a.txt");
    }

    #[test]
    fn test_parent_navigation() {
        assert_eq!(parent("dir/sub/a.txt"), "dir/sub");
        assert_eq!(parent("dir/sub"), "dir");
        assert_eq!(parent("dir"), "");
        assert_eq!(parent(""), "");
        assert!(is_root(&parent("dir")));
    }

    #[test]
    fn test_file_name_and_join() {
        assert_eq!(file_name("dir/sub/a.txt"), "a.txt");
        assert_eq!(file_name("dir/sub/"), "sub");
        assert_eq!(file_name("a.txt"), "a.txt");
        assert_eq!(join("", "a.txt"), "a.txt");
        assert_eq!(join("dir", "b.txt"), "dir/b.txt");
    }

    #[test]
    fn test_relative_fs_path_rejects_escape() {
        assert_eq!(to_relative_fs_path("dir/b.txt"), Some(Path::new("dir").join("b.txt")));
        assert_eq!(to_relative_fs_path("../etc/passwd"), None);
        assert_eq!(to_relative_fs_path("dir/../../x"), None);
        assert_eq!(to_relative_fs_path("C:/windows"), None);
        assert_eq!(to_relative_fs_path(""), None);
        // Leading slash is stripped, not treated as absolute
        assert_eq!(to_relative_fs_path("/abs.txt"), Some(PathBuf::from("abs.txt")));
    }
}
