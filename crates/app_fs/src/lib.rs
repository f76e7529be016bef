//! Honeycomb Archive File System Layer
//!
//! Presents compressed containers as navigable trees:
//! - Virtual paths: forward-slash addressing inside an archive
//! - Entry index: per-archive directory tree with synthesized parents
//! - Format backends: ZIP, 7z, TAR(.gz) and RAR behind one handler
//! - Registry: extension / magic-byte probing and split volume detection
//! - Encoding detection for legacy member names

mod encoding;
mod natural;
mod sanitize;
pub mod archive;
pub mod virtual_path;

pub use archive::{
    ArchiveEntry, ArchiveFormat, ArchiveHandler, ArchiveRegistry, EntryIndex, ExtractError,
    ExtractReport, OpenError, OpenOptions, Probe, ReadError,
};
pub use encoding::{decode_bytes, detect_encoding, system_encoding_hint, EncodingHint};
pub use natural::natural_cmp;
pub use sanitize::{is_valid_filename, sanitize_filename, SanitizeMode};
