use super::ArchiveFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to open an archive session
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported archive format: {0}")]
    Unsupported(PathBuf),

    #[error("{format} archive corrupted: {reason}")]
    Corrupt { format: ArchiveFormat, reason: String },
}

impl OpenError {
    pub(crate) fn corrupt(format: ArchiveFormat, reason: impl ToString) -> Self {
        OpenError::Corrupt {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Failure to list or read one member
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Archive is closed")]
    Closed,

    #[error("Entry not found in archive: {0}")]
    NotFound(String),

    #[error("Entry is a directory: {0}")]
    IsDirectory(String),

    #[error("Entry is not a directory: {0}")]
    NotADirectory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entry corrupted: {0}")]
    Corrupt(String),
}

/// Failure to extract one member to disk
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("Refusing to extract outside destination: {0}")]
    UnsafePath(String),

    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
