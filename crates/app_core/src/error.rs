//! Application error types

use app_fs::{ExtractError, OpenError, ReadError};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Invalid version string: {0}")]
    Version(String),

    // ===== Fatal Errors (application termination) =====
    #[error("System resource exhaustion: {0}")]
    SystemResource(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Io(_)
                | AppError::FileNotFound(_)
                | AppError::UnsupportedFormat(_)
                | AppError::ImageDecode(_)
                | AppError::Archive(_)
                | AppError::Version(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FileNotFound(path) => format!("File not found: {}", path),
            AppError::UnsupportedFormat(what) => format!("Unsupported format: {}", what),
            AppError::ImageDecode(msg) => format!("Cannot load image: {}", msg),
            AppError::Archive(msg) => format!("Cannot open archive: {}", msg),
            _ => self.to_string(),
        }
    }
}

impl From<OpenError> for AppError {
    fn from(e: OpenError) -> Self {
        match e {
            OpenError::NotFound(p) => AppError::FileNotFound(p.display().to_string()),
            OpenError::Unsupported(p) => AppError::UnsupportedFormat(p.display().to_string()),
            OpenError::Io(io) => AppError::Io(io),
            corrupt @ OpenError::Corrupt { .. } => AppError::Archive(corrupt.to_string()),
        }
    }
}

impl From<ReadError> for AppError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::NotFound(p) => AppError::FileNotFound(p),
            ReadError::Io(io) => AppError::Io(io),
            other => AppError::Archive(other.to_string()),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Read(read) => read.into(),
            ExtractError::Io { source, .. } => AppError::Io(source),
            unsafe_path @ ExtractError::UnsafePath(_) => AppError::Archive(unsafe_path.to_string()),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => AppError::Io(io),
            image::ImageError::Unsupported(u) => AppError::UnsupportedFormat(u.to_string()),
            other => AppError::ImageDecode(other.to_string()),
        }
    }
}
