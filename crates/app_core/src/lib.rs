//! Honeycomb Core Domain Logic
//!
//! This crate contains:
//! - Prefetch cache (bounded LRU + background decode)
//! - Image decoding
//! - Preload policy and viewer session
//! - Archive browsing
//! - Configuration and application context
//! - Error types

pub mod archive_browser;
pub mod config;
pub mod context;
pub mod error;
pub mod image_cache;
pub mod image_loader;
pub mod preload;
pub mod version;
pub mod viewer;

pub use archive_browser::ArchiveBrowser;
pub use config::{AppConfig, ArchiveConfig, LoggingConfig, ViewerConfig};
pub use context::AppContext;
pub use error::AppError;
pub use image_cache::{CacheStats, Loaded, PrefetchCache, DEFAULT_MAX_SIZE};
pub use image_loader::{
    decode_bytes, is_supported_image, ImageDecoder, LoadedImage, RasterDecoder, ThumbnailGenerator,
};
pub use preload::preload_targets;
pub use version::{compare_versions, is_newer, parse_version, VersionError};
pub use viewer::ViewerSession;
