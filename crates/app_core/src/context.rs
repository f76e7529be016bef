//! Explicitly constructed application context
//!
//! Replaces process-wide singletons: whoever needs settings, the archive
//! registry or a prefetch cache gets them from a context they were handed.

use crate::archive_browser::ArchiveBrowser;
use crate::config::AppConfig;
use crate::image_cache::PrefetchCache;
use crate::image_loader::RasterDecoder;
use crate::viewer::ViewerSession;
use crate::AppError;
use app_fs::{system_encoding_hint, ArchiveRegistry, EncodingHint, OpenOptions};
use std::path::Path;

pub struct AppContext {
    config: AppConfig,
    registry: ArchiveRegistry,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let encoding_hint = match config.archive.filename_encoding {
            EncodingHint::Auto => system_encoding_hint(),
            hint => hint,
        };
        let registry = ArchiveRegistry::new(
            config.archive.formats.clone(),
            OpenOptions { encoding_hint },
        );

        tracing::debug!(
            formats = ?registry.formats(),
            encoding = ?encoding_hint,
            "Application context ready"
        );

        Self { config, registry }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &ArchiveRegistry {
        &self.registry
    }

    /// Decoder honouring the configured size bound
    pub fn decoder(&self) -> RasterDecoder {
        RasterDecoder::with_max_dimension(self.config.viewer.max_decode_dimension)
    }

    /// Prefetch cache sized for the configured neighbour window
    pub fn prefetch_cache(&self) -> Result<PrefetchCache<RasterDecoder>, AppError> {
        PrefetchCache::new(
            self.decoder(),
            self.config.viewer.cache_capacity(),
            self.config.viewer.prefetch_workers,
        )
    }

    pub fn open_archive(&self, path: impl AsRef<Path>) -> Result<ArchiveBrowser, AppError> {
        ArchiveBrowser::open(&self.registry, path)
    }

    pub fn viewer_for_directory(&self, dir: &Path) -> Result<ViewerSession<RasterDecoder>, AppError> {
        ViewerSession::from_directory(dir, self.prefetch_cache()?, self.config.viewer.preload_count)
    }
}
