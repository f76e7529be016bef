//! Single-image viewing over an ordered list, with neighbour prefetch

use crate::image_cache::PrefetchCache;
use crate::image_loader::{is_supported_image, ImageDecoder};
use crate::preload::preload_targets;
use crate::AppError;
use app_fs::natural_cmp;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Owns the prefetch cache for one browsing session. All methods run on the
/// owning thread; background completions are folded in by [`pump`].
///
/// [`pump`]: ViewerSession::pump
pub struct ViewerSession<D: ImageDecoder> {
    cache: PrefetchCache<D>,
    images: Vec<PathBuf>,
    current: Option<usize>,
    preload_count: usize,
}

impl<D: ImageDecoder> ViewerSession<D> {
    pub fn new(cache: PrefetchCache<D>, images: Vec<PathBuf>, preload_count: usize) -> Self {
        Self {
            cache,
            images,
            current: None,
            preload_count,
        }
    }

    /// Session over the supported images directly inside `dir`, in natural
    /// name order
    pub fn from_directory(
        dir: &Path,
        cache: PrefetchCache<D>,
        preload_count: usize,
    ) -> Result<Self, AppError> {
        if !dir.is_dir() {
            return Err(AppError::FileNotFound(dir.display().to_string()));
        }

        let mut images = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_supported_image(&path) {
                images.push(path);
            }
        }
        images.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));

        tracing::info!(dir = %dir.display(), images = images.len(), "Viewer session opened");
        Ok(Self::new(cache, images, preload_count))
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.map(|i| self.images[i].as_path())
    }

    pub fn cache(&self) -> &PrefetchCache<D> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut PrefetchCache<D> {
        &mut self.cache
    }

    /// Change the neighbour window; the cache is resized to hold it
    pub fn set_preload_count(&mut self, count: usize) {
        self.preload_count = count;
        self.cache
            .set_max_size(count.saturating_mul(2).saturating_add(1));
    }

    /// Display image `index`: served from cache when resident, decoded on
    /// this thread otherwise. Neighbours are queued for background decode.
    pub fn show(&mut self, index: usize) -> Result<Arc<D::Image>, AppError> {
        let path = self
            .images
            .get(index)
            .cloned()
            .ok_or_else(|| AppError::FileNotFound(format!("image #{}", index)))?;

        self.pump();
        let image = self.cache.get_or_decode(&path)?;
        self.current = Some(index);

        for target in preload_targets(self.images.len(), index, self.preload_count) {
            self.cache.preload(self.images[target].as_path());
        }

        tracing::debug!(index, path = %path.display(), "Showing image");
        Ok(image)
    }

    /// Advance one image; `None` at the end of the list
    pub fn next(&mut self) -> Result<Option<Arc<D::Image>>, AppError> {
        let target = match self.current {
            Some(i) => i + 1,
            None => 0,
        };
        if target >= self.images.len() {
            return Ok(None);
        }
        self.show(target).map(Some)
    }

    /// Go back one image; `None` at the start of the list
    pub fn prev(&mut self) -> Result<Option<Arc<D::Image>>, AppError> {
        match self.current {
            Some(i) if i > 0 => self.show(i - 1).map(Some),
            _ => Ok(None),
        }
    }

    /// Insert every completed preload into the cache; returns how many
    pub fn pump(&mut self) -> usize {
        let loaded = self.cache.drain_loaded();
        let count = loaded.len();
        for done in loaded {
            self.cache.put(done.path, done.image);
        }
        count
    }
}
