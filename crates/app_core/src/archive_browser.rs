//! Navigating inside one open archive
//!
//! The handler itself is stateless; the browser owns the current virtual
//! directory and resolves names relative to it.

use crate::image_loader::{decode_bytes, is_supported_image, LoadedImage};
use crate::AppError;
use app_fs::{natural_cmp, virtual_path, ArchiveEntry, ArchiveHandler, ArchiveRegistry, ExtractReport};
use std::path::{Path, PathBuf};

pub struct ArchiveBrowser {
    handler: ArchiveHandler,
    current_path: String,
}

impl ArchiveBrowser {
    /// Open `path` through the registry and start at the archive root
    pub fn open(registry: &ArchiveRegistry, path: impl AsRef<Path>) -> Result<Self, AppError> {
        let handler = registry.open(path)?;
        tracing::info!(
            archive = %handler.archive_path().display(),
            format = %handler.format(),
            "Archive browser opened"
        );
        Ok(Self::new(handler))
    }

    pub fn new(handler: ArchiveHandler) -> Self {
        Self {
            handler,
            current_path: String::new(),
        }
    }

    pub fn archive_path(&self) -> &Path {
        self.handler.archive_path()
    }

    pub fn handler(&self) -> &ArchiveHandler {
        &self.handler
    }

    /// Current virtual directory; `""` at the root
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn is_at_root(&self) -> bool {
        virtual_path::is_root(&self.current_path)
    }

    fn resolve(&self, name: &str) -> String {
        virtual_path::join(&self.current_path, name)
    }

    /// Children of the current directory
    pub fn entries(&self) -> Result<Vec<ArchiveEntry>, AppError> {
        Ok(self.handler.list_entries(&self.current_path)?)
    }

    /// Descend into a child directory. `..` goes up.
    pub fn enter(&mut self, name: &str) -> Result<(), AppError> {
        if name == ".." {
            self.go_up();
            return Ok(());
        }

        let target = self.resolve(name);
        // Validates that the target exists and is a directory
        self.handler.list_entries(&target)?;
        tracing::debug!(from = %self.current_path, to = %target, "Enter archive directory");
        self.current_path = target;
        Ok(())
    }

    /// Move to the parent directory; false when already at the root
    pub fn go_up(&mut self) -> bool {
        if self.is_at_root() {
            return false;
        }
        self.current_path = virtual_path::parent(&self.current_path);
        true
    }

    /// Contents of a file relative to the current directory
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(name);
        Ok(self.handler.read_file(&path)?)
    }

    /// Extract one member, relative to the current directory
    pub fn extract(&mut self, name: &str, destination: &Path) -> Result<PathBuf, AppError> {
        let path = self.resolve(name);
        Ok(self.handler.extract(&path, destination)?)
    }

    /// Extract the whole archive
    pub fn extract_all(&mut self, destination: &Path) -> Result<ExtractReport, AppError> {
        Ok(self.handler.extract_all(destination)?)
    }

    /// Every image member anywhere in the archive, in natural path order
    pub fn image_entries(&self) -> Result<Vec<ArchiveEntry>, AppError> {
        let mut images: Vec<ArchiveEntry> = self
            .handler
            .index()?
            .files()
            .filter(|e| is_supported_image(&e.name))
            .cloned()
            .collect();
        images.sort_by(|a, b| natural_cmp(&a.path, &b.path));
        Ok(images)
    }

    /// Read and decode one image member by its full internal path
    pub fn load_image(&mut self, internal_path: &str, max_dimension: Option<u32>) -> Result<LoadedImage, AppError> {
        let bytes = self.handler.read_file(internal_path)?;
        decode_bytes(internal_path, &bytes, max_dimension)
    }

    /// Release the archive; later calls fail with a closed-archive error
    pub fn close(&mut self) {
        self.handler.close();
    }
}

impl Drop for ArchiveBrowser {
    fn drop(&mut self) {
        self.handler.close();
    }
}
