//! Prefetch cache: bounded LRU of decoded images with background preloading
//!
//! The resident map is owned and mutated by a single thread. Decode jobs run on
//! a small dedicated worker pool and report back through a channel; they never
//! touch resident state. The only state shared with workers is the in-flight
//! map, which is what makes "at most one decode per key" hold.

use crate::image_loader::ImageDecoder;
use crate::AppError;
use crossbeam_channel::{Receiver, Sender};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Completion notification for one background decode
#[derive(Debug)]
pub struct Loaded<I> {
    pub path: PathBuf,
    pub image: Arc<I>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub resident: usize,
    pub max_size: usize,
    pub loading: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Default capacity when no setting is supplied
pub const DEFAULT_MAX_SIZE: usize = 10;

/// Removes an in-flight marker when a decode job ends, including by panic.
///
/// Only the job that owns the marker may remove it; after `clear()` a newer
/// job for the same key holds a different ticket.
struct InFlightGuard {
    loading: Arc<DashMap<PathBuf, u64>>,
    key: PathBuf,
    ticket: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.loading.remove_if(&self.key, |_, ticket| *ticket == self.ticket);
    }
}

pub struct PrefetchCache<D: ImageDecoder> {
    decoder: Arc<D>,
    resident: LruCache<PathBuf, Arc<D::Image>>,
    loading: Arc<DashMap<PathBuf, u64>>,
    next_ticket: AtomicU64,
    pool: rayon::ThreadPool,
    loaded_tx: Sender<Loaded<D::Image>>,
    loaded_rx: Receiver<Loaded<D::Image>>,
    hits: u64,
    misses: u64,
}

fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

impl<D: ImageDecoder> PrefetchCache<D> {
    /// Create a cache holding at most `max_size` images (floor 1) that decodes
    /// on `workers` background threads
    pub fn new(decoder: D, max_size: usize, workers: usize) -> Result<Self, AppError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("prefetch-{}", i))
            .panic_handler(|_| tracing::error!("Prefetch worker panicked"))
            .build()
            .map_err(|e| AppError::SystemResource(format!("prefetch pool: {}", e)))?;

        let (loaded_tx, loaded_rx) = crossbeam_channel::unbounded();

        Ok(Self {
            decoder: Arc::new(decoder),
            resident: LruCache::new(capacity(max_size)),
            loading: Arc::new(DashMap::new()),
            next_ticket: AtomicU64::new(0),
            pool,
            loaded_tx,
            loaded_rx,
            hits: 0,
            misses: 0,
        })
    }

    /// Cache of [`DEFAULT_MAX_SIZE`] images with one decode worker
    pub fn with_decoder(decoder: D) -> Result<Self, AppError> {
        Self::new(decoder, DEFAULT_MAX_SIZE, 1)
    }

    /// Cached image, promoted to most-recently-used. Never triggers a load.
    pub fn get(&mut self, key: &Path) -> Option<Arc<D::Image>> {
        match self.resident.get(key) {
            Some(image) => {
                self.hits += 1;
                Some(Arc::clone(image))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Cached image, or decode it on the calling thread and insert it
    pub fn get_or_decode(&mut self, key: &Path) -> Result<Arc<D::Image>, AppError> {
        if let Some(image) = self.get(key) {
            return Ok(image);
        }

        let image = Arc::new(self.decoder.decode(key)?);
        self.put(key, Arc::clone(&image));
        Ok(image)
    }

    /// Insert as most-recently-used, evicting the least-recently-used entry
    /// when full.
    ///
    /// An existing entry keeps its current image and only has its recency
    /// refreshed.
    pub fn put(&mut self, key: impl Into<PathBuf>, image: Arc<D::Image>) {
        let key = key.into();
        // A resident key is never also in flight
        self.loading.remove(&key);

        if self.resident.contains(&key) {
            self.resident.promote(&key);
            tracing::trace!(path = %key.display(), "Cache refresh");
            return;
        }

        if let Some((evicted, _)) = self.resident.push(key, image) {
            tracing::debug!(path = %evicted.display(), "Cache evict");
        }
    }

    /// Change capacity (floor 1), evicting down to the new bound immediately
    pub fn set_max_size(&mut self, max_size: usize) {
        let before = self.resident.len();
        self.resident.resize(capacity(max_size));
        tracing::debug!(
            max_size = self.resident.cap().get(),
            evicted = before - self.resident.len(),
            "Cache resized"
        );
    }

    pub fn max_size(&self) -> usize {
        self.resident.cap().get()
    }

    pub fn is_cached(&self, key: &Path) -> bool {
        self.resident.contains(key)
    }

    pub fn is_loading(&self, key: &Path) -> bool {
        self.loading.contains_key(key)
    }

    /// Start a background decode of `key` unless it is resident or already in
    /// flight. Returns whether a job was started.
    ///
    /// The result arrives as a [`Loaded`] notification; it is not inserted
    /// into the cache. A failed decode produces no notification.
    pub fn preload(&self, key: impl Into<PathBuf>) -> bool {
        let key = key.into();
        if self.resident.contains(&key) {
            return false;
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        match self.loading.entry(key.clone()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(ticket);
            }
        }

        let decoder = Arc::clone(&self.decoder);
        let loading = Arc::clone(&self.loading);
        let loaded_tx = self.loaded_tx.clone();
        tracing::debug!(path = %key.display(), "Preload queued");

        self.pool.spawn(move || {
            let guard = InFlightGuard {
                loading,
                key,
                ticket,
            };
            // The key stays in flight until its notification is queued
            match decoder.decode(&guard.key) {
                Ok(image) => {
                    // Receiver gone means the cache was dropped
                    let _ = loaded_tx.send(Loaded {
                        path: guard.key.clone(),
                        image: Arc::new(image),
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %guard.key.display(), "Preload failed: {}", e);
                }
            }
            drop(guard);
        });

        true
    }

    /// Next completed preload, if any
    pub fn try_recv_loaded(&self) -> Option<Loaded<D::Image>> {
        self.loaded_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next completed preload
    pub fn recv_loaded_timeout(&self, timeout: Duration) -> Option<Loaded<D::Image>> {
        self.loaded_rx.recv_timeout(timeout).ok()
    }

    /// Every completed preload currently queued
    pub fn drain_loaded(&self) -> Vec<Loaded<D::Image>> {
        self.loaded_rx.try_iter().collect()
    }

    /// Completion channel, for callers that select over several sources
    pub fn receiver(&self) -> &Receiver<Loaded<D::Image>> {
        &self.loaded_rx
    }

    /// Drop all resident images and in-flight bookkeeping.
    ///
    /// Running decode jobs are not cancelled; their notifications still arrive.
    pub fn clear(&mut self) {
        self.resident.clear();
        self.loading.clear();
        tracing::debug!("Cache cleared");
    }

    /// Resident keys, least-recently-used first
    pub fn cached_paths(&self) -> Vec<PathBuf> {
        self.resident.iter().rev().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.resident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resident.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            resident: self.resident.len(),
            max_size: self.max_size(),
            loading: self.loading.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
