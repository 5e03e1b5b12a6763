//! Identity → cache entry table

use crate::cache::entry::{CacheEntry, EntrySettings};
use crate::toolchain::Toolchain;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

/// Shared handle to one entry
///
/// The async lock serializes `generate` calls for the same identity.
pub type EntryHandle = Arc<AsyncMutex<CacheEntry>>;

/// Lazily populated cache entries, one per stylesheet identity
pub struct CacheRegistry {
    entries: Mutex<HashMap<PathBuf, EntryHandle>>,
    settings: EntrySettings,
    toolchain: Toolchain,
}

impl CacheRegistry {
    pub fn new(settings: EntrySettings, toolchain: Toolchain) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            settings,
            toolchain,
        }
    }

    /// Existing entry for `id`, or a new uninitialized one
    ///
    /// Lookup and insertion happen under one lock, so concurrent callers
    /// always share a single entry.
    pub fn get(&self, id: &Path) -> EntryHandle {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(id) {
            return Arc::clone(entry);
        }

        debug!("Creating cache entry for {}", id.display());
        let entry = Arc::new(AsyncMutex::new(CacheEntry::new(
            id.to_path_buf(),
            self.settings.clone(),
            self.toolchain.clone(),
        )));
        entries.insert(id.to_path_buf(), Arc::clone(&entry));
        entry
    }

    /// Remove the entry for `id`; returns whether one existed
    pub fn delete(&self, id: &Path) -> bool {
        let removed = self.entries.lock().remove(id).is_some();
        if removed {
            debug!("Evicted cache entry for {}", id.display());
        }
        removed
    }

    pub fn contains(&self, id: &Path) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry, forcing full rebuilds
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn settings(&self) -> &EntrySettings {
        &self.settings
    }
}
