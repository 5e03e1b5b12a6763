//! Build dependency tracking
//!
//! Records every file a compiled stylesheet was built from together with the
//! modification time observed at that point. Freshness has to be provable:
//! a file that could not be stat'd, then or now, marks the entry stale.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::trace;

/// Last observed state of a build dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Never stat'd successfully
    Unknown,
    /// Modification time at the last successful stat
    Known(SystemTime),
}

impl Freshness {
    /// Stat `path` and capture its modification time
    pub fn observe(path: &Path) -> Self {
        match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => Self::Known(mtime),
            Err(e) => {
                trace!("Cannot stat {}: {}", path.display(), e);
                Self::Unknown
            }
        }
    }
}

/// Files one cache entry depends on
#[derive(Debug, Default)]
pub struct DependencyTracker {
    records: IndexMap<PathBuf, Freshness>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`, overwriting any previous observation
    pub fn add_dependency(&mut self, path: &Path) {
        let freshness = Freshness::observe(path);
        trace!("Tracking {} as {:?}", path.display(), freshness);
        self.records.insert(path.to_path_buf(), freshness);
    }

    /// Whether any dependency changed, vanished or was never observed
    pub fn is_stale(&self) -> bool {
        self.records.iter().any(|(path, recorded)| {
            let Freshness::Known(recorded) = recorded else {
                trace!("{} was never observed", path.display());
                return true;
            };

            match Freshness::observe(path) {
                Freshness::Known(current) if current > *recorded => {
                    trace!("{} was modified", path.display());
                    true
                }
                Freshness::Known(_) => false,
                Freshness::Unknown => true,
            }
        })
    }

    /// Forget every dependency
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Tracked paths in the order they were discovered
    pub fn paths(&self) -> Vec<PathBuf> {
        self.records.keys().cloned().collect()
    }

    pub fn get(&self, path: &Path) -> Option<Freshness> {
        self.records.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.records.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
