//! Incremental stylesheet cache
//!
//! One entry per stylesheet identity holds the compiled stylesheet, its
//! scanner and every candidate seen so far. Entries are only recompiled
//! when a file they were built from changed.
//!
//! # Invalidation
//!
//! - Each build dependency is recorded with the mtime seen at compile time
//! - A newer mtime, a failed stat or a never-observed file means stale
//! - A rebuild replaces the dependency map but keeps accumulated candidates
//!
//! # Entry States
//!
//! | State | Next call |
//! |-------|-----------|
//! | Uninitialized | compile, scan, build |
//! | Fresh | scan, build |
//! | Stale | compile, scan, build |
//! | Passthrough | evicted by the plugin |

pub mod dependency;
pub mod entry;
pub mod registry;
pub mod sources;

pub use dependency::{DependencyTracker, Freshness};
pub use entry::{CacheEntry, EntrySettings, Generated};
pub use registry::{CacheRegistry, EntryHandle};
pub use sources::resolve_sources;
