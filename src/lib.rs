//! windcache - incremental compilation cache for Tailwind CSS
//!
//! Keeps one compiled stylesheet and scanner per `.css` file across bundler
//! rebuilds, recompiling only when a file the stylesheet was built from
//! changed and accumulating utility candidates between scans.

pub mod cache;
pub mod config;
pub mod error;
pub mod instrumentation;
pub mod plugin;
pub mod toolchain;

pub use cache::{CacheEntry, CacheRegistry, Generated};
pub use config::{ConfigManager, PluginOptions};
pub use error::{WindcacheError, WindcacheResult};
pub use plugin::{LoadResult, Loader, TailwindPlugin};
pub use toolchain::Toolchain;
