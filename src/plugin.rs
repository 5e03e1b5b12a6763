//! Bundler plugin boundary
//!
//! `TailwindPlugin::on_load` is the bundler's load hook for `.css` files.
//! It looks the file up in the cache registry, evicts entries that turn out
//! to need no processing and runs the optional optimizer over the result.

use crate::cache::{CacheRegistry, EntrySettings, Generated};
use crate::config::PluginOptions;
use crate::error::{WindcacheError, WindcacheResult};
use crate::instrumentation::{debug_enabled, Instrumentation};
use crate::toolchain::{OptimizeOptions, Optimizer, Toolchain};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, trace};

/// Name the plugin registers under
pub const PLUGIN_NAME: &str = "tailwindcss";

/// Load filter the plugin registers with the bundler
pub const LOAD_FILTER: &str = r"\.css$";

/// How the bundler should treat returned contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    Css,
}

/// Result handed back to the bundler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    pub contents: String,

    pub loader: Loader,

    /// Directory the bundler resolves `url()` and imports against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_dir: Option<PathBuf>,
}

impl LoadResult {
    /// Original contents for the bundler's default CSS handling
    pub fn passthrough(contents: String) -> Self {
        Self {
            contents,
            loader: Loader::Css,
            resolve_dir: None,
        }
    }

    /// Compiled CSS resolved relative to the input's directory
    pub fn compiled(contents: String, input: &Path) -> Self {
        Self {
            contents,
            loader: Loader::Css,
            resolve_dir: input.parent().map(Path::to_path_buf),
        }
    }
}

/// Whether the bundler path names a `.css` file
pub fn is_css_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext == "css")
}

/// Stable identity for a bundler path: query stripped, absolute, normalized
pub fn id_to_path(id: &str, cwd: &Path) -> PathBuf {
    let path = id.split_once('?').map_or(id, |(path, _)| path);
    normalize(&cwd.join(path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// The Tailwind CSS load hook and its cache
pub struct TailwindPlugin {
    registry: CacheRegistry,
    optimizer: Arc<dyn Optimizer>,
    optimize: bool,
    minify: bool,
    debug: bool,
    cwd: PathBuf,
}

impl TailwindPlugin {
    /// Create a plugin rooted at the process working directory
    pub fn new(
        options: &PluginOptions,
        toolchain: Toolchain,
        optimizer: Arc<dyn Optimizer>,
    ) -> WindcacheResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| WindcacheError::io("getting current directory", e))?;
        Ok(Self::with_cwd(options, toolchain, optimizer, cwd))
    }

    /// Create a plugin resolving relative paths against `cwd`
    pub fn with_cwd(
        options: &PluginOptions,
        toolchain: Toolchain,
        optimizer: Arc<dyn Optimizer>,
        cwd: PathBuf,
    ) -> Self {
        let settings = EntrySettings::from_options(options, &cwd);
        let debug = debug_enabled(std::env::var("DEBUG").ok().as_deref());
        Self {
            registry: CacheRegistry::new(settings, toolchain),
            optimizer,
            optimize: options.optimize.should_optimize(),
            minify: options.optimize.minify(),
            debug,
            cwd,
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    /// Whether timings are collected (`DEBUG` at construction time)
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Handle a bundler load event
    ///
    /// Returns `None` for paths this plugin does not handle.
    pub async fn on_load(&self, path: &str) -> WindcacheResult<Option<LoadResult>> {
        if !is_css_file(path) {
            trace!("Skipping {}", path);
            return Ok(None);
        }

        let mut instrumentation = Instrumentation::new(self.debug);
        instrumentation.start("[tailwindcss] Compile CSS");

        let id = id_to_path(path, &self.cwd);
        let source = fs::read_to_string(&id)
            .await
            .map_err(|e| WindcacheError::io(format!("reading {}", id.display()), e))?;

        let entry = self.registry.get(&id);
        let generated = {
            let mut entry = entry.lock().await;
            entry.generate(&source, &mut instrumentation).await?
        };

        let (code, map) = match generated {
            Generated::Passthrough => {
                self.registry.delete(&id);
                debug!("Passing {} through unchanged", id.display());
                return Ok(Some(LoadResult::passthrough(source)));
            }
            Generated::Css { code, map } => (code, map),
        };

        let code = if self.optimize {
            instrumentation.start("[tailwindcss] Optimize CSS");
            let optimized = self.optimizer.optimize(
                &code,
                OptimizeOptions {
                    minify: self.minify,
                    map: map.as_deref(),
                },
            )?;
            instrumentation.end("[tailwindcss] Optimize CSS");
            optimized.code
        } else {
            code
        };

        instrumentation.end("[tailwindcss] Compile CSS");

        Ok(Some(LoadResult::compiled(code, &id)))
    }
}
