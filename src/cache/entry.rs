//! A single cached stylesheet
//!
//! Each entry keeps the compiled stylesheet and the scanner for one input
//! file, the candidates found so far and the files the compile read. Calling
//! `generate` again is cheap while none of those files changed.
//!
//! # States
//!
//! | State | Meaning |
//! |-------|---------|
//! | Uninitialized | Nothing compiled yet |
//! | Fresh | Handles valid for the current dependency mtimes |
//! | Stale | A dependency changed or could not be stat'd; rebuilt on next call |
//! | Passthrough | Nothing to process; the caller evicts the entry |

use crate::cache::dependency::DependencyTracker;
use crate::cache::sources::{base_source, resolve_sources};
use crate::config::{PluginOptions, DEFAULT_PATTERN};
use crate::error::{WindcacheError, WindcacheResult};
use crate::instrumentation::Instrumentation;
use crate::toolchain::{CompileOptions, Scanner, SourceEntry, Stylesheet, Toolchain};
use indexmap::IndexSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Per-entry settings derived from the plugin options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySettings {
    /// Base directory for automatic source detection
    pub base: PathBuf,

    /// Glob pattern under `base`
    pub pattern: String,

    /// Extra configured sources
    pub sources: Vec<SourceEntry>,

    /// Build a source map next to the CSS
    pub enable_source_maps: bool,
}

impl EntrySettings {
    /// Resolve defaults: `base` falls back to `cwd`, relative bases are
    /// taken relative to `cwd`, and the pattern falls back to `**/*`
    pub fn from_options(options: &PluginOptions, cwd: &Path) -> Self {
        let base = match &options.base.base {
            Some(base) => cwd.join(base),
            None => cwd.to_path_buf(),
        };
        Self {
            base,
            pattern: options
                .base
                .pattern
                .clone()
                .unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            sources: options.sources.clone(),
            enable_source_maps: options.source_maps,
        }
    }
}

/// Outcome of `CacheEntry::generate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// The stylesheet uses nothing that needs processing
    Passthrough,

    /// Compiled CSS and, if enabled, its raw source map
    Css { code: String, map: Option<String> },
}

/// Cache state for one stylesheet identity
///
/// Not safe for concurrent `generate` calls on its own; the registry hands
/// entries out behind a lock.
pub struct CacheEntry {
    id: PathBuf,
    settings: EntrySettings,
    toolchain: Toolchain,
    stylesheet: Option<Box<dyn Stylesheet>>,
    scanner: Option<Box<dyn Scanner>>,
    candidates: IndexSet<String>,
    dependencies: DependencyTracker,
    rebuilds: u64,
}

impl CacheEntry {
    /// Create an uninitialized entry; no I/O happens until `generate`
    pub fn new(id: PathBuf, settings: EntrySettings, toolchain: Toolchain) -> Self {
        Self {
            id,
            settings,
            toolchain,
            stylesheet: None,
            scanner: None,
            candidates: IndexSet::new(),
            dependencies: DependencyTracker::new(),
            rebuilds: 0,
        }
    }

    /// Compile if needed, scan, and build CSS for `content`
    ///
    /// Toolchain failures propagate. The entry is then left without handles
    /// so the next call compiles again.
    pub async fn generate(
        &mut self,
        content: &str,
        instrumentation: &mut Instrumentation,
    ) -> WindcacheResult<Generated> {
        let requires_build = self.dependencies.is_stale();

        if self.stylesheet.is_none() || self.scanner.is_none() || requires_build {
            self.rebuild(content, instrumentation).await?;
        }

        let (Some(stylesheet), Some(scanner)) = (self.stylesheet.as_mut(), self.scanner.as_mut())
        else {
            return Err(WindcacheError::Internal(format!(
                "{} has no compiler after rebuild",
                self.id.display()
            )));
        };

        let features = stylesheet.features();
        if !features.requires_processing() {
            debug!("{} needs no processing ({:?})", self.id.display(), features);
            return Ok(Generated::Passthrough);
        }

        if features.generates_utilities() {
            instrumentation.start("Scan for candidates");
            let before = self.candidates.len();
            self.candidates.extend(scanner.scan()?);
            trace!(
                "{}: {} new candidates, {} total",
                self.id.display(),
                self.candidates.len() - before,
                self.candidates.len()
            );
            instrumentation.end("Scan for candidates");
        }

        instrumentation.start("Build CSS");
        let candidates: Vec<String> = self.candidates.iter().cloned().collect();
        let code = stylesheet.build(&candidates)?;
        instrumentation.end("Build CSS");

        let map = if self.settings.enable_source_maps {
            Some(stylesheet.build_source_map()?.to_raw()?)
        } else {
            None
        };

        Ok(Generated::Css { code, map })
    }

    async fn rebuild(
        &mut self,
        content: &str,
        instrumentation: &mut Instrumentation,
    ) -> WindcacheResult<()> {
        debug!("Rebuilding {}", self.id.display());

        self.stylesheet = None;
        self.scanner = None;
        self.toolchain
            .compiler
            .clear_dependency_cache(&self.dependencies.paths());
        self.dependencies.clear();
        self.dependencies.add_dependency(&self.id);

        let input_base = self
            .id
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let id = self.id.to_string_lossy().into_owned();
        let dependencies = &mut self.dependencies;
        let mut on_dependency = |path: &Path| dependencies.add_dependency(path);

        instrumentation.start("Setup compiler");
        let stylesheet = self
            .toolchain
            .compiler
            .compile(
                content,
                CompileOptions {
                    from: self.settings.enable_source_maps.then_some(id.as_str()),
                    base: &input_base,
                    should_rewrite_urls: true,
                    on_dependency: &mut on_dependency,
                },
            )
            .await?;
        instrumentation.end("Setup compiler");

        instrumentation.start("Setup scanner");
        let sources = resolve_sources(
            stylesheet.root(),
            &base_source(&self.settings.base, &self.settings.pattern),
            &self.settings.sources,
            stylesheet.sources(),
        );
        trace!("{} scans {} sources", self.id.display(), sources.len());
        let scanner = self.toolchain.scanners.create(sources)?;
        instrumentation.end("Setup scanner");

        self.stylesheet = Some(stylesheet);
        self.scanner = Some(scanner);
        self.rebuilds += 1;
        Ok(())
    }

    pub fn id(&self) -> &Path {
        &self.id
    }

    /// Every candidate seen since the entry was created
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    pub fn dependencies(&self) -> &DependencyTracker {
        &self.dependencies
    }

    /// Number of times the compiler and scanner were (re)created
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Whether a compiled stylesheet and scanner are held
    pub fn is_initialized(&self) -> bool {
        self.stylesheet.is_some() && self.scanner.is_some()
    }
}
