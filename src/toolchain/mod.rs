//! Toolchain abstraction
//!
//! The CSS compiler, the candidate scanner and the optimizer are external
//! collaborators. The cache only talks to them through these traits, so
//! hosts can plug in any implementation:
//! - `Compiler` turns stylesheet text into a buildable `Stylesheet`
//! - `ScannerFactory` creates a `Scanner` over a resolved source list
//! - `Optimizer` minifies the final CSS

mod features;
mod source;
mod source_map;


pub use features::Features;
pub use source::{RootSource, SourceEntry};
pub use source_map::SourceMap;

use crate::error::WindcacheResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options passed to `Compiler::compile`
pub struct CompileOptions<'a> {
    /// Identity of the stylesheet, only set when source maps are wanted
    pub from: Option<&'a str>,

    /// Directory relative imports resolve against
    pub base: &'a Path,

    /// Rewrite `url()` references relative to imported files
    pub should_rewrite_urls: bool,

    /// Called for every file the compile step depends on
    pub on_dependency: &'a mut (dyn FnMut(&Path) + Send),
}

/// Abstract CSS compiler
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile stylesheet text into a reusable handle
    async fn compile(
        &self,
        content: &str,
        options: CompileOptions<'_>,
    ) -> WindcacheResult<Box<dyn Stylesheet>>;

    /// Drop anything cached for modules loaded from `paths`
    ///
    /// Called before a rebuild with the previous dependency set.
    fn clear_dependency_cache(&self, _paths: &[PathBuf]) {}
}

/// A compiled stylesheet that can be built repeatedly
pub trait Stylesheet: Send {
    /// Constructs found while compiling
    fn features(&self) -> Features;

    /// Declared scan root
    fn root(&self) -> &RootSource;

    /// Additional `@source` entries declared by the stylesheet
    fn sources(&self) -> &[SourceEntry];

    /// Generate CSS for the given candidates
    fn build(&mut self, candidates: &[String]) -> WindcacheResult<String>;

    /// Source map for the last build
    fn build_source_map(&self) -> WindcacheResult<SourceMap>;
}

/// Creates scanners over a source list
pub trait ScannerFactory: Send + Sync {
    fn create(&self, sources: Vec<SourceEntry>) -> WindcacheResult<Box<dyn Scanner>>;
}

/// Yields utility-class candidates from the files of its sources
pub trait Scanner: Send {
    /// Scan once; every call returns a fresh batch the caller has to merge
    fn scan(&mut self) -> WindcacheResult<Vec<String>>;
}

/// Options passed to `Optimizer::optimize`
#[derive(Debug, Clone, Copy)]
pub struct OptimizeOptions<'a> {
    pub minify: bool,
    pub map: Option<&'a str>,
}

/// Output of the optimizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    pub code: String,
    pub map: Option<String>,
}

/// Abstract CSS optimizer/minifier
pub trait Optimizer: Send + Sync {
    fn optimize(&self, code: &str, options: OptimizeOptions<'_>) -> WindcacheResult<Optimized>;
}

/// Compiler and scanner shared by every cache entry
#[derive(Clone)]
pub struct Toolchain {
    pub compiler: Arc<dyn Compiler>,
    pub scanners: Arc<dyn ScannerFactory>,
}

impl Toolchain {
    pub fn new(compiler: Arc<dyn Compiler>, scanners: Arc<dyn ScannerFactory>) -> Self {
        Self { compiler, scanners }
    }
}
