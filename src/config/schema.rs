//! Configuration schema for the plugin
//!
//! Options are read from `windcache.toml` or built by the host directly.

use crate::toolchain::SourceEntry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Glob used when no base pattern is configured
pub const DEFAULT_PATTERN: &str = "**/*";

/// Root plugin options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginOptions {
    /// Emit source maps for compiled stylesheets
    pub source_maps: bool,

    /// Optimize the generated CSS: `true`, `false` or `{ minify = <bool> }`
    pub optimize: OptimizeSetting,

    /// Base path and pattern for automatic source detection
    pub base: BaseConfig,

    /// Extra scanner sources, appended after the base source
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceEntry>,
}

/// `optimize` accepts a flag or a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizeSetting {
    Enabled(bool),
    Options(OptimizeConfig),
}

impl Default for OptimizeSetting {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl OptimizeSetting {
    /// Only an explicit `false` turns optimization off
    pub fn should_optimize(&self) -> bool {
        !matches!(self, Self::Enabled(false))
    }

    /// Minify unless the table form says `minify = false`
    pub fn minify(&self) -> bool {
        match self {
            Self::Options(options) => options.minify != Some(false),
            Self::Enabled(_) => true,
        }
    }
}

/// Table form of `optimize`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,
}

/// Base source settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    /// Directory to scan from (default: working directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<PathBuf>,

    /// Glob pattern (default: `**/*`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}
