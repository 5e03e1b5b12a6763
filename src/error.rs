//! Error types for windcache
//!
//! All modules use `WindcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for windcache operations
pub type WindcacheResult<T> = Result<T, WindcacheError>;

/// All errors that can occur in windcache
#[derive(Error, Debug)]
pub enum WindcacheError {
    // Toolchain errors
    #[error("Failed to compile {id}: {reason}")]
    Compile { id: String, reason: String },

    #[error("Candidate scan failed: {0}")]
    Scan(String),

    #[error("Failed to build CSS for {id}: {reason}")]
    Build { id: String, reason: String },

    #[error("Source map generation failed: {0}")]
    SourceMap(String),

    #[error("CSS optimization failed: {0}")]
    Optimize(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WindcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a compile error for a stylesheet identity
    pub fn compile(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Compile {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a build error for a stylesheet identity
    pub fn build(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Build {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from an external toolchain component
    pub fn is_toolchain(&self) -> bool {
        matches!(
            self,
            Self::Compile { .. }
                | Self::Scan(_)
                | Self::Build { .. }
                | Self::SourceMap(_)
                | Self::Optimize(_)
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Compile { .. } => Some("Fix the stylesheet and save it again to trigger a rebuild"),
            Self::ConfigInvalid { .. } => {
                Some("Check windcache.toml: `optimize` must be a boolean or { minify = <bool> }")
            }
            Self::Optimize(_) => Some("Set `optimize = false` to skip the optimizer"),
            _ => None,
        }
    }
}
