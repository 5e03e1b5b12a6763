//! Source descriptors handed to the scanner

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A base directory plus a glob pattern the scanner walks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Directory the pattern is relative to
    pub base: PathBuf,

    /// Glob pattern, e.g. `**/*`
    pub pattern: String,

    /// Negated sources exclude matches instead of adding them
    #[serde(default)]
    pub negated: bool,
}

impl SourceEntry {
    /// Create a non-negated source
    pub fn new(base: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            pattern: pattern.into(),
            negated: false,
        }
    }

    /// Create a negated source
    pub fn negated(base: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            negated: true,
            ..Self::new(base, pattern)
        }
    }

    /// Same pattern and negation, re-based onto `base`
    pub fn rebased(&self, base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            ..self.clone()
        }
    }
}

impl fmt::Display for SourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "{}/{}", self.base.display(), self.pattern)
    }
}

/// The entry root a compiled stylesheet declares for scanning
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RootSource {
    /// No root declared; the configured base source is used
    #[default]
    Unset,

    /// `source(none)`: automatic source detection is disabled
    None,

    /// An explicit root
    Declared { base: PathBuf, pattern: String },
}
