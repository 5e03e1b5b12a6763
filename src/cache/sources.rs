//! Scanner source list resolution
//!
//! The order of the list decides scan and override precedence:
//! 1. the stylesheet's declared root
//! 2. the configured base path and pattern
//! 3. extra configured sources, verbatim
//! 4. the stylesheet's `@source` entries, re-based onto the configured base

use crate::toolchain::{RootSource, SourceEntry};
use std::path::Path;

/// Build the ordered source list for a freshly compiled stylesheet
///
/// An unset root falls back to the base source, which is then not repeated.
/// A `none` root disables both the root and the base source.
pub fn resolve_sources(
    root: &RootSource,
    base_source: &SourceEntry,
    extra: &[SourceEntry],
    declared: &[SourceEntry],
) -> Vec<SourceEntry> {
    let mut sources = match root {
        RootSource::None => Vec::new(),
        RootSource::Unset => vec![base_source.clone()],
        RootSource::Declared { base, pattern } => {
            vec![SourceEntry::new(base.clone(), pattern.clone()), base_source.clone()]
        }
    };

    sources.extend(extra.iter().cloned());
    sources.extend(declared.iter().map(|s| s.rebased(&base_source.base)));
    sources
}

/// The configured base path and glob pattern as a source
pub fn base_source(base: &Path, pattern: &str) -> SourceEntry {
    SourceEntry::new(base, pattern)
}
