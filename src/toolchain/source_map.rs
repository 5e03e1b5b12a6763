//! Raw source maps produced alongside compiled CSS

use crate::error::WindcacheResult;
use serde::{Deserialize, Serialize};

/// A version 3 source map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    pub sources: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources_content: Vec<Option<String>>,

    #[serde(default)]
    pub names: Vec<String>,

    pub mappings: String,
}

impl SourceMap {
    /// Empty map over the given sources
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            version: 3,
            file: None,
            sources,
            sources_content: Vec::new(),
            names: Vec::new(),
            mappings: String::new(),
        }
    }

    /// Serialize to the raw JSON text bundlers expect
    pub fn to_raw(&self) -> WindcacheResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
