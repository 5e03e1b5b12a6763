//! Configuration management for windcache

pub mod schema;

pub use schema::{BaseConfig, OptimizeConfig, OptimizeSetting, PluginOptions, DEFAULT_PATTERN};

use crate::error::{WindcacheError, WindcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = "windcache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for `windcache.toml` in the working directory
    pub fn new() -> Self {
        Self {
            config_path: PathBuf::from(LOCAL_CONFIG_FILE),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Use the nearest `windcache.toml` at or above `start`
    pub fn discover(start: &Path) -> Self {
        match Self::find_local_config(start) {
            Some(path) => Self::with_path(path),
            None => Self::with_path(start.join(LOCAL_CONFIG_FILE)),
        }
    }

    /// Walk up from `start` looking for `windcache.toml`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        for dir in start.ancestors() {
            let candidate = dir.join(LOCAL_CONFIG_FILE);
            if candidate.is_file() {
                debug!("Found local config: {}", candidate.display());
                return Some(candidate);
            }
        }
        None
    }

    /// Load options, falling back to defaults if the file does not exist
    pub async fn load(&self) -> WindcacheResult<PluginOptions> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(PluginOptions::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load options from a specific file
    pub async fn load_from_file(&self, path: &Path) -> WindcacheResult<PluginOptions> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WindcacheError::ConfigNotFound(path.to_path_buf())
            } else {
                WindcacheError::io(format!("reading config from {}", path.display()), e)
            }
        })?;

        toml::from_str(&content).map_err(|e| WindcacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save options to file
    pub async fn save(&self, options: &PluginOptions) -> WindcacheResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(options)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            WindcacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    async fn ensure_config_dir(&self) -> WindcacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            if parent.as_os_str().is_empty() {
                return Ok(());
            }
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WindcacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
