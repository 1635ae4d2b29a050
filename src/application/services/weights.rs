//! Weight configuration service
//!
//! Loads the nested category/weight table from JSON or TOML.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::WeightConfig;
use crate::infrastructure::traits::FileSystem;

/// Serialization format of a weight configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightFormat {
    Json,
    Toml,
}

impl WeightFormat {
    /// `.toml` files are TOML, everything else is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Service for loading weight configurations.
pub struct WeightService {
    fs: Arc<dyn FileSystem>,
}

impl WeightService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load and parse a weight configuration file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<WeightConfig> {
        if !self.fs.exists(path) || !self.fs.is_file(path) {
            return Err(ApplicationError::ConfigNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read weight config", path)?;

        let config = Self::parse(&content, WeightFormat::from_path(path)).map_err(|message| {
            ApplicationError::InvalidWeightConfig {
                path: path.to_path_buf(),
                message,
            }
        })?;
        debug!("loaded {} top-level categories", config.len());
        Ok(config)
    }

    /// Parse weight configuration content.
    pub fn parse(content: &str, format: WeightFormat) -> Result<WeightConfig, String> {
        match format {
            WeightFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            WeightFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}
