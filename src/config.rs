//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/budgettree/budgettree.toml`
//! 3. Local config: `<project_dir>/.budgettree.toml`
//! 4. Environment variables: `BUDGETTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::SessionOptions;
use crate::application::{AmountStyle, ApplicationError};
use crate::application::input::DEFAULT_GO_BACK_KEYWORD;
use crate::domain::DEFAULT_ROOT_NAME;
use crate::util::path::expand_env_vars;

/// Default weight configuration file name.
pub const DEFAULT_WEIGHTS_FILE: &str = "investment_config.json";

/// Unified configuration for budgettree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Weight configuration file (JSON, or TOML by extension)
    pub weights_file: PathBuf,
    /// Name of the root node
    pub root_name: String,
    /// Input that rewinds the session by one category
    pub go_back_keyword: String,
    /// Symbol printed in front of amounts
    pub currency_symbol: String,
    /// Decimal places of printed amounts
    pub precision: usize,
    /// Reject zero-weight sibling groups instead of allocating 0
    pub strict_weights: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weights_file: PathBuf::from(DEFAULT_WEIGHTS_FILE),
            root_name: DEFAULT_ROOT_NAME.to_string(),
            go_back_keyword: DEFAULT_GO_BACK_KEYWORD.to_string(),
            currency_symbol: "$".to_string(),
            precision: 2,
            strict_weights: false,
        }
    }
}

/// Get the XDG config directory for budgettree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "budgettree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("budgettree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".budgettree.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.budgettree.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default(
                "weights_file",
                defaults.weights_file.to_string_lossy().to_string(),
            )
            .map_err(config_err)?
            .set_default("root_name", defaults.root_name.clone())
            .map_err(config_err)?
            .set_default("go_back_keyword", defaults.go_back_keyword.clone())
            .map_err(config_err)?
            .set_default("currency_symbol", defaults.currency_symbol.clone())
            .map_err(config_err)?
            .set_default("precision", defaults.precision as i64)
            .map_err(config_err)?
            .set_default("strict_weights", defaults.strict_weights)
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            builder = builder.add_source(File::from(local_config_path(dir)).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("BUDGETTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        // Expand ~ and $VAR in path-like fields
        settings.expand_paths();

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.weights_file.to_string_lossy().as_ref());
        self.weights_file = PathBuf::from(expanded);
    }

    pub fn amount_style(&self) -> AmountStyle {
        AmountStyle {
            currency_symbol: self.currency_symbol.clone(),
            precision: self.precision,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            root_name: self.root_name.clone(),
            go_back_keyword: self.go_back_keyword.clone(),
            style: self.amount_style(),
            strict_weights: self.strict_weights,
            accept_defaults: false,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# budgettree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/budgettree/budgettree.toml
#   Local:  <project_dir>/.budgettree.toml
#   Env:    BUDGETTREE_* environment variables

# Weight configuration (JSON, or TOML when the extension is .toml)
# weights_file = "investment_config.json"

# Name of the root node
# root_name = "Total Investment"

# Input that rewinds the session by one category
# go_back_keyword = "back"

# Amount formatting
# currency_symbol = "$"
# precision = 2

# Fail on sibling groups whose weights are all zero (default: allocate 0)
# strict_weights = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
