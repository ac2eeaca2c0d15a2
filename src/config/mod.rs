//! Configuration system for kubequill.
//!
//! Settings are read from `~/.config/kubequill/config.toml`. Every field has a
//! default, so a partial file (or none at all) is fine.
//!
//! # Example
//!
//! ```
//! use kubequill::config::Config;
//!
//! let config = Config::default();
//! assert!(!config.strict_units);
//! assert_eq!(config.default_ratio_limit, 2);
//!
//! let custom = Config {
//!     output_format: "json".to_string(),
//!     ..Config::default()
//! };
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::quantity::{Quantity, QuantityError};

/// Configuration for kubequill.
///
/// # Fields
///
/// * `strict_units` - Reject unknown quantity unit suffixes instead of reading them as `M` (default: false)
/// * `default_ratio_limit` - Maximum limits/requests ratio for the `limits` report (default: 2)
/// * `output_format` - Model output format: "yaml" or "json" (default: "yaml")
/// * `disallowed_tags` - Image tags flagged by the `images` report (default: ["latest"])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Reject unknown quantity unit suffixes
    #[serde(default)]
    pub strict_units: bool,

    /// Maximum limits/requests ratio
    #[serde(default = "default_ratio_limit")]
    pub default_ratio_limit: i32,

    /// Model output format: "yaml" or "json"
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Image tags that should not be deployed
    #[serde(default = "default_disallowed_tags")]
    pub disallowed_tags: Vec<String>,
}

fn default_ratio_limit() -> i32 {
    2
}

fn default_output_format() -> String {
    "yaml".to_string()
}

fn default_disallowed_tags() -> Vec<String> {
    vec!["latest".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_units: false,
            default_ratio_limit: default_ratio_limit(),
            output_format: default_output_format(),
            disallowed_tags: default_disallowed_tags(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/kubequill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("kubequill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), "ignoring config file: {:#}", err);
                Self::default()
            }
        }
    }

    /// Loads configuration from an explicit file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Parses a quantity honouring `strict_units`.
    pub fn parse_quantity(&self, text: &str) -> Result<Quantity, QuantityError> {
        Quantity::parse_with(text, self.strict_units)
    }

    /// True if `tag` is one of the disallowed image tags.
    pub fn is_disallowed_tag(&self, tag: &str) -> bool {
        self.disallowed_tags.iter().any(|t| t == tag)
    }
}
