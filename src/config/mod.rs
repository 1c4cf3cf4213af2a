//! Configuration for defquill.
//!
//! Settings are read from `~/.config/defquill/config.toml`. Every field has a
//! default, so a partial file (or no file at all) is fine. Command-line flags
//! override whatever is loaded here.
//!
//! # Example
//!
//! ```
//! use defquill::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.max_results_shown, 5);
//! assert_eq!(config.summary_chars, 100);
//!
//! let custom: Config = toml::from_str("max_results_shown = 10").unwrap();
//! assert_eq!(custom.max_results_shown, 10);
//! assert_eq!(custom.max_chain_depth, 64);
//! ```

use crate::format::summary::DEFAULT_MAX_SHOWN;
use crate::format::{SummaryOptions, DEFAULT_SUMMARY_CHARS};
use crate::resolver::inherit::DEFAULT_MAX_CHAIN_DEPTH;
use crate::xpath::engine::DEFAULT_MAX_VISITED_NODES;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Settings for loading archives, running queries and rendering results.
///
/// # Fields
///
/// * `archive` - Definition archive used when `--archive` is not given (default: none)
/// * `max_results_shown` - Matches rendered in a query summary (default: 5)
/// * `summary_chars` - Character budget per rendered match (default: 100)
/// * `max_chain_depth` - Ancestors followed along `ParentName` (default: 64)
/// * `max_visited_nodes` - Nodes one query may visit (default: 1,000,000)
/// * `log_filter` - Tracing filter used when `RUST_LOG` is unset (default: "warn")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Definition archive to load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,

    /// Matches rendered in a query summary
    #[serde(default = "default_max_results_shown")]
    pub max_results_shown: usize,

    /// Character budget per rendered match
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,

    /// Ancestors followed along `ParentName`
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Nodes one query may visit before it is aborted
    #[serde(default = "default_max_visited_nodes")]
    pub max_visited_nodes: usize,

    /// Tracing filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_max_results_shown() -> usize {
    DEFAULT_MAX_SHOWN
}

fn default_summary_chars() -> usize {
    DEFAULT_SUMMARY_CHARS
}

fn default_max_chain_depth() -> usize {
    DEFAULT_MAX_CHAIN_DEPTH
}

fn default_max_visited_nodes() -> usize {
    DEFAULT_MAX_VISITED_NODES
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive: None,
            max_results_shown: default_max_results_shown(),
            summary_chars: default_summary_chars(),
            max_chain_depth: default_max_chain_depth(),
            max_visited_nodes: default_max_visited_nodes(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/defquill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("defquill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be
    /// parsed.
    pub fn load() -> Self {
        let Some(config_path) = Self::config_path() else {
            return Self::default();
        };
        if !config_path.exists() {
            return Self::default();
        }

        Self::load_from(&config_path).unwrap_or_else(|err| {
            warn!(path = %config_path.display(), "ignoring config file: {:#}", err);
            Self::default()
        })
    }

    /// Loads configuration from `path`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path =
            Self::config_path().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Rendering limits for query summaries.
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            max_shown: self.max_results_shown,
            max_chars: self.summary_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_options_follow_config() {
        let config = Config {
            max_results_shown: 2,
            summary_chars: 40,
            ..Default::default()
        };
        assert_eq!(
            config.summary_options(),
            SummaryOptions {
                max_shown: 2,
                max_chars: 40
            }
        );
        assert_eq!(Config::default().summary_options(), SummaryOptions::default());
    }

    #[test]
    fn test_archive_omitted_when_unset() {
        let toml_str = toml::to_string(&Config::default()).unwrap();
        assert!(!toml_str.contains("archive"));
    }
}
