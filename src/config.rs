//! Application configuration module
//!
//! This module centralizes all comparison settings using `confy`
//! for automatic serialization and OS-specific config directory management.

use crate::constant::{
    APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, DEFAULT_ALGORITHM, DENSE_TABLE_THRESHOLD,
    EXPORT_DIR, MAX_CONTINUOUS_CHANGES, MIN_HIGHLIGHT_CHARS,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Confy(#[from] confy::ConfyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Config {
    pub settings: Settings,
}

impl Config {
    /// Load configuration from disk, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = confy::load(APP_NAME, None)?;
        info!("Load config from {:?}", Self::config_path()?);
        Ok(Self { settings })
    }

    /// Get the application data directory
    /// Falls back to a local "data" directory if platform dirs are unavailable
    pub fn data_dir(&self) -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME) {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from("data")
        }
    }

    /// Directory exported documents are written to
    pub fn export_dir(&self) -> PathBuf {
        self.settings
            .export
            .output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join(EXPORT_DIR))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, None)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::load().unwrap_or_else(|_| Self {
            settings: Settings::default(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub diff: DiffSettings,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub loader: LoaderSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffSettings {
    /// Array-diff algorithm: "myers", "patience" or "lcs"
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Consecutive change parts above which a run counts as a rewrite
    #[serde(default = "default_max_continuous_changes")]
    pub max_continuous_changes: usize,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            max_continuous_changes: default_max_continuous_changes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Highlighted parts above this count make a table document fall back
    /// to its original markup
    #[serde(default = "default_dense_table_threshold")]
    pub dense_table_threshold: usize,

    /// Changed parts shorter than this are shown without a highlight span
    #[serde(default = "default_min_highlight_chars")]
    pub min_highlight_chars: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            dense_table_threshold: default_dense_table_threshold(),
            min_highlight_chars: default_min_highlight_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// File extensions accepted by the plain text loader, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}

fn default_max_continuous_changes() -> usize {
    MAX_CONTINUOUS_CHANGES
}

fn default_dense_table_threshold() -> usize {
    DENSE_TABLE_THRESHOLD
}

fn default_min_highlight_chars() -> usize {
    MIN_HIGHLIGHT_CHARS
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string(), "md".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{ "diff": { "algorithm": "patience" } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.diff.algorithm, "patience");
        assert_eq!(settings.diff.max_continuous_changes, MAX_CONTINUOUS_CHANGES);
        assert_eq!(settings.render.dense_table_threshold, DENSE_TABLE_THRESHOLD);
        assert_eq!(settings.loader.extensions, vec!["txt", "md"]);
        assert!(settings.export.output_dir.is_none());
    }

    #[test]
    fn test_export_dir_override() {
        let mut config = Config {
            settings: Settings::default(),
        };
        assert!(config.export_dir().ends_with(EXPORT_DIR));

        config.settings.export.output_dir = Some(PathBuf::from("/tmp/docmark-out"));
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/docmark-out"));
    }
}
