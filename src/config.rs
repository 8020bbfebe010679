//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\media-resolver\config.toml
//! - macOS: ~/Library/Application Support/media-resolver/config.toml
//! - Linux: ~/.config/media-resolver/config.toml
//!
//! The config file is human-readable and editable. Command-line flags
//! override what is loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::resolve::{LanguagePreference, ResolveOptions};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search languages
    pub languages: LanguageConfig,

    /// Matching behaviour
    pub matching: MatchingConfig,

    /// Default catalog
    pub catalog: CatalogConfig,
}

/// Search language settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language searched first
    pub preferred: String,

    /// Fallback language, searched only if it differs from `preferred`
    pub default: String,

    /// Regional variants tried between the two for music
    pub regions: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            preferred: "en".to_string(),
            default: "en".to_string(),
            regions: Vec::new(),
        }
    }
}

impl LanguageConfig {
    pub fn preference(&self) -> LanguagePreference {
        LanguagePreference::new(&self.preferred, &self.default).with_regions(self.regions.clone())
    }
}

/// Matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Overwrite local names with the catalog's
    pub update_names: bool,

    /// Resolve the series or album before an episode or track
    pub resolve_parent_first: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            update_names: false,
            resolve_parent_first: true,
        }
    }
}

/// Catalog settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file used when `--catalog` is not given
    pub path: Option<PathBuf>,
}

impl Config {
    /// Resolution options described by this config.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            languages: self.languages.preference(),
            update_names: self.matching.update_names,
            resolve_parent_first: self.matching.resolve_parent_first,
            cancel: None,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("media-resolver"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit file
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Save configuration to the standard location
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to an explicit file
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[languages]"));
        assert!(toml.contains("[matching]"));
        assert!(toml.contains("[catalog]"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[languages]
preferred = "de"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.languages.preferred, "de");
        assert_eq!(config.languages.default, "en");
        assert!(config.matching.resolve_parent_first);
        assert!(!config.matching.update_names);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_resolve_options_from_config() {
        let mut config = Config::default();
        config.languages.preferred = "de".to_string();
        config.languages.regions = vec!["at".to_string()];
        config.matching.update_names = true;

        let options = config.resolve_options();

        assert_eq!(options.languages.preferred, "de");
        assert_eq!(options.languages.regions, vec!["at".to_string()]);
        assert!(options.update_names);
        assert!(options.cancel.is_none());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.catalog.path = Some(PathBuf::from("/data/catalog.json"));
        config.languages.default = "fr".to_string();

        save_to(&config, &path).unwrap();
        let loaded = load_from(&path).unwrap();

        assert_eq!(loaded, config);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "languages = 3").unwrap();

        assert!(matches!(load_from(&path), Err(ConfigError::Parse(..))));
    }
}
