//! Import configuration file support
//!
//! Handles parsing of `.catalog-import.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".catalog-import.toml";

/// Default name of the synthesized root protocol
pub const DEFAULT_ROOT_NAME: &str = "LifeLines";

/// Default code of the root component holding the generic branch
pub const DEFAULT_GENERIC_CODE: &str = "Generic";

/// Environment variable for the root protocol name
pub const ENV_ROOT_NAME: &str = "CATALOG_IMPORT_ROOT_NAME";

/// Environment variable for the generic branch code
pub const ENV_GENERIC_CODE: &str = "CATALOG_IMPORT_GENERIC_CODE";

/// Environment variable for the unsupported value type policy
pub const ENV_SKIP_UNSUPPORTED: &str = "CATALOG_IMPORT_SKIP_UNSUPPORTED";

/// Configuration error
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Catalog layout section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Name of the synthesized root protocol
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Code of the root component that holds the generic branch
    #[serde(default = "default_generic_code")]
    pub generic_code: String,
}

fn default_root_name() -> String {
    DEFAULT_ROOT_NAME.to_string()
}

fn default_generic_code() -> String {
    DEFAULT_GENERIC_CODE.to_string()
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
            generic_code: default_generic_code(),
        }
    }
}

/// Feature conversion section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturesSection {
    /// Skip observations with an unknown value type instead of aborting
    #[serde(default)]
    pub skip_unsupported_value_types: bool,
}

/// Main configuration structure
///
/// Represents the `.catalog-import.toml` configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub catalog: CatalogSection,

    #[serde(default)]
    pub features: FeaturesSection,
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unsupported value type policy
    pub fn skip_unsupported_value_types(mut self, skip: bool) -> Self {
        self.features.skip_unsupported_value_types = skip;
        self
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.catalog-import.toml` in the directory.
    /// Falls back to defaults if not found.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_ROOT_NAME).filter(|v| !v.is_empty()) {
            self.catalog.root_name = name;
        }

        if let Some(code) = lookup(ENV_GENERIC_CODE).filter(|v| !v.is_empty()) {
            self.catalog.generic_code = code;
        }

        if let Some(skip) = lookup(ENV_SKIP_UNSUPPORTED)
            && let Some(skip) = parse_flag(&skip)
        {
            self.features.skip_unsupported_value_types = skip;
        }
    }

    /// Check if configuration exists in a directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(CONFIG_FILENAME).exists()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Catalog Import Configuration

[catalog]
# Name of the root protocol created for every import
root_name = "LifeLines"

# Code of the root component that holds the generic branch
generic_code = "Generic"

[features]
# Skip observations with an unknown value type instead of aborting the import
skip_unsupported_value_types = false
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ImportConfig::new();
        assert_eq!(config.catalog.root_name, "LifeLines");
        assert_eq!(config.catalog.generic_code, "Generic");
        assert!(!config.features.skip_unsupported_value_types);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[catalog]
root_name = "Registry"

[features]
skip_unsupported_value_types = true
"#;
        let config = ImportConfig::parse(toml).unwrap();
        assert_eq!(config.catalog.root_name, "Registry");
        assert_eq!(config.catalog.generic_code, "Generic");
        assert!(config.features.skip_unsupported_value_types);
    }

    #[test]
    fn test_parse_invalid_config() {
        assert!(matches!(
            ImportConfig::parse("[catalog\nroot_name = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_sample_config_parses_to_defaults() {
        assert_eq!(ImportConfig::parse(sample_config()).unwrap(), ImportConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = ImportConfig::new().skip_unsupported_value_types(true);
        config.catalog.root_name = "Biobank".to_string();

        config.save(dir.path()).unwrap();
        assert!(ImportConfig::exists(dir.path()));

        let loaded = ImportConfig::load(dir.path()).unwrap();
        assert!(loaded.features.skip_unsupported_value_types);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        assert!(!ImportConfig::exists(dir.path()));
        assert!(ImportConfig::load(dir.path()).is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_ROOT_NAME, "Override"),
            (ENV_GENERIC_CODE, ""),
            (ENV_SKIP_UNSUPPORTED, "yes"),
        ]);
        let mut config = ImportConfig::new();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.catalog.root_name, "Override");
        assert_eq!(config.catalog.generic_code, "Generic");
        assert!(config.features.skip_unsupported_value_types);
    }

    #[test]
    fn test_invalid_flag_is_ignored() {
        let mut config = ImportConfig::new().skip_unsupported_value_types(true);
        config.apply_overrides(|key| (key == ENV_SKIP_UNSUPPORTED).then(|| "maybe".to_string()));
        assert!(config.features.skip_unsupported_value_types);
    }
}
