//! # Settings File Loading
//!
//! Loads settings from TOML or YAML files, the format chosen by file
//! extension.

use crate::settings::Settings;
use std::path::Path;

/// Settings file loading error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("Settings file has no extension")]
    NoExtension,

    #[error("Unsupported settings file format: {0}")]
    UnsupportedFormat(String),
}

/// Load settings from a TOML file. Missing sections take their defaults.
pub fn load_from_toml(path: &Path) -> Result<Settings, SettingsFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| SettingsFileError::FileNotFound(path.display().to_string()))?;

    toml::from_str(&contents).map_err(|e| SettingsFileError::TomlParse(e.to_string()))
}

/// Load settings from a YAML file. Missing sections take their defaults.
pub fn load_from_yaml(path: &Path) -> Result<Settings, SettingsFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| SettingsFileError::FileNotFound(path.display().to_string()))?;

    serde_yaml::from_str(&contents).map_err(|e| SettingsFileError::YamlParse(e.to_string()))
}

/// Load settings from file with auto-detection.
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml`, `.yml`: YAML format
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_file;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = load_from_file(Path::new("cfmigrate.toml"))?;
///     println!("Threshold: {}", settings.upgrade.major_threshold);
///     Ok(())
/// }
/// ```
pub fn load_from_file(path: &Path) -> Result<Settings, SettingsFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(SettingsFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(SettingsFileError::UnsupportedFormat(other.to_string())),
    }
}
