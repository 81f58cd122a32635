//! # Tool Settings
//!
//! Settings of the migration tool itself (not the documents it migrates).
//!
//! All settings structures:
//! - Use `serde` for serialization/deserialization, every field defaulted
//! - Use `validator` for input validation
//!
//! Values come from defaults, a TOML/YAML file, `CFM_*` environment
//! variables and CLI flags; see [`crate::precedence`] for how they combine.

use crate::sections::{CacheTypes, STRING_CACHE_TYPES, STRING_CACHE_TYPES_MAX};
use cm_core::VersionMarker;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Top-level settings.
///
/// ## Usage
/// ```rust,no_run
/// use config::Settings;
///
/// let settings = Settings::default();
/// println!("Context directory: {}", settings.paths.context_dir.display());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Settings {
    /// Version written to the markers
    #[serde(default)]
    #[validate(nested)]
    pub product: ProductSettings,

    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    #[validate(nested)]
    pub upgrade: UpgradeSettings,

    /// Cache type names expanded by the migration rules
    #[serde(default)]
    #[validate(nested)]
    pub caches: CacheSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilitySettings,
}

impl Settings {
    /// Marker for the configured product version.
    pub fn marker(&self) -> VersionMarker {
        VersionMarker::new(&self.product.version, &self.product.release_time)
    }
}

/// Product identity recorded in the `version` and `required-extension`
/// markers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ProductSettings {
    /// Dotted version, e.g. `6.0.0.1`
    #[serde(default = "default_product_version")]
    #[validate(length(min = 1, max = 64))]
    pub version: String,

    /// Release time in milliseconds since the epoch
    #[serde(default = "default_product_release_time")]
    #[validate(custom(function = "validate_release_time"))]
    pub release_time: String,
}

fn default_product_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_product_release_time() -> String {
    "0".to_string()
}

fn validate_release_time(value: &str) -> Result<(), validator::ValidationError> {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("Release time must be digits"))
    }
}

impl Default for ProductSettings {
    fn default() -> Self {
        Self {
            version: default_product_version(),
            release_time: default_product_release_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSettings {
    /// Directory holding the marker files
    #[serde(default = "default_context_dir")]
    pub context_dir: PathBuf,

    /// Classify without writing markers
    #[serde(default)]
    pub read_only: bool,
}

fn default_context_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            context_dir: default_context_dir(),
            read_only: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct UpgradeSettings {
    /// Previous majors below this need the legacy migration
    #[serde(default = "default_major_threshold")]
    #[validate(range(min = 1, max = 100))]
    pub major_threshold: u64,
}

fn default_major_threshold() -> u64 {
    crate::version::DEFAULT_MAJOR_THRESHOLD
}

impl Default for UpgradeSettings {
    fn default() -> Self {
        Self {
            major_threshold: default_major_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct CacheSettings {
    /// Types with a `cachedWithin<Type>` setting
    #[serde(default = "default_cache_types")]
    #[validate(length(min = 1))]
    pub cache_types: Vec<String>,

    /// Types with a `default<Type>` assignment
    #[serde(default = "default_cache_types_max")]
    #[validate(length(min = 1))]
    pub cache_types_max: Vec<String>,
}

fn default_cache_types() -> Vec<String> {
    STRING_CACHE_TYPES.iter().map(|s| (*s).to_string()).collect()
}

fn default_cache_types_max() -> Vec<String> {
    STRING_CACHE_TYPES_MAX
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_types: default_cache_types(),
            cache_types_max: default_cache_types_max(),
        }
    }
}

impl From<&CacheSettings> for CacheTypes {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            within: settings.cache_types.clone(),
            defaults: settings.cache_types_max.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSettings {
    /// Pretty-print migrated documents
    #[serde(default = "default_output_pretty")]
    pub pretty: bool,
}

fn default_output_pretty() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pretty: default_output_pretty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilitySettings {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_observability_logging_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub logging_level: String,
}

fn default_observability_logging_level() -> String {
    "info".to_string()
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level")),
    }
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            logging_level: default_observability_logging_level(),
        }
    }
}
