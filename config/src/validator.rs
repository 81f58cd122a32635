//! # Settings Validation
//!
//! Validates settings structures using the `validator` crate.

use crate::settings::Settings;
use validator::Validate;

/// Validate merged settings.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Settings, validate_settings};
///
/// let settings = Settings::default();
/// match validate_settings(&settings) {
///     Ok(()) => println!("Settings are valid"),
///     Err(errors) => println!("Validation errors: {:?}", errors),
/// }
/// ```
///
/// ## Validation Rules
/// ### Product
/// - `version`: 1-64 characters
/// - `release_time`: non-empty, digits only
///
/// ### Upgrade
/// - `major_threshold`: 1-100
///
/// ### Caches
/// - `cache_types`, `cache_types_max`: at least one entry
///
/// ### Observability
/// - `logging_level`: must be "trace", "debug", "info", "warn", or "error"
pub fn validate_settings(settings: &Settings) -> Result<(), validator::ValidationErrors> {
    settings.validate()
}
