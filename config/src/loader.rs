//! # Environment Variable Loader
//!
//! Loads settings from `CFM_*` environment variables. Unset or unparseable
//! variables fall back to the default of their field.

use crate::settings::{
    CacheSettings, ObservabilitySettings, OutputSettings, PathSettings, ProductSettings, Settings,
    UpgradeSettings,
};
use std::env;
use std::path::PathBuf;

/// Load settings from environment variables.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = load_from_env()?;
///     println!("Context directory: {}", settings.paths.context_dir.display());
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// - `CFM_PRODUCT_VERSION`: version written to markers (default: crate version)
/// - `CFM_RELEASE_TIME`: release time in ms (default: "0")
/// - `CFM_CONTEXT_DIR`: directory holding the markers (default: ".")
/// - `CFM_READ_ONLY`: classify without writing (true/false, default: false)
/// - `CFM_MAJOR_THRESHOLD`: legacy major threshold (default: 5)
/// - `CFM_CACHE_TYPES`: comma separated `cachedWithin<Type>` types
/// - `CFM_CACHE_TYPES_MAX`: comma separated `default<Type>` types
/// - `CFM_OUTPUT_PRETTY`: pretty-print output (true/false, default: true)
/// - `CFM_LOGGING_LEVEL`: trace/debug/info/warn/error (default: "info")
pub fn load_from_env() -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = Settings {
        product: load_product_from_env()?,
        paths: load_paths_from_env()?,
        upgrade: load_upgrade_from_env()?,
        caches: load_caches_from_env()?,
        output: load_output_from_env()?,
        observability: load_observability_from_env()?,
    };

    Ok(settings)
}

fn load_product_from_env() -> Result<ProductSettings, Box<dyn std::error::Error>> {
    let defaults = ProductSettings::default();
    Ok(ProductSettings {
        version: env::var("CFM_PRODUCT_VERSION").unwrap_or(defaults.version),
        release_time: env::var("CFM_RELEASE_TIME").unwrap_or(defaults.release_time),
    })
}

fn load_paths_from_env() -> Result<PathSettings, Box<dyn std::error::Error>> {
    Ok(PathSettings {
        context_dir: env::var("CFM_CONTEXT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".")),
        read_only: parse_env("CFM_READ_ONLY").unwrap_or(false),
    })
}

fn load_upgrade_from_env() -> Result<UpgradeSettings, Box<dyn std::error::Error>> {
    Ok(UpgradeSettings {
        major_threshold: parse_env("CFM_MAJOR_THRESHOLD")
            .unwrap_or(crate::version::DEFAULT_MAJOR_THRESHOLD),
    })
}

fn load_caches_from_env() -> Result<CacheSettings, Box<dyn std::error::Error>> {
    let defaults = CacheSettings::default();
    Ok(CacheSettings {
        cache_types: parse_list_env("CFM_CACHE_TYPES").unwrap_or(defaults.cache_types),
        cache_types_max: parse_list_env("CFM_CACHE_TYPES_MAX").unwrap_or(defaults.cache_types_max),
    })
}

fn load_output_from_env() -> Result<OutputSettings, Box<dyn std::error::Error>> {
    Ok(OutputSettings {
        pretty: parse_env("CFM_OUTPUT_PRETTY").unwrap_or(true),
    })
}

fn load_observability_from_env() -> Result<ObservabilitySettings, Box<dyn std::error::Error>> {
    Ok(ObservabilitySettings {
        logging_level: env::var("CFM_LOGGING_LEVEL").unwrap_or_else(|_| "info".to_string()),
    })
}

fn parse_env<T>(key: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(s) => s
            .parse::<T>()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>),
        Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
    }
}

/// Comma separated, blanks trimmed, empty items dropped. An empty list is
/// treated as unset.
fn parse_list_env(key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = env::var(key)
        .ok()?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "CFM_PRODUCT_VERSION",
        "CFM_RELEASE_TIME",
        "CFM_CONTEXT_DIR",
        "CFM_READ_ONLY",
        "CFM_MAJOR_THRESHOLD",
        "CFM_CACHE_TYPES",
        "CFM_CACHE_TYPES_MAX",
        "CFM_OUTPUT_PRETTY",
        "CFM_LOGGING_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_from_env_defaults() {
        clear_env();
        let settings = load_from_env().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("CFM_PRODUCT_VERSION", "6.0.0.1");
            env::set_var("CFM_RELEASE_TIME", "1700000000000");
            env::set_var("CFM_CONTEXT_DIR", "/opt/lucee/context");
            env::set_var("CFM_READ_ONLY", "true");
            env::set_var("CFM_MAJOR_THRESHOLD", "6");
            env::set_var("CFM_CACHE_TYPES", " query, function ,,");
            env::set_var("CFM_OUTPUT_PRETTY", "false");
            env::set_var("CFM_LOGGING_LEVEL", "debug");
        }

        let settings = load_from_env().unwrap();
        clear_env();

        assert_eq!(settings.marker().to_string(), "6.0.0.1-1700000000000");
        assert_eq!(settings.paths.context_dir, PathBuf::from("/opt/lucee/context"));
        assert!(settings.paths.read_only);
        assert_eq!(settings.upgrade.major_threshold, 6);
        assert_eq!(settings.caches.cache_types, vec!["query", "function"]);
        assert_eq!(
            settings.caches.cache_types_max,
            CacheSettings::default().cache_types_max
        );
        assert!(!settings.output.pretty);
        assert_eq!(settings.observability.logging_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back() {
        clear_env();
        unsafe {
            env::set_var("CFM_READ_ONLY", "sometimes");
            env::set_var("CFM_MAJOR_THRESHOLD", "five");
            env::set_var("CFM_CACHE_TYPES", " , ");
        }

        let settings = load_from_env().unwrap();
        clear_env();

        assert!(!settings.paths.read_only);
        assert_eq!(settings.upgrade.major_threshold, 5);
        assert_eq!(settings.caches, CacheSettings::default());
    }

    #[test]
    fn test_parse_env_missing() {
        let result: Result<u32, _> = parse_env("CFM_NONEXISTENT_VAR");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_parse_env_invalid_number() {
        unsafe {
            env::set_var("CFM_TEST_VAR", "not_a_number");
        }
        let result: Result<u64, _> = parse_env("CFM_TEST_VAR");
        assert!(result.is_err());
        unsafe {
            env::remove_var("CFM_TEST_VAR");
        }
    }
}
