//! # Settings Precedence
//!
//! Merges settings from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Settings file
//! 4. Default values (lowest priority)
//!
//! A source only overrides a field when its value differs from the default,
//! so a source that leaves a field unset never masks a lower source.

use crate::settings::{
    CacheSettings, ObservabilitySettings, OutputSettings, PathSettings, ProductSettings, Settings,
    UpgradeSettings,
};

/// Merge settings sources with precedence.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Settings, merge_settings, load_from_file, load_from_env};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let defaults = Settings::default();
///     let from_file = load_from_file(Path::new("cfmigrate.toml"))?;
///     let from_env = load_from_env()?;
///
///     let _settings = merge_settings(defaults, from_file, "file", from_env, "env", None, "cli");
///     Ok(())
/// }
/// ```
pub fn merge_settings(
    defaults: Settings,
    file_settings: Settings,
    file_source_name: &str,
    env_settings: Settings,
    env_source_name: &str,
    cli_settings: Option<Settings>,
    cli_source_name: &str,
) -> Settings {
    let mut settings = defaults;

    settings = merge_with_logging(settings, file_settings, file_source_name);
    settings = merge_with_logging(settings, env_settings, env_source_name);

    if let Some(cli) = cli_settings {
        settings = merge_with_logging(settings, cli, cli_source_name);
    }

    settings
}

fn merge_with_logging(mut base: Settings, override_settings: Settings, source_name: &str) -> Settings {
    let mut changes = Vec::new();

    merge_product(&mut base.product, &override_settings.product, &mut changes);
    merge_paths(&mut base.paths, &override_settings.paths, &mut changes);
    merge_upgrade(&mut base.upgrade, &override_settings.upgrade, &mut changes);
    merge_caches(&mut base.caches, &override_settings.caches, &mut changes);
    merge_output(&mut base.output, &override_settings.output, &mut changes);
    merge_observability(
        &mut base.observability,
        &override_settings.observability,
        &mut changes,
    );

    if !changes.is_empty() {
        tracing::info!("Settings from {}: {:?}", source_name, changes);
    }

    base
}

fn merge_product(base: &mut ProductSettings, other: &ProductSettings, changes: &mut Vec<String>) {
    let defaults = ProductSettings::default();
    if other.version != defaults.version && other.version != base.version {
        changes.push(format!("product.version = {}", other.version));
        base.version.clone_from(&other.version);
    }
    if other.release_time != defaults.release_time && other.release_time != base.release_time {
        changes.push(format!("product.release_time = {}", other.release_time));
        base.release_time.clone_from(&other.release_time);
    }
}

fn merge_paths(base: &mut PathSettings, other: &PathSettings, changes: &mut Vec<String>) {
    let defaults = PathSettings::default();
    if other.context_dir != defaults.context_dir && other.context_dir != base.context_dir {
        changes.push(format!("paths.context_dir = {}", other.context_dir.display()));
        base.context_dir.clone_from(&other.context_dir);
    }
    if other.read_only != defaults.read_only && other.read_only != base.read_only {
        changes.push(format!("paths.read_only = {}", other.read_only));
        base.read_only = other.read_only;
    }
}

fn merge_upgrade(base: &mut UpgradeSettings, other: &UpgradeSettings, changes: &mut Vec<String>) {
    let defaults = UpgradeSettings::default();
    if other.major_threshold != defaults.major_threshold
        && other.major_threshold != base.major_threshold
    {
        changes.push(format!("upgrade.major_threshold = {}", other.major_threshold));
        base.major_threshold = other.major_threshold;
    }
}

fn merge_caches(base: &mut CacheSettings, other: &CacheSettings, changes: &mut Vec<String>) {
    let defaults = CacheSettings::default();
    if other.cache_types != defaults.cache_types && other.cache_types != base.cache_types {
        changes.push(format!("caches.cache_types = {:?}", other.cache_types));
        base.cache_types.clone_from(&other.cache_types);
    }
    if other.cache_types_max != defaults.cache_types_max
        && other.cache_types_max != base.cache_types_max
    {
        changes.push(format!("caches.cache_types_max = {:?}", other.cache_types_max));
        base.cache_types_max.clone_from(&other.cache_types_max);
    }
}

fn merge_output(base: &mut OutputSettings, other: &OutputSettings, changes: &mut Vec<String>) {
    let defaults = OutputSettings::default();
    if other.pretty != defaults.pretty && other.pretty != base.pretty {
        changes.push(format!("output.pretty = {}", other.pretty));
        base.pretty = other.pretty;
    }
}

fn merge_observability(
    base: &mut ObservabilitySettings,
    other: &ObservabilitySettings,
    changes: &mut Vec<String>,
) {
    let defaults = ObservabilitySettings::default();
    if other.logging_level != defaults.logging_level && other.logging_level != base.logging_level {
        changes.push(format!("observability.logging_level = {}", other.logging_level));
        base.logging_level.clone_from(&other.logging_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tracing_test::traced_test;

    fn with_threshold(threshold: u64) -> Settings {
        let mut settings = Settings::default();
        settings.upgrade.major_threshold = threshold;
        settings
    }

    #[test]
    fn test_defaults_only() {
        let merged = merge_settings(
            Settings::default(),
            Settings::default(),
            "file",
            Settings::default(),
            "env",
            None,
            "cli",
        );
        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let merged = merge_settings(
            Settings::default(),
            with_threshold(6),
            "file",
            with_threshold(7),
            "env",
            None,
            "cli",
        );
        assert_eq!(merged.upgrade.major_threshold, 7);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut cli = Settings::default();
        cli.paths.context_dir = PathBuf::from("/from/cli");

        let mut env = Settings::default();
        env.paths.context_dir = PathBuf::from("/from/env");
        env.paths.read_only = true;

        let merged = merge_settings(
            Settings::default(),
            Settings::default(),
            "file",
            env,
            "env",
            Some(cli),
            "cli",
        );
        assert_eq!(merged.paths.context_dir, PathBuf::from("/from/cli"));
        assert!(merged.paths.read_only);
    }

    #[test]
    fn test_unset_source_does_not_mask_lower_source() {
        let mut file = Settings::default();
        file.output.pretty = false;
        file.observability.logging_level = "debug".to_string();
        file.caches.cache_types = vec!["query".to_string()];

        let merged = merge_settings(
            Settings::default(),
            file,
            "file",
            Settings::default(),
            "env",
            Some(Settings::default()),
            "cli",
        );
        assert!(!merged.output.pretty);
        assert_eq!(merged.observability.logging_level, "debug");
        assert_eq!(merged.caches.cache_types, vec!["query"]);
    }

    #[test]
    #[traced_test]
    fn test_changes_are_logged_with_source() {
        let mut file = Settings::default();
        file.product.version = "6.0.0.1".to_string();

        merge_settings(
            Settings::default(),
            file,
            "cfmigrate.toml",
            Settings::default(),
            "env",
            None,
            "cli",
        );

        assert!(logs_contain("Settings from cfmigrate.toml"));
        assert!(logs_contain("product.version = 6.0.0.1"));
    }
}
