pub mod extension;
pub mod load;
pub mod migrate;
pub mod status;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use config::{Settings, load_from_env, load_from_file, merge_settings, validate_settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cfmigrate",
    author,
    version,
    about = "cfmigrate - keeps Lucee configuration usable across upgrades",
    long_about = "Tracks the installed version of a Lucee context, recovers broken \
                  configuration documents and translates legacy (pre-5) documents into the \
                  current flat layout.\n\nSettings come from defaults, --settings FILE, CFM_* \
                  environment variables and flags, later sources winning."
)]
pub struct Cli {
    /// Settings file (TOML or YAML)
    #[arg(long, global = true, value_name = "FILE", env = "CFM_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Directory holding the version markers
    #[arg(long, global = true, value_name = "DIR")]
    pub context_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Translate a legacy configuration document")]
    Migrate(migrate::MigrateArgs),

    #[command(about = "Classify the installation against the stored version marker")]
    Status(status::StatusArgs),

    #[command(about = "Load a configuration document, replacing it when broken")]
    Load(load::LoadArgs),

    #[command(subcommand, about = "Inspect or record the required-extension marker")]
    Extension(extension::ExtensionCommand),
}

impl Cli {
    /// Merges defaults, the settings file, `CFM_*` variables and flags, then
    /// validates the result.
    pub fn resolve_settings(&self) -> Result<Settings> {
        let from_file = match &self.settings {
            Some(path) => load_from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        let from_env =
            load_from_env().map_err(|e| anyhow!("Failed to read CFM_* variables: {e}"))?;

        let mut from_flags = Settings::default();
        if let Some(dir) = &self.context_dir {
            from_flags.paths.context_dir.clone_from(dir);
        }

        let file_name = self
            .settings
            .as_ref()
            .map_or_else(|| "file".to_string(), |p| p.display().to_string());
        let settings = merge_settings(
            Settings::default(),
            from_file,
            &file_name,
            from_env,
            "env",
            Some(from_flags),
            "cli",
        );

        validate_settings(&settings).map_err(|e| anyhow!("Invalid settings: {e}"))?;
        Ok(settings)
    }
}
