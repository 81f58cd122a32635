use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use cm_core::FileSystem;
use config::{REQUIRED_EXTENSION_FILE, Settings, StdFileSystem, TracingLogSink, VersionTracker};

use crate::output;

#[derive(Subcommand)]
pub enum ExtensionCommand {
    #[command(about = "Report whether required extensions are recorded for this version")]
    Check(CheckArgs),

    #[command(about = "Record that required extensions are installed for this version")]
    Update,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Exit with an error when the marker is missing or stale
    #[arg(long)]
    pub strict: bool,
}

pub fn run(cmd: ExtensionCommand, settings: &Settings) -> Result<()> {
    let log = TracingLogSink;
    let context_dir = &settings.paths.context_dir;
    let tracker = VersionTracker::new(&StdFileSystem, context_dir, &log);
    let marker = settings.marker();

    match cmd {
        ExtensionCommand::Check(args) => {
            if tracker.is_required_extension(&marker) {
                output::success(&format!("Required extensions installed for {marker}"));
            } else if args.strict {
                bail!("Required extensions not recorded for {marker}");
            } else {
                output::warn(&format!("Required extensions not recorded for {marker}"));
            }
        }
        ExtensionCommand::Update => {
            if !StdFileSystem.exists(context_dir) {
                StdFileSystem
                    .create_dir_all(context_dir)
                    .with_context(|| format!("Failed to create {}", context_dir.display()))?;
            }
            tracker.update_required_extension(&marker);
            if !tracker.is_required_extension(&marker) {
                bail!(
                    "Failed to record {} in {}",
                    REQUIRED_EXTENSION_FILE,
                    context_dir.display()
                );
            }
            output::success(&format!("Recorded required extensions for {marker}"));
        }
    }
    Ok(())
}
