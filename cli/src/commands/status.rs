use anyhow::{Context, Result};
use clap::Args;
use cm_core::FileSystem;
use config::{Settings, StdFileSystem, TracingLogSink, VersionTracker};

use crate::output;

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long, help = "Classify without writing the version marker")]
    pub read_only: bool,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

pub fn run(args: StatusArgs, settings: &Settings) -> Result<()> {
    let log = TracingLogSink;
    let context_dir = &settings.paths.context_dir;
    let read_only = args.read_only || settings.paths.read_only;

    if !read_only && !StdFileSystem.exists(context_dir) {
        StdFileSystem
            .create_dir_all(context_dir)
            .with_context(|| format!("Failed to create {}", context_dir.display()))?;
    }

    let tracker = VersionTracker::new(&StdFileSystem, context_dir, &log)
        .with_major_threshold(settings.upgrade.major_threshold);
    let marker = settings.marker();
    let classification = tracker
        .classify(&marker, read_only)
        .context("Failed to classify installation")?;
    let required_extension = tracker.is_required_extension(&marker);

    if args.json {
        let output = serde_json::json!({
            "context_dir": context_dir.display().to_string(),
            "marker": marker.to_string(),
            "classification": classification.as_str(),
            "previous": classification.previous().map(ToString::to_string),
            "needs_migration": classification.needs_migration(),
            "required_extension": required_extension,
            "read_only": read_only
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::header("Installation Status");
    println!();
    output::field("context_dir", &context_dir.display().to_string());
    output::field("marker", &marker.to_string());
    output::field("classification", classification.as_str());
    if let Some(previous) = classification.previous() {
        output::field("previous", &previous.to_string());
    }
    output::field(
        "required_extension",
        if required_extension { "installed" } else { "missing" },
    );
    println!();

    if classification.needs_migration() {
        output::hint("translate the legacy configuration with `cfmigrate migrate <OLD> <NEW>`");
    }
    if read_only {
        output::info("read-only: version marker left untouched");
    }
    Ok(())
}
