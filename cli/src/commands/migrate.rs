//! Migrate command - legacy document translation
//!
//! Reads a legacy document, applies the section rules and writes the flat
//! current-format document. The source file is never modified.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use config::{
    CacheTypes, JsonDocumentWriter, MigrationEngine, Settings, StdFileSystem, TracingLogSink,
};
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct MigrateArgs {
    /// Legacy document to translate
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// Destination of the translated document (replaced when present)
    #[arg(value_name = "NEW")]
    pub new: PathBuf,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: MigrateArgs, settings: &Settings) -> Result<()> {
    let log = TracingLogSink;
    let report = MigrationEngine::new(&StdFileSystem, &log)
        .with_writer(JsonDocumentWriter::new(settings.output.pretty))
        .with_cache_types(CacheTypes::from(&settings.caches))
        .migrate(&args.old, &args.new)
        .with_context(|| format!("Failed to migrate {}", args.old.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::header("Migration");
    println!();
    for section in &report.sections {
        let changes = if section.changes == 0 {
            "no changes".dimmed()
        } else {
            format!("{} changes", section.changes).green()
        };
        println!("  {:<16} {}", format!("{}:", section.name), changes);
    }
    println!();

    if report.pruned {
        output::info("Removed containers left empty by the migration");
    }
    output::success(&format!(
        "Wrote {} ({} changes)",
        args.new.display(),
        report.total_changes()
    ));
    Ok(())
}
