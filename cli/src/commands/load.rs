//! Load command - recovering document load
//!
//! A document that cannot be read is saved aside as `lucee-<kind>.<n>.buggy`
//! and replaced by the bundled default before loading again.

use anyhow::{Context, Result};
use clap::Args;
use cm_core::ConfigKind;
use config::{RecoveringLoader, Settings, StdFileSystem, TracingLogSink};
use std::path::PathBuf;

#[derive(Args)]
pub struct LoadArgs {
    /// Configuration document to load
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Which default replaces a broken document: server or web
    #[arg(long, default_value = "server")]
    pub kind: ConfigKind,
}

pub fn run(args: LoadArgs, settings: &Settings) -> Result<()> {
    let log = TracingLogSink;
    let tree = RecoveringLoader::new(&StdFileSystem, &log)
        .load(&args.path, args.kind)
        .with_context(|| format!("Failed to load {}", args.path.display()))?;

    let text = if settings.output.pretty {
        serde_json::to_string_pretty(&tree)?
    } else {
        serde_json::to_string(&tree)?
    };
    println!("{text}");
    Ok(())
}
