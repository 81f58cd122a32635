use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.resolve_settings()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.observability.logging_level)),
        )
        .init();
    tracing::debug!(?settings, "Settings resolved");

    match cli.command {
        Commands::Migrate(args) => commands::migrate::run(args, &settings),
        Commands::Status(args) => commands::status::run(args, &settings),
        Commands::Load(args) => commands::load::run(args, &settings),
        Commands::Extension(cmd) => commands::extension::run(cmd, &settings),
    }
}
