//! Main entry point for the logsift CLI application.
//!
//! Match lines and the extracted-directory notice go to stdout; diagnostics
//! and the final error, if any, go to stderr with a non-zero exit status.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use logsift::{Cli, Pipeline};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let stdout = std::io::stdout();
    let mut pipeline = Pipeline::new(stdout.lock());
    let summary = pipeline
        .run(&cli.archive)
        .with_context(|| format!("failed to scan '{}'", cli.archive.display()))?;

    info!(
        files = summary.files_visited,
        scanned = summary.files_scanned,
        lines = summary.lines_read,
        matches = summary.matches,
        "done"
    );
    Ok(())
}
