use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "logsift")]
#[command(version)]
#[command(about = "Extract a .zip or .tar archive and report log lines mentioning errors or timeouts", long_about = None)]
#[command(after_help = "Examples:\n  \
  logsift support-bundle.zip     scan every .log/.txt file in the bundle\n  \
  RUST_LOG=debug logsift logs.tar   same, with extraction details on stderr")]
pub struct Cli {
    /// Archive to scan (.zip or .tar)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}
