use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use covreport::{cli, telemetry};

/// covreport — line coverage reports for test runs, written as LCOV.
#[derive(Parser)]
#[command(name = "covreport", version, about)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write LCOV for a coverage dump.
    Lcov {
        /// Path to the JSON coverage dump.
        coverage: PathBuf,

        /// JSON log of test events to replay into the report.
        #[arg(long)]
        events: Option<PathBuf>,

        /// Write LCOV to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show totals, per-file coverage, and test outcomes.
    Summary {
        /// Path to the JSON coverage dump.
        coverage: PathBuf,

        /// JSON log of test events to replay into the report.
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Print the full run report as JSON.
    Json {
        /// Path to the JSON coverage dump.
        coverage: PathBuf,

        /// JSON log of test events to replay into the report.
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Show missed line ranges for a source file.
    Uncovered {
        /// Path to the JSON coverage dump.
        coverage: PathBuf,

        /// The source file (as named in the coverage dump).
        source_file: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init_tracing(cli.log_json, level);

    let output = match cli.command {
        Commands::Lcov {
            coverage,
            events,
            output,
        } => cli::cmd_lcov(&coverage, events.as_deref(), output.as_deref())?,
        Commands::Summary { coverage, events } => cli::cmd_summary(&coverage, events.as_deref())?,
        Commands::Json { coverage, events } => cli::cmd_json(&coverage, events.as_deref())?,
        Commands::Uncovered {
            coverage,
            source_file,
        } => cli::cmd_uncovered(&coverage, &source_file)?,
    };

    print!("{output}");
    Ok(())
}
