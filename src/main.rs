//! Command-line interface for culvert
//!
//! # Usage Examples
//!
//! ```bash
//! # Built-in run, debug logging
//! culvert --verbose run
//!
//! # Configuration file with overrides
//! culvert run --config run.yaml \
//!   --streams 2 \
//!   --events-per-second 1000 \
//!   --commit-after-rows 500 \
//!   --timeout 1m
//!
//! # Bounded run, useful for smoke tests
//! culvert run --max-rows 10000 --output-dir /tmp/culvert
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use culvert::{format_summary, run_orchestration, RunArgs};
use culvert_core::RunConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "culvert")]
#[command(about = "A concurrent, rate-paced load generator for streaming ingest targets")]
#[command(long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch every configured stream and wait for all of them
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Print the built-in run configuration as YAML
    DefaultConfig,
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run { args } => {
            let config = args.resolve()?;
            tracing::info!(
                "Starting run '{}' with {} streams: {}",
                config.name,
                config.streams.len(),
                config.stream_names().join(", ")
            );

            let report = run_orchestration(&config)?;
            println!("{}", format_summary(&report));

            let failed = report.failed().count();
            if failed > 0 {
                anyhow::bail!("{failed} of {} streams failed", report.streams.len());
            }
        }
        Commands::DefaultConfig => {
            let yaml = RunConfig::builtin()
                .to_yaml()
                .context("Failed to serialize the built-in configuration")?;
            print!("{yaml}");
        }
    }

    Ok(())
}
