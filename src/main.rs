//! bracket-fetch main entry point
//!
//! This is the command-line interface: it reads text from a file or stdin,
//! fetches every bracketed URL it finds, and prints one JSON record per page.

use anyhow::Context;
use bracket_fetch::config::{load_config_or_default, validate, Config};
use bracket_fetch::runner::Runner;
use bracket_fetch::{BracketFetchError, ConfigError};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C
const INTERRUPTED: i32 = 130;

/// bracket-fetch: fetch the links hidden in bracketed text
///
/// Every `[ ... ]` span in the input contributes its last URL. Each distinct
/// URL is fetched once, at most one request per rate-limit interval, and
/// reported as a JSON line with the page title and a keyed hash of the first
/// email address on the page. The hash key is read from the SECRET
/// environment variable (or a `.env` file).
#[derive(Parser, Debug)]
#[command(name = "bracket-fetch")]
#[command(version)]
#[command(about = "Fetch the links found in bracketed text", long_about = None)]
struct Cli {
    /// Text file to scan; reads stdin when omitted
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Minimum milliseconds between two fetches (overrides the config file)
    #[arg(long, value_name = "MS")]
    rate_limit_ms: Option<u64>,

    /// Milliseconds to wait before retrying a failed fetch (overrides the config file)
    #[arg(long, value_name = "MS")]
    retry_delay_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    // The secret is read before any queue activity
    let runner = match Runner::from_config(&config) {
        Ok(runner) => runner,
        Err(BracketFetchError::Config(e @ ConfigError::MissingSecret)) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("Failed to set up the fetch queue"),
    };
    let queue = runner.queue().clone();

    tracing::info!(
        "Admitting one URL every {}ms, retry after {}ms (max {} retries)",
        config.queue.rate_limit_ms,
        config.queue.retry_delay_ms,
        config.queue.max_retries
    );

    let run = async {
        match &cli.input {
            Some(path) => runner
                .run_file(path)
                .await
                .with_context(|| format!("Failed to process {}", path.display())),
            None => runner
                .run_stdin()
                .await
                .context("Failed to process stdin"),
        }
    };

    tokio::select! {
        result = run => {
            result?;
            tracing::info!("All URLs processed: {}", queue.stats());
            Ok(ExitCode::SUCCESS)
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, shutting down");
            queue.shutdown();
            tracing::info!("Stopped with {}", queue.stats());
            // A blocking stdin read would otherwise hold up runtime shutdown
            std::process::exit(INTERRUPTED)
        }
    }
}

/// Loads the config file (or defaults) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to build default configuration".to_string(),
        }
    })?;

    if let Some(ms) = cli.rate_limit_ms {
        config.queue.rate_limit_ms = ms;
    }
    if let Some(ms) = cli.retry_delay_ms {
        config.queue.retry_delay_ms = ms;
    }

    validate(&config).context("Invalid command-line override")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only result records.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bracket_fetch=warn,warn"),
            1 => EnvFilter::new("bracket_fetch=info,warn"),
            2 => EnvFilter::new("bracket_fetch=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
