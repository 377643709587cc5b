//! attest - concurrent test runner
//!
//! Runs test files as isolated units, bounds their concurrency, and
//! aggregates every suite's results into one session total.
//!
//! ## Usage
//!
//! ```bash
//! # Run a set of compiled test files
//! attest target/tests/api target/tests/storage
//!
//! # Bound concurrency and disable color
//! attest tests/* -C 2 --no-color
//!
//! # Machine-readable output
//! attest tests/* --format json
//! ```

use anyhow::Result;
use clap::Parser;

use attest::cli::Args;
use attest::config::Config;
use attest::output::{OutputFormat, Reporter};
use attest::runner::Runner;
use attest::utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();

    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(format) = &args.format {
        config.format = format.clone();
    }
    if args.no_color {
        config.color = false;
    }

    let format = OutputFormat::from_str(&config.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", config.format))?;
    let mut reporter = Reporter::new(format);
    if !config.color {
        reporter = reporter.no_color();
    }

    let runner = Runner::new(config.concurrency).with_reporter(reporter);
    let summary = runner.exec(&args.files).await;

    if !summary.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
