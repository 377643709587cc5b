//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

/// Concurrent test runner with structured assertion diffs
#[derive(Parser, Debug)]
#[command(name = "attest")]
#[command(version)]
#[command(about = "Run test files as isolated units and aggregate their results")]
#[command(long_about = None)]
pub struct Args {
    /// Test files to execute, each as an isolated unit
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Maximum number of test files running concurrently
    /// (defaults to the logical core count)
    #[arg(short = 'C', long)]
    pub concurrency: Option<usize>,

    /// Output format (text, json)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file (yaml or json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
