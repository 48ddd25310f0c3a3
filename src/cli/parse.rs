//! CLI parse: clap types for stratagen. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stratagen CLI - stratified synthetic dataset generation
#[derive(Parser)]
#[command(name = "stratagen")]
#[command(about = "Plan and generate stratified, labeled synthetic text datasets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Taxonomy TOML file (overrides the configured or built-in taxonomy)
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and validate the plan, then print its distribution (no generation calls)
    Plan {
        /// Number of items
        #[arg(long)]
        total: Option<usize>,
        /// Planner seed
        #[arg(long)]
        seed: Option<u64>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Plan, generate every batch with the configured provider, and write the CSV
    Generate {
        #[arg(long)]
        total: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Maximum items per generation call
        #[arg(long)]
        batch_size: Option<usize>,
        /// Maximum concurrent generation calls
        #[arg(long)]
        concurrency: Option<usize>,
        /// Retries after a short response
        #[arg(long)]
        retries: Option<usize>,
        /// CSV output path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
