//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pagefeed CLI
#[derive(Parser, Debug)]
#[command(name = "pagefeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feed definition file (YAML)
    #[arg(short, long, global = true)]
    pub feed: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and validate a feed definition
    Validate,

    /// Walk a feed to exhaustion and print its items
    Read {
        /// Maximum number of pages to load after the first (0 = no limit)
        #[arg(long, default_value = "0")]
        max_pages: usize,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One item per line as JSON
    Json,
    /// Human-readable summary
    Pretty,
}
