//! Command-line interface for autosnap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// autosnap - scheduled ZFS snapshots with retention pruning.
#[derive(Parser)]
#[command(name = "autosnap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AUTOSNAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "AUTOSNAP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands. Without one, a single evaluation pass runs.
#[derive(Subcommand)]
pub enum Commands {
    /// Run one evaluation pass over all enabled volumes and exit
    Run,

    /// Show the schedules discovery currently resolves
    List,

    /// Show version information
    Version,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
