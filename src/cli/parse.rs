//! CLI parse: clap types for sweepgen. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sweepgen CLI - Incremental experiment config generation
#[derive(Parser)]
#[command(name = "sweepgen")]
#[command(about = "Generate experiment configs and run scripts from parameter sweeps")]
pub struct Cli {
    /// Command to run (default: generate)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace root directory (manifest and base configs are read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

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

    /// Log output (stdout, stderr)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Generate configs and scripts for every changed sweep
    Generate {
        /// Regenerate every sweep even if nothing changed
        #[arg(long)]
        force: bool,
    },
    /// Show which sweeps would be regenerated, without writing anything
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

impl Cli {
    /// The subcommand to run; bare invocation means `generate`
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Generate { force: false })
    }
}
