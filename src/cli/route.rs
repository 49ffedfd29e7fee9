//! CLI route: single route table and run context. Dispatches to the planner and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_generate_summary, format_status_json, format_status_text};
use crate::config::{ConfigLoader, GeneratorConfig};
use crate::error::ApiError;
use crate::planner::ExperimentPlanner;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Runtime context for CLI execution: workspace root and resolved configuration.
pub struct CliContext {
    workspace_root: PathBuf,
    config: GeneratorConfig,
}

impl CliContext {
    /// Create context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    /// Create context from an already resolved configuration
    pub fn with_config(workspace_root: PathBuf, config: GeneratorConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let planner = ExperimentPlanner::new(self.workspace_root.clone(), &self.config);
        let output = match command {
            Commands::Generate { force } => {
                let report = planner.generate(*force)?;
                format_generate_summary(&report)
            }
            Commands::Status { format } => {
                let report = planner.status()?;
                if format == "json" {
                    format_status_json(&report)?
                } else {
                    format_status_text(&report)
                }
            }
        };
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        Ok(output)
    }
}
