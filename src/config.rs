//! Configuration System
//!
//! Layered configuration for the generator: built-in defaults, a user-level file, workspace
//! files, then `SWEEPGEN__*` environment variables. The defaults reproduce the conventional
//! layout (`pyxperiments.json` manifest, `exps/` output directory), so no file is required.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Manifest path, relative to the workspace root
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Output directory, relative to the workspace root
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Fingerprint store file name inside the output directory
    #[serde(default = "default_store_file")]
    pub store_file: String,

    /// How generated run commands invoke the external tool
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External tool invocation used in generated run commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Command placed before the config file name
    #[serde(default = "default_command")]
    pub command: String,

    /// Seconds to sleep between announcing and running a config
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("pyxperiments.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exps")
}

fn default_store_file() -> String {
    "hashes.hash".to_string()
}

fn default_command() -> String {
    "cargo run".to_string()
}

fn default_pause_secs() -> u64 {
    1
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            pause_secs: default_pause_secs(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            output_dir: default_output_dir(),
            store_file: default_store_file(),
            runner: RunnerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Validate the configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.manifest.as_os_str().is_empty() {
            errors.push("Manifest path cannot be empty".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            errors.push("Output directory cannot be empty".to_string());
        } else if !is_plain_subdirectory(&self.output_dir) {
            // Aggregate scripts `cd` back out by counting components.
            errors.push(format!(
                "Output directory '{}' must be a relative subdirectory without '..'",
                self.output_dir.display()
            ));
        }
        if self.store_file.is_empty() {
            errors.push("Store file name cannot be empty".to_string());
        } else if self.store_file.ends_with(".json") {
            // The output directory is cleared of *.json at the start of every run.
            errors.push(format!(
                "Store file '{}' must not use the .json extension",
                self.store_file
            ));
        } else if self.store_file.contains('/') {
            errors.push("Store file must be a plain file name".to_string());
        }
        if self.runner.command.trim().is_empty() {
            errors.push("Runner command cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Manifest location for a workspace
    pub fn manifest_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.manifest)
    }

    /// Output directory for a workspace
    pub fn output_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.output_dir)
    }

    /// Fingerprint store location for a workspace
    pub fn store_path(&self, workspace_root: &Path) -> PathBuf {
        self.output_path(workspace_root).join(&self.store_file)
    }
}

fn is_plain_subdirectory(dir: &Path) -> bool {
    dir.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && dir.components().any(|c| matches!(c, Component::Normal(_)))
}
