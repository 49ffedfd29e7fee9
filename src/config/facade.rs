//! Config loading facade: builds the layered source stack and deserializes it.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::GeneratorConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;

/// Loads [`GeneratorConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace
    ///
    /// Precedence (lowest to highest): defaults, global file, `config/config.toml`,
    /// `config/{SWEEPGEN_ENV}.toml`, `SWEEPGEN__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<GeneratorConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        finish(builder.build()?.try_deserialize()?)
    }

    /// Load configuration from one explicit file (plus environment overrides)
    pub fn load_from_file(path: &Path) -> Result<GeneratorConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?.add_source(File::from(path));
        let builder = environment::add_to_builder(builder);
        finish(builder.build()?.try_deserialize()?)
    }
}

fn finish(config: GeneratorConfig) -> Result<GeneratorConfig, ApiError> {
    config.validate().map_err(|errors| {
        ApiError::ConfigError(format!(
            "Configuration validation failed:\n{}",
            errors.join("\n")
        ))
    })?;
    Ok(config)
}
