//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key; tables merge rather than replace.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("manifest", "pyxperiments.json")?
        .set_default("output_dir", "exps")?
        .set_default("store_file", "hashes.hash")?
        .set_default("runner.command", "cargo run")?
        .set_default("runner.pause_secs", 1)
}
