//! Environment source: SWEEPGEN__OUTPUT_DIR, SWEEPGEN__RUNNER__PAUSE_SECS, ...

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add `SWEEPGEN__`-prefixed environment variables; `__` separates nested keys.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("SWEEPGEN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
