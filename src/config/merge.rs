//! Merge rules: built-in defaults applied before any file or environment source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("run.total", 225)?
        .set_default("run.seed", 42)?
        .set_default("run.batch_size", 15)?
        .set_default("run.concurrency", 10)?
        .set_default("run.retries", 3)?
        .set_default("run.retry_delay_ms", 500)?
        .set_default("run.duplicate_attempts", 300)?
        .set_default("run.duplicate_policy", "accept")?
        .set_default("output.path", "output/dataset.csv")?
        .set_default("output.bom", true)
}
