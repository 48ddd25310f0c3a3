//! Configuration sources, lowest precedence first.

pub mod global_file;
pub mod workspace_file;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

/// `STRATAGEN__SECTION__KEY` environment overrides
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("STRATAGEN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
