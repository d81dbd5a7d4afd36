//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("resolver.ancestry_walk", true)?
        .set_default("resolver.max_ancestry_depth", 256i64)?
        .set_default("resolver.validate_editors", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")
}
