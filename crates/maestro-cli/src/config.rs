//! Configuration for the maestro CLI.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`MAESTRO_` prefix, `__` between nested keys,
//!    e.g. `MAESTRO_NEO4J__URI`)
//! 2. Config file (`maestro.toml`, or the prefix given with `--config`)
//! 3. Defaults

use serde::Deserialize;

use maestro_graph::GraphConfig;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// `[neo4j]` connection settings.
    #[serde(default)]
    pub neo4j: GraphConfig,
}

/// Load configuration from `<file_prefix>.{toml,json,yaml,...}` and the environment.
///
/// A missing file is not an error.
pub fn load_config(file_prefix: &str) -> anyhow::Result<AppConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("MAESTRO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(cfg.try_deserialize()?)
}
