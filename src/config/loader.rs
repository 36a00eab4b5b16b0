//! Configuration Loader
//!
//! Layered loading of [`PoolConfig`]: built-in defaults, then an optional TOML
//! file, then environment variables (`FANOUT_WORKER_COUNT`, `FANOUT_LABEL`, ...).
//! The merged result is validated before it is returned.

use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

use super::error::ConfigResult;
use super::PoolConfig;
use crate::constants::ENV_PREFIX;

impl PoolConfig {
    /// Load configuration using the default `FANOUT` environment prefix
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration with an explicit environment prefix.
    /// This is useful for testing without touching the default variables.
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> ConfigResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("Loading pool configuration from file: {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(env_prefix).try_parsing(true));

        let config: PoolConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            "Pool configuration loaded: {}",
            serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(config)
    }
}
