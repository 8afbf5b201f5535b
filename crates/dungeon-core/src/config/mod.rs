//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional TOML file and `DUNGEON__`-prefixed environment variables.
//! Each sub-module represents a logical configuration section.

pub mod logging;
pub mod pool;
pub mod roster;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::pool::PoolConfig;
pub use self::roster::RosterConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Instance pool settings.
    #[serde(default)]
    pub pool: PoolConfig,
    /// Player roster fed to matchmaking.
    #[serde(default)]
    pub roster: RosterConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// A missing file is not an error; every field has a default.
    /// Environment variables such as `DUNGEON__POOL__MAX_INSTANCES=4`
    /// override file values.
    pub fn load(path: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DUNGEON")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(path = %path, pool = ?loaded.pool, "Configuration loaded");
        Ok(loaded)
    }

    /// Check every section for values that cannot drive a simulation.
    pub fn validate(&self) -> AppResult<()> {
        self.pool.validate()?;
        self.logging.validate()
    }
}
