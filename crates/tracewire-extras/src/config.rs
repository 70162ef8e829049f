//! Configuration management with environment variable support.
//!
//! Settings come from `TRACEWIRE_*` environment variables, optionally
//! seeded from a `.env` file:
//!
//! | variable | default |
//! |---|---|
//! | `TRACEWIRE_ENV` | `development` |
//! | `TRACEWIRE_SERVICE_NAME` | `tracewire` |
//! | `TRACEWIRE_LOG_LEVEL` | `debug` in development, `info` otherwise |
//! | `TRACEWIRE_LOG_FORMAT` | `pretty` (`compact`, `json`) |
//! | `TRACEWIRE_ID_STRATEGY` | `random64` (`sequential`, `random128`, `timestamped`) |
//! | `TRACEWIRE_ID_SEED` | unset (seed from OS entropy) |
//!
//! # Example
//!
//! ```ignore
//! use tracewire_extras::config::{load_dotenv, Config};
//! use serde::Deserialize;
//!
//! load_dotenv();
//!
//! #[derive(Deserialize)]
//! struct ListenConfig {
//!     port: u16,
//! }
//!
//! // Reads LISTEN_PORT
//! let config = Config::<ListenConfig>::from_env_prefixed("LISTEN")?;
//! ```

use crate::logging::{LogFormat, LoggingConfig};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracewire_core::{IdGenerator, RandomIdGenerator, RandomStrategy, SequentialIdGenerator};

/// Prefix of every tracewire environment variable
pub const ENV_PREFIX: &str = "TRACEWIRE";

/// Error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable deserialization failed.
    #[error("Configuration error: {0}")]
    EnvyError(#[from] envy::Error),
    /// The `.env` file exists but could not be read.
    #[error("Failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// Load a `.env` file from the current directory or its parents.
///
/// Variables already set in the process environment are not overridden.
/// Returns the path of the loaded file, or `None` if there was none.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load a specific `.env` file.
pub fn load_dotenv_from(path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
    let path = path.as_ref();
    dotenvy::from_path(path)?;
    Ok(path.to_path_buf())
}

/// Environment profile for the application.
///
/// Detected from the `TRACEWIRE_ENV` environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Development environment with debug logging.
    Development,
    /// Production environment.
    Production,
    /// Custom environment name for specialized deployments.
    Custom(String),
}

impl Environment {
    /// Detect the current environment from `TRACEWIRE_ENV`.
    ///
    /// - `Production` for "production" or "prod"
    /// - `Development` for "development", "dev", or when unset
    /// - `Custom(name)` for any other value
    pub fn current() -> Self {
        match std::env::var("TRACEWIRE_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::Production,
            Ok("development") | Ok("dev") => Self::Development,
            Ok(other) => Self::Custom(other.to_string()),
            Err(_) => Self::Development,
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Get the environment name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Default log level: "debug" in development, "info" otherwise.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Production | Self::Custom(_) => "info",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed configuration deserialized from environment variables.
///
/// Field names map to SCREAMING_SNAKE_CASE variable names.
#[derive(Debug, Clone)]
pub struct Config<T>(pub T);

impl<T: DeserializeOwned> Config<T> {
    /// Load configuration from unprefixed environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        envy::from_env::<T>().map(Config).map_err(ConfigError::from)
    }

    /// Load configuration from variables starting with `{prefix}_`.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        envy::prefixed(format!("{}_", prefix))
            .from_env::<T>()
            .map(Config)
            .map_err(ConfigError::from)
    }

    /// Get the inner configuration value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Identifier generation strategy selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Deterministic counters starting at 1. Test use only.
    Sequential,
    /// Random 64-bit trace IDs
    #[default]
    Random64,
    /// Random 128-bit trace IDs
    Random128,
    /// 128-bit trace IDs prefixed with the current unix time
    Timestamped,
}

/// Settings for a tracewire service, read from `TRACEWIRE_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TracewireConfig {
    /// Service name attached to log output
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Log filter directive; falls back to the environment's default
    #[serde(default)]
    pub log_level: Option<String>,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
    /// Identifier generation strategy
    #[serde(default)]
    pub id_strategy: IdStrategy,
    /// Fixed seed for the random strategies
    #[serde(default)]
    pub id_seed: Option<u64>,
}

fn default_service_name() -> String {
    "tracewire".to_string()
}

impl Default for TracewireConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: None,
            log_format: LogFormat::default(),
            id_strategy: IdStrategy::default(),
            id_seed: None,
        }
    }
}

impl TracewireConfig {
    /// Load from `TRACEWIRE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::<Self>::from_env_prefixed(ENV_PREFIX).map(Config::into_inner)
    }

    /// Effective log level
    pub fn log_level(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| Environment::current().default_log_level().to_string())
    }

    /// Logging settings derived from this configuration
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::new(&self.service_name)
            .level(self.log_level())
            .format(self.log_format)
    }

    /// Build the configured identifier generator.
    ///
    /// The result is not synchronized; wrap it in a
    /// [`SharedIdGenerator`](tracewire_core::SharedIdGenerator) to share it.
    pub fn id_generator(&self) -> Box<dyn IdGenerator + Send> {
        let strategy = match self.id_strategy {
            IdStrategy::Sequential => return Box::new(SequentialIdGenerator::new()),
            IdStrategy::Random64 => RandomStrategy::Random64,
            IdStrategy::Random128 => RandomStrategy::Random128,
            IdStrategy::Timestamped => RandomStrategy::Timestamped,
        };
        match self.id_seed {
            Some(seed) => Box::new(RandomIdGenerator::with_seed(strategy, seed)),
            None => Box::new(RandomIdGenerator::new(strategy)),
        }
    }
}
