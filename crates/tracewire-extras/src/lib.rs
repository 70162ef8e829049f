//! # tracewire extras
//!
//! Process-level plumbing for services built on `tracewire-core`:
//!
//! - [`config`]: `.env` loading and typed configuration from environment
//!   variables
//! - [`logging`]: `tracing-subscriber` installation in pretty, compact or
//!   JSON format
//!
//! ```rust,no_run
//! use tracewire_extras::config::{load_dotenv, TracewireConfig};
//! use tracewire_extras::logging::init_logging;
//!
//! load_dotenv();
//! let config = TracewireConfig::from_env().expect("invalid TRACEWIRE_* variables");
//! init_logging(&config.logging());
//! let ids = config.id_generator();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, Environment, IdStrategy, TracewireConfig};
pub use logging::{init_logging, LogFormat, LoggingConfig};
