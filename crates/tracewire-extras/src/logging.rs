//! Logging bootstrap
//!
//! Installs a global `tracing` subscriber: an `EnvFilter` (where `RUST_LOG`
//! overrides the configured level) and a `fmt` layer in the selected format.

use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output, for development
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// Newline-delimited JSON, including the current span's fields
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Service name logged once the subscriber is installed
    pub service_name: String,
    /// Filter directive, e.g. `"info"` or `"info,tracewire_core=debug"`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("tracewire")
    }
}

impl LoggingConfig {
    /// Create a config at level `info` in pretty format
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }

    /// Set the filter directive
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Install the global subscriber described by `config`.
///
/// Returns `false` if a global subscriber was already set, in which case the
/// existing one is kept.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.filter());

    let installed = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    }
    .is_ok();

    if installed {
        tracing::info!(
            service = %config.service_name,
            format = ?config.format,
            "logging initialized"
        );
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = LoggingConfig::new("svc").level("debug").format(LogFormat::Json);
        assert_eq!(config.service_name, "svc");
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_second_init_keeps_existing_subscriber() {
        init_logging(&LoggingConfig::default().format(LogFormat::Compact));
        assert!(!init_logging(&LoggingConfig::default()));
    }
}
