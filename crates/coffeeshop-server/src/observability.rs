//! Structured logging setup
//!
//! # Example
//!
//! ```rust,no_run
//! use coffeeshop_server::observability::{LogFormat, ObservabilityConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! ObservabilityConfig::default()
//!     .with_log_level("info,coffeeshop=trace")
//!     .with_format(LogFormat::Json)
//!     .init()?;
//! # Ok(())
//! # }
//! ```

use clap::ValueEnum;
use tracing::info;
use tracing_subscriber::{
    Registry, filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Default filter when neither `RUST_LOG` nor a level is configured
pub const DEFAULT_LOG_LEVEL: &str = "info,coffeeshop=debug";

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Service version attached to the startup event
    pub service_version: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "coffeeshop-server".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl ObservabilityConfig {
    /// Set the filter directive
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Build the filter: `RUST_LOG` if set and valid, otherwise the
    /// configured level.
    ///
    /// # Errors
    ///
    /// Returns [`ObservabilityError::InvalidFilter`] if the configured level
    /// is not a valid directive.
    pub fn env_filter(&self) -> Result<EnvFilter, ObservabilityError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .map_err(|e| ObservabilityError::InvalidFilter(e.to_string()))
    }

    /// Install the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`ObservabilityError`] if the filter is invalid or a global
    /// subscriber is already installed.
    pub fn init(self) -> Result<(), ObservabilityError> {
        let env_filter = self.env_filter()?;
        let registry = Registry::default().with(env_filter);

        match self.format {
            LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .try_init(),
        }
        .map_err(|e| ObservabilityError::InitializationFailed(e.to_string()))?;

        info!(
            service_name = %self.service_name,
            service_version = %self.service_version,
            format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Logging setup error
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    /// Filter directive could not be parsed
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// Subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.service_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_configured_level_is_a_valid_filter() {
        let config = ObservabilityConfig::default().with_log_level("warn,coffeeshop_auth=trace");
        assert!(config.env_filter().is_ok());
    }
}
