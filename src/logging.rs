// ABOUTME: Logging configuration and structured logging setup for the sync daemon
// ABOUTME: Configures log levels, formatters, and per-cycle diagnostic events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging with `tracing`
//!
//! Every sync failure is swallowed at the cycle boundary, so these logs are the
//! only place a user can see why a cycle failed.

use std::env;
use std::io;

use anyhow::{anyhow, Result};
use health_sync_core::constants::service_names;
use health_sync_core::errors::SyncError;
use health_sync_core::models::{SyncOutcome, SyncTrigger};
use serde_json::json;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Emit span open/close events (shows per-cycle timing)
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for log shipping
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for constrained terminals
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: service_names::HEALTH_SYNC.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: is_production || env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::HEALTH_SYNC.into()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_owned()),
            environment,
        }
    }

    /// Override the level, e.g. from a `--verbose` flag
    #[must_use]
    pub fn with_level(mut self, level: &str) -> Self {
        level.clone_into(&mut self.level);
        self
    }

    fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").map_or_else(
            |_| EnvFilter::new(&self.level),
            |directive| EnvFilter::new(&directive),
        );
        base.add_directive(
            "hyper=warn"
                .parse()
                .unwrap_or_else(|_| Level::WARN.into()),
        )
        .add_directive(
            "reqwest=warn"
                .parse()
                .unwrap_or_else(|_| Level::WARN.into()),
        )
        .add_directive(
            format!("health_sync={}", self.level)
                .parse()
                .unwrap_or_else(|_| Level::INFO.into()),
        )
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        let installed = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_target(true)
                        .with_writer(io::stdout)
                        .with_span_events(self.span_events())
                        .json(),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_target(true)
                        .with_writer(io::stdout)
                        .with_span_events(self.span_events()),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stdout)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init(),
        };
        installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Health sync starting up"
        );

        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "spans": self.include_spans
            }
        });
        info!("Logging configured: {}", config_summary);
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Sync-specific diagnostic events
pub struct SyncLogger;

impl SyncLogger {
    /// Log the terminal outcome of a cycle
    pub fn log_cycle_outcome(trigger: SyncTrigger, outcome: SyncOutcome, duration_ms: u64) {
        match outcome {
            SyncOutcome::Failed => warn!(
                sync.trigger = %trigger,
                sync.outcome = %outcome,
                sync.duration_ms = duration_ms,
                "Sync cycle finished"
            ),
            SyncOutcome::NewData | SyncOutcome::NoData => info!(
                sync.trigger = %trigger,
                sync.outcome = %outcome,
                sync.duration_ms = duration_ms,
                "Sync cycle finished"
            ),
        }
    }

    /// Log the error that stopped a cycle
    pub fn log_cycle_error(trigger: SyncTrigger, err: &SyncError) {
        match err {
            SyncError::Rejected {
                status,
                status_text,
            } => warn!(
                sync.trigger = %trigger,
                http.status = status,
                http.status_text = %status_text,
                "Sink rejected health data"
            ),
            SyncError::CycleInProgress => info!(
                sync.trigger = %trigger,
                "Skipping sync cycle: {err}"
            ),
            _ => error!(sync.trigger = %trigger, error = %err, "Sync cycle failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_logging_env() {
        for key in [
            "RUST_LOG",
            "LOG_FORMAT",
            "ENVIRONMENT",
            "LOG_INCLUDE_LOCATION",
            "LOG_INCLUDE_SPANS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_logging_env();
        let config = LoggingConfig::from_env();

        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.include_spans);
        assert_eq!(config.service_name, service_names::HEALTH_SYNC);
    }

    #[test]
    #[serial]
    fn test_production_enables_location_and_spans() {
        clear_logging_env();
        env::set_var("ENVIRONMENT", "production");
        env::set_var("LOG_FORMAT", "json");

        let config = LoggingConfig::from_env();
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_location);
        assert!(config.include_spans);
        assert_eq!(config.span_events(), FmtSpan::NEW | FmtSpan::CLOSE);

        clear_logging_env();
    }

    #[test]
    fn test_with_level_overrides_level() {
        let config = LoggingConfig::default().with_level("debug");
        assert_eq!(config.level, "debug");
    }
}
