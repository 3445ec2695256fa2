// ABOUTME: Environment configuration management for the health sync daemon
// ABOUTME: Reads endpoint, schedule, window anchor, HTTP timeouts, and cycle policies from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration for the sync pipeline

use std::env;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use health_sync_core::constants::{defaults, env_config};
use health_sync_core::models::TimeWindow;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scheduler::SubstrateStatus;

/// Outcome reported to the substrate when delivery was attempted but failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcomePolicy {
    /// Any attempted delivery counts as `NewData`; failures show only in logs
    #[default]
    CycleRan,
    /// Rejected or transport-failed deliveries report `Failed`
    PropagateFailure,
}

impl DeliveryOutcomePolicy {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "propagate_failure" | "propagate" | "strict" => Self::PropagateFailure,
            _ => Self::CycleRan,
        }
    }
}

impl fmt::Display for DeliveryOutcomePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleRan => write!(f, "cycle_ran"),
            Self::PropagateFailure => write!(f, "propagate_failure"),
        }
    }
}

/// Behaviour when a scheduled and a manual cycle overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Overlapping cycles run independently
    #[default]
    Concurrent,
    /// A cycle that finds another in progress is skipped
    SingleFlight,
}

impl OverlapPolicy {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "single_flight" | "single-flight" | "exclusive" => Self::SingleFlight,
            _ => Self::Concurrent,
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concurrent => write!(f, "concurrent"),
            Self::SingleFlight => write!(f, "single_flight"),
        }
    }
}

/// HTTP client timeouts for delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
            connect_timeout_secs: defaults::HTTP_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Registration options handed to the scheduling substrate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Name the background task is defined and registered under
    pub task_id: String,
    /// Minimum interval between firings, in seconds
    pub minimum_interval_secs: u64,
    /// Drop the registration when the app terminates
    pub stop_on_terminate: bool,
    /// Restore the registration after a reboot
    pub start_on_boot: bool,
}

impl ScheduleConfig {
    /// Minimum interval as a `Duration`
    #[must_use]
    pub const fn minimum_interval(&self) -> Duration {
        Duration::from_secs(self.minimum_interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            task_id: defaults::BACKGROUND_TASK_ID.to_owned(),
            minimum_interval_secs: defaults::MINIMUM_INTERVAL_SECS,
            stop_on_terminate: defaults::STOP_ON_TERMINATE,
            start_on_boot: defaults::START_ON_BOOT,
        }
    }
}

/// Complete sync daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Ingestion endpoint the snapshot is posted to
    pub endpoint_url: String,
    /// Fixed start of every query window
    pub window_anchor: DateTime<Utc>,
    /// Background task registration
    pub schedule: ScheduleConfig,
    /// Delivery HTTP timeouts
    pub http: HttpClientConfig,
    /// Outcome mapping for failed deliveries
    pub outcome_policy: DeliveryOutcomePolicy,
    /// Overlap handling between scheduled and manual cycles
    pub overlap_policy: OverlapPolicy,
    /// Status reported by the in-process scheduling substrate
    pub substrate_status: SubstrateStatus,
    /// JSON export file backing the CLI health source
    pub export_path: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint_url: defaults::INGEST_ENDPOINT_URL.to_owned(),
            window_anchor: default_anchor(),
            schedule: ScheduleConfig::default(),
            http: HttpClientConfig::default(),
            outcome_policy: DeliveryOutcomePolicy::default(),
            overlap_policy: OverlapPolicy::default(),
            substrate_status: SubstrateStatus::Available,
            export_path: None,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparsable, or if the
    /// resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        info!("Loading sync configuration from environment variables");

        let window_anchor = TimeWindow::parse_anchor(&env_var_or(
            env_config::WINDOW_ANCHOR,
            defaults::WINDOW_ANCHOR,
        ))
        .with_context(|| format!("{} must be an RFC 3339 instant", env_config::WINDOW_ANCHOR))?;

        let config = Self {
            endpoint_url: env_var_or(env_config::ENDPOINT_URL, defaults::INGEST_ENDPOINT_URL),
            window_anchor,
            schedule: ScheduleConfig {
                task_id: env_var_or(env_config::TASK_ID, defaults::BACKGROUND_TASK_ID),
                minimum_interval_secs: parse_env(
                    env_config::INTERVAL_SECS,
                    defaults::MINIMUM_INTERVAL_SECS,
                )?,
                stop_on_terminate: parse_env(
                    env_config::STOP_ON_TERMINATE,
                    defaults::STOP_ON_TERMINATE,
                )?,
                start_on_boot: parse_env(env_config::START_ON_BOOT, defaults::START_ON_BOOT)?,
            },
            http: HttpClientConfig {
                timeout_secs: parse_env(env_config::HTTP_TIMEOUT_SECS, defaults::HTTP_TIMEOUT_SECS)?,
                connect_timeout_secs: parse_env(
                    env_config::CONNECT_TIMEOUT_SECS,
                    defaults::HTTP_CONNECT_TIMEOUT_SECS,
                )?,
            },
            outcome_policy: DeliveryOutcomePolicy::from_str_or_default(&env_var_or(
                env_config::OUTCOME_POLICY,
                "cycle_ran",
            )),
            overlap_policy: OverlapPolicy::from_str_or_default(&env_var_or(
                env_config::OVERLAP_POLICY,
                "concurrent",
            )),
            substrate_status: SubstrateStatus::from_str_or_default(&env_var_or(
                env_config::SUBSTRATE_STATUS,
                "available",
            )),
            export_path: env::var(env_config::EXPORT_PATH).ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for a non-HTTP endpoint, a zero interval or timeout,
    /// or an anchor in the future
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint_url)
            .with_context(|| format!("Invalid endpoint URL: {}", self.endpoint_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Endpoint URL must use http or https: {}", self.endpoint_url);
        }

        if self.schedule.minimum_interval_secs == 0 {
            anyhow::bail!("Background interval must be greater than 0");
        }

        if self.schedule.task_id.trim().is_empty() {
            anyhow::bail!("Background task id cannot be empty");
        }

        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            anyhow::bail!("HTTP timeouts must be greater than 0");
        }

        if self.window_anchor > Utc::now() {
            anyhow::bail!("Window anchor {} is in the future", self.window_anchor);
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Health Sync Configuration:\n\
             - Endpoint: {}\n\
             - Window Anchor: {}\n\
             - Task: {} every {}s (stop_on_terminate={}, start_on_boot={})\n\
             - HTTP Timeouts: {}s request / {}s connect\n\
             - Outcome Policy: {}\n\
             - Overlap Policy: {}\n\
             - Substrate Status: {}\n\
             - Export Source: {}",
            self.endpoint_url,
            self.window_anchor.to_rfc3339(),
            self.schedule.task_id,
            self.schedule.minimum_interval_secs,
            self.schedule.stop_on_terminate,
            self.schedule.start_on_boot,
            self.http.timeout_secs,
            self.http.connect_timeout_secs,
            self.outcome_policy,
            self.overlap_policy,
            self.substrate_status,
            self.export_path
                .as_ref()
                .map_or_else(|| "not configured".to_owned(), |p| p.display().to_string()),
        )
    }
}

fn default_anchor() -> DateTime<Utc> {
    TimeWindow::parse_anchor(defaults::WINDOW_ANCHOR).unwrap_or_default()
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
