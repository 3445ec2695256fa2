// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Wire keys, default values, and environment variable names for health-sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by the concern that reads them.

/// Keys and literals that appear on the wire
pub mod wire {
    /// Top-level key wrapping the snapshot in the delivery body
    pub const HEALTH_DATA_KEY: &str = "healthData";
    /// Time range filter operator used for every category read
    pub const BETWEEN_OPERATOR: &str = "between";
    /// Access type requested for every category
    pub const READ_ACCESS: &str = "read";
    /// JSON content type for delivery requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Default values used when configuration is absent
pub mod defaults {
    /// Ingestion endpoint the snapshot is posted to
    pub const INGEST_ENDPOINT_URL: &str = "http://localhost:5678/webhook/health-sync";
    /// Fixed start of every query window
    pub const WINDOW_ANCHOR: &str = "2023-09-01T00:00:00Z";
    /// Name the background task is defined and registered under
    pub const BACKGROUND_TASK_ID: &str = "background-fetch-task";
    /// Minimum interval between background firings, in seconds
    pub const MINIMUM_INTERVAL_SECS: u64 = 60;
    /// Whether the registration is dropped when the app terminates
    pub const STOP_ON_TERMINATE: bool = false;
    /// Whether the registration is restored after a device reboot
    pub const START_ON_BOOT: bool = true;
    /// HTTP request timeout, in seconds
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    /// HTTP connect timeout, in seconds
    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Environment variable names read by `SyncConfig::from_env`
pub mod env_config {
    /// Ingestion endpoint override
    pub const ENDPOINT_URL: &str = "HEALTH_SYNC_ENDPOINT_URL";
    /// Background interval override
    pub const INTERVAL_SECS: &str = "HEALTH_SYNC_INTERVAL_SECS";
    /// Query window anchor override (RFC 3339)
    pub const WINDOW_ANCHOR: &str = "HEALTH_SYNC_WINDOW_ANCHOR";
    /// Background task name override
    pub const TASK_ID: &str = "HEALTH_SYNC_TASK_ID";
    /// Registration flag: drop on terminate
    pub const STOP_ON_TERMINATE: &str = "HEALTH_SYNC_STOP_ON_TERMINATE";
    /// Registration flag: restore on boot
    pub const START_ON_BOOT: &str = "HEALTH_SYNC_START_ON_BOOT";
    /// HTTP request timeout
    pub const HTTP_TIMEOUT_SECS: &str = "HEALTH_SYNC_HTTP_TIMEOUT_SECS";
    /// HTTP connect timeout
    pub const CONNECT_TIMEOUT_SECS: &str = "HEALTH_SYNC_CONNECT_TIMEOUT_SECS";
    /// Outcome reported for failed deliveries
    pub const OUTCOME_POLICY: &str = "HEALTH_SYNC_OUTCOME_POLICY";
    /// Behaviour when cycles overlap
    pub const OVERLAP_POLICY: &str = "HEALTH_SYNC_OVERLAP_POLICY";
    /// Status the in-process substrate reports
    pub const SUBSTRATE_STATUS: &str = "HEALTH_SYNC_SUBSTRATE_STATUS";
    /// JSON export file backing the CLI health source
    pub const EXPORT_PATH: &str = "HEALTH_SYNC_EXPORT_PATH";
}

/// Service identity used in structured logs
pub mod service_names {
    /// Service name for the sync daemon
    pub const HEALTH_SYNC: &str = "health-sync";
}
