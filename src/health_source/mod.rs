// ABOUTME: Health data source abstraction consumed by the sync pipeline
// ABOUTME: Defines the initialize/permission/read contract and its wire types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Health Data Source
//!
//! The device health store is an external collaborator. The pipeline only sees
//! this trait: initialize the client, request read permission for a batch of
//! categories, and read one category over a time range.
//!
//! Records are never interpreted here. Whatever the source puts in `records`
//! travels to the sink unchanged.

/// Health source backed by a JSON export file
pub mod json_export;

pub use json_export::JsonExportSource;

use async_trait::async_trait;
use health_sync_core::constants::wire::BETWEEN_OPERATOR;
use health_sync_core::errors::SourceResult;
use health_sync_core::models::{MetricCategory, PermissionGrant, PermissionRequest, TimeWindow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `timeRangeFilter` of a read query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeFilter {
    /// Range operator, always `"between"` for sync reads
    pub operator: String,
    /// ISO-8601 start bound
    pub start_time: String,
    /// ISO-8601 end bound
    pub end_time: String,
}

impl TimeRangeFilter {
    /// Inclusive filter covering `window`
    #[must_use]
    pub fn between(window: &TimeWindow) -> Self {
        Self {
            operator: BETWEEN_OPERATOR.to_owned(),
            start_time: window.start_iso(),
            end_time: window.end_iso(),
        }
    }
}

/// Options passed with every `read_records` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRecordsOptions {
    /// Time range the read covers
    pub time_range_filter: TimeRangeFilter,
}

impl ReadRecordsOptions {
    /// Options for a `between` read over `window`
    #[must_use]
    pub fn for_window(window: &TimeWindow) -> Self {
        Self {
            time_range_filter: TimeRangeFilter::between(window),
        }
    }
}

/// Response of a `read_records` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadRecordsResult {
    /// Records in source order
    #[serde(default)]
    pub records: Vec<Value>,
}

/// Device-local health data store
///
/// Implementations must tolerate `initialize` being called on every cycle and
/// must not block waiting for user interaction when asked for permissions from
/// a background context.
#[async_trait]
pub trait HealthDataSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Start (or confirm) the client; `Ok(false)` means it could not start
    ///
    /// # Errors
    /// Returns an error if the platform raised while starting
    async fn initialize(&self) -> SourceResult<bool>;

    /// Request access for a batch of categories, returning what was granted
    ///
    /// # Errors
    /// Returns an error if the platform raised during the request
    async fn request_permission(
        &self,
        requests: &[PermissionRequest],
    ) -> SourceResult<Vec<PermissionGrant>>;

    /// Read one category's records over the filter's time range
    ///
    /// # Errors
    /// Returns an error if the query fails or times out
    async fn read_records(
        &self,
        category: MetricCategory,
        options: &ReadRecordsOptions,
    ) -> SourceResult<ReadRecordsResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_read_options_wire_shape() {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        );
        let value = serde_json::to_value(ReadRecordsOptions::for_window(&window)).unwrap();
        assert_eq!(
            value,
            json!({
                "timeRangeFilter": {
                    "operator": "between",
                    "startTime": "2023-09-01T00:00:00.000Z",
                    "endTime": "2024-01-01T08:00:00.000Z"
                }
            })
        );
    }
}
