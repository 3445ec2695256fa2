// ABOUTME: Health data source reading records from a JSON export file
// ABOUTME: Re-reads the export on every initialize and filters reads by time window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use health_sync_core::constants::wire::{BETWEEN_OPERATOR, READ_ACCESS};
use health_sync_core::errors::{SourceError, SourceResult};
use health_sync_core::models::{MetricCategory, PermissionGrant, PermissionRequest, TimeWindow};
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{HealthDataSource, ReadRecordsOptions, ReadRecordsResult};

/// Record fields checked, in order, for the instant a record belongs to
const TIMESTAMP_FIELDS: [&str; 2] = ["time", "startTime"];

/// Parsed export file
///
/// ```json
/// { "granted": ["Steps", "HeartRate"], "Steps": [{"count": 900, "startTime": "..."}] }
/// ```
///
/// A missing `granted` list means every category is granted. Categories
/// absent from the file read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
struct ExportDocument {
    #[serde(default)]
    granted: Option<Vec<MetricCategory>>,
    #[serde(flatten)]
    records: HashMap<String, Vec<Value>>,
}

impl ExportDocument {
    fn is_granted(&self, category: MetricCategory) -> bool {
        self.granted
            .as_ref()
            .is_none_or(|granted| granted.contains(&category))
    }
}

/// `HealthDataSource` over a JSON export on disk
pub struct JsonExportSource {
    path: PathBuf,
    document: RwLock<Option<ExportDocument>>,
}

impl JsonExportSource {
    /// Source for the export at `path`; nothing is read until `initialize`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: RwLock::new(None),
        }
    }

    /// Export file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HealthDataSource for JsonExportSource {
    fn name(&self) -> &str {
        "json_export"
    }

    async fn initialize(&self) -> SourceResult<bool> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Health export file not found");
                *self.document.write().await = None;
                return Ok(false);
            }
            Err(e) => return Err(SourceError::Unavailable(e.to_string())),
        };

        let document: ExportDocument = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::Malformed(format!("{}: {e}", self.path.display())))?;
        info!(
            path = %self.path.display(),
            record_types = document.records.len(),
            "Health export loaded"
        );
        *self.document.write().await = Some(document);
        Ok(true)
    }

    async fn request_permission(
        &self,
        requests: &[PermissionRequest],
    ) -> SourceResult<Vec<PermissionGrant>> {
        let guard = self.document.read().await;
        let document = guard
            .as_ref()
            .ok_or_else(|| SourceError::Unavailable("export not initialized".to_owned()))?;

        Ok(requests
            .iter()
            .filter(|request| request.access_type == READ_ACCESS)
            .filter(|request| document.is_granted(request.record_type))
            .map(|request| PermissionGrant {
                access_type: request.access_type.clone(),
                record_type: request.record_type,
            })
            .collect())
    }

    async fn read_records(
        &self,
        category: MetricCategory,
        options: &ReadRecordsOptions,
    ) -> SourceResult<ReadRecordsResult> {
        let window = parse_filter(options)?;

        let guard = self.document.read().await;
        let document = guard
            .as_ref()
            .ok_or_else(|| SourceError::Unavailable("export not initialized".to_owned()))?;

        // The platform raises for ungranted reads rather than returning empty
        if !document.is_granted(category) {
            return Err(SourceError::Platform(format!(
                "read permission for {category} not granted"
            )));
        }

        let records: Vec<Value> = document
            .records
            .get(category.record_type())
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record_instant(record).is_none_or(|at| window.contains(at)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(category = %category, count = records.len(), "Export records read");
        Ok(ReadRecordsResult { records })
    }
}

fn parse_filter(options: &ReadRecordsOptions) -> SourceResult<TimeWindow> {
    let filter = &options.time_range_filter;
    if filter.operator != BETWEEN_OPERATOR {
        return Err(SourceError::Malformed(format!(
            "unsupported time range operator: {}",
            filter.operator
        )));
    }
    let start = TimeWindow::parse_anchor(&filter.start_time)
        .map_err(|e| SourceError::Malformed(format!("startTime: {e}")))?;
    let end = TimeWindow::parse_anchor(&filter.end_time)
        .map_err(|e| SourceError::Malformed(format!("endTime: {e}")))?;
    Ok(TimeWindow::new(start, end))
}

fn record_instant(record: &Value) -> Option<DateTime<Utc>> {
    TIMESTAMP_FIELDS
        .iter()
        .filter_map(|field| record.get(field).and_then(Value::as_str))
        .find_map(|raw| TimeWindow::parse_anchor(raw).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_export(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{value}").unwrap();
        file
    }

    fn september_window() -> ReadRecordsOptions {
        ReadRecordsOptions::for_window(&TimeWindow::new(
            Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 9, 30, 0, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_missing_file_does_not_initialize() {
        let source = JsonExportSource::new("/nonexistent/health-export.json");
        assert!(!source.initialize().await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let source = JsonExportSource::new(file.path());
        assert!(matches!(
            source.initialize().await,
            Err(SourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_filter_by_window() {
        let file = write_export(&json!({
            "Steps": [
                {"count": 10, "startTime": "2023-08-31T23:00:00Z"},
                {"count": 20, "startTime": "2023-09-10T08:00:00Z"},
                {"count": 30}
            ]
        }));
        let source = JsonExportSource::new(file.path());
        assert!(source.initialize().await.unwrap());

        let result = source
            .read_records(MetricCategory::Steps, &september_window())
            .await
            .unwrap();
        assert_eq!(
            result.records,
            vec![
                json!({"count": 20, "startTime": "2023-09-10T08:00:00Z"}),
                json!({"count": 30})
            ]
        );

        let empty = source
            .read_records(MetricCategory::Weight, &september_window())
            .await
            .unwrap();
        assert!(empty.records.is_empty());
    }

    #[tokio::test]
    async fn test_granted_list_limits_permissions_and_reads() {
        let file = write_export(&json!({"granted": ["Steps"], "Steps": []}));
        let source = JsonExportSource::new(file.path());
        source.initialize().await.unwrap();

        let grants = source
            .request_permission(&PermissionRequest::read_all())
            .await
            .unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].record_type, MetricCategory::Steps);

        let denied = source
            .read_records(MetricCategory::HeartRate, &september_window())
            .await;
        assert!(matches!(denied, Err(SourceError::Platform(_))));
    }

    #[tokio::test]
    async fn test_reads_before_initialize_fail() {
        let source = JsonExportSource::new("/nonexistent/health-export.json");
        let result = source
            .read_records(MetricCategory::Steps, &september_window())
            .await;
        assert!(matches!(result, Err(SourceError::Unavailable(_))));
    }
}
