// ABOUTME: Record aggregator that reads every category over the widening window
// ABOUTME: Fans out one read per category, joins them, and fails whole on any read error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use health_sync_core::errors::{SyncError, SyncResult};
use health_sync_core::models::{HealthSnapshot, MetricCategory, RecordSet, TimeWindow};
use tracing::{debug, info, warn};

use crate::health_source::{HealthDataSource, ReadRecordsOptions};

/// Builds one `HealthSnapshot` per call from the health source
pub struct RecordAggregator {
    source: Arc<dyn HealthDataSource>,
    anchor: DateTime<Utc>,
}

impl RecordAggregator {
    /// Aggregator reading from `anchor` up to the call instant
    #[must_use]
    pub fn new(source: Arc<dyn HealthDataSource>, anchor: DateTime<Utc>) -> Self {
        Self { source, anchor }
    }

    /// Fixed start of every window this aggregator queries
    #[must_use]
    pub const fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    /// Read every category over `(anchor, now)` and assemble a snapshot
    ///
    /// All eight reads are issued concurrently against the same window. The
    /// first failure drops the reads still in flight, so no partial snapshot
    /// is ever returned.
    ///
    /// # Errors
    ///
    /// Returns `ReadFailure` naming the first category whose read failed
    pub async fn collect(&self) -> SyncResult<HealthSnapshot> {
        let window = TimeWindow::ending_now(self.anchor);
        let options = ReadRecordsOptions::for_window(&window);
        debug!(
            start = %options.time_range_filter.start_time,
            end = %options.time_range_filter.end_time,
            "Collecting health records"
        );

        let reads = MetricCategory::ALL
            .into_iter()
            .map(|category| self.read_category(category, &options));
        let entries: BTreeMap<MetricCategory, RecordSet> =
            try_join_all(reads).await?.into_iter().collect();

        let snapshot = HealthSnapshot::from_entries(entries).map_err(|incomplete| {
            let category = incomplete
                .missing
                .first()
                .copied()
                .unwrap_or(MetricCategory::ALL[0]);
            SyncError::read_failure(category, incomplete.to_string())
        })?;

        info!(
            total_records = snapshot.total_records(),
            window_end = %options.time_range_filter.end_time,
            "Health snapshot collected"
        );
        Ok(snapshot)
    }

    async fn read_category(
        &self,
        category: MetricCategory,
        options: &ReadRecordsOptions,
    ) -> SyncResult<(MetricCategory, RecordSet)> {
        match self.source.read_records(category, options).await {
            Ok(result) => {
                debug!(category = %category, count = result.records.len(), "Category read");
                Ok((category, RecordSet::new(result.records)))
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Category read failed");
                Err(SyncError::read_failure(category, e.to_string()))
            }
        }
    }
}
