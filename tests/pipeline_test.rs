// ABOUTME: Integration tests for the sync cycle against a mocked ingestion endpoint
// ABOUTME: Covers gate failures, read failures, delivery classification, and cycle policies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::DateTime;
use common::{ingest_url, pipeline_for, test_config, InitBehavior, RecordingSource};
use health_sync::aggregator::RecordAggregator;
use health_sync::config::{DeliveryOutcomePolicy, OverlapPolicy};
use health_sync::delivery::{Delivered, DeliveryClient};
use health_sync::errors::SyncError;
use health_sync::models::{MetricCategory, SyncOutcome, SyncTrigger};
use serde_json::{json, Value};
use tokio::time::sleep;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_sink(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/webhook/health-sync"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scheduled_cycle_delivers_full_snapshot() -> Result<()> {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 1).await;

    let source = RecordingSource::granting_all();
    source.set_records(
        MetricCategory::HeartRate,
        vec![json!({ "time": "2024-01-15T10:00:00Z", "beatsPerMinute": 62 })],
    );
    let config = test_config(&ingest_url(&server.uri()));
    let pipeline = pipeline_for(Arc::clone(&source), &config);

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.trigger, SyncTrigger::Scheduled);
    assert_eq!(report.outcome, SyncOutcome::NewData);
    assert_eq!(report.delivered, Some(Delivered { status: 200 }));
    assert!(report.error.is_none());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json()?;
    let health_data = body["healthData"].as_object().unwrap();
    assert_eq!(health_data.len(), 8);
    for category in MetricCategory::ALL {
        assert!(
            health_data.contains_key(category.snapshot_key()),
            "missing {}",
            category.snapshot_key()
        );
    }
    assert_eq!(health_data["heartRate"][0]["beatsPerMinute"], 62);
    Ok(())
}

#[tokio::test]
async fn test_each_category_read_once_over_anchored_window() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 1).await;

    let source = RecordingSource::granting_all();
    let config = test_config(&ingest_url(&server.uri()));
    let pipeline = pipeline_for(Arc::clone(&source), &config);

    pipeline.run_scheduled().await;

    let reads = source.reads();
    assert_eq!(reads.len(), MetricCategory::ALL.len());

    let mut categories: Vec<MetricCategory> = reads.iter().map(|(c, _)| *c).collect();
    categories.sort();
    categories.dedup();
    assert_eq!(categories.len(), MetricCategory::ALL.len());

    let filter = &reads[0].1.time_range_filter;
    for (_, options) in &reads {
        assert_eq!(options.time_range_filter.operator, "between");
        assert_eq!(options.time_range_filter.start_time, "2023-09-01T00:00:00.000Z");
        assert_eq!(&options.time_range_filter, filter, "one window per cycle");
    }
}

#[tokio::test]
async fn test_window_end_does_not_move_backwards() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 2).await;

    let source = RecordingSource::granting_all();
    let config = test_config(&ingest_url(&server.uri()));
    let pipeline = pipeline_for(Arc::clone(&source), &config);

    pipeline.run_scheduled().await;
    sleep(Duration::from_millis(5)).await;
    pipeline.run_scheduled().await;

    let reads = source.reads();
    let first_end = &reads[0].1.time_range_filter.end_time;
    let last_end = &reads[reads.len() - 1].1.time_range_filter.end_time;
    let first = DateTime::parse_from_rfc3339(first_end).unwrap();
    let last = DateTime::parse_from_rfc3339(last_end).unwrap();
    assert!(last >= first);
    assert_eq!(
        reads[0].1.time_range_filter.start_time,
        reads[reads.len() - 1].1.time_range_filter.start_time
    );
}

#[tokio::test]
async fn test_initialization_false_stops_cycle_before_reads() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 0).await;

    let source = RecordingSource::granting_all();
    source.set_init(InitBehavior::ReportsFalse);
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.outcome, SyncOutcome::Failed);
    assert!(matches!(
        report.error,
        Some(SyncError::InitializationFailure { .. })
    ));
    assert_eq!(source.permission_calls(), 0);
    assert_eq!(source.read_count(), 0);
}

#[tokio::test]
async fn test_initialization_error_is_initialization_failure() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 0).await;

    let source = RecordingSource::granting_all();
    source.set_init(InitBehavior::Raises);
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.outcome, SyncOutcome::Failed);
    assert!(matches!(
        report.error,
        Some(SyncError::InitializationFailure { .. })
    ));
    assert_eq!(source.read_count(), 0);
}

#[tokio::test]
async fn test_empty_grant_list_is_permission_denied() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 0).await;

    let source = RecordingSource::granting_all();
    source.set_granted(Some(Vec::new()));
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.outcome, SyncOutcome::Failed);
    assert!(matches!(report.error, Some(SyncError::PermissionDenied { .. })));
    assert_eq!(source.read_count(), 0);
    assert!(!pipeline.gate().has_been_ready());
}

#[tokio::test]
async fn test_failed_permission_request_is_permission_denied() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 0).await;

    let source = RecordingSource::granting_all();
    source.set_granted(None);
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_scheduled().await;

    assert!(matches!(report.error, Some(SyncError::PermissionDenied { .. })));
    assert_eq!(source.read_count(), 0);
}

#[tokio::test]
async fn test_partial_grant_still_runs_cycle() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 1).await;

    let source = RecordingSource::granting_all();
    source.set_granted(Some(vec![MetricCategory::Steps, MetricCategory::HeartRate]));
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.outcome, SyncOutcome::NewData);
    assert_eq!(source.read_count(), MetricCategory::ALL.len());
}

#[tokio::test]
async fn test_single_read_failure_delivers_nothing() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 0).await;

    let source = RecordingSource::granting_all();
    source.fail_reads_of(MetricCategory::HeartRate);
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.outcome, SyncOutcome::Failed);
    assert!(report.delivered.is_none());
    match report.error {
        Some(SyncError::ReadFailure { category, .. }) => {
            assert_eq!(category, MetricCategory::HeartRate);
        }
        other => panic!("expected ReadFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_category_reads_run_concurrently() -> Result<()> {
    let source = RecordingSource::granting_all();
    source.set_read_delay(Duration::from_millis(200));
    let aggregator = RecordAggregator::new(
        source.clone(),
        DateTime::parse_from_rfc3339("2023-09-01T00:00:00Z")?.into(),
    );

    let started = Instant::now();
    let snapshot = aggregator.collect().await?;
    let elapsed = started.elapsed();

    assert_eq!(snapshot.categories().count(), MetricCategory::ALL.len());
    assert!(
        elapsed < Duration::from_millis(800),
        "eight 200ms reads took {elapsed:?}"
    );
    Ok(())
}

#[tokio::test]
async fn test_read_failure_surfaces_after_every_read_dispatched() {
    let source = RecordingSource::granting_all();
    source.set_read_delay(Duration::from_millis(200));
    source.fail_reads_of(MetricCategory::HeartRate);
    let aggregator = RecordAggregator::new(
        source.clone(),
        DateTime::parse_from_rfc3339("2023-09-01T00:00:00Z").unwrap().into(),
    );

    let started = Instant::now();
    let err = aggregator.collect().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(
        err,
        SyncError::ReadFailure {
            category: MetricCategory::HeartRate,
            ..
        }
    ));
    assert_eq!(source.read_count(), MetricCategory::ALL.len());
    assert!(elapsed < Duration::from_millis(800), "failure took {elapsed:?}");
}

#[tokio::test]
async fn test_rejected_delivery_counts_as_cycle_ran_by_default() {
    let server = MockServer::start().await;
    mount_sink(&server, 500, 1).await;

    let source = RecordingSource::granting_all();
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.outcome, SyncOutcome::NewData);
    assert!(report.delivered.is_none());
    assert_eq!(
        report.error,
        Some(SyncError::Rejected {
            status: 500,
            status_text: "Internal Server Error".to_owned(),
        })
    );
}

#[tokio::test]
async fn test_rejected_delivery_fails_under_propagate_policy() {
    let server = MockServer::start().await;
    mount_sink(&server, 404, 1).await;

    let source = RecordingSource::granting_all();
    let mut config = test_config(&ingest_url(&server.uri()));
    config.outcome_policy = DeliveryOutcomePolicy::PropagateFailure;
    let pipeline = pipeline_for(Arc::clone(&source), &config);

    let report = pipeline.run_scheduled().await;

    assert_eq!(report.outcome, SyncOutcome::Failed);
    assert!(matches!(
        report.error,
        Some(SyncError::Rejected { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    let source = RecordingSource::granting_all();
    let pipeline = pipeline_for(
        Arc::clone(&source),
        &test_config("http://127.0.0.1:1/webhook/health-sync"),
    );

    let report = pipeline.run_scheduled().await;

    assert!(matches!(
        report.error,
        Some(SyncError::TransportFailure { .. })
    ));
    assert_eq!(report.outcome, SyncOutcome::NewData);
}

#[tokio::test]
async fn test_manual_trigger_before_readiness_reads_nothing() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 0).await;

    let source = RecordingSource::granting_all();
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    let report = pipeline.run_manual().await;

    assert_eq!(report.trigger, SyncTrigger::Manual);
    assert_eq!(report.error, Some(SyncError::NotReady));
    assert_eq!(report.outcome, SyncOutcome::Failed);
    assert_eq!(source.init_calls(), 0);
    assert_eq!(source.read_count(), 0);
}

#[tokio::test]
async fn test_manual_trigger_skips_gate_once_ready() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 2).await;

    let source = RecordingSource::granting_all();
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    assert_eq!(pipeline.run_scheduled().await.outcome, SyncOutcome::NewData);
    let manual = pipeline.run_manual().await;

    assert_eq!(manual.outcome, SyncOutcome::NewData);
    assert_eq!(source.init_calls(), 1);
    assert_eq!(source.permission_calls(), 1);
    assert_eq!(source.read_count(), 2 * MetricCategory::ALL.len());
}

#[tokio::test]
async fn test_scheduled_cycles_rerun_gate_every_time() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 2).await;

    let source = RecordingSource::granting_all();
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));

    pipeline.run_scheduled().await;
    pipeline.run_scheduled().await;

    assert_eq!(source.init_calls(), 2);
    assert_eq!(source.permission_calls(), 2);
}

#[tokio::test]
async fn test_single_flight_skips_overlapping_cycle() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 1).await;

    let source = RecordingSource::granting_all();
    source.set_read_delay(Duration::from_millis(200));
    let mut config = test_config(&ingest_url(&server.uri()));
    config.overlap_policy = OverlapPolicy::SingleFlight;
    let pipeline = pipeline_for(Arc::clone(&source), &config);
    pipeline.gate().ensure_ready().await.unwrap();

    let (scheduled, manual) = tokio::join!(pipeline.run_scheduled(), async {
        sleep(Duration::from_millis(50)).await;
        pipeline.run_manual().await
    });

    assert_eq!(scheduled.outcome, SyncOutcome::NewData);
    assert_eq!(manual.error, Some(SyncError::CycleInProgress));
    assert_eq!(manual.outcome, SyncOutcome::Failed);
}

#[tokio::test]
async fn test_concurrent_policy_lets_cycles_overlap() {
    let server = MockServer::start().await;
    mount_sink(&server, 200, 2).await;

    let source = RecordingSource::granting_all();
    source.set_read_delay(Duration::from_millis(100));
    let pipeline = pipeline_for(Arc::clone(&source), &test_config(&ingest_url(&server.uri())));
    pipeline.gate().ensure_ready().await.unwrap();

    let (scheduled, manual) = tokio::join!(pipeline.run_scheduled(), pipeline.run_manual());

    assert_eq!(scheduled.outcome, SyncOutcome::NewData);
    assert_eq!(manual.outcome, SyncOutcome::NewData);
    assert_ne!(scheduled.cycle_id, manual.cycle_id);
}

#[tokio::test]
async fn test_body_wraps_collected_snapshot_unchanged() -> Result<()> {
    let source = RecordingSource::granting_all();
    source.set_records(
        MetricCategory::Weight,
        vec![json!({ "time": "2024-02-01T07:00:00Z", "weight": { "inKilograms": 71.4 } })],
    );
    let aggregator = RecordAggregator::new(
        source,
        DateTime::parse_from_rfc3339("2023-09-01T00:00:00Z")?.into(),
    );

    let snapshot = aggregator.collect().await?;
    let body = DeliveryClient::body_for(&snapshot)?;

    assert_eq!(body.as_object().unwrap().len(), 1);
    assert_eq!(body["healthData"], serde_json::to_value(&snapshot)?);
    assert_eq!(body["healthData"]["weight"][0]["weight"]["inKilograms"], 71.4);
    Ok(())
}
