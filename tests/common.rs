// ABOUTME: Shared test fixtures for health sync integration tests
// ABOUTME: Recording in-memory health source, recording substrate, and pipeline builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `health_sync`

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use health_sync::config::SyncConfig;
use health_sync::delivery::DeliveryClient;
use health_sync::errors::{SchedulerError, SchedulerResult, SourceError, SourceResult};
use health_sync::health_source::{HealthDataSource, ReadRecordsOptions, ReadRecordsResult};
use health_sync::models::{MetricCategory, PermissionGrant, PermissionRequest, SyncOutcome};
use health_sync::pipeline::SyncPipeline;
use health_sync::scheduler::{SchedulingSubstrate, SubstrateStatus, TaskBody, TaskOptions};
use serde_json::{json, Value};
use tokio::time::sleep;

/// How `initialize` answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitBehavior {
    Starts,
    ReportsFalse,
    Raises,
}

/// In-memory health source that records every call it receives
pub struct RecordingSource {
    init: Mutex<InitBehavior>,
    granted: Mutex<Option<Vec<MetricCategory>>>,
    failing: Mutex<HashSet<MetricCategory>>,
    records: Mutex<HashMap<MetricCategory, Vec<Value>>>,
    read_delay: Mutex<Option<Duration>>,
    init_calls: AtomicUsize,
    permission_calls: AtomicUsize,
    reads: Mutex<Vec<(MetricCategory, ReadRecordsOptions)>>,
}

impl Default for RecordingSource {
    fn default() -> Self {
        Self {
            init: Mutex::new(InitBehavior::Starts),
            granted: Mutex::new(Some(MetricCategory::ALL.to_vec())),
            failing: Mutex::new(HashSet::new()),
            records: Mutex::new(HashMap::new()),
            read_delay: Mutex::new(None),
            init_calls: AtomicUsize::new(0),
            permission_calls: AtomicUsize::new(0),
            reads: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingSource {
    /// Source that starts, grants everything, and returns one record per category
    pub fn granting_all() -> Arc<Self> {
        let source = Self::default();
        for category in MetricCategory::ALL {
            source.set_records(
                category,
                vec![json!({ "time": "2024-01-15T10:00:00Z", "type": category.record_type() })],
            );
        }
        Arc::new(source)
    }

    pub fn set_init(&self, behavior: InitBehavior) {
        *self.init.lock().unwrap() = behavior;
    }

    /// `None` makes the permission request itself raise
    pub fn set_granted(&self, granted: Option<Vec<MetricCategory>>) {
        *self.granted.lock().unwrap() = granted;
    }

    pub fn fail_reads_of(&self, category: MetricCategory) {
        self.failing.lock().unwrap().insert(category);
    }

    pub fn set_records(&self, category: MetricCategory, records: Vec<Value>) {
        self.records.lock().unwrap().insert(category, records);
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn permission_calls(&self) -> usize {
        self.permission_calls.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> Vec<(MetricCategory, ReadRecordsOptions)> {
        self.reads.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }
}

#[async_trait]
impl HealthDataSource for RecordingSource {
    fn name(&self) -> &str {
        "recording"
    }

    async fn initialize(&self) -> SourceResult<bool> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match *self.init.lock().unwrap() {
            InitBehavior::Starts => Ok(true),
            InitBehavior::ReportsFalse => Ok(false),
            InitBehavior::Raises => Err(SourceError::Platform("client unavailable".to_owned())),
        }
    }

    async fn request_permission(
        &self,
        requests: &[PermissionRequest],
    ) -> SourceResult<Vec<PermissionGrant>> {
        self.permission_calls.fetch_add(1, Ordering::SeqCst);
        let granted = self
            .granted
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::Platform("permission sheet failed".to_owned()))?;

        Ok(requests
            .iter()
            .filter(|request| granted.contains(&request.record_type))
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
        self.reads.lock().unwrap().push((category, options.clone()));

        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&category) {
            return Err(SourceError::Timeout(format!("{category} query timed out")));
        }

        Ok(ReadRecordsResult {
            records: self
                .records
                .lock()
                .unwrap()
                .get(&category)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

/// Substrate that records registrations and fires task bodies on demand
pub struct RecordingSubstrate {
    status: Mutex<SubstrateStatus>,
    define_enabled: bool,
    fail_registration: bool,
    tasks: Mutex<HashMap<String, TaskBody>>,
    status_calls: AtomicUsize,
    registrations: Mutex<Vec<(String, TaskOptions)>>,
}

impl RecordingSubstrate {
    pub fn new(status: SubstrateStatus) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            define_enabled: true,
            fail_registration: false,
            tasks: Mutex::new(HashMap::new()),
            status_calls: AtomicUsize::new(0),
            registrations: Mutex::new(Vec::new()),
        })
    }

    /// Substrate that silently drops task definitions
    pub fn ignoring_definitions() -> Arc<Self> {
        Arc::new(Self {
            define_enabled: false,
            ..Self::plain()
        })
    }

    /// Substrate whose registration call fails
    pub fn refusing_registration() -> Arc<Self> {
        Arc::new(Self {
            fail_registration: true,
            ..Self::plain()
        })
    }

    fn plain() -> Self {
        Self {
            status: Mutex::new(SubstrateStatus::Available),
            define_enabled: true,
            fail_registration: false,
            tasks: Mutex::new(HashMap::new()),
            status_calls: AtomicUsize::new(0),
            registrations: Mutex::new(Vec::new()),
        }
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> Vec<(String, TaskOptions)> {
        self.registrations.lock().unwrap().clone()
    }

    /// Run the body defined under `task_id` once, as the host would on a firing
    pub async fn fire(&self, task_id: &str) -> SyncOutcome {
        let body = self
            .tasks
            .lock()
            .unwrap()
            .get(task_id)
            .cloned()
            .expect("task should be defined");
        body().await
    }
}

#[async_trait]
impl SchedulingSubstrate for RecordingSubstrate {
    async fn status(&self) -> SubstrateStatus {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap()
    }

    fn define_task(&self, task_id: &str, body: TaskBody) {
        if self.define_enabled {
            self.tasks.lock().unwrap().insert(task_id.to_owned(), body);
        }
    }

    fn is_task_defined(&self, task_id: &str) -> bool {
        self.tasks.lock().unwrap().contains_key(task_id)
    }

    async fn register_task(&self, task_id: &str, options: TaskOptions) -> SchedulerResult<()> {
        self.registrations
            .lock()
            .unwrap()
            .push((task_id.to_owned(), options));
        if self.fail_registration {
            return Err(SchedulerError::RegistrationFailed {
                task_id: task_id.to_owned(),
                reason: "host refused".to_owned(),
            });
        }
        Ok(())
    }
}

/// Default configuration pointed at `endpoint`
pub fn test_config(endpoint: &str) -> SyncConfig {
    SyncConfig {
        endpoint_url: endpoint.to_owned(),
        ..SyncConfig::default()
    }
}

/// Pipeline over `source` delivering to `endpoint` with a fresh HTTP client
pub fn pipeline_for(source: Arc<RecordingSource>, config: &SyncConfig) -> Arc<SyncPipeline> {
    let delivery = DeliveryClient::with_client(reqwest::Client::new(), config.endpoint_url.clone());
    Arc::new(SyncPipeline::new(source, delivery, config))
}

/// Endpoint URL on a mock server
pub fn ingest_url(server_uri: &str) -> String {
    format!("{server_uri}/webhook/health-sync")
}
