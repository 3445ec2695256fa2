// ABOUTME: In-process scheduling substrate running registered tasks on tokio intervals
// ABOUTME: Tracks per-task firings and last outcome; aborts task loops on shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use health_sync_core::errors::{SchedulerError, SchedulerResult};
use health_sync_core::models::SyncOutcome;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::substrate::{SchedulingSubstrate, SubstrateStatus, TaskBody, TaskOptions};

/// Firing statistics for one registered task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Completed firings
    pub firings: u64,
    /// Outcome of the latest firing
    pub last_outcome: Option<SyncOutcome>,
}

struct Registration {
    options: TaskOptions,
    handle: JoinHandle<()>,
    stats: Arc<Mutex<TaskStats>>,
}

/// Scheduling substrate backed by the tokio runtime of this process
///
/// Registrations live only as long as the process; `stop_on_terminate` and
/// `start_on_boot` are recorded for inspection but not acted on.
pub struct TokioSubstrate {
    status: SubstrateStatus,
    tasks: Mutex<HashMap<String, TaskBody>>,
    registrations: Mutex<HashMap<String, Registration>>,
}

impl TokioSubstrate {
    /// Substrate reporting `status`
    #[must_use]
    pub fn new(status: SubstrateStatus) -> Self {
        Self {
            status,
            tasks: Mutex::new(HashMap::new()),
            registrations: Mutex::new(HashMap::new()),
        }
    }

    /// Options `task_id` was registered with, if registered
    #[must_use]
    pub fn registered_options(&self, task_id: &str) -> Option<TaskOptions> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .map(|registration| registration.options)
    }

    /// Firing statistics for `task_id`, if registered
    #[must_use]
    pub fn stats(&self, task_id: &str) -> Option<TaskStats> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .map(|registration| {
                *registration
                    .stats
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
            })
    }

    /// Abort every task loop and drop all registrations
    pub fn shutdown(&self) {
        let mut registrations = self
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (task_id, registration) in registrations.drain() {
            registration.handle.abort();
            info!(task_id = %task_id, "Background task stopped");
        }
    }

    fn spawn_loop(task_id: &str, body: TaskBody, options: TaskOptions) -> Registration {
        let stats = Arc::new(Mutex::new(TaskStats::default()));
        let loop_stats = Arc::clone(&stats);
        let loop_task_id = task_id.to_owned();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(options.minimum_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; the first firing waits one interval
            ticker.tick().await;

            loop {
                ticker.tick().await;
                debug!(task_id = %loop_task_id, "Background task firing");
                let outcome = body().await;

                let mut stats = loop_stats.lock().unwrap_or_else(PoisonError::into_inner);
                stats.firings += 1;
                stats.last_outcome = Some(outcome);
            }
        });

        Registration {
            options,
            handle,
            stats,
        }
    }
}

impl Default for TokioSubstrate {
    fn default() -> Self {
        Self::new(SubstrateStatus::Available)
    }
}

impl Drop for TokioSubstrate {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl SchedulingSubstrate for TokioSubstrate {
    async fn status(&self) -> SubstrateStatus {
        self.status
    }

    fn define_task(&self, task_id: &str, body: TaskBody) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task_id.to_owned(), body);
        debug!(task_id = %task_id, "Background task defined");
    }

    fn is_task_defined(&self, task_id: &str) -> bool {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(task_id)
    }

    async fn register_task(&self, task_id: &str, options: TaskOptions) -> SchedulerResult<()> {
        if options.minimum_interval.is_zero() {
            return Err(SchedulerError::RegistrationFailed {
                task_id: task_id.to_owned(),
                reason: "minimum interval must be greater than zero".to_owned(),
            });
        }

        let body = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .cloned()
            .ok_or_else(|| SchedulerError::TaskNotDefined {
                task_id: task_id.to_owned(),
            })?;

        let registration = Self::spawn_loop(task_id, body, options);
        let previous = self
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task_id.to_owned(), registration);
        if let Some(previous) = previous {
            previous.handle.abort();
        }

        info!(
            task_id = %task_id,
            interval_secs = options.minimum_interval.as_secs(),
            stop_on_terminate = options.stop_on_terminate,
            start_on_boot = options.start_on_boot,
            "Background task registered"
        );
        Ok(())
    }
}
