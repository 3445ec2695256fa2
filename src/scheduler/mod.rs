// ABOUTME: Background sync scheduler binding the sync cycle to a scheduling substrate
// ABOUTME: Registers the recurring task at most once and exposes the manual trigger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sync Scheduler
//!
//! Lifecycle: `Unregistered` → `Registered` ↔ `Firing`. Registration happens
//! at most once per process; a refused or failed registration leaves the
//! scheduler `Unregistered` for good and only the manual trigger remains.

/// Process-wide scheduler handle
pub mod global;
/// Scheduling substrate contract
pub mod substrate;
/// Tokio-interval substrate
pub mod tokio_substrate;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use health_sync_core::models::SyncOutcome;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

pub use substrate::{SchedulingSubstrate, SubstrateStatus, TaskBody, TaskOptions};
pub use tokio_substrate::{TaskStats, TokioSubstrate};

use crate::config::ScheduleConfig;
use crate::pipeline::{CycleReport, SyncPipeline};

/// Result of the one-time registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    /// Not registered; scheduled firings will not happen
    Unregistered,
    /// Registered with the substrate
    Registered,
}

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// No registration in place
    Unregistered,
    /// Registered and idle
    Registered,
    /// Registered with at least one scheduled cycle running
    Firing,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered => write!(f, "unregistered"),
            Self::Registered => write!(f, "registered"),
            Self::Firing => write!(f, "firing"),
        }
    }
}

/// Holds one unit of the firing count until dropped
struct FiringGuard<'a> {
    count: &'a AtomicUsize,
}

impl<'a> FiringGuard<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self { count }
    }
}

impl Drop for FiringGuard<'_> {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Owns the recurring sync task's registration
pub struct SyncScheduler {
    substrate: Arc<dyn SchedulingSubstrate>,
    pipeline: Arc<SyncPipeline>,
    schedule: ScheduleConfig,
    registration: OnceCell<RegistrationState>,
    firing: AtomicUsize,
}

impl SyncScheduler {
    /// Scheduler over `substrate`; defines the task body under `schedule.task_id`
    #[must_use]
    pub fn new(
        substrate: Arc<dyn SchedulingSubstrate>,
        pipeline: Arc<SyncPipeline>,
        schedule: ScheduleConfig,
    ) -> Arc<Self> {
        let scheduler = Arc::new(Self {
            substrate,
            pipeline,
            schedule,
            registration: OnceCell::new(),
            firing: AtomicUsize::new(0),
        });

        let body = Self::task_body(Arc::downgrade(&scheduler));
        scheduler
            .substrate
            .define_task(&scheduler.schedule.task_id, body);
        scheduler
    }

    fn task_body(scheduler: Weak<Self>) -> TaskBody {
        Arc::new(move || {
            let scheduler = scheduler.clone();
            async move {
                match scheduler.upgrade() {
                    Some(scheduler) => scheduler.fire().await,
                    None => SyncOutcome::Failed,
                }
            }
            .boxed()
        })
    }

    /// Task name used with the substrate
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.schedule.task_id
    }

    /// Register the recurring task, once
    ///
    /// Later calls return the first attempt's result without contacting the
    /// substrate again.
    pub async fn register(&self) -> RegistrationState {
        *self
            .registration
            .get_or_init(|| self.attempt_registration())
            .await
    }

    /// Whether `register` would reach the substrate's registration call
    ///
    /// Checks substrate status and task definition only; registers nothing.
    pub async fn can_register(&self) -> bool {
        let task_id = self.task_id();
        let status = self.substrate.status().await;
        info!(task_id = %task_id, status = %status, "Background execution status");

        if !status.allows_registration() {
            warn!(
                task_id = %task_id,
                status = %status,
                "Background execution unavailable; scheduled sync disabled"
            );
            return false;
        }

        if !self.substrate.is_task_defined(task_id) {
            warn!(task_id = %task_id, "Background task is not defined; skipping registration");
            return false;
        }

        true
    }

    async fn attempt_registration(&self) -> RegistrationState {
        if !self.can_register().await {
            return RegistrationState::Unregistered;
        }

        let task_id = self.task_id();
        match self
            .substrate
            .register_task(task_id, TaskOptions::from(&self.schedule))
            .await
        {
            Ok(()) => {
                info!(
                    task_id = %task_id,
                    interval_secs = self.schedule.minimum_interval_secs,
                    "Scheduled sync registered"
                );
                RegistrationState::Registered
            }
            Err(e) => {
                error!(task_id = %task_id, error = %e, "Scheduled sync registration failed");
                RegistrationState::Unregistered
            }
        }
    }

    /// Whether `register` has been called to completion
    #[must_use]
    pub fn registration_attempted(&self) -> bool {
        self.registration.initialized()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        match self.registration.get() {
            Some(RegistrationState::Registered) if self.firing.load(Ordering::Acquire) > 0 => {
                SchedulerState::Firing
            }
            Some(RegistrationState::Registered) => SchedulerState::Registered,
            _ => SchedulerState::Unregistered,
        }
    }

    /// One scheduled firing: a full cycle, reduced to the substrate's outcome
    ///
    /// The firing count is released even if the host drops this future
    /// mid-cycle, so the state falls back to `Registered`.
    pub async fn fire(&self) -> SyncOutcome {
        let _firing = FiringGuard::enter(&self.firing);
        self.pipeline.run_scheduled().await.outcome
    }

    /// Manual "Get Health Data"; independent of registration state
    pub async fn trigger_manual(&self) -> CycleReport {
        self.pipeline.run_manual().await
    }

    /// Pipeline shared by both triggers
    #[must_use]
    pub const fn pipeline(&self) -> &Arc<SyncPipeline> {
        &self.pipeline
    }
}
