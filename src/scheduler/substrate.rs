// ABOUTME: Scheduling substrate abstraction for recurring background tasks
// ABOUTME: Status, task definition, and registration contract the sync scheduler consumes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use health_sync_core::errors::SchedulerResult;
use health_sync_core::models::SyncOutcome;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;

/// Whether the host allows background execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubstrateStatus {
    /// Background tasks may be registered
    #[default]
    Available,
    /// Background execution is restricted by the host (e.g. parental controls)
    Restricted,
    /// The user disabled background execution
    Denied,
}

impl SubstrateStatus {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "restricted" => Self::Restricted,
            "denied" => Self::Denied,
            _ => Self::Available,
        }
    }

    /// Whether registration may be attempted
    #[must_use]
    pub const fn allows_registration(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for SubstrateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Restricted => write!(f, "restricted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Options for a recurring task registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOptions {
    /// Minimum interval between firings
    pub minimum_interval: Duration,
    /// Drop the registration when the app terminates
    pub stop_on_terminate: bool,
    /// Restore the registration after a reboot
    pub start_on_boot: bool,
}

impl From<&ScheduleConfig> for TaskOptions {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            minimum_interval: config.minimum_interval(),
            stop_on_terminate: config.stop_on_terminate,
            start_on_boot: config.start_on_boot,
        }
    }
}

/// Body the substrate runs on each firing; resolves to `NewData` or `Failed`
pub type TaskBody = Arc<dyn Fn() -> BoxFuture<'static, SyncOutcome> + Send + Sync>;

/// Host facility that runs named tasks periodically
///
/// The substrate owns the registration's lifecycle; once registered, firings
/// happen on its schedule, not the caller's.
#[async_trait]
pub trait SchedulingSubstrate: Send + Sync {
    /// Current availability of background execution
    async fn status(&self) -> SubstrateStatus;

    /// Bind a task body to a name
    fn define_task(&self, task_id: &str, body: TaskBody);

    /// Whether a body is bound to `task_id`
    fn is_task_defined(&self, task_id: &str) -> bool;

    /// Start firing `task_id` on the given schedule
    ///
    /// # Errors
    /// Returns an error if the task is undefined or the host refuses it
    async fn register_task(&self, task_id: &str, options: TaskOptions) -> SchedulerResult<()>;
}
