// ABOUTME: Process-wide sync scheduler installed once at startup
// ABOUTME: Lets UI or signal handlers reach the running scheduler without threading it through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::{Arc, OnceLock};

use health_sync_core::errors::{SchedulerError, SchedulerResult};

use super::SyncScheduler;

static SCHEDULER: OnceLock<Arc<SyncScheduler>> = OnceLock::new();

/// Install the process-wide scheduler
///
/// # Errors
/// Returns `AlreadyInstalled` if a scheduler was installed before
pub fn install(scheduler: Arc<SyncScheduler>) -> SchedulerResult<()> {
    SCHEDULER
        .set(scheduler)
        .map_err(|_| SchedulerError::AlreadyInstalled)
}

/// The installed scheduler, if any
#[must_use]
pub fn installed() -> Option<Arc<SyncScheduler>> {
    SCHEDULER.get().cloned()
}
