// ABOUTME: Application bootstrap wiring source, delivery, pipeline, and scheduler together
// ABOUTME: Runs startup registration and permission request; exposes the manual sync action
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use health_sync_core::errors::SyncResult;
use health_sync_core::models::PermissionSet;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::delivery::DeliveryClient;
use crate::health_source::HealthDataSource;
use crate::pipeline::{CycleReport, SyncPipeline};
use crate::scheduler::{RegistrationState, SchedulingSubstrate, SyncScheduler};

/// What startup achieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    /// Registration result of the background task
    pub registration: RegistrationState,
    /// Whether the startup permission request reached readiness
    pub permissions_ready: bool,
    /// Number of categories granted at startup
    pub granted_categories: usize,
}

/// Running application: one pipeline shared by the scheduled and manual triggers
pub struct HealthSyncApp {
    scheduler: Arc<SyncScheduler>,
}

impl HealthSyncApp {
    /// Wire `source` and `substrate` into an application using `config`
    #[must_use]
    pub fn new(
        config: &SyncConfig,
        source: Arc<dyn HealthDataSource>,
        substrate: Arc<dyn SchedulingSubstrate>,
        delivery: DeliveryClient,
    ) -> Self {
        let pipeline = Arc::new(SyncPipeline::new(source, delivery, config));
        let scheduler = SyncScheduler::new(substrate, pipeline, config.schedule.clone());
        Self { scheduler }
    }

    /// Scheduler owning the background registration
    #[must_use]
    pub const fn scheduler(&self) -> &Arc<SyncScheduler> {
        &self.scheduler
    }

    /// Startup: register the background task and request permissions concurrently
    ///
    /// Neither step failing stops the application; both are logged.
    pub async fn start(&self) -> StartupReport {
        let (registration, permissions) = tokio::join!(
            self.scheduler.register(),
            self.scheduler.pipeline().gate().ensure_ready()
        );

        let granted_categories = match &permissions {
            Ok(set) => set.readable_categories().len(),
            Err(e) => {
                warn!(error = %e, "Startup permission request failed");
                0
            }
        };

        info!(
            registration = ?registration,
            permissions_ready = permissions.is_ok(),
            granted_categories,
            "Startup complete"
        );

        StartupReport {
            registration,
            permissions_ready: permissions.is_ok(),
            granted_categories,
        }
    }

    /// Request permissions without touching the background registration
    ///
    /// # Errors
    ///
    /// Returns the gate's `InitializationFailure` or `PermissionDenied`
    pub async fn request_permissions(&self) -> SyncResult<PermissionSet> {
        self.scheduler.pipeline().gate().ensure_ready().await
    }

    /// Manual "Get Health Data"
    pub async fn get_health_data(&self) -> CycleReport {
        self.scheduler.trigger_manual().await
    }
}
