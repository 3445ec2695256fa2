// ABOUTME: Permission gate that readies the health source before any read
// ABOUTME: Initializes the client and requests batched read access for every category
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use health_sync_core::errors::{SyncError, SyncResult};
use health_sync_core::models::{PermissionRequest, PermissionSet};
use tracing::{error, info, warn};

use crate::health_source::HealthDataSource;

/// Confirms the health source is started and readable
///
/// Any non-empty grant list counts as ready; which categories were granted is
/// only logged. Reads are still issued for the whole fixed set afterwards.
pub struct PermissionGate {
    source: Arc<dyn HealthDataSource>,
    established: AtomicBool,
}

impl PermissionGate {
    /// Gate over `source`
    #[must_use]
    pub fn new(source: Arc<dyn HealthDataSource>) -> Self {
        Self {
            source,
            established: AtomicBool::new(false),
        }
    }

    /// Initialize the source and request read access for every category
    ///
    /// Safe to call on every cycle and from background contexts: the source's
    /// answer is taken as-is.
    ///
    /// # Errors
    ///
    /// - `InitializationFailure` if the source did not start
    /// - `PermissionDenied` if the request failed or nothing was granted
    pub async fn ensure_ready(&self) -> SyncResult<PermissionSet> {
        match self.source.initialize().await {
            Ok(true) => {}
            Ok(false) => {
                error!(source = self.source.name(), "Health source could not be initialized");
                return Err(SyncError::initialization(
                    "health source reported it could not start",
                ));
            }
            Err(e) => {
                error!(source = self.source.name(), error = %e, "Health source initialization raised");
                return Err(SyncError::initialization(e.to_string()));
            }
        }

        let requests = PermissionRequest::read_all();
        let grants = self
            .source
            .request_permission(&requests)
            .await
            .map_err(|e| {
                error!(error = %e, "Permission request failed");
                SyncError::permission_denied(e.to_string())
            })?;

        let permissions = PermissionSet::new(grants);
        if permissions.is_empty() {
            warn!(requested = requests.len(), "Health data permissions denied");
            return Err(SyncError::permission_denied("no categories granted"));
        }

        let missing = permissions.missing_categories();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Read permission missing for some categories");
        }
        info!(
            granted = permissions.len(),
            grants = ?permissions.grants(),
            "Health data permissions granted"
        );

        self.established.store(true, Ordering::SeqCst);
        Ok(permissions)
    }

    /// Whether `ensure_ready` has succeeded at least once in this process
    #[must_use]
    pub fn has_been_ready(&self) -> bool {
        self.established.load(Ordering::SeqCst)
    }
}
