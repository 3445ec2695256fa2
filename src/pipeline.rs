// ABOUTME: Sync cycle driving permission gate, aggregation, and delivery in order
// ABOUTME: Maps stage errors to the coarse outcome reported to the scheduling substrate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sync Cycle
//!
//! A cycle is permission → aggregate → deliver, run to completion. Errors stop
//! the cycle at the stage that raised them and are logged here; nothing
//! propagates past the cycle boundary.

use std::sync::Arc;
use std::time::Instant;

use health_sync_core::errors::{SyncError, SyncResult};
use health_sync_core::models::{SyncOutcome, SyncTrigger};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::aggregator::RecordAggregator;
use crate::config::{DeliveryOutcomePolicy, OverlapPolicy, SyncConfig};
use crate::delivery::{Delivered, DeliveryClient};
use crate::health_source::HealthDataSource;
use crate::logging::SyncLogger;
use crate::permission_gate::PermissionGate;

/// What one cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Correlates the cycle's log lines
    pub cycle_id: Uuid,
    /// What started the cycle
    pub trigger: SyncTrigger,
    /// Outcome after applying the delivery outcome policy
    pub outcome: SyncOutcome,
    /// Receipt when the sink accepted the snapshot
    pub delivered: Option<Delivered>,
    /// Error that stopped the cycle or failed the delivery
    pub error: Option<SyncError>,
}

/// Permission gate, aggregator, and delivery client wired into one cycle
pub struct SyncPipeline {
    gate: PermissionGate,
    aggregator: RecordAggregator,
    delivery: DeliveryClient,
    outcome_policy: DeliveryOutcomePolicy,
    overlap_policy: OverlapPolicy,
    in_flight: Mutex<()>,
}

impl SyncPipeline {
    /// Pipeline over `source`, delivering through `delivery`, with policies from `config`
    #[must_use]
    pub fn new(
        source: Arc<dyn HealthDataSource>,
        delivery: DeliveryClient,
        config: &SyncConfig,
    ) -> Self {
        Self {
            gate: PermissionGate::new(Arc::clone(&source)),
            aggregator: RecordAggregator::new(source, config.window_anchor),
            delivery,
            outcome_policy: config.outcome_policy,
            overlap_policy: config.overlap_policy,
            in_flight: Mutex::new(()),
        }
    }

    /// Permission gate shared by both triggers
    #[must_use]
    pub const fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Active delivery outcome policy
    #[must_use]
    pub const fn outcome_policy(&self) -> DeliveryOutcomePolicy {
        self.outcome_policy
    }

    /// Full cycle for a scheduled firing: gate, collect, deliver
    pub async fn run_scheduled(&self) -> CycleReport {
        self.run(SyncTrigger::Scheduled).await
    }

    /// Manual "Get Health Data": collect and deliver without re-running the gate
    ///
    /// Fails with `NotReady` and reads nothing if the gate has never succeeded
    /// in this process.
    pub async fn run_manual(&self) -> CycleReport {
        self.run(SyncTrigger::Manual).await
    }

    async fn run(&self, trigger: SyncTrigger) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("sync_cycle", cycle_id = %cycle_id, trigger = %trigger);
        self.run_cycle(cycle_id, trigger).instrument(span).await
    }

    async fn run_cycle(&self, cycle_id: Uuid, trigger: SyncTrigger) -> CycleReport {
        let started = Instant::now();

        let result = match self.acquire_slot() {
            Ok(_guard) => self.execute(trigger).await,
            Err(e) => Err(e),
        };

        let (outcome, delivered, error) = match result {
            Ok(delivered) => (SyncOutcome::NewData, Some(delivered), None),
            Err(e) => {
                SyncLogger::log_cycle_error(trigger, &e);
                (self.outcome_for(&e), None, Some(e))
            }
        };

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        SyncLogger::log_cycle_outcome(trigger, outcome, duration_ms);

        CycleReport {
            cycle_id,
            trigger,
            outcome,
            delivered,
            error,
        }
    }

    async fn execute(&self, trigger: SyncTrigger) -> SyncResult<Delivered> {
        match trigger {
            SyncTrigger::Scheduled => {
                self.gate.ensure_ready().await?;
            }
            SyncTrigger::Manual => {
                if !self.gate.has_been_ready() {
                    return Err(SyncError::NotReady);
                }
            }
        }

        let snapshot = self.aggregator.collect().await?;
        self.delivery.deliver(&snapshot).await
    }

    /// Serialize cycles under `SingleFlight`; `None` guard means no exclusion
    fn acquire_slot(&self) -> SyncResult<Option<MutexGuard<'_, ()>>> {
        match self.overlap_policy {
            OverlapPolicy::Concurrent => Ok(None),
            OverlapPolicy::SingleFlight => self
                .in_flight
                .try_lock()
                .map(Some)
                .map_err(|_| SyncError::CycleInProgress),
        }
    }

    /// Outcome for a cycle that ended in `error`
    fn outcome_for(&self, error: &SyncError) -> SyncOutcome {
        if error.is_delivery_failure() && self.outcome_policy == DeliveryOutcomePolicy::CycleRan {
            SyncOutcome::NewData
        } else {
            SyncOutcome::Failed
        }
    }
}
