// ABOUTME: Error taxonomy for the health-sync pipeline boundaries
// ABOUTME: SyncError for the cycle, SourceError and SchedulerError for adapters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Types
//!
//! Each boundary returns a typed error so callers pattern-match outcomes:
//! - `SyncError` - the cycle-level taxonomy (initialization, permission, read, delivery)
//! - `SourceError` - failures reported by a `HealthDataSource` adapter
//! - `SchedulerError` - failures reported by a scheduling substrate
//! - `IncompleteSnapshot` - attempt to build a snapshot without every category
//! - `SnapshotShapeError` - decoded snapshot object with missing or unknown keys

mod scheduler;
mod source;
mod sync;

pub use scheduler::{SchedulerError, SchedulerResult};
pub use source::{SourceError, SourceResult};
pub use sync::{IncompleteSnapshot, SnapshotShapeError, SyncError, SyncResult};
