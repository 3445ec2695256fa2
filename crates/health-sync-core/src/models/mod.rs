// ABOUTME: Core data models for the health-sync pipeline
// ABOUTME: Re-exports categories, time windows, snapshots, permissions, and outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! One sync cycle reads a `RecordSet` per `MetricCategory` over a `TimeWindow`,
//! assembles them into a `HealthSnapshot`, and ends in a `SyncOutcome`.
//!
//! ## Design Principles
//!
//! - **Closed category set**: `MetricCategory::ALL` is the only list of categories
//! - **Opaque records**: records stay `serde_json::Value` exactly as the source returned them
//! - **All-or-nothing snapshots**: a `HealthSnapshot` cannot be built from a partial map

mod category;
mod outcome;
mod permission;
mod snapshot;
mod window;

pub use category::MetricCategory;
pub use outcome::{SyncOutcome, SyncTrigger};
pub use permission::{PermissionGrant, PermissionRequest, PermissionSet};
pub use snapshot::{HealthSnapshot, RecordSet};
pub use window::TimeWindow;
