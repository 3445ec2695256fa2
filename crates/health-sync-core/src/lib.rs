// ABOUTME: Core types and constants for the health-sync pipeline
// ABOUTME: Foundation crate with metric categories, snapshots, outcomes, and error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Health Sync Core
//!
//! Foundation crate providing shared types for the health-sync pipeline. The
//! pipeline crate, its adapters, and its tests all depend on these types, so
//! this crate is kept free of I/O and runtime dependencies.
//!
//! ## Modules
//!
//! - **models**: `MetricCategory`, `TimeWindow`, `RecordSet`, `HealthSnapshot`,
//!   `PermissionSet`, `SyncOutcome`
//! - **errors**: `SyncError` taxonomy plus adapter-level `SourceError` and `SchedulerError`
//! - **constants**: wire keys, defaults, and environment variable names

/// Error taxonomy for every pipeline boundary
pub mod errors;

/// Wire keys, defaults, and environment variable names
pub mod constants;

/// Core data models (categories, windows, snapshots, outcomes)
pub mod models;
