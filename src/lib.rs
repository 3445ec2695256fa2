// ABOUTME: Main library entry point for the health-sync pipeline
// ABOUTME: Reads on-device health records, delivers them to an ingestion endpoint, and schedules recurring syncs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Health Sync
//!
//! Periodically reads eight categories of health records from a health data
//! source and posts them, as one JSON snapshot, to a remote ingestion endpoint.
//!
//! ## Architecture
//!
//! - **Permission gate**: initializes the source and requests read access
//! - **Aggregator**: reads every category over a window anchored at a fixed start
//! - **Delivery**: posts `{"healthData": ...}` to the configured endpoint
//! - **Scheduler**: registers the recurring background task once and exposes a
//!   manual trigger
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use health_sync::app::HealthSyncApp;
//! use health_sync::config::SyncConfig;
//! use health_sync::delivery::DeliveryClient;
//! use health_sync::health_source::JsonExportSource;
//! use health_sync::scheduler::TokioSubstrate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SyncConfig::from_env()?;
//!     let app = HealthSyncApp::new(
//!         &config,
//!         Arc::new(JsonExportSource::new("health-export.json")),
//!         Arc::new(TokioSubstrate::new(config.substrate_status)),
//!         DeliveryClient::new(config.endpoint_url.clone()),
//!     );
//!     app.start().await;
//!     let report = app.get_health_data().await;
//!     println!("{}", report.outcome);
//!     Ok(())
//! }
//! ```

/// Category aggregation over the sync window
pub mod aggregator;

/// Startup bootstrap and manual sync action
pub mod app;

/// Environment-based configuration
pub mod config;

/// Snapshot delivery to the ingestion endpoint
pub mod delivery;

/// Health data source abstraction and adapters
pub mod health_source;

/// Structured logging setup
pub mod logging;

/// Source initialization and permission request
pub mod permission_gate;

/// One sync cycle: gate, collect, deliver
pub mod pipeline;

/// Background task registration and scheduling substrates
pub mod scheduler;

pub use health_sync_core::{constants, errors, models};
