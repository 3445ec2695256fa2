// ABOUTME: Configuration module for the health sync daemon
// ABOUTME: Re-exports the environment-driven SyncConfig and its policy enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is environment-only; the CLI may override a few fields after loading.

/// Environment-driven sync configuration
pub mod environment;

pub use environment::{
    DeliveryOutcomePolicy, HttpClientConfig, OverlapPolicy, ScheduleConfig, SyncConfig,
};
