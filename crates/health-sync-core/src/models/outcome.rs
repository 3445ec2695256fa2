// ABOUTME: Coarse result of one sync cycle and the trigger that started it
// ABOUTME: Reported to the scheduling substrate and to diagnostics, never persisted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one sync cycle as seen by the scheduling substrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A snapshot was built and delivery was attempted
    NewData,
    /// Nothing to deliver (not produced while every category yields a record set)
    NoData,
    /// Permission, read, or (under the propagating policy) delivery failure
    Failed,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewData => write!(f, "new_data"),
            Self::NoData => write!(f, "no_data"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What started a sync cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    /// Recurring background firing
    Scheduled,
    /// User-initiated "Get Health Data"
    Manual,
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Manual => write!(f, "manual"),
        }
    }
}
