// ABOUTME: Cycle-level error taxonomy for permission, aggregation, and delivery
// ABOUTME: Every pipeline stage returns SyncError; the cycle maps it to an outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::MetricCategory;

/// Result alias for pipeline stages
pub type SyncResult<T> = Result<T, SyncError>;

/// Failures that stop a sync cycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Health source could not be started
    #[error("Health source failed to initialize: {reason}")]
    InitializationFailure {
        /// What the source reported
        reason: String,
    },

    /// No category was granted, or the permission request itself failed
    #[error("Health data permission denied: {reason}")]
    PermissionDenied {
        /// Why the grant list was treated as a denial
        reason: String,
    },

    /// A single category read failed; the whole aggregation fails with it
    #[error("Reading {category} records failed: {reason}")]
    ReadFailure {
        /// Category whose read failed first
        category: MetricCategory,
        /// Source error message
        reason: String,
    },

    /// The delivery request could not complete
    #[error("Delivery transport failure: {reason}")]
    TransportFailure {
        /// Transport error message
        reason: String,
    },

    /// The sink answered with a non-2xx status
    #[error("Delivery rejected with HTTP {status} {status_text}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// Manual trigger before the permission gate ever reported ready
    #[error("Health source readiness has not been established yet")]
    NotReady,

    /// Single-flight policy skipped a cycle because another one is running
    #[error("Another sync cycle is already in progress")]
    CycleInProgress,

    /// Snapshot could not be encoded as JSON
    #[error("Snapshot serialization failed: {reason}")]
    Serialization {
        /// Encoder error message
        reason: String,
    },
}

impl SyncError {
    /// Create an initialization failure
    #[must_use]
    pub fn initialization(reason: impl Into<String>) -> Self {
        Self::InitializationFailure {
            reason: reason.into(),
        }
    }

    /// Create a permission denial
    #[must_use]
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Create a read failure for one category
    #[must_use]
    pub fn read_failure(category: MetricCategory, reason: impl Into<String>) -> Self {
        Self::ReadFailure {
            category,
            reason: reason.into(),
        }
    }

    /// Create a transport failure
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::TransportFailure {
            reason: reason.into(),
        }
    }

    /// Whether the error came from the delivery stage
    #[must_use]
    pub const fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure { .. } | Self::Rejected { .. } | Self::Serialization { .. }
        )
    }
}

/// Snapshot construction without every category present
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Snapshot is missing categories: {missing:?}")]
pub struct IncompleteSnapshot {
    /// Categories absent from the supplied map
    pub missing: Vec<MetricCategory>,
}

/// Decoded snapshot object that does not hold exactly the eight category keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotShapeError {
    /// One or more category keys are absent
    #[error(transparent)]
    Incomplete(#[from] IncompleteSnapshot),

    /// Keys outside the category set are present
    #[error("Snapshot has unknown keys: {keys:?}")]
    UnknownKeys {
        /// Leftover keys, sorted
        keys: Vec<String>,
    },
}
