// ABOUTME: Errors reported by health data source adapters
// ABOUTME: Opaque platform failures, timeouts, and malformed responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Result alias for health source calls
pub type SourceResult<T> = Result<T, SourceError>;

/// Failure reported by a `HealthDataSource`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Backing store could not be reached or opened
    #[error("Health source unavailable: {0}")]
    Unavailable(String),

    /// Platform raised an exception for the call
    #[error("Health source platform error: {0}")]
    Platform(String),

    /// Query did not finish in time
    #[error("Health source query timed out: {0}")]
    Timeout(String),

    /// Response did not have the expected shape
    #[error("Malformed health source response: {0}")]
    Malformed(String),
}
