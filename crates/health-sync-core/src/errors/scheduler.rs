// ABOUTME: Errors reported by the task scheduling substrate
// ABOUTME: Covers undefined tasks, duplicate registrations, and global install conflicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Result alias for substrate calls
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Failure reported by a scheduling substrate or the scheduler singleton
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// No task body was defined under this name
    #[error("Task '{task_id}' is not defined")]
    TaskNotDefined {
        /// Requested task name
        task_id: String,
    },

    /// Substrate refused or failed the registration
    #[error("Registering task '{task_id}' failed: {reason}")]
    RegistrationFailed {
        /// Task name
        task_id: String,
        /// Substrate error message
        reason: String,
    },

    /// A process-wide scheduler was already installed
    #[error("A sync scheduler is already installed for this process")]
    AlreadyInstalled,
}
