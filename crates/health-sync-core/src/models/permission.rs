// ABOUTME: Permission request and grant entries exchanged with the health source
// ABOUTME: PermissionSet is the point-in-time list of granted read entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::MetricCategory;
use crate::constants::wire::READ_ACCESS;

/// One `{accessType, recordType}` entry in a batched permission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    /// Requested access, always `"read"` here
    pub access_type: String,
    /// Category the access applies to
    pub record_type: MetricCategory,
}

impl PermissionRequest {
    /// Read access for one category
    #[must_use]
    pub fn read(record_type: MetricCategory) -> Self {
        Self {
            access_type: READ_ACCESS.to_owned(),
            record_type,
        }
    }

    /// Read access for the whole fixed category set, in snapshot order
    #[must_use]
    pub fn read_all() -> Vec<Self> {
        MetricCategory::ALL.into_iter().map(Self::read).collect()
    }
}

/// One entry the platform reports as granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    /// Granted access type
    pub access_type: String,
    /// Category the grant covers
    pub record_type: MetricCategory,
}

/// Granted entries returned by one permission request
///
/// The platform owns the real permission state; this is only the answer it
/// gave at request time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    grants: Vec<PermissionGrant>,
}

impl PermissionSet {
    /// Wrap the grant list returned by the source
    #[must_use]
    pub const fn new(grants: Vec<PermissionGrant>) -> Self {
        Self { grants }
    }

    /// Granted entries as returned
    #[must_use]
    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    /// Number of granted entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// True when nothing was granted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Categories with a read grant
    #[must_use]
    pub fn readable_categories(&self) -> BTreeSet<MetricCategory> {
        self.grants
            .iter()
            .filter(|grant| grant.access_type == READ_ACCESS)
            .map(|grant| grant.record_type)
            .collect()
    }

    /// Categories of the fixed set with no read grant
    #[must_use]
    pub fn missing_categories(&self) -> Vec<MetricCategory> {
        let readable = self.readable_categories();
        MetricCategory::ALL
            .into_iter()
            .filter(|category| !readable.contains(category))
            .collect()
    }
}
