// ABOUTME: Record sets and the all-category health snapshot built each cycle
// ABOUTME: Serializes as one object keyed by snapshot keys, in fixed category order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::MetricCategory;
use crate::errors::{IncompleteSnapshot, SnapshotShapeError};

/// Records returned for one category and window, verbatim from the source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet(Vec<Value>);

impl RecordSet {
    /// Wrap the source's `records` array
    #[must_use]
    pub const fn new(records: Vec<Value>) -> Self {
        Self(records)
    }

    /// Records in source order
    #[must_use]
    pub fn records(&self) -> &[Value] {
        &self.0
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the source returned no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for RecordSet {
    fn from(records: Vec<Value>) -> Self {
        Self(records)
    }
}

/// One cycle's complete read across every `MetricCategory`
///
/// Only constructible from a map holding all eight categories, so a partial
/// read can never reach delivery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, RecordSet>")]
pub struct HealthSnapshot {
    entries: BTreeMap<MetricCategory, RecordSet>,
}

impl HealthSnapshot {
    /// Build a snapshot from per-category record sets
    ///
    /// # Errors
    ///
    /// Returns `IncompleteSnapshot` naming the categories absent from `entries`
    pub fn from_entries(
        entries: BTreeMap<MetricCategory, RecordSet>,
    ) -> Result<Self, IncompleteSnapshot> {
        let missing: Vec<_> = MetricCategory::ALL
            .into_iter()
            .filter(|category| !entries.contains_key(category))
            .collect();
        if missing.is_empty() {
            Ok(Self { entries })
        } else {
            Err(IncompleteSnapshot { missing })
        }
    }

    /// Record set for one category
    #[must_use]
    pub fn get(&self, category: MetricCategory) -> Option<&RecordSet> {
        self.entries.get(&category)
    }

    /// Iterate `(category, records)` in snapshot order
    pub fn iter(&self) -> impl Iterator<Item = (MetricCategory, &RecordSet)> {
        self.entries.iter().map(|(category, records)| (*category, records))
    }

    /// Categories present (always the full fixed set)
    pub fn categories(&self) -> impl Iterator<Item = MetricCategory> + '_ {
        self.entries.keys().copied()
    }

    /// Total number of records across all categories
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.entries.values().map(RecordSet::len).sum()
    }
}

impl Serialize for HealthSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, records) in self.iter() {
            map.serialize_entry(category.snapshot_key(), records)?;
        }
        map.end()
    }
}

impl TryFrom<BTreeMap<String, RecordSet>> for HealthSnapshot {
    type Error = SnapshotShapeError;

    fn try_from(raw: BTreeMap<String, RecordSet>) -> Result<Self, Self::Error> {
        let mut raw = raw;
        let entries = MetricCategory::ALL
            .into_iter()
            .filter_map(|category| {
                raw.remove(category.snapshot_key())
                    .map(|records| (category, records))
            })
            .collect();
        let snapshot = Self::from_entries(entries)?;
        if !raw.is_empty() {
            return Err(SnapshotShapeError::UnknownKeys {
                keys: raw.into_keys().collect(),
            });
        }
        Ok(snapshot)
    }
}
