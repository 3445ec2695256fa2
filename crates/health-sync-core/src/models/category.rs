// ABOUTME: Metric category enumeration for health records
// ABOUTME: Defines the fixed category set with record-type names and snapshot keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health record categories read on every sync cycle
///
/// The set is closed: every snapshot carries exactly these eight entries.
/// Serialized form is the health source's record-type name (`"SleepSession"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricCategory {
    /// Step counts
    Steps,
    /// Sleep sessions with stages
    SleepSession,
    /// Body fat percentage
    BodyFat,
    /// Body temperature readings
    BodyTemperature,
    /// Systolic/diastolic blood pressure readings
    BloodPressure,
    /// Nutrition entries
    Nutrition,
    /// Heart rate samples
    HeartRate,
    /// Body weight
    Weight,
}

impl MetricCategory {
    /// Every category, in snapshot order
    pub const ALL: [Self; 8] = [
        Self::Steps,
        Self::SleepSession,
        Self::BodyFat,
        Self::BodyTemperature,
        Self::BloodPressure,
        Self::Nutrition,
        Self::HeartRate,
        Self::Weight,
    ];

    /// Record-type name used in permission requests and read queries
    #[must_use]
    pub const fn record_type(self) -> &'static str {
        match self {
            Self::Steps => "Steps",
            Self::SleepSession => "SleepSession",
            Self::BodyFat => "BodyFat",
            Self::BodyTemperature => "BodyTemperature",
            Self::BloodPressure => "BloodPressure",
            Self::Nutrition => "Nutrition",
            Self::HeartRate => "HeartRate",
            Self::Weight => "Weight",
        }
    }

    /// Key this category occupies inside the delivered snapshot object
    #[must_use]
    pub const fn snapshot_key(self) -> &'static str {
        match self {
            Self::Steps => "steps",
            Self::SleepSession => "sleepSessions",
            Self::BodyFat => "bodyFat",
            Self::BodyTemperature => "bodyTemperature",
            Self::BloodPressure => "bloodPressure",
            Self::Nutrition => "nutrition",
            Self::HeartRate => "heartRate",
            Self::Weight => "weight",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_type())
    }
}

impl FromStr for MetricCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.record_type() == s)
            .ok_or_else(|| format!("unknown record type: {s}"))
    }
}
