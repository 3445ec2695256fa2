// ABOUTME: Query time window anchored at a fixed instant and ending at query time
// ABOUTME: Formats bounds as ISO-8601 strings for the health source's range filter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` range a category read covers
///
/// `start` is a fixed anchor shared by every cycle and `end` is taken at query
/// time, so consecutive windows share a start and only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Fixed anchor instant
    pub start: DateTime<Utc>,
    /// Instant the query was issued
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window between two explicit instants
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window from `anchor` up to the current instant
    #[must_use]
    pub fn ending_now(anchor: DateTime<Utc>) -> Self {
        Self::new(anchor, Utc::now())
    }

    /// Start bound in ISO-8601 with millisecond precision (`2023-09-01T00:00:00.000Z`)
    #[must_use]
    pub fn start_iso(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// End bound in ISO-8601 with millisecond precision
    #[must_use]
    pub fn end_iso(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Whether `instant` falls inside the window, bounds included
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Parse an RFC 3339 anchor such as `2023-09-01T00:00:00Z`
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error if `value` is not valid RFC 3339
    pub fn parse_anchor(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_bounds_use_millis_and_zulu() {
        let start = Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 5).unwrap();
        let window = TimeWindow::new(start, end);
        assert_eq!(window.start_iso(), "2023-09-01T00:00:00.000Z");
        assert_eq!(window.end_iso(), "2024-02-29T12:30:05.000Z");
    }

    #[test]
    fn test_contains_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 9, 2, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, end);
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(Utc.with_ymd_and_hms(2023, 8, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_ending_now_keeps_anchor() {
        let anchor = TimeWindow::parse_anchor("2023-09-01T00:00:00Z").unwrap();
        let first = TimeWindow::ending_now(anchor);
        let second = TimeWindow::ending_now(anchor);
        assert_eq!(first.start, second.start);
        assert!(first.end <= second.end);
    }
}
