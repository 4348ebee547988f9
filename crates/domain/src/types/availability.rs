//! Professional availability windows

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::TimeRange;

/// Whether a window opens or blocks time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Open,
    Blocked,
}

/// Day of week for recurring windows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    fn matches(&self, weekday: Weekday) -> bool {
        matches!(
            (self, weekday),
            (Self::Monday, Weekday::Mon)
                | (Self::Tuesday, Weekday::Tue)
                | (Self::Wednesday, Weekday::Wed)
                | (Self::Thursday, Weekday::Thu)
                | (Self::Friday, Weekday::Fri)
                | (Self::Saturday, Weekday::Sat)
                | (Self::Sunday, Weekday::Sun)
        )
    }
}

/// One-off or weekly-recurring window rule
///
/// Weekly times are naive UTC times of day; a rule whose end does not lie
/// after its start resolves to nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RecurrenceRule {
    OneOff { start: DateTime<Utc>, end: DateTime<Utc> },
    Weekly { day: DayOfWeek, start: NaiveTime, end: NaiveTime },
}

/// A professional's open or blocked window
///
/// Owned by the professional; consulted, never mutated, by the slot
/// allocator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub professional_id: Uuid,
    pub state: WindowState,
    pub rule: RecurrenceRule,
}

impl AvailabilityWindow {
    /// Convenience constructor for a one-off window
    pub fn one_off(
        professional_id: Uuid,
        state: WindowState,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self { professional_id, state, rule: RecurrenceRule::OneOff { start, end } }
    }

    /// Convenience constructor for a weekly window
    pub fn weekly(
        professional_id: Uuid,
        state: WindowState,
        day: DayOfWeek,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        Self { professional_id, state, rule: RecurrenceRule::Weekly { day, start, end } }
    }

    /// Resolve the rule to concrete intervals within `range`, clipped to it
    ///
    /// Returned intervals are sorted by start and non-overlapping (a single
    /// rule cannot produce overlapping occurrences).
    pub fn resolve(&self, range: &TimeRange) -> Vec<TimeRange> {
        match &self.rule {
            RecurrenceRule::OneOff { start, end } => {
                if end <= start {
                    return Vec::new();
                }
                TimeRange { start: *start, end: *end }.intersect(range).into_iter().collect()
            }
            RecurrenceRule::Weekly { day, start, end } => {
                if end <= start {
                    return Vec::new();
                }
                let mut occurrences = Vec::new();
                let mut date = range.start.date_naive();
                let last = range.end.date_naive();
                while date <= last {
                    if day.matches(date.weekday()) {
                        let occurrence = TimeRange {
                            start: Utc.from_utc_datetime(&date.and_time(*start)),
                            end: Utc.from_utc_datetime(&date.and_time(*end)),
                        };
                        if let Some(clipped) = occurrence.intersect(range) {
                            occurrences.push(clipped);
                        }
                    }
                    date = date + Duration::days(1);
                }
                occurrences
            }
        }
    }
}
