//! Time intervals and derived slots
//!
//! All intervals in the engine are half-open `[start, end)` in UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CarebookError, Result};

/// A half-open `[start, end)` interval in UTC
///
/// `end > start` is enforced at construction; build ranges through
/// [`TimeRange::new`] rather than struct literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range, rejecting inverted or zero-length bounds
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(CarebookError::InvalidRange(format!(
                "range end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a range from a start and a positive duration
    pub fn from_start(start: DateTime<Utc>, duration: std::time::Duration) -> Result<Self> {
        if duration.is_zero() {
            return Err(CarebookError::InvalidDuration("duration must be positive".to_string()));
        }
        let span = chrono::Duration::from_std(duration)
            .map_err(|e| CarebookError::InvalidDuration(e.to_string()))?;
        Self::new(start, start + span)
    }

    /// Length of the range
    pub fn duration(&self) -> std::time::Duration {
        (self.end - self.start).to_std().unwrap_or(std::time::Duration::ZERO)
    }

    /// Whether two half-open ranges share any instant
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether this range fully contains another
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersection of two ranges, if non-empty
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeRange { start, end })
    }
}

/// A computed, non-persisted candidate interval available for booking
///
/// Slots are derived per query from availability windows minus active
/// appointments; they are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub professional_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    /// Length of the slot
    pub fn duration(&self) -> std::time::Duration {
        (self.end - self.start).to_std().unwrap_or(std::time::Duration::ZERO)
    }

    /// The slot's interval as a range
    pub fn range(&self) -> TimeRange {
        TimeRange { start: self.start, end: self.end }
    }
}
