//! Slot allocation
//!
//! Computes candidate free slots for a professional by walking the open
//! availability windows and subtracting the intervals of active appointments.
//! Slots are derived values; nothing here is persisted.

use std::sync::Arc;

use carebook_domain::{CarebookError, Result, Slot, TimeRange};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ledger::AppointmentLedger;
use super::ports::AvailabilityStore;

/// Computes free slots from availability minus booked time
pub struct SlotAllocator {
    availability: Arc<dyn AvailabilityStore>,
    ledger: Arc<AppointmentLedger>,
    /// Step between candidate starts within a free interval; defaults to the
    /// requested duration (back-to-back slots)
    granularity: Option<std::time::Duration>,
}

impl SlotAllocator {
    /// Create an allocator over the given availability source and ledger
    pub fn new(availability: Arc<dyn AvailabilityStore>, ledger: Arc<AppointmentLedger>) -> Self {
        Self { availability, ledger, granularity: None }
    }

    /// Override the candidate-start step
    pub fn with_granularity(mut self, granularity: std::time::Duration) -> Self {
        self.granularity = Some(granularity);
        self
    }

    /// Free slots of `duration` within `range`, earliest first
    ///
    /// The returned iterator is finite, lazy, and restartable (`Clone`
    /// restarts it from the beginning). It is a snapshot: bookings committed
    /// after the call do not invalidate already-yielded slots, which is why
    /// the ledger re-checks overlap at commit time.
    pub async fn find_slots(
        &self,
        professional_id: Uuid,
        range: &TimeRange,
        duration: std::time::Duration,
    ) -> Result<SlotIter> {
        if duration.is_zero() {
            return Err(CarebookError::InvalidDuration(
                "slot duration must be positive".to_string(),
            ));
        }

        let open = self.availability.open_windows(professional_id, range).await?;
        let busy = self.ledger.active_intervals(professional_id, range);
        let free = subtract_intervals(&open, &busy);

        let step = self.granularity.filter(|g| !g.is_zero()).unwrap_or(duration);
        Ok(SlotIter::new(professional_id, free, duration, step))
    }
}

/// Subtract sorted `busy` intervals from sorted `open` intervals
///
/// Single merge walk over both lists, O(n + m). Inputs must each be sorted
/// by start; `open` must be non-overlapping.
pub fn subtract_intervals(open: &[TimeRange], busy: &[TimeRange]) -> Vec<TimeRange> {
    let mut free = Vec::new();
    let mut busy_iter = busy.iter().peekable();

    for window in open {
        let mut cursor = window.start;

        // Skip busy intervals that end before this window
        while let Some(b) = busy_iter.peek() {
            if b.end <= cursor {
                busy_iter.next();
            } else {
                break;
            }
        }

        // Clone the iterator so a busy interval spanning two windows is
        // applied to both
        for b in busy_iter.clone() {
            if b.start >= window.end {
                break;
            }
            if b.start > cursor {
                free.push(TimeRange { start: cursor, end: b.start });
            }
            cursor = cursor.max(b.end);
            if cursor >= window.end {
                break;
            }
        }

        if cursor < window.end {
            free.push(TimeRange { start: cursor, end: window.end });
        }
    }

    free
}

/// Lazy, restartable iterator over candidate slots
#[derive(Debug, Clone)]
pub struct SlotIter {
    professional_id: Uuid,
    free: Arc<[TimeRange]>,
    duration: chrono::Duration,
    step: chrono::Duration,
    window_idx: usize,
    cursor: Option<DateTime<Utc>>,
}

impl SlotIter {
    fn new(
        professional_id: Uuid,
        free: Vec<TimeRange>,
        duration: std::time::Duration,
        step: std::time::Duration,
    ) -> Self {
        // A duration too large for chrono cannot fit any window; yield nothing
        let (free, duration, step) =
            match (chrono::Duration::from_std(duration), chrono::Duration::from_std(step)) {
                (Ok(duration), Ok(step)) => (free, duration, step.max(chrono::Duration::seconds(1))),
                _ => (Vec::new(), chrono::Duration::zero(), chrono::Duration::seconds(1)),
            };
        Self { professional_id, free: free.into(), duration, step, window_idx: 0, cursor: None }
    }
}

impl Iterator for SlotIter {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        while self.window_idx < self.free.len() {
            let window = self.free[self.window_idx];
            let start = self.cursor.unwrap_or(window.start);

            if start + self.duration <= window.end {
                self.cursor = Some(start + self.step);
                return Some(Slot {
                    professional_id: self.professional_id,
                    start,
                    end: start + self.duration,
                });
            }

            self.window_idx += 1;
            self.cursor = None;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).single().unwrap()
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> TimeRange {
        TimeRange::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
    }

    fn hour() -> std::time::Duration {
        std::time::Duration::from_secs(3600)
    }

    #[test]
    fn test_subtract_no_busy_returns_open() {
        let open = vec![range((9, 0), (17, 0))];

        assert_eq!(subtract_intervals(&open, &[]), open);
    }

    #[test]
    fn test_subtract_splits_around_busy() {
        let open = vec![range((9, 0), (17, 0))];
        let busy = vec![range((10, 0), (11, 0)), range((13, 0), (14, 30))];

        assert_eq!(
            subtract_intervals(&open, &busy),
            vec![range((9, 0), (10, 0)), range((11, 0), (13, 0)), range((14, 30), (17, 0))]
        );
    }

    #[test]
    fn test_subtract_busy_at_window_edges() {
        let open = vec![range((9, 0), (12, 0))];
        let busy = vec![range((9, 0), (10, 0)), range((11, 0), (12, 0))];

        assert_eq!(subtract_intervals(&open, &busy), vec![range((10, 0), (11, 0))]);
    }

    #[test]
    fn test_subtract_busy_covering_window() {
        let open = vec![range((9, 0), (12, 0))];
        let busy = vec![range((8, 0), (13, 0))];

        assert!(subtract_intervals(&open, &busy).is_empty());
    }

    #[test]
    fn test_subtract_busy_spanning_two_windows() {
        let open = vec![range((9, 0), (11, 0)), range((12, 0), (14, 0))];
        let busy = vec![range((10, 30), (12, 30))];

        assert_eq!(
            subtract_intervals(&open, &busy),
            vec![range((9, 0), (10, 30)), range((12, 30), (14, 0))]
        );
    }

    #[test]
    fn test_slot_iter_steps_by_duration() {
        let free = vec![range((9, 0), (12, 0))];
        let slots: Vec<Slot> = SlotIter::new(Uuid::new_v4(), free, hour(), hour()).collect();

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start, at(9, 0));
        assert_eq!(slots[0].end, at(10, 0));
        assert_eq!(slots[1].start, at(10, 0));
        assert_eq!(slots[2].start, at(11, 0));
    }

    #[test]
    fn test_slot_iter_custom_granularity() {
        let free = vec![range((9, 0), (10, 30))];
        let step = std::time::Duration::from_secs(30 * 60);
        let slots: Vec<Slot> = SlotIter::new(Uuid::new_v4(), free, hour(), step).collect();

        // Starts at 09:00 and 09:30 fit a 1h slot before 10:30
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start, at(9, 0));
        assert_eq!(slots[1].start, at(9, 30));
    }

    #[test]
    fn test_slot_iter_skips_short_intervals() {
        let free = vec![range((9, 0), (9, 30)), range((10, 0), (11, 0))];
        let slots: Vec<Slot> = SlotIter::new(Uuid::new_v4(), free, hour(), hour()).collect();

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, at(10, 0));
    }

    #[test]
    fn test_slot_iter_restartable_via_clone() {
        let free = vec![range((9, 0), (11, 0))];
        let mut iter = SlotIter::new(Uuid::new_v4(), free, hour(), hour());
        let restart = iter.clone();

        assert_eq!(iter.count(), 2);
        assert_eq!(restart.count(), 2);
    }
}
