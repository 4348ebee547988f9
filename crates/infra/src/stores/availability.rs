//! In-memory availability store
//!
//! Holds each professional's declared windows and resolves them to concrete
//! open intervals on demand: recurring rules are expanded against the
//! queried range, contiguous open spans merged, and blocked spans
//! subtracted before anything is returned.

use std::collections::HashMap;

use async_trait::async_trait;
use carebook_core::scheduling::slots::subtract_intervals;
use carebook_core::AvailabilityStore;
use carebook_domain::{AvailabilityWindow, CarebookError, Result, TimeRange, WindowState};
use parking_lot::RwLock;
use uuid::Uuid;

/// Availability port backed by a hash map of declared windows
#[derive(Default)]
pub struct InMemoryAvailabilityStore {
    windows: RwLock<HashMap<Uuid, Vec<AvailabilityWindow>>>,
}

impl InMemoryAvailabilityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a professional's declared windows
    ///
    /// Registering an empty set is valid: the professional is known but has
    /// no bookable time.
    pub fn set_windows(&self, professional_id: Uuid, windows: Vec<AvailabilityWindow>) {
        self.windows.write().insert(professional_id, windows);
    }

    /// Append one declared window
    pub fn add_window(&self, window: AvailabilityWindow) {
        self.windows.write().entry(window.professional_id).or_default().push(window);
    }

    /// Forget a professional entirely
    pub fn remove(&self, professional_id: Uuid) {
        self.windows.write().remove(&professional_id);
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn open_windows(
        &self,
        professional_id: Uuid,
        range: &TimeRange,
    ) -> Result<Vec<TimeRange>> {
        // Copy-on-read: resolve from a snapshot so a concurrent update never
        // tears a query's results
        let declared = {
            let windows = self.windows.read();
            windows
                .get(&professional_id)
                .cloned()
                .ok_or_else(|| CarebookError::NotFound(format!("professional {professional_id}")))?
        };

        let mut open = Vec::new();
        let mut blocked = Vec::new();
        for window in &declared {
            let resolved = window.resolve(range);
            match window.state {
                WindowState::Open => open.extend(resolved),
                WindowState::Blocked => blocked.extend(resolved),
            }
        }

        let open = merge_ranges(open);
        let blocked = merge_ranges(blocked);
        Ok(subtract_intervals(&open, &blocked))
    }
}

/// Sort and merge overlapping or adjacent ranges
fn merge_ranges(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<TimeRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
