//! `SubmissionQueue` — requests waiting for their submission time.
//!
//! Scenario requests are known up front but must reach the optimizer one
//! step at a time, at or after their submission time.  `BTreeMap` keyed by
//! time keeps the drain O(log W) per step, W being the number of distinct
//! pending submission times.

use std::collections::BTreeMap;

use drt_core::SimTime;
use drt_fleet::RequestSpec;

/// Pending submissions by time; FIFO among equal times.
#[derive(Default)]
pub struct SubmissionQueue {
    inner: BTreeMap<SimTime, Vec<RequestSpec>>,
    /// Cached entry count for O(1) `len()`.
    total: usize,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: SimTime, spec: RequestSpec) {
        self.inner.entry(at).or_default().push(spec);
        self.total += 1;
    }

    /// Remove and return every submission due at or before `now`, in time
    /// order.
    pub fn drain_until(&mut self, now: SimTime) -> Vec<(SimTime, RequestSpec)> {
        let mut due = Vec::new();
        while let Some(entry) = self.inner.first_entry() {
            if *entry.key() > now {
                break;
            }
            let (at, specs) = entry.remove_entry();
            self.total -= specs.len();
            due.extend(specs.into_iter().map(|s| (at, s)));
        }
        due
    }

    /// The earliest pending submission time, or `None` if empty.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Extend<(SimTime, RequestSpec)> for SubmissionQueue {
    fn extend<I: IntoIterator<Item = (SimTime, RequestSpec)>>(&mut self, iter: I) {
        for (at, spec) in iter {
            self.push(at, spec);
        }
    }
}
