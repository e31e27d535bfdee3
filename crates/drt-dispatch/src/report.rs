use drt_core::{RequestId, VehicleId};

/// Outcome of one re-optimization pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Committed this pass, in commit order.
    pub planned:     Vec<(RequestId, VehicleId)>,
    /// No feasible vehicle; still queued.
    pub unassigned:  Vec<RequestId>,
    /// Candidate went stale before commit; still queued.
    pub stale:       Vec<RequestId>,
    /// Pulled back out of schedules before matching.
    pub unscheduled: Vec<RequestId>,
    /// Vehicles whose empty drive was cut short.
    pub diverted:    Vec<VehicleId>,
}

impl PassReport {
    /// `true` when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.planned.is_empty() && self.unscheduled.is_empty() && self.diverted.is_empty()
    }
}
