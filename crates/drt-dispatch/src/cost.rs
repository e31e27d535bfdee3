//! Candidate scoring.
//!
//! A [`CostFunction`] maps the measurable effects of a candidate plan to a
//! scalar; lower is better.  Implementations must be non-decreasing in
//! `added_drive_secs` so candidates stay comparable across vehicles.

use drt_core::SimTime;

/// What a candidate plan does to its vehicle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlanCost {
    /// Total driving time of the planned tail.
    pub drive_secs:          u64,
    /// Driving time of the tail before the insertion.
    pub baseline_drive_secs: u64,
    /// Sum over the new requests of `pickup_begin - t0`.
    pub new_wait_secs:       u64,
    /// When the last stop is done.
    pub completion:          SimTime,
}

impl PlanCost {
    #[inline]
    pub fn added_drive_secs(&self) -> u64 {
        self.drive_secs.saturating_sub(self.baseline_drive_secs)
    }
}

pub trait CostFunction: Send + Sync {
    fn cost(&self, plan: &PlanCost) -> f64;
}

/// Added vehicle travel time.
#[derive(Copy, Clone, Debug, Default)]
pub struct AddedTravelTime;

impl CostFunction for AddedTravelTime {
    fn cost(&self, plan: &PlanCost) -> f64 {
        plan.added_drive_secs() as f64
    }
}

/// Added travel time plus weighted passenger waiting.
#[derive(Copy, Clone, Debug)]
pub struct WaitWeighted {
    pub wait_weight: f64,
}

impl Default for WaitWeighted {
    fn default() -> Self {
        Self { wait_weight: 1.0 }
    }
}

impl CostFunction for WaitWeighted {
    fn cost(&self, plan: &PlanCost) -> f64 {
        plan.added_drive_secs() as f64 + self.wait_weight.max(0.0) * plan.new_wait_secs as f64
    }
}
