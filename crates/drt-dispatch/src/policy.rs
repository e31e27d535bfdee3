//! Re-optimization hooks.

use drt_core::DispatchConfig;
use drt_schedule::{Task, TaskType};

/// Decides when the optimizer should re-plan beyond the fixed triggers
/// (submission, non-empty queue at a step boundary).
///
/// All methods default to "no".
pub trait ReoptimizationPolicy: Send + Sync {
    /// Called after a vehicle's cursor moved to `next`, unless a pass is
    /// already pending.
    fn reoptimize_after_next_task(&self, _next: &Task) -> bool {
        false
    }

    /// Pull PLANNED requests out of every schedule before matching.
    fn unschedule_awaiting_requests(&self) -> bool {
        false
    }

    /// Stop empty drives that no longer lead to a stop after matching.
    fn handle_aimless_drives(&self) -> bool {
        false
    }
}

/// The policy described by a [`DispatchConfig`].
///
/// With unknown destinations the onward trip is only learned at pickup, so
/// a pass is requested once the vehicle sets off with passengers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConfigPolicy {
    pub destination_known:            bool,
    pub unschedule_awaiting_requests: bool,
    pub vehicle_diversion:            bool,
}

impl From<&DispatchConfig> for ConfigPolicy {
    fn from(c: &DispatchConfig) -> Self {
        Self {
            destination_known:            c.destination_known,
            unschedule_awaiting_requests: c.unschedule_awaiting_requests,
            vehicle_diversion:            c.vehicle_diversion,
        }
    }
}

impl ReoptimizationPolicy for ConfigPolicy {
    fn reoptimize_after_next_task(&self, next: &Task) -> bool {
        !self.destination_known && next.task_type() == TaskType::DriveWithPassengers
    }

    fn unschedule_awaiting_requests(&self) -> bool {
        self.unschedule_awaiting_requests
    }

    fn handle_aimless_drives(&self) -> bool {
        self.unschedule_awaiting_requests && self.vehicle_diversion
    }
}
