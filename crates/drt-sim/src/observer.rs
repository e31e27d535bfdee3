//! Observer trait for progress reporting and data collection.

use drt_core::{SimTime, VehicleId};
use drt_dispatch::PassReport;
use drt_schedule::Task;

/// Callbacks invoked by [`FleetSim::run`][crate::FleetSim::run] at key points
/// in the step loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — served-request counter
///
/// ```rust,ignore
/// struct Served(usize);
///
/// impl DispatchObserver for Served {
///     fn on_task_started(&mut self, _v: VehicleId, task: &Task) {
///         if task.task_type() == TaskType::Dropoff {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait DispatchObserver {
    /// Called at the very start of each step, before any processing.
    fn on_step_start(&mut self, _now: SimTime) {}

    /// Called whenever a vehicle's cursor moves to a new task.
    fn on_task_started(&mut self, _vehicle: VehicleId, _task: &Task) {}

    /// Called at the end of each step with the outcome of that step's pass
    /// (empty when no pass ran).
    fn on_step_end(&mut self, _now: SimTime, _report: &PassReport) {}

    /// Called once after the final step.
    fn on_sim_end(&mut self, _now: SimTime) {}
}

/// A [`DispatchObserver`] that does nothing.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}
