//! The `FleetSim` struct and its step loop.

use tracing::{debug, info, trace};

use drt_core::{NodeId, RequestId, SimClock, SimConfig, SimTime, VehicleId};
use drt_fleet::RequestStatus;
use drt_dispatch::{
    AddedTravelTime, ConfigPolicy, CostFunction, DispatchOptimizer, PassReport,
    ReoptimizationPolicy,
};
use drt_schedule::{Cursor, Task, TaskType};
use drt_spatial::PathCostProvider;

use crate::{DispatchObserver, SimResult, SubmissionQueue};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

// ── FleetSim ──────────────────────────────────────────────────────────────────

/// The reference driver.
///
/// `FleetSim` owns the optimizer and plays the role of the outside world:
/// vehicles follow their current task exactly as planned, passengers tell
/// the driver where they are going once picked up, and requests arrive at
/// their scheduled submission time.
///
/// Create via [`FleetSimBuilder`][crate::FleetSimBuilder].
pub struct FleetSim<P, C = AddedTravelTime, Q = ConfigPolicy>
where
    P: PathCostProvider,
    C: CostFunction,
    Q: ReoptimizationPolicy,
{
    /// Start, step length and end of the run.
    pub config: SimConfig,

    /// Step clock; `clock.now` is the next step to process.
    pub clock: SimClock,

    /// The dispatch engine under test.
    pub optimizer: DispatchOptimizer<P, C, Q>,

    /// Requests not yet released to the optimizer.
    pub submissions: SubmissionQueue,

    /// Destinations withheld from the optimizer until pickup.
    hidden: Map<RequestId, NodeId>,

    /// Per driving vehicle, the next hop of the current leg whose entry has
    /// not been reported yet.
    next_hop: Map<VehicleId, usize>,
}

impl<P, C, Q> FleetSim<P, C, Q>
where
    P: PathCostProvider,
    C: CostFunction,
    Q: ReoptimizationPolicy,
{
    pub fn new(
        config:      SimConfig,
        optimizer:   DispatchOptimizer<P, C, Q>,
        submissions: SubmissionQueue,
    ) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            clock: config.make_clock(),
            config,
            optimizer,
            submissions,
            hidden: Map::default(),
            next_hop: Map::default(),
        })
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current step to `config.end`.
    ///
    /// Calls observer hooks at every step boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: DispatchObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.now < self.config.end {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.now);

        let requests = self.optimizer.requests();
        let performed = requests
            .iter()
            .filter(|r| r.status() == RequestStatus::Performed)
            .count();
        info!(
            steps     = self.clock.steps_elapsed(),
            requests  = requests.len(),
            performed,
            pending   = self.submissions.len(),
            "simulation finished"
        );
        Ok(())
    }

    /// Run exactly `n` steps from the current position (ignores `end`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_steps<O: DispatchObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    // ── Core step processing ──────────────────────────────────────────────

    fn step<O: DispatchObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.now;
        observer.on_step_start(now);
        let report = self.process_step(now, observer)?;
        observer.on_step_end(now, &report);
        self.clock.advance();
        Ok(())
    }

    fn process_step<O: DispatchObserver>(
        &mut self,
        now:      SimTime,
        observer: &mut O,
    ) -> SimResult<PassReport> {
        // ── Phase 1: vehicle progress ─────────────────────────────────────
        //
        // Ascending VehicleId order.  Every event carries the exact time it
        // happened, which is never later than `now`.
        let vehicles: Vec<VehicleId> = self.optimizer.fleet().ids().collect();
        for vehicle in vehicles {
            self.advance_vehicle(vehicle, now, observer)?;
        }

        // ── Phase 2: submissions ──────────────────────────────────────────
        //
        // Requests due since the previous step are received at the step
        // boundary.
        for (_, spec) in self.submissions.drain_until(now) {
            let id = self.optimizer.on_request_submitted(spec, now)?;
            if !self.optimizer.config().destination_known {
                if let Some(to) = spec.to {
                    self.hidden.insert(id, to);
                }
            }
        }

        // ── Phase 3: dispatch pass ────────────────────────────────────────
        Ok(self.optimizer.on_sim_step(now)?)
    }

    /// Play `vehicle` forward to `now`.
    fn advance_vehicle<O: DispatchObserver>(
        &mut self,
        vehicle:  VehicleId,
        now:      SimTime,
        observer: &mut O,
    ) -> SimResult<()> {
        let schedule = self.optimizer.schedule(vehicle)?;
        match schedule.cursor() {
            Cursor::Completed => return Ok(()),
            Cursor::NotStarted => {
                let Some(first) = schedule.tasks().first() else { return Ok(()) };
                let start = first.begin().max(schedule.window().start);
                if start > now {
                    return Ok(());
                }
                self.complete(vehicle, start, observer)?;
            }
            Cursor::At(_) => {}
        }

        loop {
            let Some(task) = self.optimizer.current_task(vehicle)?.cloned() else {
                return Ok(());
            };
            if let Some(leg) = task.leg() {
                let mut hop = self.next_hop.get(&vehicle).copied().unwrap_or(0);
                while hop < leg.hops.len() && leg.entry_time(hop) <= now {
                    let entered = leg.entry_time(hop);
                    self.optimizer.on_link_entered(vehicle, leg.hops[hop].link, entered)?;
                    hop += 1;
                }
                self.next_hop.insert(vehicle, hop);
            }

            // Link events may have moved the end.
            let end = match self.optimizer.current_task(vehicle)? {
                Some(t) => t.end(),
                None => return Ok(()),
            };
            if end > now {
                return Ok(());
            }
            if !self.complete(vehicle, end, observer)? {
                return Ok(());
            }
        }
    }

    /// Report the end of the current task.  Returns `false` once the
    /// schedule is completed.
    fn complete<O: DispatchObserver>(
        &mut self,
        vehicle:  VehicleId,
        at:       SimTime,
        observer: &mut O,
    ) -> SimResult<bool> {
        self.next_hop.remove(&vehicle);
        let Some(kind) = self.optimizer.on_task_completed(vehicle, at)? else {
            debug!(vehicle = %vehicle, at = %at, "vehicle out of service");
            return Ok(false);
        };

        if kind == TaskType::Pickup {
            self.reveal_on_pickup(vehicle)?;
        }
        if let Some(task) = self.optimizer.current_task(vehicle)? {
            trace!(vehicle = %vehicle, at = %at, task = %task, "task started");
            observer.on_task_started(vehicle, task);
        }
        Ok(true)
    }

    /// The passenger boarding `vehicle` names their destination.
    fn reveal_on_pickup(&mut self, vehicle: VehicleId) -> SimResult<()> {
        let Some(request) = self.optimizer.current_task(vehicle)?.and_then(Task::request) else {
            return Ok(());
        };
        if let Some(to) = self.hidden.remove(&request) {
            self.optimizer.reveal_destination(request, to)?;
        }
        Ok(())
    }
}
