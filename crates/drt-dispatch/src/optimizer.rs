//! The dispatch optimizer and its event entry points.
//!
//! # Event contract
//!
//! | Entry point              | Effect                                                  |
//! |--------------------------|---------------------------------------------------------|
//! | `on_request_submitted`   | queue the request, require a pass                       |
//! | `on_sim_step`            | run a pass if required or if the queue is non-empty     |
//! | `on_task_completed`      | status bookkeeping, advance the cursor, policy hook     |
//! | `on_link_entered`        | record drive progress, refresh the current ETA          |
//! | `reveal_destination`     | set an unknown destination at pickup                    |
//! | `withdraw_request`       | un-plan a PLANNED request, re-plan its vehicle          |
//!
//! Every schedule mutation goes through this type.  The driver only reads
//! current tasks and reports what happened.
//!
//! # Pass order
//!
//! 1. **Unscheduling** (policy): every PLANNED request is withdrawn and
//!    each affected vehicle keeps only its onboard drop-offs.
//! 2. **Timeline update** for every vehicle.
//! 3. **Matching / committing**, sequential or batch (see
//!    [`MatchingMode`]).
//! 4. **Aimless drives** (policy): an empty drive whose vehicle has no stop
//!    left is cut at the end of the link it is on and followed by a `Wait`.

use tracing::{debug, info, instrument, trace, warn};

use drt_core::{DispatchConfig, LinkId, MatchingMode, NodeId, RequestId, SimTime, VehicleId};
use drt_fleet::{Fleet, Request, RequestRegistry, RequestSpec, RequestStatus};
use drt_schedule::{Schedule, ScheduleSnapshot, Task, TaskKind, TaskType};
use drt_spatial::{PathCostProvider, SpatialError};

use crate::builder::planned_destination;
use crate::progress::ProgressMap;
use crate::{
    AddedTravelTime, CandidateBuilder, ConfigPolicy, CostFunction, DispatchError, DispatchResult,
    DriveProgress, PassReport, ReoptimizationPolicy, VehicleIndex, VehicleRequestPath,
};

// ── PassPhase ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassPhase {
    Idle,
    Triggered,
    Unscheduling,
    Matching,
    Committing,
}

// ── DispatchOptimizer ─────────────────────────────────────────────────────────

pub struct DispatchOptimizer<P, C = AddedTravelTime, Q = ConfigPolicy>
where
    P: PathCostProvider,
    C: CostFunction,
    Q: ReoptimizationPolicy,
{
    config:   DispatchConfig,
    paths:    P,
    cost:     C,
    policy:   Q,
    fleet:    Fleet,
    requests: RequestRegistry,
    progress: ProgressMap,
    phase:    PassPhase,
    requires_reoptimization: bool,
    #[cfg(feature = "parallel")]
    pool:     Option<rayon::ThreadPool>,
}

impl<P: PathCostProvider> DispatchOptimizer<P> {
    /// Optimizer with the reference cost function and the policy described
    /// by `config`.
    pub fn new(config: DispatchConfig, fleet: Fleet, paths: P) -> DispatchResult<Self> {
        config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = match config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| DispatchError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            policy: ConfigPolicy::from(&config),
            config,
            paths,
            cost: AddedTravelTime,
            fleet,
            requests: RequestRegistry::new(),
            progress: ProgressMap::default(),
            phase: PassPhase::Idle,
            requires_reoptimization: false,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

impl<P, C, Q> DispatchOptimizer<P, C, Q>
where
    P: PathCostProvider,
    C: CostFunction,
    Q: ReoptimizationPolicy,
{
    pub fn with_cost<C2: CostFunction>(self, cost: C2) -> DispatchOptimizer<P, C2, Q> {
        DispatchOptimizer {
            config:   self.config,
            paths:    self.paths,
            cost,
            policy:   self.policy,
            fleet:    self.fleet,
            requests: self.requests,
            progress: self.progress,
            phase:    self.phase,
            requires_reoptimization: self.requires_reoptimization,
            #[cfg(feature = "parallel")]
            pool:     self.pool,
        }
    }

    pub fn with_policy<Q2: ReoptimizationPolicy>(self, policy: Q2) -> DispatchOptimizer<P, C, Q2> {
        DispatchOptimizer {
            config:   self.config,
            paths:    self.paths,
            cost:     self.cost,
            policy,
            fleet:    self.fleet,
            requests: self.requests,
            progress: self.progress,
            phase:    self.phase,
            requires_reoptimization: self.requires_reoptimization,
            #[cfg(feature = "parallel")]
            pool:     self.pool,
        }
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn paths(&self) -> &P {
        &self.paths
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn requests(&self) -> &RequestRegistry {
        &self.requests
    }

    pub fn request(&self, id: RequestId) -> DispatchResult<&Request> {
        Ok(self.requests.get(id)?)
    }

    pub fn schedule(&self, vehicle: VehicleId) -> DispatchResult<&Schedule> {
        Ok(self.fleet.get(vehicle)?.schedule())
    }

    /// The task the driver should be simulating for `vehicle`.
    pub fn current_task(&self, vehicle: VehicleId) -> DispatchResult<Option<&Task>> {
        Ok(self.schedule(vehicle)?.current_task())
    }

    pub fn progress(&self, vehicle: VehicleId) -> Option<DriveProgress> {
        self.progress.get(&vehicle).copied()
    }

    #[inline]
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    #[inline]
    pub fn requires_reoptimization(&self) -> bool {
        self.requires_reoptimization
    }

    fn builder(&self) -> CandidateBuilder<'_> {
        CandidateBuilder {
            paths:    &self.paths,
            cost:     &self.cost,
            config:   &self.config,
            requests: &self.requests,
        }
    }

    // ── Driver events ─────────────────────────────────────────────────────

    /// Register a new request.  With `destination_known = false` any
    /// destination in `spec` is ignored until revealed at pickup.
    pub fn on_request_submitted(&mut self, spec: RequestSpec, now: SimTime) -> DispatchResult<RequestId> {
        let spec = if self.config.destination_known {
            spec
        } else {
            RequestSpec { to: None, ..spec }
        };
        let id = self.requests.submit(spec, now)?;
        self.requires_reoptimization = true;
        debug!(request = %id, t0 = %spec.t0, origin = %spec.from, "request submitted");
        Ok(id)
    }

    /// Step boundary.  Runs a pass when one is required; otherwise returns
    /// an empty report without touching any schedule.
    #[instrument(skip_all, level = "debug", fields(now = %now))]
    pub fn on_sim_step(&mut self, now: SimTime) -> DispatchResult<PassReport> {
        if self.requests.has_unplanned() {
            self.requires_reoptimization = true;
        }
        if !self.requires_reoptimization {
            return Ok(PassReport::default());
        }

        self.phase = PassPhase::Triggered;
        self.requires_reoptimization = false;
        let mut report = PassReport::default();
        let result = self.run_pass(now, &mut report);
        self.phase = PassPhase::Idle;
        result?;

        if !report.is_noop() || !report.unassigned.is_empty() {
            info!(
                planned     = report.planned.len(),
                unassigned  = report.unassigned.len(),
                stale       = report.stale.len(),
                unscheduled = report.unscheduled.len(),
                diverted    = report.diverted.len(),
                "pass complete"
            );
        }
        Ok(report)
    }

    /// The current task of `vehicle` finished at `now` (or, for a schedule
    /// not yet started, the vehicle comes into service).  Returns the type
    /// of the new current task, `None` once the schedule is completed.
    pub fn on_task_completed(
        &mut self,
        vehicle: VehicleId,
        now:     SimTime,
    ) -> DispatchResult<Option<TaskType>> {
        self.progress.remove(&vehicle);

        let schedule = self.fleet.get_mut(vehicle)?.schedule_mut();
        schedule.update_timeline(now);
        let finished = schedule.current_task().map(|t| (t.task_type(), t.request()));

        match finished {
            Some((TaskType::Pickup, Some(_))) => {
                if self.dropoffs_outdated(vehicle)? {
                    debug!(vehicle = %vehicle, "destination revealed, re-planning stops");
                    self.replan_vehicle(vehicle, &[], now)?;
                }
            }
            Some((TaskType::Dropoff, Some(request))) => {
                self.requests.mark_performed(request)?;
                debug!(request = %request, vehicle = %vehicle, "request performed");
            }
            _ => {}
        }

        let schedule = self.fleet.get_mut(vehicle)?.schedule_mut();
        let next = schedule.advance(now)?.cloned();
        let Some(next) = next else {
            debug!(vehicle = %vehicle, "schedule completed");
            return Ok(None);
        };
        trace!(vehicle = %vehicle, task = %next, "next task");

        if let TaskKind::Pickup { request, .. } = next.kind {
            self.requests.mark_dispatched(request)?;
        }
        if !self.requires_reoptimization && self.policy.reoptimize_after_next_task(&next) {
            self.requires_reoptimization = true;
        }
        Ok(Some(next.task_type()))
    }

    /// `vehicle` entered `link` at `now`.  Only refreshes estimates.
    pub fn on_link_entered(
        &mut self,
        vehicle: VehicleId,
        link:    LinkId,
        now:     SimTime,
    ) -> DispatchResult<()> {
        let schedule = self.fleet.get_mut(vehicle)?.schedule_mut();
        let leg = schedule
            .current_task()
            .and_then(Task::leg)
            .ok_or(DispatchError::NotDriving(vehicle))?;
        let hop = leg.hop_index(link).ok_or(SpatialError::LinkNotOnLeg(link))?;
        let eta = now + leg.remaining_after_entry(hop);

        schedule.set_current_end(eta)?;
        schedule.update_timeline(now);
        self.progress.insert(vehicle, DriveProgress { hop, entered_at: now });
        trace!(vehicle = %vehicle, link = %link, eta = %eta, "link entered");
        Ok(())
    }

    /// Set the destination of a request picked up without one.
    pub fn reveal_destination(&mut self, request: RequestId, to: NodeId) -> DispatchResult<()> {
        let status = self.requests.get(request)?.status();
        if status != RequestStatus::Dispatched {
            return Err(DispatchError::RequestState {
                request,
                status,
                action: "reveal its destination",
            });
        }
        self.requests.reveal_destination(request, to)?;
        debug!(request = %request, destination = %to, "destination revealed");
        Ok(())
    }

    /// Take a PLANNED request off its vehicle and put it back in the queue.
    /// Fails once the pickup has started.
    pub fn withdraw_request(&mut self, request: RequestId, now: SimTime) -> DispatchResult<()> {
        let status = self.requests.get(request)?.status();
        if status != RequestStatus::Planned {
            return Err(DispatchError::RequestState { request, status, action: "withdraw" });
        }
        let vehicle = self.requests.withdraw(request)?;
        self.replan_vehicle(vehicle, &[request], now)?;
        self.requires_reoptimization = true;
        debug!(request = %request, vehicle = %vehicle, "request withdrawn");
        Ok(())
    }

    // ── Pass ──────────────────────────────────────────────────────────────

    fn run_pass(&mut self, now: SimTime, report: &mut PassReport) -> DispatchResult<()> {
        if self.policy.unschedule_awaiting_requests() {
            self.phase = PassPhase::Unscheduling;
            self.unschedule_awaiting(now, report)?;
        }

        for v in self.fleet.ids().collect::<Vec<_>>() {
            self.fleet.get_mut(v)?.schedule_mut().update_timeline(now);
        }

        match self.config.matching {
            MatchingMode::Sequential => self.match_sequential(now, report)?,
            MatchingMode::Batch => self.match_batch(now, report)?,
        }

        if self.policy.handle_aimless_drives() {
            self.stop_aimless_drives(now, report)?;
        }
        Ok(())
    }

    fn unschedule_awaiting(&mut self, now: SimTime, report: &mut PassReport) -> DispatchResult<()> {
        for v in self.fleet.ids().collect::<Vec<_>>() {
            let awaiting = self.fleet.get(v)?.schedule().snapshot().awaiting();
            if awaiting.is_empty() {
                continue;
            }
            for &r in &awaiting {
                self.requests.withdraw(r)?;
            }
            self.replan_vehicle(v, &awaiting, now)?;
            trace!(vehicle = %v, count = awaiting.len(), "unscheduled");
            report.unscheduled.extend(awaiting);
        }
        Ok(())
    }

    /// One request at a time, fresh snapshots for each.
    fn match_sequential(&mut self, now: SimTime, report: &mut PassReport) -> DispatchResult<()> {
        let queue: Vec<RequestId> = self.requests.unplanned().collect();
        if queue.is_empty() {
            return Ok(());
        }
        let index = self.vehicle_index(&self.fleet.snapshots(), now);

        for request in queue {
            self.phase = PassPhase::Matching;
            let snapshots = self.fleet.snapshots();
            match self.best_candidate(request, &snapshots, index.as_ref(), now)? {
                Some(best) => {
                    self.phase = PassPhase::Committing;
                    self.commit(best, report)?;
                }
                None => {
                    debug!(request = %request, "no feasible vehicle");
                    report.unassigned.push(request);
                }
            }
        }
        Ok(())
    }

    /// Every request against one snapshot set, then commits in `t0` order.
    fn match_batch(&mut self, now: SimTime, report: &mut PassReport) -> DispatchResult<()> {
        let queue: Vec<RequestId> = self.requests.unplanned().collect();
        if queue.is_empty() {
            return Ok(());
        }
        self.phase = PassPhase::Matching;
        let snapshots = self.fleet.snapshots();
        let index = self.vehicle_index(&snapshots, now);

        let eval = |&request: &RequestId| {
            self.best_candidate(request, &snapshots, index.as_ref(), now)
                .map(|best| (request, best))
        };

        #[cfg(not(feature = "parallel"))]
        let results = queue.iter().map(eval).collect::<DispatchResult<Vec<_>>>()?;

        #[cfg(feature = "parallel")]
        let results = {
            use rayon::prelude::*;
            self.install(|| queue.par_iter().map(eval).collect::<DispatchResult<Vec<_>>>())?
        };

        let mut winners = Vec::with_capacity(results.len());
        for (request, best) in results {
            match best {
                Some(path) => winners.push(path),
                None => {
                    debug!(request = %request, "no feasible vehicle");
                    report.unassigned.push(request);
                }
            }
        }
        winners.sort();

        self.phase = PassPhase::Committing;
        for path in winners {
            self.commit(path, report)?;
        }
        Ok(())
    }

    /// Lowest-cost candidate for `request`; ties go to the lowest vehicle id.
    /// With pruning configured the `k` nearest vehicles are tried first and
    /// the whole fleet only if none of them can serve the request.
    fn best_candidate(
        &self,
        request:   RequestId,
        snapshots: &[ScheduleSnapshot],
        index:     Option<&VehicleIndex>,
        now:       SimTime,
    ) -> DispatchResult<Option<VehicleRequestPath>> {
        if let Some(nearest) = self.nearest_vehicles(request, index)? {
            if let Some(best) = self.evaluate(request, &nearest, snapshots, now)? {
                return Ok(Some(best));
            }
            trace!(request = %request, k = nearest.len(), "no feasible nearby vehicle, widening");
        }
        let active: Vec<VehicleId> = snapshots
            .iter()
            .filter(|s| s.departure(now).is_some())
            .map(|s| s.vehicle)
            .collect();
        self.evaluate(request, &active, snapshots, now)
    }

    fn evaluate(
        &self,
        request:   RequestId,
        vehicles:  &[VehicleId],
        snapshots: &[ScheduleSnapshot],
        now:       SimTime,
    ) -> DispatchResult<Option<VehicleRequestPath>> {
        let builder = self.builder();
        let eval = |&v: &VehicleId| -> DispatchResult<Option<VehicleRequestPath>> {
            let capacity = self.fleet.get(v)?.capacity;
            builder.build(&snapshots[v.index()], capacity, &[request], now)
        };

        #[cfg(not(feature = "parallel"))]
        let results = vehicles.iter().map(eval).collect::<DispatchResult<Vec<_>>>()?;

        #[cfg(feature = "parallel")]
        let results = {
            use rayon::prelude::*;
            self.install(|| vehicles.par_iter().map(eval).collect::<DispatchResult<Vec<_>>>())?
        };

        Ok(results.into_iter().flatten().min_by(|a, b| {
            a.cost.total_cmp(&b.cost).then(a.vehicle.cmp(&b.vehicle))
        }))
    }

    /// The `k` vehicles nearest to the request origin, when pruning is
    /// configured and positions are known.
    fn nearest_vehicles(
        &self,
        request: RequestId,
        index:   Option<&VehicleIndex>,
    ) -> DispatchResult<Option<Vec<VehicleId>>> {
        let (Some(k), Some(index)) = (self.config.candidate_vehicles, index) else {
            return Ok(None);
        };
        let origin = self.requests.get(request)?.origin();
        Ok(self.paths.position(origin).map(|pos| index.nearest(pos, k)))
    }

    fn vehicle_index(&self, snapshots: &[ScheduleSnapshot], now: SimTime) -> Option<VehicleIndex> {
        self.config.candidate_vehicles?;
        VehicleIndex::build(snapshots, &self.paths, now)
    }

    #[cfg(feature = "parallel")]
    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Apply `path` unless its vehicle changed since the snapshot it was
    /// built from.  Returns whether it was applied.
    fn commit(&mut self, path: VehicleRequestPath, report: &mut PassReport) -> DispatchResult<bool> {
        path.fail_if_any_request_not_unplanned(&self.requests)?;

        let schedule = self.fleet.get_mut(path.vehicle)?.schedule_mut();
        if schedule.version() != path.schedule_version {
            debug!(
                vehicle = %path.vehicle,
                requests = ?path.requests,
                "stale candidate, re-queued"
            );
            report.stale.extend(&path.requests);
            self.requires_reoptimization = true;
            return Ok(false);
        }
        apply_path(schedule, &path)?;

        for &r in &path.requests {
            self.requests.mark_planned(r, path.vehicle)?;
            report.planned.push((r, path.vehicle));
            debug!(request = %r, vehicle = %path.vehicle, cost = path.cost, "planned");
        }
        Ok(true)
    }

    /// Re-plan the committed stops of `vehicle` minus `exclude`.
    fn replan_vehicle(
        &mut self,
        vehicle: VehicleId,
        exclude: &[RequestId],
        now:     SimTime,
    ) -> DispatchResult<()> {
        let v = self.fleet.get(vehicle)?;
        let path = self
            .builder()
            .rebuild(&v.schedule().snapshot(), v.capacity, exclude, now)?;
        apply_path(self.fleet.get_mut(vehicle)?.schedule_mut(), &path)
    }

    /// Any planned drop-off whose location no longer matches its request.
    fn dropoffs_outdated(&self, vehicle: VehicleId) -> DispatchResult<bool> {
        for task in self.schedule(vehicle)?.planned_tail() {
            if let TaskKind::Dropoff { request, at } = task.kind {
                if planned_destination(self.requests.get(request)?) != at {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn stop_aimless_drives(&mut self, now: SimTime, report: &mut PassReport) -> DispatchResult<()> {
        for v in self.fleet.ids().collect::<Vec<_>>() {
            let hop = self.progress.get(&v).map_or(0, |p| p.hop);
            let schedule = self.fleet.get_mut(v)?.schedule_mut();

            let Some(TaskKind::DriveEmpty { leg }) = schedule.current_task().map(|t| &t.kind) else {
                continue;
            };
            if schedule.planned_tail().iter().any(|t| t.request().is_some()) {
                continue;
            }
            // Already on the last link: the drive ends at the nearest stop.
            if hop + 1 >= leg.hops.len() {
                continue;
            }

            let cut = Task::drive(leg.divert_at(hop)?, false).extended_to(now);
            let (at, end) = (cut.end_node(), cut.end());
            let window_end = schedule.window().end;

            schedule.truncate_after_current();
            schedule.replace_current(cut)?;
            schedule.append(Task::wait(at, end, window_end.max(end)))?;
            debug!(vehicle = %v, stop_at = %at, "aimless drive stopped");
            report.diverted.push(v);
        }
        Ok(())
    }

    // ── Audit ─────────────────────────────────────────────────────────────

    /// Verify, for the whole fleet, temporal ordering, pickup before
    /// drop-off and that every request is either queued or owned by exactly
    /// the vehicle it references.
    pub fn check_invariants(&self) -> DispatchResult<()> {
        let mut owner: Vec<Option<VehicleId>> = vec![None; self.requests.len()];

        for v in self.fleet.vehicles() {
            v.schedule().validate()?;
            for task in v.schedule().tasks() {
                let TaskKind::Pickup { request, .. } = task.kind else { continue };
                let slot = owner
                    .get_mut(request.index())
                    .ok_or_else(|| DispatchError::Invariant(format!("{request} is not registered")))?;
                if let Some(other) = slot.replace(v.id) {
                    return Err(DispatchError::Invariant(format!(
                        "{request} picked up by both {other} and {}",
                        v.id
                    )));
                }
            }
        }

        for req in self.requests.iter() {
            let held_by = owner[req.id().index()];
            let queued = self.requests.is_queued(req.id());
            let ok = match req.status() {
                RequestStatus::Unplanned => queued && held_by.is_none(),
                _ => !queued && held_by.is_some() && held_by == req.vehicle(),
            };
            if !ok {
                warn!(request = %req.id(), status = ?req.status(), "ownership violated");
                return Err(DispatchError::Invariant(format!(
                    "{} is {:?} (queued: {queued}, held by {held_by:?}, assigned {:?})",
                    req.id(),
                    req.status(),
                    req.vehicle()
                )));
            }
        }
        Ok(())
    }
}

/// Replace the tail of `schedule` with `path`.  An idle current `Wait` is
/// cut at the path's departure time, or absorbs a leading `Wait` at the same
/// node.
fn apply_path(schedule: &mut Schedule, path: &VehicleRequestPath) -> DispatchResult<()> {
    schedule.truncate_after_current();
    let mut tasks = path.tasks.iter().peekable();
    if path.departure.idle && schedule.current_task().is_some_and(Task::is_wait) {
        let end = match tasks.next_if(|t| t.is_wait() && t.start_node() == path.departure.node) {
            Some(wait) => wait.end(),
            None => path.departure.time,
        };
        schedule.set_current_end(end)?;
    }
    for task in tasks {
        schedule.append(task.clone())?;
    }
    Ok(())
}
