//! Candidate construction: cheapest insertion of new requests into a
//! vehicle's committed stops.
//!
//! # Algorithm
//!
//! 1. The departure point comes from the snapshot: an idle vehicle leaves
//!    from where it waits (no earlier than `now`); a busy one leaves from
//!    the end of its current task.
//! 2. Committed pickups and drop-offs keep their relative order.  For a
//!    single new request every `(pickup, drop-off)` position pair with the
//!    pickup first is timed; several requests are inserted greedily one
//!    after another in `(t0, id)` order.
//! 3. Timing walks the stop sequence with legs from the
//!    [`PathCostProvider`]: a drive per non-trivial leg (with passengers
//!    iff anyone is aboard), a `Wait` before any pickup reached ahead of
//!    its `t0`, the stop itself, and finally an idle `Wait` up to the end
//!    of the vehicle's window.
//! 4. A sequence is feasible when the load never exceeds capacity, the
//!    last stop finishes inside the window and no new request waits longer
//!    than `max_wait_secs`.
//!
//! The builder only reads; it is shared by reference across worker threads.

use tracing::{debug, trace};

use drt_core::{DispatchConfig, NodeId, RequestId, SimTime};
use drt_fleet::{Request, RequestRegistry};
use drt_schedule::{DeparturePoint, ScheduleSnapshot, Task, TaskKind};
use drt_spatial::{Leg, PathCostProvider, SpatialError, SpatialResult};

use crate::candidate::SingleRequest;
use crate::{
    CostFunction, DispatchError, DispatchResult, PathKind, PlanCost, Stop, StopKind,
    VehicleRequestPath,
};

/// Where a request is dropped off: its destination, or its origin while the
/// destination is still unknown.
pub(crate) fn planned_destination(req: &Request) -> NodeId {
    req.destination().unwrap_or(req.origin())
}

// ── Internal plan types ───────────────────────────────────────────────────────

/// Per-vehicle inputs shared by every sequence timed for one candidate.
struct VehicleContext<'s> {
    snapshot:            &'s ScheduleSnapshot,
    departure:           DeparturePoint,
    capacity:            u32,
    onboard:             u32,
    baseline_drive_secs: u64,
}

/// A timed stop sequence.
struct Plan {
    legs:     Vec<Leg>,
    tasks:    Vec<Task>,
    /// Arrival at each stop's node, before any waiting.
    arrivals: Vec<SimTime>,
    cost:     PlanCost,
}

// ── CandidateBuilder ──────────────────────────────────────────────────────────

pub struct CandidateBuilder<'a> {
    pub paths:    &'a dyn PathCostProvider,
    pub cost:     &'a dyn CostFunction,
    pub config:   &'a DispatchConfig,
    pub requests: &'a RequestRegistry,
}

impl CandidateBuilder<'_> {
    /// Cheapest feasible insertion of `new` into the vehicle behind
    /// `snapshot`, or `None` when no ordering is feasible.
    ///
    /// A route failure makes the vehicle infeasible for this call.
    pub fn build(
        &self,
        snapshot: &ScheduleSnapshot,
        capacity: u32,
        new:      &[RequestId],
        now:      SimTime,
    ) -> DispatchResult<Option<VehicleRequestPath>> {
        let Some(ctx) = self.context(snapshot, capacity, now) else {
            return Ok(None);
        };

        let mut ordered = new
            .iter()
            .map(|&r| self.requests.get(r))
            .collect::<Result<Vec<_>, _>>()?;
        ordered.sort_by_key(|r| r.key());
        let ids: Vec<RequestId> = ordered.iter().map(|r| r.id()).collect();

        let mut base = self.committed_stops(snapshot, &[])?;
        let mut best = None;
        for req in &ordered {
            let pickup = Stop {
                request: req.id(),
                kind:    StopKind::Pickup,
                at:      req.origin(),
                t0:      req.t0(),
            };
            let dropoff = Stop {
                kind: StopKind::Dropoff,
                at:   planned_destination(req),
                ..pickup
            };
            match self.best_insertion(&ctx, &base, pickup, dropoff, &ids) {
                Ok(Some(found)) => {
                    base.clone_from(&found.0);
                    best = Some(found);
                }
                Ok(None) => return Ok(None),
                Err(e) => {
                    debug!(vehicle = %snapshot.vehicle, error = %e, "route failure, vehicle skipped");
                    return Ok(None);
                }
            }
        }
        let Some((stops, plan, cost)) = best else {
            return Ok(None);
        };

        let single = match ordered.as_slice() {
            [req] => {
                let idx = stops
                    .iter()
                    .position(|s| s.request == req.id() && s.is_pickup())
                    .unwrap_or_default();
                Some(SingleRequest {
                    t0:                  req.t0(),
                    arrival_time:        plan.arrivals[idx],
                    initial_destination: planned_destination(req),
                })
            }
            _ => None,
        };

        trace!(vehicle = %snapshot.vehicle, cost, stops = stops.len(), "candidate");
        Ok(Some(VehicleRequestPath {
            vehicle:          snapshot.vehicle,
            kind:             PathKind::Insertion,
            requests:         ids,
            departure:        ctx.departure,
            stops,
            legs:             plan.legs,
            tasks:            plan.tasks,
            cost,
            schedule_version: snapshot.version,
            single,
        }))
    }

    /// Re-time the committed stops minus `exclude`, using current request
    /// destinations.  Time-window and wait limits are not enforced: these
    /// stops are already promised.  A route failure is an error.
    pub fn rebuild(
        &self,
        snapshot: &ScheduleSnapshot,
        capacity: u32,
        exclude:  &[RequestId],
        now:      SimTime,
    ) -> DispatchResult<VehicleRequestPath> {
        let ctx = self
            .context(snapshot, capacity, now)
            .ok_or(DispatchError::Replan(snapshot.vehicle))?;
        let stops = self.committed_stops(snapshot, exclude)?;
        let plan = self
            .time_stops(&ctx, &stops, &[], true)?
            .ok_or(DispatchError::Replan(snapshot.vehicle))?;

        Ok(VehicleRequestPath {
            vehicle:          snapshot.vehicle,
            kind:             PathKind::Rebuild,
            requests:         Vec::new(),
            departure:        ctx.departure,
            stops,
            legs:             plan.legs,
            cost:             self.cost.cost(&plan.cost),
            tasks:            plan.tasks,
            schedule_version: snapshot.version,
            single:           None,
        })
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn context<'s>(
        &self,
        snapshot: &'s ScheduleSnapshot,
        capacity: u32,
        now:      SimTime,
    ) -> Option<VehicleContext<'s>> {
        let departure = snapshot.departure(now)?;
        Some(VehicleContext {
            snapshot,
            departure,
            capacity,
            onboard: snapshot.onboard().len() as u32,
            baseline_drive_secs: snapshot
                .tail
                .iter()
                .filter_map(Task::leg)
                .map(Leg::travel_secs)
                .sum(),
        })
    }

    /// Pickups and drop-offs of the snapshot tail, in order.
    fn committed_stops(
        &self,
        snapshot: &ScheduleSnapshot,
        exclude:  &[RequestId],
    ) -> DispatchResult<Vec<Stop>> {
        let mut stops = Vec::new();
        for task in &snapshot.tail {
            let (request, kind) = match task.kind {
                TaskKind::Pickup { request, .. } => (request, StopKind::Pickup),
                TaskKind::Dropoff { request, .. } => (request, StopKind::Dropoff),
                _ => continue,
            };
            if exclude.contains(&request) {
                continue;
            }
            let req = self.requests.get(request)?;
            let at = match kind {
                StopKind::Pickup => req.origin(),
                StopKind::Dropoff => planned_destination(req),
            };
            stops.push(Stop { request, kind, at, t0: req.t0() });
        }
        Ok(stops)
    }

    fn best_insertion(
        &self,
        ctx:     &VehicleContext<'_>,
        base:    &[Stop],
        pickup:  Stop,
        dropoff: Stop,
        new:     &[RequestId],
    ) -> SpatialResult<Option<(Vec<Stop>, Plan, f64)>> {
        let n = base.len();
        let mut best: Option<(Vec<Stop>, Plan, f64)> = None;

        for i in 0..=n {
            for j in i..=n {
                let mut seq = Vec::with_capacity(n + 2);
                seq.extend_from_slice(&base[..i]);
                seq.push(pickup);
                seq.extend_from_slice(&base[i..j]);
                seq.push(dropoff);
                seq.extend_from_slice(&base[j..]);

                let Some(plan) = self.time_stops(ctx, &seq, new, false)? else {
                    continue;
                };
                let cost = self.cost.cost(&plan.cost);
                if best.as_ref().is_none_or(|(_, _, c)| cost < *c) {
                    best = Some((seq, plan, cost));
                }
            }
        }
        Ok(best)
    }

    /// Time `stops` from the vehicle's departure point.  `None` when the
    /// sequence is infeasible.
    fn time_stops(
        &self,
        ctx:     &VehicleContext<'_>,
        stops:   &[Stop],
        new:     &[RequestId],
        relaxed: bool,
    ) -> SpatialResult<Option<Plan>> {
        // Capacity first: it needs no routing.
        let mut load = ctx.onboard;
        for s in stops {
            match s.kind {
                StopKind::Pickup => {
                    load += 1;
                    if load > ctx.capacity {
                        return Ok(None);
                    }
                }
                StopKind::Dropoff => load = load.saturating_sub(1),
            }
        }

        let dep = ctx.departure;
        let mut nodes = Vec::with_capacity(stops.len() + 1);
        nodes.push(dep.node);
        nodes.extend(stops.iter().map(|s| s.at));
        let routed = self.paths.route(&nodes, dep.time)?;
        if routed.len() != stops.len() {
            return Err(SpatialError::NoRoute {
                from: dep.node,
                to:   nodes[nodes.len() - 1],
            });
        }

        let mut t = dep.time;
        let mut load = ctx.onboard;
        let mut tasks = Vec::with_capacity(stops.len() * 3 + 1);
        let mut legs = Vec::with_capacity(stops.len());
        let mut arrivals = Vec::with_capacity(stops.len());
        let mut drive_secs = 0;
        let mut new_wait_secs = 0;

        for (stop, leg) in stops.iter().zip(routed) {
            let leg = leg.departing_at(t);
            if !leg.is_trivial() {
                drive_secs += leg.travel_secs();
                t = leg.arrival;
                tasks.push(Task::drive(leg.clone(), load > 0));
            }
            arrivals.push(t);
            legs.push(leg);

            let task = match stop.kind {
                StopKind::Pickup => {
                    if t < stop.t0 {
                        tasks.push(Task::wait(stop.at, t, stop.t0));
                        t = stop.t0;
                    }
                    if new.contains(&stop.request) {
                        let wait = t - stop.t0;
                        if !relaxed && self.config.max_wait_secs.is_some_and(|m| wait > m) {
                            return Ok(None);
                        }
                        new_wait_secs += wait;
                    }
                    load += 1;
                    Task::pickup(stop.request, stop.at, t, self.config.pickup_duration_secs)
                }
                StopKind::Dropoff => {
                    load = load.saturating_sub(1);
                    Task::dropoff(stop.request, stop.at, t, self.config.dropoff_duration_secs)
                }
            };
            t = task.end();
            tasks.push(task);
        }

        let window_end = ctx.snapshot.window.end;
        if !relaxed && !stops.is_empty() && t > window_end {
            return Ok(None);
        }
        let last = stops.last().map_or(dep.node, |s| s.at);
        tasks.push(Task::wait(last, t, window_end.max(t)));

        Ok(Some(Plan {
            legs,
            tasks,
            arrivals,
            cost: PlanCost {
                drive_secs,
                baseline_drive_secs: ctx.baseline_drive_secs,
                new_wait_secs,
                completion: t,
            },
        }))
    }
}
