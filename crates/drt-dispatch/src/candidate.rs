//! `VehicleRequestPath` — a costed, uncommitted plan for one vehicle.
//!
//! A path is produced by the [`CandidateBuilder`](crate::CandidateBuilder)
//! against a schedule snapshot and is either discarded or consumed by the
//! optimizer's commit step within the same pass.  It records the snapshot
//! `schedule_version` so a commit can tell whether the vehicle changed in
//! the meantime.
//!
//! Paths that insert exactly one new request also carry that request's
//! `t0`, the vehicle's arrival time at the pickup and the planned drop-off
//! node.  Reading them on any other path is a
//! [`DispatchError::SingleRequestOnly`].

use std::cmp::Ordering;

use drt_core::{NodeId, RequestId, SimTime, VehicleId};
use drt_fleet::{RequestRegistry, RequestStatus};
use drt_schedule::{DeparturePoint, Task};
use drt_spatial::Leg;

use crate::{DispatchError, DispatchResult};

// ── Stop ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StopKind {
    Pickup,
    Dropoff,
}

/// One pickup or drop-off in a planned stop sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stop {
    pub request: RequestId,
    pub kind:    StopKind,
    pub at:      NodeId,
    /// Earliest departure of `request`.
    pub t0:      SimTime,
}

impl Stop {
    #[inline]
    pub fn is_pickup(&self) -> bool {
        self.kind == StopKind::Pickup
    }
}

// ── PathKind ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// Adds new requests to the committed stops.
    Insertion,
    /// Re-plans committed stops only (withdrawal, unscheduling, revealed
    /// destinations).
    Rebuild,
}

// ── VehicleRequestPath ────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SingleRequest {
    pub t0:                  SimTime,
    pub arrival_time:        SimTime,
    pub initial_destination: NodeId,
}

#[derive(Clone, Debug)]
pub struct VehicleRequestPath {
    pub vehicle:          VehicleId,
    pub kind:             PathKind,
    /// New requests, in `(t0, id)` order.  Empty for a rebuild.
    pub requests:         Vec<RequestId>,
    pub departure:        DeparturePoint,
    /// Full stop order of the new tail, committed stops included.
    pub stops:            Vec<Stop>,
    /// One leg per stop: `legs[i]` ends at `stops[i].at`.
    pub legs:             Vec<Leg>,
    /// The replacement tail, ending with an idle `Wait`.
    pub tasks:            Vec<Task>,
    pub cost:             f64,
    pub schedule_version: u64,
    pub(crate) single:    Option<SingleRequest>,
}

impl VehicleRequestPath {
    fn single(&self) -> DispatchResult<&SingleRequest> {
        self.single.as_ref().ok_or(DispatchError::SingleRequestOnly {
            vehicle:  self.vehicle,
            requests: self.requests.len(),
        })
    }

    /// Earliest departure of the single new request.
    pub fn t0(&self) -> DispatchResult<SimTime> {
        Ok(self.single()?.t0)
    }

    /// When the vehicle reaches the single new request's pickup location.
    pub fn arrival_time(&self) -> DispatchResult<SimTime> {
        Ok(self.single()?.arrival_time)
    }

    /// Drop-off node planned for the single new request (its origin while
    /// the destination is unknown).
    pub fn initial_destination(&self) -> DispatchResult<NodeId> {
        Ok(self.single()?.initial_destination)
    }

    /// Requests picked up at `node`, by `(t0, id)`.
    pub fn pickups_at(&self, node: NodeId) -> Option<Vec<RequestId>> {
        self.stops_at(node, StopKind::Pickup)
    }

    /// Requests dropped off at `node`, by `(t0, id)`.
    pub fn dropoffs_at(&self, node: NodeId) -> Option<Vec<RequestId>> {
        self.stops_at(node, StopKind::Dropoff)
    }

    fn stops_at(&self, node: NodeId, kind: StopKind) -> Option<Vec<RequestId>> {
        let mut hits: Vec<(SimTime, RequestId)> = self
            .stops
            .iter()
            .filter(|s| s.at == node && s.kind == kind)
            .map(|s| (s.t0, s.request))
            .collect();
        if hits.is_empty() {
            return None;
        }
        hits.sort_unstable();
        hits.dedup();
        Some(hits.into_iter().map(|(_, r)| r).collect())
    }

    /// Fails unless every new request is still UNPLANNED.
    pub fn fail_if_any_request_not_unplanned(&self, registry: &RequestRegistry) -> DispatchResult<()> {
        for &request in &self.requests {
            let status = registry.get(request)?.status();
            if status != RequestStatus::Unplanned {
                return Err(DispatchError::NotUnplanned { request, status });
            }
        }
        Ok(())
    }

    /// `(earliest t0, first request, vehicle)`; rebuilds sort last.
    fn order_key(&self) -> (SimTime, RequestId, VehicleId) {
        let t0 = self
            .stops
            .iter()
            .filter(|s| s.is_pickup() && self.requests.contains(&s.request))
            .map(|s| s.t0)
            .min()
            .unwrap_or(SimTime::MAX);
        let first = self.requests.first().copied().unwrap_or(RequestId::INVALID);
        (t0, first, self.vehicle)
    }
}

// Ordered by t0 (then request id, vehicle and cost) so winners of a batch
// commit in queue order.
impl PartialEq for VehicleRequestPath {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VehicleRequestPath {}

impl PartialOrd for VehicleRequestPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VehicleRequestPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key()
            .cmp(&other.order_key())
            .then_with(|| self.cost.total_cmp(&other.cost))
    }
}
