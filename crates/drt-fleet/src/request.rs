//! Trip requests and their status registry.
//!
//! # Status machine
//!
//! ```text
//! UNPLANNED ──mark_planned──▶ PLANNED ──mark_dispatched──▶ DISPATCHED ──mark_performed──▶ PERFORMED
//!     ▲                          │
//!     └────────withdraw──────────┘
//! ```
//!
//! Every other transition is a [`FleetError::InvalidTransition`].
//!
//! The unplanned queue is a `BTreeSet<(t0, id)>`, so iteration order is
//! `(t0, id)` ascending and ties on `t0` resolve by submission order.

use std::collections::BTreeSet;

use drt_core::{NodeId, RequestId, SimTime, VehicleId};

use crate::{FleetError, FleetResult};

// ── RequestStatus ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequestStatus {
    Unplanned,
    Planned,
    Dispatched,
    Performed,
}

// ── Request ───────────────────────────────────────────────────────────────────

/// What a caller submits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RequestSpec {
    pub from: NodeId,
    /// `None` until revealed at pickup.
    pub to:   Option<NodeId>,
    /// Earliest departure.
    pub t0:   SimTime,
}

#[derive(Clone, Debug)]
pub struct Request {
    id:           RequestId,
    from:         NodeId,
    to:           Option<NodeId>,
    t0:           SimTime,
    submitted_at: SimTime,
    status:       RequestStatus,
    vehicle:      Option<VehicleId>,
}

impl Request {
    #[inline] pub fn id(&self) -> RequestId { self.id }
    #[inline] pub fn origin(&self) -> NodeId { self.from }
    #[inline] pub fn destination(&self) -> Option<NodeId> { self.to }
    #[inline] pub fn t0(&self) -> SimTime { self.t0 }
    #[inline] pub fn submitted_at(&self) -> SimTime { self.submitted_at }
    #[inline] pub fn status(&self) -> RequestStatus { self.status }
    #[inline] pub fn vehicle(&self) -> Option<VehicleId> { self.vehicle }

    /// Queue key.
    #[inline]
    pub fn key(&self) -> (SimTime, RequestId) {
        (self.t0, self.id)
    }

    fn transition(&mut self, from: RequestStatus, to: RequestStatus) -> FleetResult<()> {
        if self.status != from {
            return Err(FleetError::InvalidTransition { request: self.id, from: self.status, to });
        }
        self.status = to;
        Ok(())
    }
}

// ── RequestRegistry ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RequestRegistry {
    requests:  Vec<Request>,
    unplanned: BTreeSet<(SimTime, RequestId)>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request as UNPLANNED and queue it.
    pub fn submit(&mut self, spec: RequestSpec, now: SimTime) -> FleetResult<RequestId> {
        let id = request_id(self.requests.len())?;
        let req = Request {
            id,
            from: spec.from,
            to: spec.to,
            t0: spec.t0,
            submitted_at: now,
            status: RequestStatus::Unplanned,
            vehicle: None,
        };
        self.unplanned.insert(req.key());
        self.requests.push(req);
        Ok(id)
    }

    pub fn get(&self, id: RequestId) -> FleetResult<&Request> {
        self.requests.get(id.index()).ok_or(FleetError::RequestNotFound(id))
    }

    fn get_mut(&mut self, id: RequestId) -> FleetResult<&mut Request> {
        self.requests.get_mut(id.index()).ok_or(FleetError::RequestNotFound(id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter()
    }

    // ── Unplanned queue ───────────────────────────────────────────────────

    /// Unplanned requests in `(t0, id)` order.
    pub fn unplanned(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.unplanned.iter().map(|&(_, id)| id)
    }

    #[inline]
    pub fn unplanned_len(&self) -> usize {
        self.unplanned.len()
    }

    #[inline]
    pub fn has_unplanned(&self) -> bool {
        !self.unplanned.is_empty()
    }

    pub fn is_queued(&self, id: RequestId) -> bool {
        self.get(id).is_ok_and(|r| self.unplanned.contains(&r.key()))
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// UNPLANNED → PLANNED on `vehicle`; leaves the queue.
    pub fn mark_planned(&mut self, id: RequestId, vehicle: VehicleId) -> FleetResult<()> {
        let req = self.get_mut(id)?;
        req.transition(RequestStatus::Unplanned, RequestStatus::Planned)?;
        req.vehicle = Some(vehicle);
        let key = req.key();
        self.unplanned.remove(&key);
        Ok(())
    }

    /// PLANNED → DISPATCHED (pickup started).
    pub fn mark_dispatched(&mut self, id: RequestId) -> FleetResult<()> {
        self.get_mut(id)?
            .transition(RequestStatus::Planned, RequestStatus::Dispatched)
    }

    /// DISPATCHED → PERFORMED (drop-off completed).
    pub fn mark_performed(&mut self, id: RequestId) -> FleetResult<()> {
        self.get_mut(id)?
            .transition(RequestStatus::Dispatched, RequestStatus::Performed)
    }

    /// PLANNED → UNPLANNED; re-queues the request and returns the vehicle it
    /// was planned on.  Fails once the passenger has been picked up.
    pub fn withdraw(&mut self, id: RequestId) -> FleetResult<VehicleId> {
        let req = self.get_mut(id)?;
        req.transition(RequestStatus::Planned, RequestStatus::Unplanned)?;
        let vehicle = req.vehicle.take().ok_or(FleetError::InvalidTransition {
            request: id,
            from:    RequestStatus::Planned,
            to:      RequestStatus::Unplanned,
        })?;
        let key = req.key();
        self.unplanned.insert(key);
        Ok(vehicle)
    }

    /// Set the destination of a request submitted without one.  Allowed
    /// exactly once.
    pub fn reveal_destination(&mut self, id: RequestId, to: NodeId) -> FleetResult<()> {
        let req = self.get_mut(id)?;
        if req.to.is_some() {
            return Err(FleetError::DestinationAlreadyKnown(id));
        }
        req.to = Some(to);
        Ok(())
    }
}

/// The id of the request at arena index `index`.
pub(crate) fn request_id(index: usize) -> FleetResult<RequestId> {
    RequestId::try_from(index)
        .ok()
        .filter(|&id| id != RequestId::INVALID)
        .ok_or(FleetError::IdSpaceExhausted("request"))
}
