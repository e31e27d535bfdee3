use thiserror::Error;

use drt_core::{DrtError, RequestId, VehicleId};
use drt_fleet::{FleetError, RequestStatus};
use drt_schedule::ScheduleError;
use drt_spatial::SpatialError;

/// Errors surfaced by the optimizer.
///
/// Infeasibility and stale candidates are not errors: they are recorded in
/// [`PassReport`](crate::PassReport) and the request stays queued.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("configuration: {0}")]
    Config(#[from] DrtError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A route failure while re-planning already committed stops.
    #[error("routing: {0}")]
    Spatial(#[from] SpatialError),

    #[error("request {request} is {status:?}, expected Unplanned")]
    NotUnplanned {
        request: RequestId,
        status:  RequestStatus,
    },

    #[error("request {request} is {status:?}; cannot {action}")]
    RequestState {
        request: RequestId,
        status:  RequestStatus,
        action:  &'static str,
    },

    /// `t0` / `arrival_time` / `initial_destination` read on a path that
    /// does not insert exactly one new request.
    #[error("path for {vehicle} carries {requests} new request(s); field is defined for a single new request only")]
    SingleRequestOnly { vehicle: VehicleId, requests: usize },

    #[error("{0} is not driving")]
    NotDriving(VehicleId),

    #[error("committed stops of {0} cannot be re-planned")]
    Replan(VehicleId),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("thread pool: {0}")]
    ThreadPool(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
