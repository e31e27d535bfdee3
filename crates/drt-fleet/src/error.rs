use thiserror::Error;

use drt_core::{RequestId, VehicleId};

use crate::RequestStatus;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    /// An out-of-order status transition.
    #[error("request {request} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        request: RequestId,
        from:    RequestStatus,
        to:      RequestStatus,
    },

    /// Arena ids are `u32` and `u32::MAX` is reserved as the invalid id.
    #[error("{0} ids exhausted")]
    IdSpaceExhausted(&'static str),

    #[error("destination of {0} is already known")]
    DestinationAlreadyKnown(RequestId),

    #[error("scenario parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FleetResult<T> = Result<T, FleetError>;
