//! Engine-wide base error type.
//!
//! Sub-crates define their own error enums and either convert into `DrtError`
//! or wrap it as one variant, whichever keeps the error sites clean.

use thiserror::Error;

use crate::{NodeId, RequestId, VehicleId};

/// The top-level error type for `drt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DrtError {
    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `drt-*` crates.
pub type DrtResult<T> = Result<T, DrtError>;
