//! Spatial-subsystem error type.

use thiserror::Error;

use drt_core::{LinkId, NodeId};

/// Errors produced by `drt-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("link {0} is not part of this leg")]
    LinkNotOnLeg(LinkId),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
