use drt_core::{DrtError, SimTime};
use drt_dispatch::DispatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] DrtError),

    #[error("request submitted at {at}, before the simulation starts at {start}")]
    SubmissionBeforeStart { at: SimTime, start: SimTime },

    #[error("fleet has no vehicles")]
    EmptyFleet,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub type SimResult<T> = Result<T, SimError>;
