use thiserror::Error;

use drt_core::{RequestId, SimTime, VehicleId};

/// Schedule state violations.  Each indicates a logic defect in the caller
/// and is surfaced, never ignored.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("task at index {index} begins at {begin}, before the previous task ends at {prev_end}")]
    TemporalOverlap {
        index:    usize,
        begin:    SimTime,
        prev_end: SimTime,
    },

    #[error("task interval [{begin}, {end}] is inverted")]
    InvalidInterval { begin: SimTime, end: SimTime },

    #[error("schedule of {0} is already completed")]
    Completed(VehicleId),

    #[error("schedule of {0} has no current task")]
    NoCurrentTask(VehicleId),

    #[error("index {index} is not in the planned tail (which starts at {tail_start})")]
    NotInTail { index: usize, tail_start: usize },

    #[error("drop-off of {0} precedes its pickup")]
    DropoffBeforePickup(RequestId),

    #[error("pickup of {0} has no later drop-off")]
    MissingDropoff(RequestId),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
