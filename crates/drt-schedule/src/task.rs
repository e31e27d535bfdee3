//! Vehicle tasks.
//!
//! A [`Task`] is one timed unit of vehicle activity.  The variant-specific
//! payload lives in [`TaskKind`]; the common interval and status live on the
//! task itself.
//!
//! | Kind                  | Payload                | Start node  | End node   |
//! |-----------------------|------------------------|-------------|------------|
//! | `Wait`                | location               | `at`        | `at`       |
//! | `DriveEmpty`          | timed [`Leg`]          | `leg.from`  | `leg.to`   |
//! | `DriveWithPassengers` | timed [`Leg`]          | `leg.from`  | `leg.to`   |
//! | `Pickup`              | request, location      | `at`        | `at`       |
//! | `Dropoff`             | request, location      | `at`        | `at`       |

use std::fmt;

use drt_core::{NodeId, RequestId, SimTime};
use drt_spatial::Leg;

// ── TaskKind ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskKind {
    Wait { at: NodeId },
    DriveEmpty { leg: Leg },
    DriveWithPassengers { leg: Leg },
    Pickup { request: RequestId, at: NodeId },
    Dropoff { request: RequestId, at: NodeId },
}

/// Payload-free discriminant of [`TaskKind`], for logging and policy hooks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskType {
    Wait,
    DriveEmpty,
    DriveWithPassengers,
    Pickup,
    Dropoff,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskType::Wait                => "WAIT",
            TaskType::DriveEmpty          => "DRIVE_EMPTY",
            TaskType::DriveWithPassengers => "DRIVE_WITH_PASSENGERS",
            TaskType::Pickup              => "PICKUP",
            TaskType::Dropoff             => "DROPOFF",
        };
        f.write_str(s)
    }
}

// ── TaskStatus ────────────────────────────────────────────────────────────────

/// Lifecycle of a task.  Moves forward only; the owning schedule's cursor
/// is the single writer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskStatus {
    Planned,
    Started,
    Performed,
}

// ── Task ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub kind:         TaskKind,
    pub(crate) begin: SimTime,
    pub(crate) end:   SimTime,
    status:           TaskStatus,
}

impl Task {
    /// A `Planned` task.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `end < begin`.
    pub fn new(kind: TaskKind, begin: SimTime, end: SimTime) -> Self {
        debug_assert!(begin <= end, "task ends before it begins");
        Self { kind, begin, end, status: TaskStatus::Planned }
    }

    pub fn wait(at: NodeId, begin: SimTime, end: SimTime) -> Self {
        Self::new(TaskKind::Wait { at }, begin, end)
    }

    /// A drive over `leg`, timed by the leg itself.
    pub fn drive(leg: Leg, occupied: bool) -> Self {
        let (begin, end) = (leg.departure, leg.arrival);
        let kind = if occupied {
            TaskKind::DriveWithPassengers { leg }
        } else {
            TaskKind::DriveEmpty { leg }
        };
        Self::new(kind, begin, end)
    }

    pub fn pickup(request: RequestId, at: NodeId, begin: SimTime, duration_secs: u64) -> Self {
        Self::new(TaskKind::Pickup { request, at }, begin, begin + duration_secs)
    }

    pub fn dropoff(request: RequestId, at: NodeId, begin: SimTime, duration_secs: u64) -> Self {
        Self::new(TaskKind::Dropoff { request, at }, begin, begin + duration_secs)
    }

    /// The same task ending no earlier than `end`.
    pub fn extended_to(mut self, end: SimTime) -> Self {
        self.end = self.end.max(end);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn begin(&self) -> SimTime {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> SimTime {
        self.end
    }

    #[inline]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn task_type(&self) -> TaskType {
        match self.kind {
            TaskKind::Wait { .. }                => TaskType::Wait,
            TaskKind::DriveEmpty { .. }          => TaskType::DriveEmpty,
            TaskKind::DriveWithPassengers { .. } => TaskType::DriveWithPassengers,
            TaskKind::Pickup { .. }              => TaskType::Pickup,
            TaskKind::Dropoff { .. }             => TaskType::Dropoff,
        }
    }

    pub fn start_node(&self) -> NodeId {
        match &self.kind {
            TaskKind::Wait { at }
            | TaskKind::Pickup { at, .. }
            | TaskKind::Dropoff { at, .. } => *at,
            TaskKind::DriveEmpty { leg } | TaskKind::DriveWithPassengers { leg } => leg.from,
        }
    }

    pub fn end_node(&self) -> NodeId {
        match &self.kind {
            TaskKind::Wait { at }
            | TaskKind::Pickup { at, .. }
            | TaskKind::Dropoff { at, .. } => *at,
            TaskKind::DriveEmpty { leg } | TaskKind::DriveWithPassengers { leg } => leg.to,
        }
    }

    /// The request served by a pickup or drop-off.
    pub fn request(&self) -> Option<RequestId> {
        match self.kind {
            TaskKind::Pickup { request, .. } | TaskKind::Dropoff { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn leg(&self) -> Option<&Leg> {
        match &self.kind {
            TaskKind::DriveEmpty { leg } | TaskKind::DriveWithPassengers { leg } => Some(leg),
            _ => None,
        }
    }

    #[inline]
    pub fn is_drive(&self) -> bool {
        self.leg().is_some()
    }

    #[inline]
    pub fn is_wait(&self) -> bool {
        matches!(self.kind, TaskKind::Wait { .. })
    }

    #[inline]
    pub fn duration_secs(&self) -> u64 {
        self.end - self.begin
    }

    // ── Mutation (schedule-internal) ──────────────────────────────────────

    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        debug_assert!(status >= self.status, "task status regressed");
        self.status = status;
    }

    /// Move the task to begin at `begin`.  Drives and stops keep their
    /// duration; waits keep their end unless it would precede `begin`.
    pub(crate) fn shift_to(&mut self, begin: SimTime) {
        match &mut self.kind {
            TaskKind::Wait { .. } => {
                self.begin = begin;
                self.end = self.end.max(begin);
            }
            TaskKind::DriveEmpty { leg } | TaskKind::DriveWithPassengers { leg } => {
                *leg = leg.departing_at(begin);
                self.begin = leg.departure;
                self.end = leg.arrival;
            }
            TaskKind::Pickup { .. } | TaskKind::Dropoff { .. } => {
                let d = self.duration_secs();
                self.begin = begin;
                self.end = begin + d;
            }
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}]", self.task_type(), self.begin, self.end)?;
        if let Some(r) = self.request() {
            write!(f, " {r}")?;
        }
        Ok(())
    }
}
