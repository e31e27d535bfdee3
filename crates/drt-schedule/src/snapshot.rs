//! Read-only copies of a schedule handed to candidate evaluation.
//!
//! Snapshots let the matching phase run without borrowing the live
//! schedules; `version` records what the candidate was computed against.

use drt_core::{NodeId, RequestId, SimTime, TimeWindow, VehicleId};

use crate::{Cursor, Task, TaskKind};

/// Where and when a vehicle could begin something new.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeparturePoint {
    pub node: NodeId,
    pub time: SimTime,
    /// The vehicle is waiting, so its current task can be cut at `time`.
    pub idle: bool,
}

#[derive(Clone, Debug)]
pub struct ScheduleSnapshot {
    pub vehicle: VehicleId,
    pub version: u64,
    pub home:    NodeId,
    pub window:  TimeWindow,
    pub cursor:  Cursor,
    pub current: Option<Task>,
    /// Planned tasks after `current`.
    pub tail:    Vec<Task>,
}

impl ScheduleSnapshot {
    /// The point from which a re-planned tail would start, or `None` for a
    /// completed schedule.
    pub fn departure(&self, now: SimTime) -> Option<DeparturePoint> {
        match (&self.cursor, &self.current) {
            (Cursor::Completed, _) => None,
            (Cursor::At(_), Some(cur)) => Some(match cur.kind {
                TaskKind::Wait { at } => DeparturePoint {
                    node: at,
                    time: now.max(cur.begin),
                    idle: true,
                },
                _ => DeparturePoint {
                    node: cur.end_node(),
                    time: now.max(cur.end),
                    idle: false,
                },
            }),
            _ => Some(DeparturePoint {
                node: self.home,
                time: now.max(self.window.start),
                idle: true,
            }),
        }
    }

    /// Pickup and drop-off tasks of the tail, in order.
    pub fn stops(&self) -> impl Iterator<Item = &Task> {
        self.tail.iter().filter(|t| t.request().is_some())
    }

    /// Requests picked up in the tail.
    pub fn awaiting(&self) -> Vec<RequestId> {
        self.tail
            .iter()
            .filter_map(|t| match t.kind {
                TaskKind::Pickup { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Requests already aboard: dropped off in the tail but not picked up
    /// there.
    pub fn onboard(&self) -> Vec<RequestId> {
        let awaiting = self.awaiting();
        self.tail
            .iter()
            .filter_map(|t| match t.kind {
                TaskKind::Dropoff { request, .. } if !awaiting.contains(&request) => Some(request),
                _ => None,
            })
            .collect()
    }
}
