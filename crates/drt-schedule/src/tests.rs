//! Unit tests for drt-schedule.

#[cfg(test)]
mod helpers {
    use drt_core::{NodeId, SimTime, TimeWindow, VehicleId};
    use drt_spatial::{Leg, LinkHop};
    use drt_core::LinkId;

    pub const A: NodeId = NodeId(0);
    pub const B: NodeId = NodeId(1);

    pub fn t(s: u64) -> SimTime {
        SimTime(s)
    }

    pub fn window() -> TimeWindow {
        TimeWindow::new(t(0), t(1_000))
    }

    pub fn vehicle() -> VehicleId {
        VehicleId(0)
    }

    /// A → B in `secs`, one link.
    pub fn leg(departure: u64, secs: u64) -> Leg {
        Leg {
            from: A,
            to: B,
            departure: t(departure),
            arrival: t(departure + secs),
            hops: vec![LinkHop { link: LinkId(0), to: B, exit_offset_secs: secs }],
        }
    }
}

// ── Tasks ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod task {
    use drt_core::RequestId;
    use super::helpers::*;
    use crate::{Task, TaskStatus, TaskType};

    #[test]
    fn drive_takes_leg_timing() {
        let d = Task::drive(leg(10, 30), false);
        assert_eq!(d.begin(), t(10));
        assert_eq!(d.end(), t(40));
        assert_eq!(d.task_type(), TaskType::DriveEmpty);
        assert_eq!(d.start_node(), A);
        assert_eq!(d.end_node(), B);
        assert_eq!(d.status(), TaskStatus::Planned);

        let full = Task::drive(leg(10, 30), true);
        assert_eq!(full.task_type(), TaskType::DriveWithPassengers);
    }

    #[test]
    fn stop_tasks_carry_request() {
        let p = Task::pickup(RequestId(3), A, t(100), 60);
        assert_eq!(p.end(), t(160));
        assert_eq!(p.request(), Some(RequestId(3)));
        assert!(p.leg().is_none());
        assert!(Task::wait(A, t(0), t(5)).request().is_none());
    }

    #[test]
    fn extension_only_pushes_end_later() {
        let d = Task::drive(leg(10, 30), false);
        assert_eq!(d.clone().extended_to(t(55)).end(), t(55));
        let same = d.extended_to(t(20));
        assert_eq!((same.begin(), same.end()), (t(10), t(40)));
    }

    #[test]
    fn display_names_type() {
        let p = Task::dropoff(RequestId(1), B, t(0), 0);
        assert!(p.to_string().starts_with("DROPOFF"));
    }
}

// ── Structural mutation ───────────────────────────────────────────────────────

#[cfg(test)]
mod structure {
    use drt_core::RequestId;
    use super::helpers::*;
    use crate::{Cursor, Schedule, ScheduleError, Task};

    #[test]
    fn seeded_with_window_wait() {
        let s = Schedule::new(vehicle(), A, window());
        assert_eq!(s.tasks().len(), 1);
        assert!(s.tasks()[0].is_wait());
        assert_eq!(s.tasks()[0].end(), t(1_000));
        assert_eq!(s.cursor(), Cursor::NotStarted);
        assert!(Schedule::empty(vehicle(), A, window()).tasks().is_empty());
    }

    #[test]
    fn append_rejects_overlap() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::wait(A, t(0), t(50))).unwrap();
        let err = s.append(Task::drive(leg(40, 10), false)).unwrap_err();
        assert!(matches!(err, ScheduleError::TemporalOverlap { index: 1, .. }));
        // A gap is fine.
        s.append(Task::drive(leg(60, 10), false)).unwrap();
        assert_eq!(s.tasks().len(), 2);
    }

    #[test]
    fn insert_before_checks_both_neighbours() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::wait(A, t(0), t(10))).unwrap();
        s.append(Task::wait(A, t(50), t(60))).unwrap();

        let fits = Task::pickup(RequestId(0), A, t(10), 40);
        let too_long = Task::pickup(RequestId(0), A, t(10), 41);
        assert!(matches!(
            s.insert_before(1, too_long),
            Err(ScheduleError::TemporalOverlap { index: 2, .. })
        ));
        s.insert_before(1, fits).unwrap();
        assert_eq!(s.tasks()[1].request(), Some(RequestId(0)));
    }

    #[test]
    fn insert_before_current_is_rejected() {
        let mut s = Schedule::new(vehicle(), A, window());
        s.advance(t(0)).unwrap();
        let err = s.insert_before(0, Task::wait(A, t(0), t(0))).unwrap_err();
        assert!(matches!(err, ScheduleError::NotInTail { index: 0, tail_start: 1 }));
    }

    #[test]
    fn version_tracks_structure_not_timing() {
        let mut s = Schedule::new(vehicle(), A, window());
        let v0 = s.version();
        s.advance(t(0)).unwrap();
        let v1 = s.version();
        assert!(v1 > v0);
        s.update_timeline(t(5));
        s.set_current_end(t(20)).unwrap();
        assert_eq!(s.version(), v1);
        s.append(Task::wait(A, t(20), t(30))).unwrap();
        assert!(s.version() > v1);
    }

    #[test]
    fn extended_current_cannot_overrun_successor() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::drive(leg(0, 30), false)).unwrap();
        s.append(Task::wait(B, t(30), t(100))).unwrap();
        s.advance(t(0)).unwrap();

        let v = s.version();
        let late = Task::drive(leg(0, 30), false).extended_to(t(50));
        assert!(matches!(
            s.replace_current(late),
            Err(ScheduleError::TemporalOverlap { index: 1, .. })
        ));
        assert_eq!(s.version(), v);
        assert_eq!(s.tasks()[0].end(), t(30));
        s.validate().unwrap();
    }

    #[test]
    fn truncate_returns_planned_tail() {
        let mut s = Schedule::new(vehicle(), A, window());
        s.advance(t(0)).unwrap();
        s.set_current_end(t(10)).unwrap();
        s.append(Task::drive(leg(10, 30), false)).unwrap();
        s.append(Task::pickup(RequestId(0), B, t(40), 0)).unwrap();

        let v = s.version();
        let removed = s.truncate_after_current();
        assert_eq!(removed.len(), 2);
        assert_eq!(s.tasks().len(), 1);
        assert!(s.version() > v);

        let v = s.version();
        assert!(s.truncate_after_current().is_empty());
        assert_eq!(s.version(), v);
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cursor {
    use super::helpers::*;
    use crate::{Cursor, Schedule, ScheduleError, Task, TaskStatus};

    #[test]
    fn advance_walks_to_completion() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::wait(A, t(0), t(10))).unwrap();
        s.append(Task::drive(leg(10, 30), false)).unwrap();

        assert!(s.advance(t(0)).unwrap().unwrap().is_wait());
        assert_eq!(s.cursor(), Cursor::At(0));
        assert_eq!(s.tasks()[0].status(), TaskStatus::Started);

        let cur = s.advance(t(10)).unwrap().unwrap();
        assert!(cur.is_drive());
        assert_eq!(s.tasks()[0].status(), TaskStatus::Performed);

        assert!(s.advance(t(40)).unwrap().is_none());
        assert_eq!(s.cursor(), Cursor::Completed);
        assert!(s.tasks().iter().all(|t| t.status() == TaskStatus::Performed));
        assert!(matches!(s.advance(t(50)), Err(ScheduleError::Completed(_))));
    }

    #[test]
    fn empty_schedule_completes_immediately() {
        let mut s = Schedule::empty(vehicle(), A, window());
        assert!(s.advance(t(0)).unwrap().is_none());
        assert_eq!(s.cursor(), Cursor::Completed);
    }

    #[test]
    fn late_start_shifts_task_and_tail() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::wait(A, t(0), t(10))).unwrap();
        s.append(Task::drive(leg(10, 30), false)).unwrap();
        s.append(Task::wait(B, t(40), t(100))).unwrap();
        s.advance(t(0)).unwrap();

        // Wait finishes 5 s late.
        s.advance(t(15)).unwrap();
        assert_eq!(s.tasks()[0].end(), t(15));
        assert_eq!(s.tasks()[1].begin(), t(15));
        assert_eq!(s.tasks()[1].end(), t(45));
        assert_eq!(s.tasks()[1].leg().unwrap().arrival, t(45));
        // The final wait absorbs the delay.
        assert_eq!(s.tasks()[2].begin(), t(45));
        assert_eq!(s.tasks()[2].end(), t(100));
        s.validate().unwrap();
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod timeline {
    use drt_core::RequestId;
    use super::helpers::*;
    use crate::{Schedule, Task};

    fn busy() -> Schedule {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::drive(leg(0, 30), false)).unwrap();
        s.append(Task::pickup(RequestId(0), B, t(30), 10)).unwrap();
        s.append(Task::wait(B, t(40), t(60))).unwrap();
        s.append(Task::dropoff(RequestId(0), B, t(60), 10)).unwrap();
        s.advance(t(0)).unwrap();
        s
    }

    #[test]
    fn overdue_task_pushes_successors() {
        let mut s = busy();
        s.update_timeline(t(50));
        let ts = s.tasks();
        assert_eq!(ts[0].end(), t(50));
        assert_eq!((ts[1].begin(), ts[1].end()), (t(50), t(60)));
        // Wait is consumed but never inverted.
        assert_eq!((ts[2].begin(), ts[2].end()), (t(60), t(60)));
        assert_eq!(ts[3].begin(), t(60));
        s.validate().unwrap();
    }

    #[test]
    fn on_time_is_noop() {
        let mut s = busy();
        let before = s.tasks().to_vec();
        s.update_timeline(t(20));
        assert_eq!(s.tasks(), &before[..]);
    }

    #[test]
    fn early_estimate_leaves_gap() {
        let mut s = busy();
        s.set_current_end(t(25)).unwrap();
        assert_eq!(s.tasks()[0].end(), t(25));
        assert_eq!(s.tasks()[1].begin(), t(30));
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod validation {
    use drt_core::RequestId;
    use super::helpers::*;
    use crate::{Schedule, ScheduleError, Task};

    #[test]
    fn dropoff_without_pickup_fails() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::dropoff(RequestId(2), A, t(0), 0)).unwrap();
        s.append(Task::pickup(RequestId(2), A, t(0), 0)).unwrap();
        assert!(matches!(s.validate(), Err(ScheduleError::DropoffBeforePickup(RequestId(2)))));
    }

    #[test]
    fn pickup_without_dropoff_fails() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::pickup(RequestId(1), A, t(0), 0)).unwrap();
        assert!(matches!(s.validate(), Err(ScheduleError::MissingDropoff(RequestId(1)))));
    }

    #[test]
    fn paired_stops_pass() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::pickup(RequestId(1), A, t(0), 5)).unwrap();
        s.append(Task::drive(leg(5, 10), true)).unwrap();
        s.append(Task::dropoff(RequestId(1), B, t(15), 5)).unwrap();
        s.validate().unwrap();
    }
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use drt_core::RequestId;
    use super::helpers::*;
    use crate::{Schedule, Task};

    #[test]
    fn unstarted_departs_from_home() {
        let s = Schedule::new(vehicle(), A, window());
        let d = s.snapshot().departure(t(7)).unwrap();
        assert_eq!((d.node, d.time, d.idle), (A, t(7), true));
    }

    #[test]
    fn busy_departs_after_current() {
        let mut s = Schedule::empty(vehicle(), A, window());
        s.append(Task::drive(leg(0, 30), true)).unwrap();
        s.append(Task::dropoff(RequestId(4), B, t(30), 0)).unwrap();
        s.advance(t(0)).unwrap();

        let snap = s.snapshot();
        let d = snap.departure(t(5)).unwrap();
        assert_eq!((d.node, d.time, d.idle), (B, t(30), false));
        assert_eq!(snap.onboard(), vec![RequestId(4)]);
        assert!(snap.awaiting().is_empty());
        assert_eq!(snap.stops().count(), 1);
    }

    #[test]
    fn completed_has_no_departure() {
        let mut s = Schedule::new(vehicle(), A, window());
        s.advance(t(0)).unwrap();
        s.advance(t(1_000)).unwrap();
        assert!(s.snapshot().departure(t(1_000)).is_none());
    }
}
