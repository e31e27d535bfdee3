//! Per-vehicle schedule: an ordered task list with a forward-only cursor.
//!
//! # Mutation rules
//!
//! | Operation                  | Touches            | Bumps `version` |
//! |----------------------------|--------------------|-----------------|
//! | `append` / `insert_before` | planned tail       | yes             |
//! | `truncate_after_current`   | planned tail       | yes (if any)    |
//! | `advance`                  | cursor + statuses  | yes             |
//! | `replace_current`          | current task       | yes             |
//! | `set_current_end`          | timing only        | no              |
//! | `update_timeline`          | timing only        | no              |
//!
//! Timing updates only ever push tasks later.  A task that finishes early
//! leaves a gap before its successor rather than pulling it forward, so a
//! pickup never moves ahead of the time it was planned for.

use drt_core::{NodeId, SimTime, TimeWindow, VehicleId};

use crate::{ScheduleError, ScheduleResult, ScheduleSnapshot, Task, TaskKind, TaskStatus};

// ── Cursor ───────────────────────────────────────────────────────────

/// Position of the current task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cursor {
    NotStarted,
    At(usize),
    Completed,
}

// ── Schedule ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Schedule {
    vehicle: VehicleId,
    home:    NodeId,
    window:  TimeWindow,
    tasks:   Vec<Task>,
    cursor:  Cursor,
    version: u64,
}

impl Schedule {
    /// A schedule seeded with one `Wait` at `home` spanning `window`.
    pub fn new(vehicle: VehicleId, home: NodeId, window: TimeWindow) -> Self {
        let mut s = Self::empty(vehicle, home, window);
        s.tasks.push(Task::wait(home, window.start, window.end));
        s
    }

    /// A schedule with no tasks.
    pub fn empty(vehicle: VehicleId, home: NodeId, window: TimeWindow) -> Self {
        Self {
            vehicle,
            home,
            window,
            tasks: Vec::new(),
            cursor: Cursor::NotStarted,
            version: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn vehicle(&self) -> VehicleId { self.vehicle }
    #[inline] pub fn home(&self) -> NodeId { self.home }
    #[inline] pub fn window(&self) -> TimeWindow { self.window }
    #[inline] pub fn tasks(&self) -> &[Task] { &self.tasks }
    #[inline] pub fn cursor(&self) -> Cursor { self.cursor }
    #[inline] pub fn version(&self) -> u64 { self.version }

    pub fn current_index(&self) -> Option<usize> {
        match self.cursor {
            Cursor::At(i) => Some(i),
            _ => None,
        }
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_index().map(|i| &self.tasks[i])
    }

    /// Index of the first task that may be restructured.
    pub fn tail_start(&self) -> usize {
        match self.cursor {
            Cursor::NotStarted => 0,
            Cursor::At(i)      => i + 1,
            Cursor::Completed  => self.tasks.len(),
        }
    }

    /// Tasks after the current one (all of them before the first start).
    pub fn planned_tail(&self) -> &[Task] {
        &self.tasks[self.tail_start()..]
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            vehicle: self.vehicle,
            version: self.version,
            home:    self.home,
            window:  self.window,
            cursor:  self.cursor,
            current: self.current_task().cloned(),
            tail:    self.planned_tail().to_vec(),
        }
    }

    // ── Structural mutation ───────────────────────────────────────────────

    pub fn append(&mut self, task: Task) -> ScheduleResult<()> {
        self.insert_before(self.tasks.len(), task)
    }

    /// Insert `task` at `index`, which must lie in the planned tail
    /// (`index == len` appends).  The neighbours must not overlap it.
    pub fn insert_before(&mut self, index: usize, task: Task) -> ScheduleResult<()> {
        if self.cursor == Cursor::Completed {
            return Err(ScheduleError::Completed(self.vehicle));
        }
        let tail_start = self.tail_start();
        if index < tail_start || index > self.tasks.len() {
            return Err(ScheduleError::NotInTail { index, tail_start });
        }
        if task.end < task.begin {
            return Err(ScheduleError::InvalidInterval { begin: task.begin, end: task.end });
        }
        if let Some(prev) = index.checked_sub(1).map(|i| &self.tasks[i]) {
            if task.begin < prev.end {
                return Err(ScheduleError::TemporalOverlap {
                    index,
                    begin: task.begin,
                    prev_end: prev.end,
                });
            }
        }
        if let Some(next) = self.tasks.get(index) {
            if next.begin < task.end {
                return Err(ScheduleError::TemporalOverlap {
                    index:    index + 1,
                    begin:    next.begin,
                    prev_end: task.end,
                });
            }
        }
        self.tasks.insert(index, task);
        self.version += 1;
        Ok(())
    }

    /// Drop every planned task after the current one and return them.
    pub fn truncate_after_current(&mut self) -> Vec<Task> {
        let start = self.tail_start();
        if start >= self.tasks.len() {
            return Vec::new();
        }
        self.version += 1;
        self.tasks.drain(start..).collect()
    }

    /// Complete the current task at `now` and start the next one.
    ///
    /// Returns the new current task, or `None` once the list is exhausted
    /// (the schedule is then `Completed`).  A task started later than
    /// planned is shifted to `now` and the delay propagates down the tail.
    pub fn advance(&mut self, now: SimTime) -> ScheduleResult<Option<&Task>> {
        let next = match self.cursor {
            Cursor::Completed => return Err(ScheduleError::Completed(self.vehicle)),
            Cursor::NotStarted => 0,
            Cursor::At(i) => {
                let done = &mut self.tasks[i];
                done.end = now.max(done.begin);
                done.set_status(TaskStatus::Performed);
                i + 1
            }
        };
        self.version += 1;

        if next >= self.tasks.len() {
            self.cursor = Cursor::Completed;
            return Ok(None);
        }
        self.cursor = Cursor::At(next);
        let task = &mut self.tasks[next];
        task.set_status(TaskStatus::Started);
        if task.begin < now {
            task.shift_to(now);
        }
        self.propagate_from(next + 1);
        Ok(Some(&self.tasks[next]))
    }

    /// Swap the started task for `task`, which keeps the same begin time.
    /// Used to cut a drive short when a vehicle is diverted.
    pub fn replace_current(&mut self, task: Task) -> ScheduleResult<()> {
        let i = self.current_index().ok_or(ScheduleError::NoCurrentTask(self.vehicle))?;
        if task.begin != self.tasks[i].begin || task.end < task.begin {
            return Err(ScheduleError::InvalidInterval { begin: task.begin, end: task.end });
        }
        if let Some(next) = self.tasks.get(i + 1) {
            if next.begin < task.end {
                return Err(ScheduleError::TemporalOverlap {
                    index:    i + 1,
                    begin:    next.begin,
                    prev_end: task.end,
                });
            }
        }
        let mut task = task;
        task.set_status(TaskStatus::Started);
        self.tasks[i] = task;
        self.version += 1;
        Ok(())
    }

    // ── Timing ────────────────────────────────────────────────────────────

    /// Re-estimate the end of the current task.  Any resulting delay
    /// propagates down the tail.
    pub fn set_current_end(&mut self, end: SimTime) -> ScheduleResult<()> {
        let i = self.current_index().ok_or(ScheduleError::NoCurrentTask(self.vehicle))?;
        let cur = &mut self.tasks[i];
        if end < cur.begin {
            return Err(ScheduleError::InvalidInterval { begin: cur.begin, end });
        }
        cur.end = end;
        self.propagate_from(i + 1);
        Ok(())
    }

    /// Bring the timeline up to `now`: an overdue current task is assumed
    /// to end at `now`, and every later task is pushed back as needed.
    pub fn update_timeline(&mut self, now: SimTime) {
        let Some(i) = self.current_index() else { return };
        let cur = &mut self.tasks[i];
        if cur.end < now {
            cur.end = now;
        }
        self.propagate_from(i + 1);
    }

    fn propagate_from(&mut self, start: usize) {
        for k in start.max(1)..self.tasks.len() {
            let prev_end = self.tasks[k - 1].end;
            if self.tasks[k].begin >= prev_end {
                break;
            }
            self.tasks[k].shift_to(prev_end);
        }
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Check temporal ordering and pickup-before-drop-off pairing.
    pub fn validate(&self) -> ScheduleResult<()> {
        for (i, t) in self.tasks.iter().enumerate() {
            if t.end < t.begin {
                return Err(ScheduleError::InvalidInterval { begin: t.begin, end: t.end });
            }
            if let Some(prev) = i.checked_sub(1).map(|p| &self.tasks[p]) {
                if t.begin < prev.end {
                    return Err(ScheduleError::TemporalOverlap {
                        index:    i,
                        begin:    t.begin,
                        prev_end: prev.end,
                    });
                }
            }
        }

        let mut open = Vec::new();
        for t in &self.tasks {
            match t.kind {
                TaskKind::Pickup { request, .. } => open.push(request),
                TaskKind::Dropoff { request, .. } => match open.iter().position(|&r| r == request) {
                    Some(p) => { open.swap_remove(p); }
                    None => return Err(ScheduleError::DropoffBeforePickup(request)),
                },
                _ => {}
            }
        }
        match open.first() {
            Some(&r) => Err(ScheduleError::MissingDropoff(r)),
            None => Ok(()),
        }
    }
}
