//! `drt-schedule` — what each vehicle is committed to do.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`task`]      | `TaskKind` (sum type), `TaskType`, `TaskStatus`, `Task`   |
//! | [`schedule`]  | `Schedule` (ordered tasks + cursor)                       |
//! | [`snapshot`]  | `ScheduleSnapshot`, `DeparturePoint`                      |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Cursor model (summary)
//!
//! ```text
//! tasks:   [ PERFORMED … PERFORMED | STARTED | PLANNED … PLANNED ]
//!                                    ^ cursor        ^ tail
//! ```
//!
//! Only the tail (tasks after the cursor) may be restructured.  The cursor
//! moves forward through [`Schedule::advance`] and never back, so task
//! status never regresses.  Every structural mutation bumps
//! [`Schedule::version`], which is how stale candidates are detected.

pub mod error;
pub mod schedule;
pub mod snapshot;
pub mod task;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use schedule::{Cursor, Schedule};
pub use snapshot::{DeparturePoint, ScheduleSnapshot};
pub use task::{Task, TaskKind, TaskStatus, TaskType};
