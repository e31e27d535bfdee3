//! `drt-dispatch` — turns unplanned requests into committed vehicle tasks.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`candidate`]  | `VehicleRequestPath`, `Stop`, `StopKind`, `PathKind`        |
//! | [`builder`]    | `CandidateBuilder` (insertion search against snapshots)     |
//! | [`cost`]       | `CostFunction`, `PlanCost`, `AddedTravelTime`, `WaitWeighted` |
//! | [`policy`]     | `ReoptimizationPolicy`, `ConfigPolicy`                      |
//! | [`optimizer`]  | `DispatchOptimizer`, `PassPhase`                            |
//! | [`report`]     | `PassReport`                                                |
//! | [`progress`]   | per-vehicle drive progress (last entered link)              |
//! | [`pruning`]    | `VehicleIndex` (k-nearest vehicle pre-selection)            |
//! | [`error`]      | `DispatchError`, `DispatchResult<T>`                        |
//!
//! # Pass model
//!
//! ```text
//! IDLE ─▶ TRIGGERED ─▶ (UNSCHEDULING) ─▶ MATCHING ─▶ COMMITTING ─▶ IDLE
//!                                          │   ▲
//!                                          └───┘  (sequential mode: one
//!                                                  request per round)
//! ```
//!
//! Matching reads immutable [`ScheduleSnapshot`](drt_schedule::ScheduleSnapshot)s
//! and may fan out across threads; committing is single-threaded and is the
//! only place schedules change during a pass.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Candidate evaluation runs on Rayon                         |
//! | `fx-hash`  | FxHash for the drive-progress map                          |
//! | `serde`    | Forwards `serde` to the lower crates                       |

pub mod builder;
pub mod candidate;
pub mod cost;
pub mod error;
pub mod optimizer;
pub mod policy;
pub mod progress;
pub mod pruning;
pub mod report;


pub use builder::CandidateBuilder;
pub use candidate::{PathKind, Stop, StopKind, VehicleRequestPath};
pub use cost::{AddedTravelTime, CostFunction, PlanCost, WaitWeighted};
pub use error::{DispatchError, DispatchResult};
pub use optimizer::{DispatchOptimizer, PassPhase};
pub use policy::{ConfigPolicy, ReoptimizationPolicy};
pub use progress::DriveProgress;
pub use pruning::VehicleIndex;
pub use report::PassReport;
