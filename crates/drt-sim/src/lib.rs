//! `drt-sim` — reference driver for the rust_drt dispatch engine.
//!
//! The engine only reacts to events.  This crate produces them from a fixed
//! step clock and a queue of timed submissions, and plays each vehicle's
//! current task forward with the travel times the engine planned.
//!
//! # Step loop
//!
//! ```text
//! while now < config.end:
//!   ① Progress     — for every vehicle, in ascending VehicleId order:
//!                      start the schedule once its window opens,
//!                      report link entries of the current drive,
//!                      complete every task whose end ≤ now,
//!                      reveal hidden destinations when a pickup starts.
//!   ② Submissions  — release requests whose submit time ≤ now.
//!   ③ Pass         — DispatchOptimizer::on_sim_step(now).
//! ```
//!
//! Completions are reported at the task's own end time, not at the step
//! boundary, so results do not depend on the step length.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Candidate evaluation on Rayon's thread pool.           |
//! | `fx-hash`  | FxHash for the driver's bookkeeping maps.              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use drt_core::{DispatchConfig, SimConfig};
//! use drt_sim::{FleetSimBuilder, NoopObserver};
//! use drt_spatial::NetworkPathCost;
//!
//! let mut sim = FleetSimBuilder::new(config, DispatchConfig::default(), fleet,
//!                                    NetworkPathCost::dijkstra(network))
//!     .requests(requests)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod queue;
pub mod sim;


pub use builder::FleetSimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{DispatchObserver, NoopObserver};
pub use queue::SubmissionQueue;
pub use sim::FleetSim;
