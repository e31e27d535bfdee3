//! `drt-core` — foundational types for the `rust_drt` dispatch engine.
//!
//! This crate is a dependency of every other `drt-*` crate.  It has no
//! `drt-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `RequestId`, `NodeId`, `LinkId`          |
//! | [`geo`]         | `GeoPoint`, haversine distance                        |
//! | [`time`]        | `SimTime`, `SimClock`, `TimeWindow`                   |
//! | [`config`]      | `DispatchConfig`, `MatchingMode`, `SimConfig`         |
//! | [`rng`]         | `DemandRng` (synthetic demand generation)             |
//! | [`error`]       | `DrtError`, `DrtResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DispatchConfig, MatchingMode, SimConfig};
pub use error::{DrtError, DrtResult};
pub use geo::GeoPoint;
pub use ids::{LinkId, NodeId, RequestId, VehicleId};
pub use rng::DemandRng;
pub use time::{SimClock, SimTime, TimeWindow};
