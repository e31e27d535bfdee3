//! `drt-spatial` — road network, routing, and path costing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR), `RoadNetworkBuilder`                    |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`                   |
//! | [`path`]    | `PathCostProvider` trait, `Leg`, `LinkHop`, `NetworkPathCost` |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! The dispatch engine only ever talks to [`PathCostProvider`]; the network
//! and router are the default provider behind it.  Swap in any other
//! implementation (a travel-time matrix, an external traffic simulation)
//! without touching the engine.

pub mod error;
pub mod network;
pub mod path;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use path::{Leg, LinkHop, NetworkPathCost, PathCostProvider};
pub use router::{DijkstraRouter, Route, Router};
