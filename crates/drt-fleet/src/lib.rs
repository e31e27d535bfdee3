//! `drt-fleet` — arenas of vehicles and requests addressed by stable ids.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`vehicle`]   | `Vehicle`, `VehicleSpec`, `Fleet`, `FleetBuilder`         |
//! | [`request`]   | `Request`, `RequestSpec`, `RequestStatus`, `RequestRegistry` |
//! | [`loader`]    | CSV loaders for vehicle and request scenario files        |
//! | [`error`]     | `FleetError`, `FleetResult<T>`                            |
//!
//! Both arenas index by id: `VehicleId(i)` is `fleet.vehicles()[i]` and
//! `RequestId(i)` is the `i`-th submitted request.  Ids are never reused.

pub mod error;
pub mod loader;
pub mod request;
pub mod vehicle;


pub use error::{FleetError, FleetResult};
pub use loader::{load_requests_csv, load_requests_reader, load_vehicles_csv, load_vehicles_reader};
pub use request::{Request, RequestRegistry, RequestSpec, RequestStatus};
pub use vehicle::{Fleet, FleetBuilder, Vehicle, VehicleSpec};
