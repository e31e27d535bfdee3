//! CSV scenario loaders.
//!
//! # Vehicle file
//!
//! ```csv
//! start_node,capacity,window_start,window_end
//! 0,4,0,86400
//! 17,8,21600,64800
//! ```
//!
//! Row `i` becomes `VehicleId(i)` once the specs are handed to a
//! [`FleetBuilder`](crate::FleetBuilder).
//!
//! # Request file
//!
//! ```csv
//! submit_time,from_node,to_node,t0
//! 0,3,12,300
//! 60,5,,420
//! ```
//!
//! An empty `to_node` submits the request with an unknown destination.
//! Rows are returned sorted by `submit_time` (stable), ready for a
//! submission queue.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use drt_core::{NodeId, SimTime, TimeWindow};

use crate::{FleetError, FleetResult, RequestSpec, VehicleSpec};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct VehicleRecord {
    start_node:   u32,
    capacity:     u32,
    window_start: u64,
    window_end:   u64,
}

#[derive(Deserialize)]
struct RequestRecord {
    submit_time: u64,
    from_node:   u32,
    to_node:     Option<u32>,
    t0:          u64,
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

pub fn load_vehicles_csv(path: &Path) -> FleetResult<Vec<VehicleSpec>> {
    let file = std::fs::File::open(path)?;
    load_vehicles_reader(file)
}

/// Like [`load_vehicles_csv`] but accepts any `Read` source.
pub fn load_vehicles_reader<R: Read>(reader: R) -> FleetResult<Vec<VehicleSpec>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut specs = Vec::new();

    for (row, result) in csv_reader.deserialize::<VehicleRecord>().enumerate() {
        let r = result.map_err(|e| FleetError::Parse(e.to_string()))?;
        if r.window_end < r.window_start {
            return Err(FleetError::Parse(format!(
                "vehicle row {row}: window ends ({}) before it starts ({})",
                r.window_end, r.window_start
            )));
        }
        if r.capacity == 0 {
            return Err(FleetError::Parse(format!("vehicle row {row}: zero capacity")));
        }
        specs.push(VehicleSpec {
            start:    NodeId(r.start_node),
            capacity: r.capacity,
            window:   TimeWindow::new(SimTime(r.window_start), SimTime(r.window_end)),
        });
    }

    Ok(specs)
}

// ── Requests ──────────────────────────────────────────────────────────────────

pub fn load_requests_csv(path: &Path) -> FleetResult<Vec<(SimTime, RequestSpec)>> {
    let file = std::fs::File::open(path)?;
    load_requests_reader(file)
}

/// Like [`load_requests_csv`] but accepts any `Read` source.
pub fn load_requests_reader<R: Read>(reader: R) -> FleetResult<Vec<(SimTime, RequestSpec)>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize::<RequestRecord>() {
        let r = result.map_err(|e| FleetError::Parse(e.to_string()))?;
        rows.push((
            SimTime(r.submit_time),
            RequestSpec {
                from: NodeId(r.from_node),
                to:   r.to_node.map(NodeId),
                t0:   SimTime(r.t0),
            },
        ));
    }

    rows.sort_by_key(|&(at, _)| at);
    Ok(rows)
}
