//! Synthetic street grid for the demo.
//!
//! A `SIDE × SIDE` lattice of intersections 400 m apart, roughly the size of
//! a small town centre.  Every block is a two-way road; east–west streets are
//! arterials (50 km/h), north–south streets residential (30 km/h), so
//! routes are not all ties.

use drt_core::{GeoPoint, NodeId};
use drt_spatial::{RoadNetwork, RoadNetworkBuilder};

pub const SIDE: usize = 4;

/// Grid spacing in degrees (~400 m north–south).
const SPACING_DEG: f32 = 0.0036;

/// Traversal times in milliseconds for one block.
const ARTERIAL_MS:    u32 = 29_000; // 50 km/h
const RESIDENTIAL_MS: u32 = 48_000; // 30 km/h

/// Build the grid.  Returns the network and its nodes in row-major order.
pub fn build_network() -> (RoadNetwork, Vec<NodeId>) {
    let mut b = RoadNetworkBuilder::with_capacity(SIDE * SIDE, 4 * SIDE * (SIDE - 1));

    let origin = GeoPoint::new(30.690, -88.050);
    let points: Vec<GeoPoint> = (0..SIDE * SIDE)
        .map(|i| {
            let (row, col) = (i / SIDE, i % SIDE);
            GeoPoint::new(
                origin.lat + row as f32 * SPACING_DEG,
                origin.lon + col as f32 * SPACING_DEG,
            )
        })
        .collect();
    let nodes: Vec<NodeId> = points.iter().map(|&p| b.add_node(p)).collect();

    let mut road = |from: usize, to: usize, travel_ms: u32| {
        b.add_road(nodes[from], nodes[to], points[from].distance_m(points[to]), travel_ms);
    };
    for row in 0..SIDE {
        for col in 0..SIDE {
            let here = row * SIDE + col;
            if col + 1 < SIDE {
                road(here, here + 1, ARTERIAL_MS);
            }
            if row + 1 < SIDE {
                road(here, here + SIDE, RESIDENTIAL_MS);
            }
        }
    }

    (b.build(), nodes)
}
