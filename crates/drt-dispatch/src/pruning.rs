//! k-nearest vehicle pre-selection.
//!
//! An R-tree over each active vehicle's departure position.  Only built
//! when the path-cost provider knows node positions for every vehicle.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use drt_core::{GeoPoint, SimTime, VehicleId};
use drt_schedule::ScheduleSnapshot;
use drt_spatial::PathCostProvider;

#[derive(Clone)]
struct VehicleEntry {
    point: [f32; 2], // [lat, lon]
    id:    VehicleId,
}

impl RTreeObject for VehicleEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VehicleEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

pub struct VehicleIndex {
    tree: RTree<VehicleEntry>,
}

impl VehicleIndex {
    /// Index the departure points of all vehicles still in service at `now`.
    /// `None` if any of them has no known position.
    pub fn build(
        snapshots: &[ScheduleSnapshot],
        paths:     &dyn PathCostProvider,
        now:       SimTime,
    ) -> Option<Self> {
        let mut entries = Vec::with_capacity(snapshots.len());
        for s in snapshots.iter().filter(|s| s.window.end > now) {
            let Some(dep) = s.departure(now) else { continue };
            let pos = paths.position(dep.node)?;
            entries.push(VehicleEntry { point: pos.to_array(), id: s.vehicle });
        }
        Some(Self { tree: RTree::bulk_load(entries) })
    }

    /// Up to `k` vehicles closest to `pos`, in ascending id order.
    pub fn nearest(&self, pos: GeoPoint, k: usize) -> Vec<VehicleId> {
        let mut ids: Vec<VehicleId> = self
            .tree
            .nearest_neighbor_iter(&pos.to_array())
            .take(k)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
