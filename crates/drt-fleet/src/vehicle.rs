//! Vehicles and the fleet arena.
//!
//! A [`Vehicle`] owns exactly one [`Schedule`].  The fleet hands out `&mut`
//! access to schedules only through [`Fleet::get_mut`], which the dispatch
//! optimizer uses during its single-threaded commit phase.

use drt_core::{NodeId, TimeWindow, VehicleId};
use drt_schedule::{Schedule, ScheduleSnapshot};

use crate::{FleetError, FleetResult};

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// Static description of a vehicle, as read from a scenario file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VehicleSpec {
    pub start:    NodeId,
    pub capacity: u32,
    pub window:   TimeWindow,
}

#[derive(Debug)]
pub struct Vehicle {
    pub id:       VehicleId,
    pub start:    NodeId,
    /// Seats.  Every request occupies one.
    pub capacity: u32,
    pub window:   TimeWindow,
    schedule:     Schedule,
}

impl Vehicle {
    pub fn new(id: VehicleId, spec: VehicleSpec) -> Self {
        Self {
            id,
            start:    spec.start,
            capacity: spec.capacity,
            window:   spec.window,
            schedule: Schedule::new(id, spec.start, spec.window),
        }
    }

    #[inline]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    #[inline]
    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    #[inline]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// All vehicle ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        (0..self.vehicles.len() as u32).map(VehicleId)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn get(&self, id: VehicleId) -> FleetResult<&Vehicle> {
        self.vehicles.get(id.index()).ok_or(FleetError::VehicleNotFound(id))
    }

    pub fn get_mut(&mut self, id: VehicleId) -> FleetResult<&mut Vehicle> {
        self.vehicles.get_mut(id.index()).ok_or(FleetError::VehicleNotFound(id))
    }

    /// Copy-on-read view of every schedule, in id order.
    pub fn snapshots(&self) -> Vec<ScheduleSnapshot> {
        self.vehicles.iter().map(|v| v.schedule.snapshot()).collect()
    }
}

// ── FleetBuilder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Fleet`].  Ids are assigned in insertion order.
///
/// ```rust
/// use drt_core::{NodeId, SimTime, TimeWindow};
/// use drt_fleet::FleetBuilder;
///
/// let mut b = FleetBuilder::new();
/// let v = b.add(NodeId(0), 4, TimeWindow::new(SimTime(0), SimTime(3_600)))?;
/// let fleet = b.build()?;
/// assert_eq!(fleet.get(v)?.capacity, 4);
/// # Ok::<(), drt_fleet::FleetError>(())
/// ```
#[derive(Default)]
pub struct FleetBuilder {
    specs: Vec<VehicleSpec>,
}

impl FleetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { specs: Vec::with_capacity(n) }
    }

    pub fn add(&mut self, start: NodeId, capacity: u32, window: TimeWindow) -> FleetResult<VehicleId> {
        self.add_spec(VehicleSpec { start, capacity, window })
    }

    pub fn add_spec(&mut self, spec: VehicleSpec) -> FleetResult<VehicleId> {
        let id = vehicle_id(self.specs.len())?;
        self.specs.push(spec);
        Ok(id)
    }

    pub fn extend(mut self, specs: impl IntoIterator<Item = VehicleSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Fails if more vehicles were added than ids exist.
    pub fn build(self) -> FleetResult<Fleet> {
        let vehicles = self
            .specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Ok(Vehicle::new(vehicle_id(i)?, spec)))
            .collect::<FleetResult<_>>()?;
        Ok(Fleet { vehicles })
    }
}

/// The id of the vehicle at arena index `index`.
pub(crate) fn vehicle_id(index: usize) -> FleetResult<VehicleId> {
    VehicleId::try_from(index)
        .ok()
        .filter(|&id| id != VehicleId::INVALID)
        .ok_or(FleetError::IdSpaceExhausted("vehicle"))
}
