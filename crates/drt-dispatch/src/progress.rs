//! Where each driving vehicle is along its current leg.
//!
//! Updated from link-entered events; consulted to refresh the current
//! drive's ETA and to pick the diversion point when a drive is cut short.

use drt_core::{SimTime, VehicleId};

/// Last entered link of the current drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DriveProgress {
    /// Index into the current leg's hops.
    pub hop:        usize,
    pub entered_at: SimTime,
}

#[cfg(feature = "fx-hash")]
pub(crate) type ProgressMap = rustc_hash::FxHashMap<VehicleId, DriveProgress>;

#[cfg(not(feature = "fx-hash"))]
pub(crate) type ProgressMap = std::collections::HashMap<VehicleId, DriveProgress>;
