//! Engine configuration.
//!
//! Loading is left to the application (the demo deserializes JSON with the
//! `serde` feature enabled); this module only defines the shapes, their
//! defaults and validation.

use crate::{DrtError, DrtResult, SimTime};

// ── MatchingMode ──────────────────────────────────────────────────────────────

/// How unplanned requests are matched to vehicles within one pass.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchingMode {
    /// One request at a time in `(t0, id)` order; candidates for that request
    /// are evaluated across the fleet (in parallel with the `parallel`
    /// feature) and the winner is committed before the next request is read.
    #[default]
    Sequential,
    /// Every unplanned request is evaluated against one snapshot of the whole
    /// fleet up front, then winners are committed in `(t0, id)` order.  A
    /// winner whose vehicle changed in the meantime is stale and re-queued.
    Batch,
}

// ── DispatchConfig ────────────────────────────────────────────────────────────

/// Dispatch optimizer settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Pull PLANNED (not yet picked up) requests back out of every schedule
    /// before matching.  Costs recomputation, gains global optimality.
    pub unschedule_awaiting_requests: bool,

    /// Whether request destinations are known at submission.  When `false`
    /// the drop-off is planned provisionally at the pickup node and replaced
    /// once the destination is revealed at pickup.
    pub destination_known: bool,

    /// Allow redirecting a vehicle that is already driving.  Together with
    /// `unschedule_awaiting_requests` this enables aimless-drive handling.
    pub vehicle_diversion: bool,

    /// Dwell time of a PICKUP task.
    pub pickup_duration_secs: u64,

    /// Dwell time of a DROPOFF task.
    pub dropoff_duration_secs: u64,

    /// Upper bound on `pickup_begin - t0`.  `None` means unbounded.
    pub max_wait_secs: Option<u64>,

    /// Evaluate only the `k` vehicles closest to the request origin.
    /// `None` evaluates the whole fleet.
    pub candidate_vehicles: Option<usize>,

    pub matching: MatchingMode,

    /// Worker thread count for candidate evaluation.  `None` uses Rayon's
    /// global pool.  Ignored without the `parallel` feature.
    pub num_threads: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            unschedule_awaiting_requests: false,
            destination_known:            true,
            vehicle_diversion:            false,
            pickup_duration_secs:         60,
            dropoff_duration_secs:        60,
            max_wait_secs:                None,
            candidate_vehicles:           None,
            matching:                     MatchingMode::Sequential,
            num_threads:                  None,
        }
    }
}

impl DispatchConfig {
    /// `true` when vehicles driving towards an abandoned pickup are stopped
    /// after each pass.
    #[inline]
    pub fn handles_aimless_drives(&self) -> bool {
        self.unschedule_awaiting_requests && self.vehicle_diversion
    }

    pub fn validate(&self) -> DrtResult<()> {
        if self.candidate_vehicles == Some(0) {
            return Err(DrtError::Config(
                "candidate_vehicles must be at least 1 when set".into(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(DrtError::Config("num_threads must be at least 1 when set".into()));
        }
        Ok(())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Driver configuration: when to start, how long a step is, when to stop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    pub start: SimTime,

    /// Seconds per step boundary (`onSimStep`).
    pub step_secs: u32,

    /// Exclusive end of the run.
    pub end: SimTime,
}

impl SimConfig {
    pub fn validate(&self) -> DrtResult<()> {
        if self.step_secs == 0 {
            return Err(DrtError::Config("step_secs must be > 0".into()));
        }
        if self.end < self.start {
            return Err(DrtError::Config(format!(
                "end {} precedes start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> crate::SimClock {
        crate::SimClock::new(self.start, self.step_secs)
    }

    /// Number of steps in the run.
    pub fn total_steps(&self) -> u64 {
        (self.end - self.start).div_ceil(self.step_secs.max(1) as u64)
    }
}
