//! Simulation time model.
//!
//! # Design
//!
//! Time is an absolute count of simulated seconds held in [`SimTime`].  The
//! dispatch engine has no clock of its own: every entry point receives `now`
//! from the external driver, which advances a [`SimClock`] in fixed steps.
//!
//! Using integral seconds keeps schedule arithmetic exact, so the temporal
//! ordering invariant (`task[i].end <= task[i+1].begin`) never fails on
//! floating-point noise.

use std::fmt;

// ── SimTime ──────────────────────────────────────────────────────────────────

/// An absolute simulation time in seconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const MAX: SimTime = SimTime(u64::MAX);

    /// Return the time `secs` seconds after `self`, saturating at `MAX`.
    #[inline]
    pub fn offset(self, secs: u64) -> SimTime {
        SimTime(self.0.saturating_add(secs))
    }

    /// Seconds elapsed from `earlier` to `self`; zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn secs(self) -> u64 {
        self.0
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        self.offset(rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: SimTime) -> u64 {
        self.since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(f, "{:02}:{:02}:{:02}", s / 3_600, (s % 3_600) / 60, s % 60)
    }
}

// ── TimeWindow ───────────────────────────────────────────────────────────────

/// A closed interval `[start, end]`: a vehicle's operating window.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    pub start: SimTime,
    pub end:   SimTime,
}

impl TimeWindow {
    /// # Panics
    ///
    /// Panics in debug mode if `end < start`.
    pub fn new(start: SimTime, end: SimTime) -> Self {
        debug_assert!(start <= end, "time window end precedes start");
        Self { start, end }
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Fixed-step clock owned by the driver.
///
/// Cheap to copy; holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Time of step 0.
    pub start: SimTime,
    /// Seconds between two step boundaries.
    pub step_secs: u32,
    /// The current time, advanced by [`SimClock::advance`].
    pub now: SimTime,
}

impl SimClock {
    pub fn new(start: SimTime, step_secs: u32) -> Self {
        Self { start, step_secs, now: start }
    }

    /// Advance the clock by one step.
    #[inline]
    pub fn advance(&mut self) {
        self.now = self.now + self.step_secs as u64;
    }

    /// Number of completed steps since `start`.
    #[inline]
    pub fn steps_elapsed(&self) -> u64 {
        (self.now - self.start) / self.step_secs.max(1) as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (step {})", self.now, self.steps_elapsed())
    }
}
