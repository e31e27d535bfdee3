//! Deterministic RNG for synthetic demand.
//!
//! The engine itself is deterministic and never draws random numbers; this
//! wrapper exists for scenario generators (the demo binary, randomized
//! invariant tests) that need reproducible request streams.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded RNG used by demand generators.
///
/// Used only in single-threaded contexts.
pub struct DemandRng(SmallRng);

impl DemandRng {
    pub fn new(seed: u64) -> Self {
        DemandRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a slice; `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Exponentially distributed inter-arrival gap in whole seconds for a
    /// Poisson process with `rate_per_hour` arrivals.
    pub fn arrival_gap_secs(&mut self, rate_per_hour: f64) -> u64 {
        if rate_per_hour <= 0.0 {
            return u64::MAX;
        }
        let u: f64 = self.0.gen_range(f64::EPSILON..1.0);
        (-u.ln() * 3_600.0 / rate_per_hour).ceil() as u64
    }
}
