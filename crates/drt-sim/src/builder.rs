//! Fluent builder for constructing a [`FleetSim`].

use drt_core::{DispatchConfig, SimConfig, SimTime};
use drt_dispatch::DispatchOptimizer;
use drt_fleet::{Fleet, RequestSpec};
use drt_spatial::PathCostProvider;

use crate::{FleetSim, SimError, SimResult, SubmissionQueue};

/// Fluent builder for [`FleetSim<P>`] with the default cost function and
/// re-optimization policy.
///
/// # Required inputs
///
/// - [`SimConfig`] — start, step length, end
/// - [`DispatchConfig`] — optimizer settings
/// - [`Fleet`] — from [`drt_fleet::FleetBuilder`]
/// - `P: PathCostProvider` — e.g. [`drt_spatial::NetworkPathCost::dijkstra`]
///
/// # Optional inputs
///
/// | Method             | Default        |
/// |--------------------|----------------|
/// | `.request(at, s)`  | no requests    |
/// | `.requests(iter)`  | no requests    |
///
/// For a custom `CostFunction` or policy build the optimizer yourself and
/// call [`FleetSim::new`].
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = FleetSimBuilder::new(config, DispatchConfig::default(), fleet, paths)
///     .requests(load_requests_csv(path)?)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct FleetSimBuilder<P: PathCostProvider> {
    config:      SimConfig,
    dispatch:    DispatchConfig,
    fleet:       Fleet,
    paths:       P,
    submissions: Vec<(SimTime, RequestSpec)>,
}

impl<P: PathCostProvider> FleetSimBuilder<P> {
    pub fn new(config: SimConfig, dispatch: DispatchConfig, fleet: Fleet, paths: P) -> Self {
        Self { config, dispatch, fleet, paths, submissions: Vec::new() }
    }

    /// Submit `spec` to the optimizer at the first step at or after `at`.
    pub fn request(mut self, at: SimTime, spec: RequestSpec) -> Self {
        self.submissions.push((at, spec));
        self
    }

    pub fn requests(mut self, requests: impl IntoIterator<Item = (SimTime, RequestSpec)>) -> Self {
        self.submissions.extend(requests);
        self
    }

    /// Validate inputs and return a ready-to-run [`FleetSim`].
    pub fn build(self) -> SimResult<FleetSim<P>> {
        self.config.validate()?;
        if self.fleet.is_empty() {
            return Err(SimError::EmptyFleet);
        }
        if let Some(&(at, _)) = self.submissions.iter().find(|(at, _)| *at < self.config.start) {
            return Err(SimError::SubmissionBeforeStart { at, start: self.config.start });
        }

        let mut queue = SubmissionQueue::new();
        queue.extend(self.submissions);

        let optimizer = DispatchOptimizer::new(self.dispatch, self.fleet, self.paths)?;
        FleetSim::new(self.config, optimizer, queue)
    }
}
