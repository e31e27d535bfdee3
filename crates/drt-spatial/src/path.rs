//! The path-cost boundary of the dispatch engine.
//!
//! The engine never computes travel times itself.  It hands an ordered list
//! of stops and a departure time to a [`PathCostProvider`] and gets back one
//! timed [`Leg`] per consecutive stop pair.  Legs carry their link sequence
//! with per-link exit offsets so the engine can refresh ETAs when the driver
//! reports link entries, and can cut a drive short at a link boundary when a
//! vehicle is diverted.

use std::sync::Arc;

use drt_core::{GeoPoint, LinkId, NodeId, SimTime};

use crate::{DijkstraRouter, RoadNetwork, Router, SpatialError, SpatialResult};

// ── Leg ───────────────────────────────────────────────────────────────────────

/// One traversed link and the offset (from leg departure) at which the
/// vehicle leaves it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkHop {
    pub link: LinkId,
    /// Node at the end of `link`.
    pub to: NodeId,
    pub exit_offset_secs: u64,
}

/// A timed path between two consecutive stops.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub from: NodeId,
    pub to: NodeId,
    pub departure: SimTime,
    pub arrival: SimTime,
    /// Empty when `from == to`.
    pub hops: Vec<LinkHop>,
}

impl Leg {
    /// A zero-length leg at `at`.
    pub fn stationary(at: NodeId, time: SimTime) -> Self {
        Self { from: at, to: at, departure: time, arrival: time, hops: Vec::new() }
    }

    #[inline]
    pub fn travel_secs(&self) -> u64 {
        self.arrival - self.departure
    }

    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.hops.is_empty()
    }

    /// The same path re-timed to leave at `departure`.
    pub fn departing_at(&self, departure: SimTime) -> Leg {
        Leg {
            departure,
            arrival: departure + self.travel_secs(),
            ..self.clone()
        }
    }

    /// Position of `link` within this leg.
    pub fn hop_index(&self, link: LinkId) -> Option<usize> {
        self.hops.iter().position(|h| h.link == link)
    }

    /// Planned time at which the vehicle enters hop `hop`.
    pub fn entry_time(&self, hop: usize) -> SimTime {
        match hop {
            0 => self.departure,
            i => self.departure + self.hops[i - 1].exit_offset_secs,
        }
    }

    /// Seconds from entering hop `hop` until arrival.
    pub fn remaining_after_entry(&self, hop: usize) -> u64 {
        self.arrival - self.entry_time(hop)
    }

    /// The prefix of this leg that ends at the far node of hop `hop`, the
    /// earliest point at which a vehicle on that link can stop.
    pub fn divert_at(&self, hop: usize) -> SpatialResult<Leg> {
        let last = self
            .hops
            .get(hop)
            .ok_or(SpatialError::LinkNotOnLeg(LinkId::INVALID))?;
        Ok(Leg {
            from: self.from,
            to: last.to,
            departure: self.departure,
            arrival: self.departure + last.exit_offset_secs,
            hops: self.hops[..=hop].to_vec(),
        })
    }
}

// ── PathCostProvider ──────────────────────────────────────────────────────────

/// Travel-time oracle consumed by the candidate builder.
///
/// # Contract
///
/// - `route(stops, departure)` returns `stops.len() - 1` legs (none for fewer
///   than two stops); leg `i` runs `stops[i] → stops[i+1]` and departs when
///   leg `i-1` arrives.
/// - Calls are synchronous and bounded; a missing path is an error, never a
///   stall.
/// - Implementations are shared across worker threads, hence `Send + Sync`.
pub trait PathCostProvider: Send + Sync {
    fn route(&self, stops: &[NodeId], departure: SimTime) -> SpatialResult<Vec<Leg>>;

    /// Position of `node` for proximity pruning.  Providers without geometry
    /// keep the default, which disables pruning.
    fn position(&self, _node: NodeId) -> Option<GeoPoint> {
        None
    }
}

impl<P: PathCostProvider + ?Sized> PathCostProvider for Arc<P> {
    fn route(&self, stops: &[NodeId], departure: SimTime) -> SpatialResult<Vec<Leg>> {
        (**self).route(stops, departure)
    }

    fn position(&self, node: NodeId) -> Option<GeoPoint> {
        (**self).position(node)
    }
}

// ── NetworkPathCost ───────────────────────────────────────────────────────────

/// Default provider: free-flow routing on a [`RoadNetwork`].
pub struct NetworkPathCost<R: Router = DijkstraRouter> {
    pub network: RoadNetwork,
    pub router:  R,
}

impl NetworkPathCost<DijkstraRouter> {
    pub fn dijkstra(network: RoadNetwork) -> Self {
        Self { network, router: DijkstraRouter }
    }
}

impl<R: Router> NetworkPathCost<R> {
    pub fn new(network: RoadNetwork, router: R) -> Self {
        Self { network, router }
    }

    /// Route a single stop pair departing at `departure`.
    pub fn leg(&self, from: NodeId, to: NodeId, departure: SimTime) -> SpatialResult<Leg> {
        let route = self.router.route(&self.network, from, to)?;

        let mut elapsed_ms = 0u64;
        let hops: Vec<LinkHop> = route
            .links
            .iter()
            .map(|&link| {
                elapsed_ms += self.network.link_travel_ms(link) as u64;
                LinkHop {
                    link,
                    to: self.network.link_to[link.index()],
                    exit_offset_secs: elapsed_ms.div_ceil(1_000),
                }
            })
            .collect();

        Ok(Leg {
            from,
            to,
            departure,
            arrival: departure + route.travel_secs(),
            hops,
        })
    }

    /// Metres covered by `leg`.  Links outside this network count as zero.
    pub fn distance_m(&self, leg: &Leg) -> f32 {
        leg.hops
            .iter()
            .filter_map(|h| self.network.link_length_m.get(h.link.index()))
            .sum()
    }
}

impl<R: Router> PathCostProvider for NetworkPathCost<R> {
    fn route(&self, stops: &[NodeId], departure: SimTime) -> SpatialResult<Vec<Leg>> {
        let mut legs = Vec::with_capacity(stops.len().saturating_sub(1));
        let mut t = departure;
        for pair in stops.windows(2) {
            let leg = self.leg(pair[0], pair[1], t)?;
            t = leg.arrival;
            legs.push(leg);
        }
        Ok(legs)
    }

    fn position(&self, node: NodeId) -> Option<GeoPoint> {
        self.network.position(node)
    }
}
