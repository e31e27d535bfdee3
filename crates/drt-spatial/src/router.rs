//! Point-to-point routing over the road network.
//!
//! [`NetworkPathCost`](crate::NetworkPathCost) calls the [`Router`] once per
//! consecutive stop pair.  Costs are free-flow milliseconds; the resulting
//! [`Route`] exposes whole seconds (rounded up) for schedule arithmetic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use drt_core::{LinkId, NodeId};

use crate::network::RoadNetwork;
use crate::SpatialError;

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered list of links and the total travel time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Links to traverse in order, from source to destination.
    pub links: Vec<LinkId>,
    /// Total travel time in milliseconds.
    pub travel_ms: u64,
}

impl Route {
    /// Travel time in whole seconds, rounded up so vehicles are never planned
    /// to arrive early.
    pub fn travel_secs(&self) -> u64 {
        self.travel_ms.div_ceil(1_000)
    }

    /// `true` if source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.links.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Must be `Send + Sync`: candidate evaluation routes from Rayon workers.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to`.
    ///
    /// `from == to` yields an empty route; a disconnected pair yields
    /// [`SpatialError::NoRoute`].
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Result<Route, SpatialError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Plain Dijkstra over `link_travel_ms`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Result<Route, SpatialError> {
        dijkstra(network, from, to)
    }
}

fn dijkstra(network: &RoadNetwork, from: NodeId, to: NodeId) -> Result<Route, SpatialError> {
    if from == to {
        return Ok(Route { links: vec![], travel_ms: 0 });
    }
    if !network.contains_node(from) {
        return Err(SpatialError::NodeNotFound(from));
    }
    if !network.contains_node(to) {
        return Err(SpatialError::NodeNotFound(to));
    }

    let n = network.node_count();
    let mut dist      = vec![u64::MAX; n];
    let mut prev_link = vec![LinkId::INVALID; n];

    dist[from.index()] = 0;

    // Min-heap via Reverse; NodeId as secondary key keeps tie-breaking
    // deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, prev_link, to, cost));
        }

        // Stale heap entry.
        if cost > dist[node.index()] {
            continue;
        }

        for link in network.out_links(node) {
            let neighbor = network.link_to[link.index()];
            let new_cost = cost.saturating_add(network.link_travel_ms(link) as u64);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_link[neighbor.index()] = link;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Err(SpatialError::NoRoute { from, to })
}

fn reconstruct(network: &RoadNetwork, prev_link: Vec<LinkId>, to: NodeId, total_ms: u64) -> Route {
    let mut links = Vec::new();
    let mut cur = to;
    loop {
        let l = prev_link[cur.index()];
        if l == LinkId::INVALID {
            break;
        }
        links.push(l);
        cur = network.link_from[l.index()];
    }
    links.reverse();
    Route { links, travel_ms: total_ms }
}
