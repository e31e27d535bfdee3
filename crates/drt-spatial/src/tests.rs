//! Unit tests for drt-spatial.
//!
//! All tests use hand-crafted networks with exact link times.

#[cfg(test)]
mod helpers {
    use drt_core::{GeoPoint, NodeId};
    use crate::{RoadNetwork, RoadNetworkBuilder};

    /// Small grid network.
    ///
    /// Nodes (lat, lon):
    ///   0:(0,0)  1:(0,1)  2:(0,2)
    ///   3:(1,0)           4:(1,2)
    ///
    /// Undirected roads: 0-1, 1-2, 2-4 (10 s each), 0-3 (50 s), 3-4 (10 s).
    /// Shortest 0→4 is 0→1→2→4 in 30 s.
    pub fn grid_network() -> (RoadNetwork, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 1.0));
        let n2 = b.add_node(GeoPoint::new(0.0, 2.0));
        let n3 = b.add_node(GeoPoint::new(1.0, 0.0));
        let n4 = b.add_node(GeoPoint::new(1.0, 2.0));

        b.add_road(n0, n1, 100.0, 10_000);
        b.add_road(n1, n2, 100.0, 10_000);
        b.add_road(n2, n4, 100.0, 10_000);
        b.add_road(n0, n3, 500.0, 50_000);
        b.add_road(n3, n4, 100.0, 10_000);

        (b.build(), [n0, n1, n2, n3, n4])
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use drt_core::GeoPoint;
    use crate::RoadNetworkBuilder;

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.link_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn csr_out_links() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        assert_eq!(net.out_links(n1).count(), 2);
        assert_eq!(net.out_links(n0).count(), 2);
        assert_eq!(net.out_links(n2).count(), 2);
        assert_eq!(net.out_links(n3).count(), 2);
        assert_eq!(net.out_links(n4).count(), 2);
        for l in net.out_links(n0) {
            assert_eq!(net.link_from[l.index()], n0);
        }
    }

    #[test]
    fn directed_only_link() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_link(a, c, 100.0, 10_000);
        let net = b.build();
        assert_eq!(net.link_count(), 1);
        assert_eq!(net.out_links(a).count(), 1);
        assert_eq!(net.out_links(c).count(), 0);
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use drt_core::{GeoPoint, NodeId};
    use crate::{DijkstraRouter, RoadNetworkBuilder, Router, SpatialError};

    #[test]
    fn trivial_same_node() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let r = DijkstraRouter.route(&net, n0, n0).unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.travel_secs(), 0);
    }

    #[test]
    fn shortest_path_correct() {
        let (net, [n0, n1, n2, _, n4]) = super::helpers::grid_network();
        let route = DijkstraRouter.route(&net, n0, n4).unwrap();

        assert_eq!(route.travel_secs(), 30);
        assert_eq!(route.links.len(), 3);
        assert_eq!(net.link_from[route.links[0].index()], n0);
        assert_eq!(net.link_to[route.links[0].index()], n1);
        assert_eq!(net.link_to[route.links[1].index()], n2);
        assert_eq!(net.link_to[route.links[2].index()], n4);
    }

    #[test]
    fn no_route_disconnected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(1.0, 0.0));
        let net = b.build();
        let result = DijkstraRouter.route(&net, a, c);
        assert!(matches!(result, Err(SpatialError::NoRoute { .. })));
    }

    #[test]
    fn unknown_node_is_an_error() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let result = DijkstraRouter.route(&net, n0, NodeId(99));
        assert!(matches!(result, Err(SpatialError::NodeNotFound(NodeId(99)))));
    }

    #[test]
    fn travel_secs_round_up() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_road(a, c, 10.0, 1_001);
        let net = b.build();
        assert_eq!(DijkstraRouter.route(&net, a, c).unwrap().travel_secs(), 2);
    }
}

// ── Path costing ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod path_cost {
    use drt_core::SimTime;
    use crate::{Leg, NetworkPathCost, PathCostProvider, SpatialError};

    #[test]
    fn legs_chain_departures() {
        let (net, [n0, _, n2, _, n4]) = super::helpers::grid_network();
        let provider = NetworkPathCost::dijkstra(net);

        let legs = provider.route(&[n0, n2, n4], SimTime(100)).unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].departure, SimTime(100));
        assert_eq!(legs[0].arrival, SimTime(120));
        assert_eq!(legs[1].departure, SimTime(120));
        assert_eq!(legs[1].arrival, SimTime(130));
        assert_eq!(legs[0].hops.last().unwrap().exit_offset_secs, 20);
    }

    #[test]
    fn fewer_than_two_stops_yield_no_legs() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let provider = NetworkPathCost::dijkstra(net);
        assert!(provider.route(&[], SimTime(0)).unwrap().is_empty());
        assert!(provider.route(&[n0], SimTime(0)).unwrap().is_empty());
    }

    #[test]
    fn missing_path_fails_hard() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let provider = NetworkPathCost::dijkstra(net);
        let err = provider.route(&[n0, drt_core::NodeId(42)], SimTime(0));
        assert!(matches!(err, Err(SpatialError::NodeNotFound(_))));
    }

    #[test]
    fn entry_times_and_diversion() {
        let (net, [n0, n1, _, _, n4]) = super::helpers::grid_network();
        let provider = NetworkPathCost::dijkstra(net);
        let leg = provider.leg(n0, n4, SimTime(0)).unwrap();

        assert_eq!(leg.entry_time(0), SimTime(0));
        assert_eq!(leg.entry_time(1), SimTime(10));
        assert_eq!(leg.remaining_after_entry(1), 20);

        let cut = leg.divert_at(0).unwrap();
        assert_eq!(cut.to, n1);
        assert_eq!(cut.arrival, SimTime(10));
        assert_eq!(cut.hops.len(), 1);
        assert!(leg.divert_at(3).is_err());
    }

    #[test]
    fn retiming_preserves_duration() {
        let (net, [n0, _, _, _, n4]) = super::helpers::grid_network();
        let provider = NetworkPathCost::dijkstra(net);
        let leg = provider.leg(n0, n4, SimTime(0)).unwrap().departing_at(SimTime(50));
        assert_eq!(leg.arrival, SimTime(80));
        assert_eq!(Leg::stationary(n0, SimTime(5)).travel_secs(), 0);
    }

    #[test]
    fn provider_exposes_positions() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let provider = NetworkPathCost::dijkstra(net);
        assert!(provider.position(n0).is_some());
        assert!(provider.position(drt_core::NodeId(99)).is_none());
    }

    #[test]
    fn leg_distance_sums_link_lengths() {
        let (net, [n0, _, _, n3, n4]) = super::helpers::grid_network();
        let provider = NetworkPathCost::dijkstra(net);
        let leg = provider.leg(n0, n4, SimTime(0)).unwrap();
        assert_eq!(provider.distance_m(&leg), 300.0);
        let cut = leg.divert_at(0).unwrap();
        assert_eq!(provider.distance_m(&cut), 100.0);
        assert_eq!(provider.distance_m(&Leg::stationary(n3, SimTime(0))), 0.0);
    }
}
