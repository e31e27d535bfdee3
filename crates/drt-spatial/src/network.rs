//! Road network representation and builder.
//!
//! # Data layout
//!
//! Outgoing links are stored in **Compressed Sparse Row (CSR)** form.  Given
//! a `NodeId n`, its outgoing links are the contiguous `LinkId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! Every link array (`link_from`, `link_to`, `link_length_m`,
//! `link_travel_ms`) is sorted by source node and indexed by `LinkId`, so the
//! Dijkstra inner loop is a linear scan.

use drt_core::{GeoPoint, LinkId, NodeId};

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format.
///
/// Fields are `pub` for indexed access on hot paths.  Construct through
/// [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Geographic position of each node, indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// CSR row pointer, length `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each link.  Needed to walk `prev_link` back during
    /// route reconstruction.
    pub link_from: Vec<NodeId>,

    /// Destination node of each link.
    pub link_to: Vec<NodeId>,

    /// Length of each link in metres.
    pub link_length_m: Vec<f32>,

    /// Free-flow travel time in milliseconds.  Used as Dijkstra cost.
    pub link_travel_ms: Vec<u32>,
}

impl RoadNetwork {
    /// A network with no nodes; every routing request against it fails with
    /// [`SpatialError::NoRoute`](crate::SpatialError::NoRoute) unless source
    /// and target coincide.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Iterator over the outgoing links of `node`.  No allocation.
    #[inline]
    pub fn out_links(&self, node: NodeId) -> impl Iterator<Item = LinkId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| LinkId(i as u32))
    }

    #[inline]
    pub fn link_travel_ms(&self, link: LinkId) -> u32 {
        self.link_travel_ms[link.index()]
    }

    /// Position of `node`, or `None` if it is not in the network.
    #[inline]
    pub fn position(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Collects nodes and directed links in any order; [`build`](Self::build)
/// sorts links by source node and fills the CSR arrays.
///
/// # Example
///
/// ```
/// use drt_core::GeoPoint;
/// use drt_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(52.52, 13.40));
/// let c = b.add_node(GeoPoint::new(52.53, 13.41));
/// b.add_road(a, c, 1_200.0, 90_000);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.link_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    raw_links: Vec<RawLink>,
}

struct RawLink {
    from:      NodeId,
    to:        NodeId,
    length_m:  f32,
    travel_ms: u32,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_links: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_links: Vec::with_capacity(links),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** link from `from` to `to`.
    pub fn add_directed_link(&mut self, from: NodeId, to: NodeId, length_m: f32, travel_ms: u32) {
        self.raw_links.push(RawLink { from, to, length_m, travel_ms });
    }

    /// Add links in **both directions** for an undirected road segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f32, travel_ms: u32) {
        self.add_directed_link(a, b, length_m, travel_ms);
        self.add_directed_link(b, a, length_m, travel_ms);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn link_count(&self) -> usize { self.raw_links.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// O(L log L) for the link sort.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let link_count = self.raw_links.len();

        // Stable sort keeps insertion order among a node's links, so LinkIds
        // are reproducible for a given build sequence.
        let mut raw = self.raw_links;
        raw.sort_by_key(|l| l.from.0);

        let link_from:      Vec<NodeId> = raw.iter().map(|l| l.from).collect();
        let link_to:        Vec<NodeId> = raw.iter().map(|l| l.to).collect();
        let link_length_m:  Vec<f32>    = raw.iter().map(|l| l.length_m).collect();
        let link_travel_ms: Vec<u32>    = raw.iter().map(|l| l.travel_ms).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for l in &raw {
            node_out_start[l.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, link_count);

        RoadNetwork {
            node_pos: self.nodes,
            node_out_start,
            link_from,
            link_to,
            link_length_m,
            link_travel_ms,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
