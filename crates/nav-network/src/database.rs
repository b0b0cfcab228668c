//! Road-network database and builder.
//!
//! # Data layout
//!
//! Entities are stored in id-keyed `FxHashMap`s (ids are strings owned by
//! external simulators, not dense indices).  For every node the builder
//! pre-computes three connection lists, mirroring how a connection relates
//! to the node:
//!
//! | List       | The node is …                                 |
//! |------------|-----------------------------------------------|
//! | `outgoing` | the first node of the connection              |
//! | `incoming` | the last node of the connection               |
//! | `part_of`  | an inner shape node of the connection         |
//!
//! # Spatial index
//!
//! Two R-trees (via `rstar`) in planar `[lat, lon]` space: one over node
//! positions for closest-node queries and one over connection segments
//! (adjacent node pairs) for closest-edge queries.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use nav_core::{ConnectionId, GeoPoint, GeoRect, NodeId, RouteId, WayId};

use crate::road::{Connection, DbRoute, Node, RouteEdge, Way};
use crate::{NetworkError, NetworkResult};

/// Number of nearest segments inspected by heading-aware edge lookups.
const HEADING_SEARCH_CANDIDATES: usize = 32;

// ── R-tree entries ────────────────────────────────────────────────────────────

/// Node position entry: `[lat, lon]` plus the node id.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for ranking
    /// nearby candidates within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// One segment of a connection: the straight piece between the node at
/// `index` and the node at `index + 1`.
#[derive(Clone)]
struct SegmentEntry {
    a:          [f64; 2],
    b:          [f64; 2],
    connection: ConnectionId,
    index:      usize,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

impl PointDistance for SegmentEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (dx, dy) = (self.b[0] - self.a[0], self.b[1] - self.a[1]);
        let len2 = dx * dx + dy * dy;
        let t = if len2 == 0.0 {
            0.0
        } else {
            (((point[0] - self.a[0]) * dx + (point[1] - self.a[1]) * dy) / len2).clamp(0.0, 1.0)
        };
        let px = self.a[0] + t * dx - point[0];
        let py = self.a[1] + t * dy - point[1];
        px * px + py * py
    }
}

// ── EdgeHit ───────────────────────────────────────────────────────────────────

/// Result of a closest-edge query: the connection and the two adjacent nodes
/// bounding the matched segment.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeHit {
    pub connection:    ConnectionId,
    pub previous_node: NodeId,
    pub next_node:     NodeId,
}

// ── RoadNetworkDatabase ───────────────────────────────────────────────────────

/// Read-only road graph plus the routes defined with the scenario.
///
/// Do not construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetworkDatabase {
    nodes:       FxHashMap<NodeId, Node>,
    ways:        FxHashMap<WayId, Way>,
    connections: FxHashMap<ConnectionId, Connection>,
    routes:      Vec<DbRoute>,

    outgoing: FxHashMap<NodeId, Vec<ConnectionId>>,
    incoming: FxHashMap<NodeId, Vec<ConnectionId>>,
    part_of:  FxHashMap<NodeId, Vec<ConnectionId>>,

    node_idx: RTree<NodeEntry>,
    edge_idx: RTree<SegmentEntry>,
    bounds:   Option<GeoRect>,
}

impl RoadNetworkDatabase {
    /// A database without nodes, connections or routes.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Entity lookup ─────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn way(&self, id: &str) -> Option<&Way> {
        self.ways.get(id)
    }

    #[inline]
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Routes defined with the scenario, in load order.
    pub fn routes(&self) -> &[DbRoute] {
        &self.routes
    }

    pub fn route(&self, id: &str) -> Option<&DbRoute> {
        self.routes.iter().find(|r| r.id.as_str() == id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Speed limit of `connection`, taken from its owning way.
    pub fn max_speed_ms(&self, connection: &Connection) -> f64 {
        self.ways.get(&connection.way).map_or(0.0, |w| w.max_speed_ms)
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    /// Connections starting at `node`.
    pub fn outgoing(&self, node: &str) -> &[ConnectionId] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Connections ending at `node`.
    pub fn incoming(&self, node: &str) -> &[ConnectionId] {
        self.incoming.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Connections passing through `node` as an inner shape node.
    pub fn part_of(&self, node: &str) -> &[ConnectionId] {
        self.part_of.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Connections a vehicle at `node` can continue on: the outgoing ones,
    /// or the connection(s) `node` is a shape node of when it starts none.
    pub fn leaving(&self, node: &str) -> &[ConnectionId] {
        let out = self.outgoing(node);
        if out.is_empty() { self.part_of(node) } else { out }
    }

    /// Counterpart of [`leaving`](Self::leaving) for arrival at `node`.
    pub fn arriving(&self, node: &str) -> &[ConnectionId] {
        let inc = self.incoming(node);
        if inc.is_empty() { self.part_of(node) } else { inc }
    }

    /// Connections that may follow `connection` directly.
    pub fn successors(&self, connection: &Connection) -> &[ConnectionId] {
        self.outgoing(connection.end().as_str())
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Bounding box of all positioned nodes; `None` for an empty network.
    pub fn bounding_box(&self) -> Option<GeoRect> {
        self.bounds
    }

    /// Nearest positioned node to `point`.
    pub fn closest_node(&self, point: GeoPoint) -> Option<&Node> {
        self.node_idx
            .nearest_neighbor(&[point.lat, point.lon])
            .and_then(|e| self.nodes.get(&e.id))
    }

    /// Nearest positioned node to `point` satisfying `filter`.
    pub fn closest_node_where<F>(&self, point: GeoPoint, mut filter: F) -> Option<&Node>
    where
        F: FnMut(&Node) -> bool,
    {
        self.node_idx
            .nearest_neighbor_iter(&[point.lat, point.lon])
            .filter_map(|e| self.nodes.get(&e.id))
            .find(|n| filter(*n))
    }

    /// All segments at the minimal distance to `point` (several when the
    /// point is equidistant, e.g. on a shared node or on a two-way road).
    pub fn closest_edges(&self, point: GeoPoint) -> Vec<EdgeHit> {
        let query = [point.lat, point.lon];
        let mut iter = self.edge_idx.nearest_neighbor_iter_with_distance_2(&query);
        let Some((first, best)) = iter.next() else {
            return Vec::new();
        };
        let tolerance = best.max(1e-18) * 1e-9;

        let mut hits = vec![self.edge_hit(first)];
        hits.extend(
            iter.take_while(|(_, d)| *d <= best + tolerance)
                .map(|(e, _)| self.edge_hit(e)),
        );
        hits
    }

    /// Nearest segment whose direction of travel deviates at most
    /// `tolerance_deg` from `heading_deg`.  Falls back to the nearest segment
    /// overall if none of the nearby candidates is aligned.
    pub fn closest_edge_with_heading(
        &self,
        point:         GeoPoint,
        heading_deg:   f64,
        tolerance_deg: f64,
    ) -> Option<EdgeHit> {
        let query = [point.lat, point.lon];
        let mut nearest = None;
        for entry in self.edge_idx.nearest_neighbor_iter(&query).take(HEADING_SEARCH_CANDIDATES) {
            if nearest.is_none() {
                nearest = Some(entry);
            }
            let a = GeoPoint::new(entry.a[0], entry.a[1]);
            let b = GeoPoint::new(entry.b[0], entry.b[1]);
            if heading_difference(a.bearing_deg(b), heading_deg) <= tolerance_deg {
                return Some(self.edge_hit(entry));
            }
        }
        nearest.map(|e| self.edge_hit(e))
    }

    fn edge_hit(&self, entry: &SegmentEntry) -> EdgeHit {
        let con = &self.connections[&entry.connection];
        EdgeHit {
            connection:    entry.connection.clone(),
            previous_node: con.nodes[entry.index].clone(),
            next_node:     con.nodes[entry.index + 1].clone(),
        }
    }
}

/// Absolute angular difference in degrees, `[0, 180]`.
fn heading_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 { 360.0 - d } else { d }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetworkDatabase`] incrementally, then call
/// [`build`](Self::build).
///
/// Nodes and ways must be added before the connections referencing them, and
/// connections before the routes referencing them.
///
/// # Example
///
/// ```
/// use nav_core::GeoPoint;
/// use nav_network::{Node, RoadNetworkBuilder, Way};
///
/// let mut b = RoadNetworkBuilder::new();
/// b.add_node(Node::new("a", GeoPoint::new(52.50, 13.40))).unwrap();
/// b.add_node(Node::new("b", GeoPoint::new(52.51, 13.40))).unwrap();
/// b.add_way(Way::new("w", "primary", 13.9)).unwrap();
/// b.add_connection("w_a_b", "w", &["a", "b"], 1, None).unwrap();
/// let db = b.build();
/// assert_eq!(db.outgoing("a").len(), 1);
/// ```
pub struct RoadNetworkBuilder {
    nodes:       FxHashMap<NodeId, Node>,
    ways:        FxHashMap<WayId, Way>,
    connections: FxHashMap<ConnectionId, Connection>,
    order:       Vec<ConnectionId>,
    routes:      Vec<DbRoute>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:       FxHashMap::default(),
            ways:        FxHashMap::default(),
            connections: FxHashMap::default(),
            order:       Vec::new(),
            routes:      Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> NetworkResult<&mut Self> {
        if self.nodes.contains_key(&node.id) {
            return Err(NetworkError::DuplicateId { kind: "node", id: node.id.to_string() });
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(self)
    }

    pub fn add_way(&mut self, way: Way) -> NetworkResult<&mut Self> {
        if self.ways.contains_key(&way.id) {
            return Err(NetworkError::DuplicateId { kind: "way", id: way.id.to_string() });
        }
        self.ways.insert(way.id.clone(), way);
        Ok(self)
    }

    /// Add a directed connection of `way` through `nodes` (in travel order).
    ///
    /// When `length_m` is `None` the length is the sum of great-circle
    /// distances between consecutive positioned nodes.
    pub fn add_connection(
        &mut self,
        id:       impl Into<ConnectionId>,
        way:      impl Into<WayId>,
        nodes:    &[&str],
        lanes:    u32,
        length_m: Option<f64>,
    ) -> NetworkResult<&mut Self> {
        let id: ConnectionId = id.into();
        let way: WayId = way.into();
        if self.connections.contains_key(&id) {
            return Err(NetworkError::DuplicateId { kind: "connection", id: id.to_string() });
        }
        if nodes.len() < 2 {
            return Err(NetworkError::DegenerateConnection(id));
        }
        if !self.ways.contains_key(&way) {
            return Err(NetworkError::WayNotFound(way));
        }
        let nodes: Vec<NodeId> = nodes.iter().map(|&n| NodeId::from(n)).collect();
        if let Some(missing) = nodes.iter().find(|n| !self.nodes.contains_key(*n)) {
            return Err(NetworkError::NodeNotFound(missing.clone()));
        }

        let length_m = length_m.unwrap_or_else(|| self.polyline_length(&nodes));
        self.order.push(id.clone());
        self.connections.insert(id.clone(), Connection { id, way, nodes, length_m, lanes });
        Ok(self)
    }

    /// Add a scenario route following `connections` in order.
    ///
    /// Every connection expands into one edge per adjacent node pair.
    pub fn add_route(
        &mut self,
        id:          impl Into<RouteId>,
        connections: &[&str],
    ) -> NetworkResult<&mut Self> {
        let id: RouteId = id.into();
        if self.routes.iter().any(|r| r.id == id) {
            return Err(NetworkError::DuplicateId { kind: "route", id: id.to_string() });
        }

        let mut route = DbRoute::new(id);
        let mut last_end: Option<&NodeId> = None;
        for &con_id in connections {
            let con = self
                .connections
                .get(con_id)
                .ok_or_else(|| NetworkError::ConnectionNotFound(ConnectionId::from(con_id)))?;
            if last_end.is_some_and(|end| end != con.start()) {
                return Err(NetworkError::DisjointRoute {
                    route:      route.id.clone(),
                    connection: con.id.clone(),
                });
            }
            for pair in con.nodes.windows(2) {
                route.edges.push(RouteEdge {
                    connection:    con.id.clone(),
                    previous_node: pair[0].clone(),
                    next_node:     pair[1].clone(),
                });
            }
            last_end = Some(con.end());
        }
        self.routes.push(route);
        Ok(self)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn connection_count(&self) -> usize { self.connections.len() }

    fn polyline_length(&self, nodes: &[NodeId]) -> f64 {
        nodes
            .windows(2)
            .filter_map(|p| {
                let a = self.nodes[&p[0]].position?;
                let b = self.nodes[&p[1]].position?;
                Some(a.distance_m(b))
            })
            .sum()
    }

    /// Consume the builder and produce a [`RoadNetworkDatabase`].
    ///
    /// Adjacency lists keep connection insertion order so lookups are
    /// deterministic.
    pub fn build(self) -> RoadNetworkDatabase {
        let mut outgoing: FxHashMap<NodeId, Vec<ConnectionId>> = FxHashMap::default();
        let mut incoming: FxHashMap<NodeId, Vec<ConnectionId>> = FxHashMap::default();
        let mut part_of:  FxHashMap<NodeId, Vec<ConnectionId>> = FxHashMap::default();
        let mut segments = Vec::new();

        for con_id in &self.order {
            let con = &self.connections[con_id];
            let last = con.nodes.len() - 1;
            for (i, node) in con.nodes.iter().enumerate() {
                let list = if node == con.start() {
                    outgoing.entry(node.clone()).or_default()
                } else if node == con.end() {
                    incoming.entry(node.clone()).or_default()
                } else {
                    part_of.entry(node.clone()).or_default()
                };
                if !list.contains(con_id) {
                    list.push(con_id.clone());
                }

                if i < last {
                    let a = self.nodes[node].position;
                    let b = self.nodes[&con.nodes[i + 1]].position;
                    if let (Some(a), Some(b)) = (a, b) {
                        segments.push(SegmentEntry {
                            a:          [a.lat, a.lon],
                            b:          [b.lat, b.lon],
                            connection: con_id.clone(),
                            index:      i,
                        });
                    }
                }
            }
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .values()
            .filter_map(|n| n.position.map(|p| NodeEntry { point: [p.lat, p.lon], id: n.id.clone() }))
            .collect();
        let bounds = GeoRect::enclosing(self.nodes.values().filter_map(|n| n.position));

        RoadNetworkDatabase {
            nodes:       self.nodes,
            ways:        self.ways,
            connections: self.connections,
            routes:      self.routes,
            outgoing,
            incoming,
            part_of,
            node_idx:    RTree::bulk_load(entries),
            edge_idx:    RTree::bulk_load(segments),
            bounds,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
