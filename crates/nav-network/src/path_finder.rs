//! Path-finder seam and the default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The route coordinator consumes path finding through the [`PathFinder`]
//! trait only: "given a request, return ranked candidate paths".  Embedding
//! processes plug in their own engine (contraction hierarchies, an external
//! routing service, …).  [`DijkstraPathFinder`] is a self-contained
//! reference implementation over the database graph and [`NoPathFinder`]
//! disables routing altogether.
//!
//! # Cost units
//!
//! Dijkstra costs are integers: milliseconds for
//! [`CostFunction::Fastest`], millimetres for [`CostFunction::Shortest`].
//! Candidates expose `length_m` and `time_s` as floats.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use nav_core::{ConnectionId, CostFunction, GeoPoint, NodeId};

use crate::road::Connection;
use crate::RoadNetworkDatabase;

/// Cost multiplier applied to connections of already found paths when
/// searching for alternatives.
const ALTERNATIVE_PENALTY: f64 = 2.0;

// ── Request / response types ──────────────────────────────────────────────────

/// Search parameters.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RoutingParameters {
    /// Alternatives requested in addition to the best path.
    pub alternatives:  usize,
    pub cost_function: CostFunction,
}

impl RoutingParameters {
    pub fn alternatives(mut self, n: usize) -> Self {
        self.alternatives = n;
        self
    }

    pub fn cost_function(mut self, f: CostFunction) -> Self {
        self.cost_function = f;
        self
    }
}

/// A routing query between two geographic positions.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutingRequest {
    pub source: GeoPoint,
    pub target: GeoPoint,
    pub params: RoutingParameters,
}

impl RoutingRequest {
    pub fn new(source: GeoPoint, target: GeoPoint, params: RoutingParameters) -> Self {
        Self { source, target, params }
    }
}

/// An unregistered route proposal.  Carries no id.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateRoute {
    /// Connections in travel order.
    pub connection_ids: Vec<ConnectionId>,
    /// Every node passed, shape nodes included, in travel order.
    pub node_ids:       Vec<NodeId>,
    pub length_m:       f64,
    pub time_s:         f64,
}

impl CandidateRoute {
    /// Build a candidate from a connection sequence, deriving node ids,
    /// length and time from the database.  Unknown connections are skipped.
    pub fn from_connections(db: &RoadNetworkDatabase, connection_ids: Vec<ConnectionId>) -> Self {
        let mut node_ids: Vec<NodeId> = Vec::new();
        let mut length_m = 0.0;
        let mut time_s = 0.0;
        for con in connection_ids.iter().filter_map(|id| db.connection(id.as_str())) {
            let skip = usize::from(node_ids.last() == Some(con.start()));
            node_ids.extend(con.nodes.iter().skip(skip).cloned());
            length_m += con.length_m;
            time_s += travel_time_s(db, con);
        }
        Self { connection_ids, node_ids, length_m, time_s }
    }
}

/// Ranked search result: the best candidate plus alternatives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutingResponse {
    pub best:         Option<CandidateRoute>,
    pub alternatives: Vec<CandidateRoute>,
}

impl RoutingResponse {
    /// Split a ranked candidate list into best + alternatives.
    pub fn from_ranked(mut ranked: Vec<CandidateRoute>) -> Self {
        if ranked.is_empty() {
            return Self::default();
        }
        let best = ranked.remove(0);
        Self { best: Some(best), alternatives: ranked }
    }
}

// ── PathFinder trait ──────────────────────────────────────────────────────────

/// Pluggable path-finding engine.
pub trait PathFinder {
    /// Ranked candidate paths for `request`, best first.  An empty vector
    /// means no path exists.
    fn find_routes(&self, db: &RoadNetworkDatabase, request: &RoutingRequest) -> Vec<CandidateRoute>;
}

/// A [`PathFinder`] that never finds anything.  Use when the scenario runs
/// without navigation.
pub struct NoPathFinder;

impl PathFinder for NoPathFinder {
    fn find_routes(&self, _db: &RoadNetworkDatabase, _request: &RoutingRequest) -> Vec<CandidateRoute> {
        Vec::new()
    }
}

// ── DijkstraPathFinder ────────────────────────────────────────────────────────

/// Dijkstra over the connection graph.
///
/// The source is snapped to the closest node starting a connection, the
/// target to the closest node ending one.  Alternatives are produced with a
/// penalty method: every connection of an already returned path has its cost
/// multiplied before the next search, and duplicates are discarded.
pub struct DijkstraPathFinder;

impl PathFinder for DijkstraPathFinder {
    fn find_routes(&self, db: &RoadNetworkDatabase, request: &RoutingRequest) -> Vec<CandidateRoute> {
        let Some(from) = db.closest_node_where(request.source, |n| !db.outgoing(n.id.as_str()).is_empty()) else {
            return Vec::new();
        };
        let Some(to) = db.closest_node_where(request.target, |n| !db.incoming(n.id.as_str()).is_empty()) else {
            return Vec::new();
        };
        if from.id == to.id {
            return Vec::new();
        }

        let wanted = request.params.alternatives + 1;
        let mut penalties: FxHashMap<ConnectionId, f64> = FxHashMap::default();
        let mut results: Vec<CandidateRoute> = Vec::with_capacity(wanted);

        // A few extra attempts: penalised searches may rediscover a known path.
        for _ in 0..wanted * 2 {
            let Some(path) = dijkstra(db, &from.id, &to.id, request.params.cost_function, &penalties) else {
                break;
            };
            for id in &path {
                *penalties.entry(id.clone()).or_insert(1.0) *= ALTERNATIVE_PENALTY;
            }
            if results.iter().all(|r| r.connection_ids != path) {
                results.push(CandidateRoute::from_connections(db, path));
                if results.len() == wanted {
                    break;
                }
            }
        }
        results
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[inline]
fn travel_time_s(db: &RoadNetworkDatabase, con: &Connection) -> f64 {
    let speed = db.max_speed_ms(con);
    if speed > 0.0 { con.length_m / speed } else { f64::INFINITY }
}

/// Integer edge cost for the given cost function.
#[inline]
fn edge_cost(db: &RoadNetworkDatabase, con: &Connection, f: CostFunction, penalty: f64) -> u64 {
    let raw = match f {
        CostFunction::Fastest  => travel_time_s(db, con) * 1_000.0,
        CostFunction::Shortest => con.length_m * 1_000.0,
    };
    // Saturating float→int cast maps an infinite cost to u64::MAX.
    (raw * penalty).round() as u64
}

fn dijkstra(
    db:        &RoadNetworkDatabase,
    from:      &NodeId,
    to:        &NodeId,
    f:         CostFunction,
    penalties: &FxHashMap<ConnectionId, f64>,
) -> Option<Vec<ConnectionId>> {
    let mut dist: FxHashMap<NodeId, u64> = FxHashMap::default();
    let mut prev: FxHashMap<NodeId, ConnectionId> = FxHashMap::default();

    dist.insert(from.clone(), 0);

    // Min-heap via Reverse; the NodeId secondary key makes ties deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from.clone())));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if &node == to {
            return Some(reconstruct(db, &prev, to));
        }
        if dist.get(&node).is_some_and(|&d| cost > d) {
            continue;
        }

        for con_id in db.outgoing(node.as_str()) {
            let Some(con) = db.connection(con_id.as_str()) else { continue };
            let penalty = penalties.get(con_id).copied().unwrap_or(1.0);
            let new_cost = cost.saturating_add(edge_cost(db, con, f, penalty));
            let neighbor = con.end();

            if dist.get(neighbor).is_none_or(|&d| new_cost < d) {
                dist.insert(neighbor.clone(), new_cost);
                prev.insert(neighbor.clone(), con_id.clone());
                heap.push(Reverse((new_cost, neighbor.clone())));
            }
        }
    }
    None
}

fn reconstruct(
    db:   &RoadNetworkDatabase,
    prev: &FxHashMap<NodeId, ConnectionId>,
    to:   &NodeId,
) -> Vec<ConnectionId> {
    let mut path = Vec::new();
    let mut cur = to;
    while let Some(con_id) = prev.get(cur) {
        path.push(con_id.clone());
        match db.connection(con_id.as_str()) {
            Some(con) => cur = con.start(),
            None => break,
        }
    }
    path.reverse();
    path
}
