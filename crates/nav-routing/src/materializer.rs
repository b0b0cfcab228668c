//! Turns node sequences and database routes into canonical [`Route`]s.
//!
//! # Id allocation
//!
//! Minted route ids are decimal integers.  The counter starts one above the
//! largest numeric id among the database routes (non-numeric ids are
//! ignored, an empty database starts at 1) and only ever moves forward.

use log::{debug, warn};

use nav_core::{ConnectionId, NodeId, RouteId};
use nav_network::{CandidateRoute, DbRoute, RoadNetworkDatabase, RouteEdge};

use crate::cost::{ConnectionCost, Fastest};
use crate::{Route, RoutingError, RoutingResult};

pub struct RouteMaterializer<C: ConnectionCost = Fastest> {
    next_id: u64,
    cost:    C,
}

impl RouteMaterializer<Fastest> {
    pub fn new(db: &RoadNetworkDatabase) -> Self {
        Self::with_cost(db, Fastest)
    }
}

impl<C: ConnectionCost> RouteMaterializer<C> {
    pub fn with_cost(db: &RoadNetworkDatabase, cost: C) -> Self {
        let max = db.routes().iter().filter_map(|r| r.id.as_number()).max().unwrap_or(0);
        Self { next_id: max.saturating_add(1), cost }
    }

    /// Replace the tie-break policy, keeping the id counter.
    pub fn into_cost<C2: ConnectionCost>(self, cost: C2) -> RouteMaterializer<C2> {
        RouteMaterializer { next_id: self.next_id, cost }
    }

    /// The id the next materialized route will receive.
    #[inline]
    pub fn peek_id(&self) -> RouteId {
        RouteId::from_number(self.next_id)
    }

    /// The counter saturates at `u64::MAX`; registering the repeated id then
    /// fails as a duplicate.
    fn mint_id(&mut self) -> RouteId {
        let id = RouteId::from_number(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Edges through `node_ids`, without minting an id.
    ///
    /// Each adjacent pair must be joined by a connection leaving the first
    /// node with the second node directly after it.  Parallel candidates are
    /// ranked by the cost policy.
    pub fn edges_through(&self, db: &RoadNetworkDatabase, node_ids: &[NodeId]) -> RoutingResult<Vec<RouteEdge>> {
        if node_ids.len() < 2 {
            return Err(RoutingError::EmptyRoute);
        }

        let mut edges = Vec::with_capacity(node_ids.len() - 1);
        for pair in node_ids.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let con = db
                .leaving(prev.as_str())
                .iter()
                .filter_map(|id| db.connection(id.as_str()))
                .filter(|con| con.node_after(prev) == Some(cur))
                .min_by(|a, b| self.cost.cost(db, a).total_cmp(&self.cost.cost(db, b)))
                .ok_or_else(|| RoutingError::IllegalRoute { from: prev.clone(), to: cur.clone() })?;
            edges.push(RouteEdge {
                connection:    con.id.clone(),
                previous_node: prev.clone(),
                next_node:     cur.clone(),
            });
        }
        Ok(edges)
    }

    /// Edges of a path-finder candidate.  Candidates without node ids are
    /// expanded from their connections.
    pub fn candidate_edges(&self, db: &RoadNetworkDatabase, candidate: &CandidateRoute) -> RoutingResult<Vec<RouteEdge>> {
        if candidate.node_ids.is_empty() {
            let expanded = CandidateRoute::from_connections(db, candidate.connection_ids.clone());
            self.edges_through(db, &expanded.node_ids)
        } else {
            self.edges_through(db, &candidate.node_ids)
        }
    }

    /// Give `edges` the next route id.
    pub fn mint(&mut self, edges: Vec<RouteEdge>) -> DbRoute {
        let route = DbRoute { id: self.mint_id(), edges };
        debug!("materialized route {} with {} edges", route.id, route.edges.len());
        route
    }

    /// Build a database route through `node_ids`.  A new id is minted only
    /// on success.
    pub fn materialize(&mut self, db: &RoadNetworkDatabase, node_ids: &[NodeId]) -> RoutingResult<DbRoute> {
        let edges = self.edges_through(db, node_ids)?;
        Ok(self.mint(edges))
    }

    /// Materialize a path-finder candidate into a canonical route.
    pub fn create_route(&mut self, db: &RoadNetworkDatabase, candidate: &CandidateRoute) -> RoutingResult<Route> {
        let edges = self.candidate_edges(db, candidate)?;
        Ok(flatten(db, &self.mint(edges)))
    }

    /// All database routes as canonical routes, in load order.
    pub fn routes_from_database(&self, db: &RoadNetworkDatabase) -> Vec<Route> {
        db.routes().iter().map(|r| flatten(db, r)).collect()
    }
}

/// Connection ids traversed by `edges`; consecutive edges on the same
/// connection count once.
pub fn connection_sequence(edges: &[RouteEdge]) -> Vec<ConnectionId> {
    let mut connection_ids: Vec<ConnectionId> = Vec::new();
    for edge in edges {
        if connection_ids.last() != Some(&edge.connection) {
            connection_ids.push(edge.connection.clone());
        }
    }
    connection_ids
}

/// Collapse a database route into a [`Route`]: consecutive edges on the same
/// connection count as one traversal.
pub fn flatten(db: &RoadNetworkDatabase, route: &DbRoute) -> Route {
    let connection_ids = connection_sequence(&route.edges);
    let length_m = connection_ids
        .iter()
        .filter_map(|id| match db.connection(id.as_str()) {
            Some(con) => Some(con.length_m),
            None => {
                warn!("route {} uses unknown connection {id}", route.id);
                None
            }
        })
        .sum();

    let mut node_ids: Vec<NodeId> = Vec::with_capacity(route.edges.len() + 1);
    if let Some(first) = route.edges.first() {
        node_ids.push(first.previous_node.clone());
    }
    node_ids.extend(route.edges.iter().map(|e| e.next_node.clone()));

    Route { id: route.id.clone(), connection_ids, node_ids, length_m }
}

/// Recompute length and travel time of `candidate` from the database.
/// Unknown connections contribute nothing.
pub fn approximate_cost(db: &RoadNetworkDatabase, candidate: &CandidateRoute) -> CandidateRoute {
    let mut length_m = 0.0;
    let mut time_s = 0.0;
    for id in &candidate.connection_ids {
        let Some(con) = db.connection(id.as_str()) else {
            warn!("cannot cost unknown connection {id}");
            continue;
        };
        length_m += con.length_m;
        time_s += Fastest.cost(db, con);
    }
    CandidateRoute {
        connection_ids: candidate.connection_ids.clone(),
        node_ids:       candidate.node_ids.clone(),
        length_m,
        time_s,
    }
}
