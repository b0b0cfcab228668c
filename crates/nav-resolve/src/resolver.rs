//! `EntityResolver`: memoizing front-end over the resolution functions.

use std::sync::Arc;

use log::trace;
use rustc_hash::FxHashMap;

use nav_core::{ConnectionId, GeoPoint, NodeId};
use nav_network::{Connection, Node, RoadNetworkDatabase};

use crate::descriptor::{ConnectionDescriptor, NodeDescriptor, RoadPosition, RoadPositionDescriptor};
use crate::lazy::{Lazy, LazyConnection, LazyNode};
use crate::resolve;

/// Cache key of a road-position descriptor.  Lane and lateral offset do not
/// influence resolution.
#[derive(Clone, PartialEq, Eq, Hash)]
struct PositionKey {
    connection: Option<ConnectionId>,
    previous:   Option<NodeId>,
    upcoming:   Option<NodeId>,
    offset:     u64,
}

impl PositionKey {
    fn of(d: &RoadPositionDescriptor) -> Self {
        Self {
            connection: d.connection.clone(),
            previous:   d.previous_node.clone(),
            upcoming:   d.upcoming_node.clone(),
            offset:     d.offset_m.to_bits(),
        }
    }
}

#[derive(Clone)]
struct ResolvedPosition {
    connection: Option<ConnectionId>,
    previous:   Option<NodeId>,
    upcoming:   Option<NodeId>,
}

/// Completes descriptors against one database and remembers the answers.
///
/// Caching never touches the database; a resolver can be dropped and
/// recreated at any time.  Node and connection entries stay `Pending` until they
/// resolve, so an unresolvable descriptor is retried on every call.
pub struct EntityResolver {
    db:          Arc<RoadNetworkDatabase>,
    nodes:       FxHashMap<NodeId, LazyNode>,
    connections: FxHashMap<ConnectionDescriptor, LazyConnection>,
    positions:   FxHashMap<PositionKey, ResolvedPosition>,
}

impl EntityResolver {
    pub fn new(db: Arc<RoadNetworkDatabase>) -> Self {
        Self {
            db,
            nodes:       FxHashMap::default(),
            connections: FxHashMap::default(),
            positions:   FxHashMap::default(),
        }
    }

    #[inline]
    pub fn database(&self) -> &RoadNetworkDatabase {
        &self.db
    }

    pub fn node(&mut self, d: &NodeDescriptor) -> Option<&Node> {
        self.nodes
            .entry(d.id.clone())
            .or_insert_with(|| Lazy::Pending(d.clone()))
            .resolve(&self.db)
    }

    pub fn connection(&mut self, d: &ConnectionDescriptor) -> Option<&Connection> {
        lazy_connection(&self.db, &mut self.connections, d)
    }

    pub fn road_position(&mut self, d: &RoadPositionDescriptor) -> RoadPosition {
        let key = PositionKey::of(d);
        let resolved = match self.positions.get(&key) {
            Some(r) => r.clone(),
            None => {
                let lookup = resolve::position_connection(d);
                let connection = lazy_connection(&self.db, &mut self.connections, &lookup);
                let pos = resolve::complete_road_position(&self.db, d, connection);
                let r = ResolvedPosition {
                    connection: pos.connection,
                    previous:   pos.previous_node,
                    upcoming:   pos.upcoming_node,
                };
                self.positions.insert(key, r.clone());
                r
            }
        };
        RoadPosition {
            connection:     resolved.connection,
            previous_node:  resolved.previous,
            upcoming_node:  resolved.upcoming,
            lane_index:     d.lane_index,
            lateral_offset: d.lateral_offset,
            offset_m:       d.offset_m,
        }
    }

    /// Road position on the edge closest to `point`.  With a heading, edges
    /// whose bearing lies within `tolerance_deg` of it are preferred.
    pub fn closest_road_position(
        &self,
        point:         GeoPoint,
        heading_deg:   Option<f64>,
        tolerance_deg: f64,
    ) -> Option<RoadPosition> {
        let hit = match heading_deg {
            Some(h) => self.db.closest_edge_with_heading(point, h, tolerance_deg),
            None => self.db.closest_edges(point).into_iter().next(),
        }?;
        Some(resolve::road_position_on_edge(&self.db, &hit, point))
    }

    /// Number of memoized descriptors.
    pub fn cached(&self) -> usize {
        self.nodes.len() + self.connections.len() + self.positions.len()
    }

    pub fn clear_cache(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.positions.clear();
    }
}

fn lazy_connection<'c>(
    db:    &RoadNetworkDatabase,
    cache: &'c mut FxHashMap<ConnectionDescriptor, LazyConnection>,
    d:     &ConnectionDescriptor,
) -> Option<&'c Connection> {
    let lazy = cache.entry(d.clone()).or_insert_with(|| Lazy::Pending(d.clone()));
    if !lazy.is_resolved() {
        trace!("resolving {d:?}");
    }
    lazy.resolve(db)
}
