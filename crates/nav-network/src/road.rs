//! Immutable road-network entities.
//!
//! Entities are created once by [`RoadNetworkBuilder`](crate::RoadNetworkBuilder)
//! and never change afterwards.  Cross references are by id; resolve them
//! through the owning [`RoadNetworkDatabase`](crate::RoadNetworkDatabase).

use nav_core::{ConnectionId, GeoPoint, NodeId, RouteId, WayId};

/// A point in the road graph: an intersection or a shape point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:                NodeId,
    pub position:          Option<GeoPoint>,
    pub has_traffic_light: bool,
    pub is_intersection:   bool,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, position: GeoPoint) -> Self {
        Self {
            id:                id.into(),
            position:          Some(position),
            has_traffic_light: false,
            is_intersection:   false,
        }
    }

    pub fn with_traffic_light(mut self) -> Self {
        self.has_traffic_light = true;
        self
    }

    pub fn with_intersection(mut self) -> Self {
        self.is_intersection = true;
        self
    }
}

/// A typed road entity owning one or more connections.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Way {
    pub id:           WayId,
    pub road_type:    String,
    /// Speed limit in metres per second.
    pub max_speed_ms: f64,
}

impl Way {
    pub fn new(id: impl Into<WayId>, road_type: impl Into<String>, max_speed_ms: f64) -> Self {
        Self { id: id.into(), road_type: road_type.into(), max_speed_ms }
    }
}

/// A directed edge of the road graph.
///
/// `nodes` holds the full ordered node list: start node, any shape nodes the
/// connection passes, end node.  The builder guarantees at least two entries.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub id:       ConnectionId,
    pub way:      WayId,
    pub nodes:    Vec<NodeId>,
    pub length_m: f64,
    pub lanes:    u32,
}

impl Connection {
    #[inline]
    pub fn start(&self) -> &NodeId {
        &self.nodes[0]
    }

    #[inline]
    pub fn end(&self) -> &NodeId {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Position of `node` in the ordered node list (first occurrence).
    pub fn index_of(&self, node: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n == node)
    }

    /// Node following `node` on this connection.
    pub fn node_after(&self, node: &NodeId) -> Option<&NodeId> {
        self.index_of(node).and_then(|i| self.nodes.get(i + 1))
    }

    /// Node preceding `node` on this connection.
    pub fn node_before(&self, node: &NodeId) -> Option<&NodeId> {
        match self.index_of(node) {
            Some(i) if i > 0 => self.nodes.get(i - 1),
            _ => None,
        }
    }
}

/// One step of a database route: traversal of `connection` between two
/// adjacent nodes of its node list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteEdge {
    pub connection:    ConnectionId,
    pub previous_node: NodeId,
    pub next_node:     NodeId,
}

/// A route as stored in the database: an id plus its edge sequence.
///
/// A connection with shape nodes contributes one edge per node pair, so the
/// same connection id appears on consecutive edges.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbRoute {
    pub id:    RouteId,
    pub edges: Vec<RouteEdge>,
}

impl DbRoute {
    pub fn new(id: RouteId) -> Self {
        Self { id, edges: Vec::new() }
    }
}
