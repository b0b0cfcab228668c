//! Canonical routes and the suffix-match policy.

use nav_core::{ConnectionId, NodeId, RouteId, SimTime};

/// A registered, cross-process route.  Immutable once created.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub id:             RouteId,
    /// Connections in travel order, each traversal listed once.
    pub connection_ids: Vec<ConnectionId>,
    /// Every node passed, shape nodes included.
    pub node_ids:       Vec<NodeId>,
    pub length_m:       f64,
}

impl Route {
    /// Whether `connections` is a trailing part of this route.
    #[inline]
    pub fn ends_with(&self, connections: &[ConnectionId]) -> bool {
        is_suffix(connections, &self.connection_ids)
    }

    pub fn first_node(&self) -> Option<&NodeId> {
        self.node_ids.first()
    }

    pub fn last_node(&self) -> Option<&NodeId> {
        self.node_ids.last()
    }

    /// Index of the first occurrence of `node`.
    pub fn index_of_node(&self, node: &str) -> Option<usize> {
        self.node_ids.iter().position(|n| n.as_str() == node)
    }
}

/// `a` is a suffix of `b`: no longer than `b` and equal to its last
/// `a.len()` elements.  The empty sequence is a suffix of everything.
pub fn is_suffix(a: &[ConnectionId], b: &[ConnectionId]) -> bool {
    a.len() <= b.len() && a.iter().rev().zip(b.iter().rev()).all(|(x, y)| x == y)
}

/// What a vehicle needs to enter the simulation on a route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleDeparture {
    pub route_id: RouteId,
    pub time:     SimTime,
}
