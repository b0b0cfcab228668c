//! Partially-known entity descriptors as reported by external simulators,
//! and the resolved [`RoadPosition`].

use nav_core::{ConnectionId, GeoPoint, NodeId, WayId};

/// A node known by id, optionally with the position the reporter saw.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDescriptor {
    pub id:       NodeId,
    pub position: Option<GeoPoint>,
}

impl NodeDescriptor {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self { id: id.into(), position: None }
    }

    pub fn with_position(mut self, position: GeoPoint) -> Self {
        self.position = Some(position);
        self
    }
}

/// Whatever is known about a connection.  Any field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionDescriptor {
    pub id:    Option<ConnectionId>,
    pub way:   Option<WayId>,
    pub start: Option<NodeId>,
    pub end:   Option<NodeId>,
}

impl ConnectionDescriptor {
    pub fn with_id(id: impl Into<ConnectionId>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    pub fn between(start: impl Into<NodeId>, end: impl Into<NodeId>) -> Self {
        Self { start: Some(start.into()), end: Some(end.into()), ..Self::default() }
    }

    pub fn on_way(mut self, way: impl Into<WayId>) -> Self {
        self.way = Some(way.into());
        self
    }
}

/// A vehicle position as reported by an external simulator.
///
/// Some reporters only know the connection and an offset, others only the
/// two nodes around the vehicle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadPositionDescriptor {
    pub connection:     Option<ConnectionId>,
    pub previous_node:  Option<NodeId>,
    pub upcoming_node:  Option<NodeId>,
    pub lane_index:     u32,
    pub lateral_offset: f64,
    /// Metres travelled on the connection, measured from its start node.
    pub offset_m:       f64,
}

impl RoadPositionDescriptor {
    pub fn on_connection(connection: impl Into<ConnectionId>, offset_m: f64) -> Self {
        Self { connection: Some(connection.into()), offset_m, ..Self::default() }
    }

    pub fn between(previous: impl Into<NodeId>, upcoming: impl Into<NodeId>) -> Self {
        Self {
            previous_node: Some(previous.into()),
            upcoming_node: Some(upcoming.into()),
            ..Self::default()
        }
    }

    pub fn previous_node(mut self, node: impl Into<NodeId>) -> Self {
        self.previous_node = Some(node.into());
        self
    }

    pub fn upcoming_node(mut self, node: impl Into<NodeId>) -> Self {
        self.upcoming_node = Some(node.into());
        self
    }
}

/// A road position with every field the database could supply filled in.
/// Fields that could not be derived stay `None`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadPosition {
    pub connection:     Option<ConnectionId>,
    pub previous_node:  Option<NodeId>,
    pub upcoming_node:  Option<NodeId>,
    pub lane_index:     u32,
    pub lateral_offset: f64,
    /// Metres from the start node of `connection`.
    pub offset_m:       f64,
}

impl RoadPosition {
    /// Connection and both bracketing nodes are known.
    pub fn is_complete(&self) -> bool {
        self.connection.is_some() && self.previous_node.is_some() && self.upcoming_node.is_some()
    }
}
