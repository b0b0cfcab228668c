//! Network-layer error type.

use thiserror::Error;

use nav_core::{ConnectionId, NodeId, RouteId, WayId};

/// Errors produced while building or querying the road-network database.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("way {0} not found in network")]
    WayNotFound(WayId),

    #[error("connection {0} not found in network")]
    ConnectionNotFound(ConnectionId),

    #[error("connection {0} needs at least two nodes")]
    DegenerateConnection(ConnectionId),

    #[error("route {route} cannot follow connection {connection}: it does not start where the previous one ended")]
    DisjointRoute { route: RouteId, connection: ConnectionId },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
