use thiserror::Error;

use nav_core::{CoreError, NodeId, RouteId};
use nav_network::NetworkError;

/// A message could not be handed to the cooperating processes.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast channel closed")]
    Closed,

    #[error("broadcast rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid route: no connection leads from node {from} to node {to}")]
    IllegalRoute { from: NodeId, to: NodeId },

    #[error("route needs at least two nodes")]
    EmptyRoute,

    #[error("route {0} is already registered")]
    DuplicateRoute(RouteId),

    #[error("route {0} is not registered")]
    UnknownRoute(RouteId),

    #[error("node {0} has no position")]
    MissingPosition(NodeId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("path finder returned no route")]
    NoRouteFound,

    #[error("broadcast failed: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
