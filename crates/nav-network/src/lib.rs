//! `nav-network`: read-only road-network database, spatial lookups, and the
//! path-finder seam.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`road`]        | `Node`, `Way`, `Connection`, `DbRoute`, `RouteEdge`          |
//! | [`database`]    | `RoadNetworkDatabase` (maps + R-trees), `RoadNetworkBuilder` |
//! | [`path_finder`] | `PathFinder` trait, `CandidateRoute`, `DijkstraPathFinder`   |
//! | [`error`]       | `NetworkError`, `NetworkResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public entity types.    |

pub mod database;
pub mod error;
pub mod path_finder;
pub mod road;


pub use database::{EdgeHit, RoadNetworkBuilder, RoadNetworkDatabase};
pub use error::{NetworkError, NetworkResult};
pub use path_finder::{
    CandidateRoute, DijkstraPathFinder, NoPathFinder, PathFinder, RoutingParameters, RoutingRequest,
    RoutingResponse,
};
pub use road::{Connection, DbRoute, Node, RouteEdge, Way};
