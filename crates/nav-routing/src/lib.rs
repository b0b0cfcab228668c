//! `nav-routing`: canonical routes and their coordination across processes.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                      |
//! |------------------|---------------------------------------------------------------|
//! | [`route`]        | `Route`, `VehicleDeparture`, suffix matching                  |
//! | [`cost`]         | `ConnectionCost` policies (`Fastest`, `Shortest`)             |
//! | [`materializer`] | `RouteMaterializer`: node sequence → route, id minting        |
//! | [`registry`]     | `RouteRegistry`: append-only id → route store                 |
//! | [`broadcast`]    | `Broadcast` trait, `NavMessage`, `NoopBroadcast`, `RecordingBroadcast` |
//! | [`fixer`]        | `RouteFixer`: bridges gaps between connections                |
//! | [`coordinator`]  | `RouteCoordinator`: switching, distances, OD routes           |
//! | [`error`]        | `RoutingError`, `BroadcastError`, `RoutingResult<T>`          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on routes and messages.     |

pub mod broadcast;
pub mod coordinator;
pub mod cost;
pub mod error;
pub mod fixer;
pub mod materializer;
pub mod registry;
pub mod route;

#[cfg(test)]
mod tests;

pub use broadcast::{Broadcast, MessageKind, NavMessage, NoopBroadcast, RecordingBroadcast};
pub use coordinator::RouteCoordinator;
pub use cost::{ConnectionCost, Fastest, Shortest};
pub use error::{BroadcastError, RoutingError, RoutingResult};
pub use fixer::RouteFixer;
pub use materializer::{approximate_cost, connection_sequence, flatten, RouteMaterializer};
pub use registry::RouteRegistry;
pub use route::{is_suffix, Route, VehicleDeparture};
