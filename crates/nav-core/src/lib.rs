//! `nav-core`: foundational types for the co-simulation navigation core.
//!
//! This crate is a dependency of every other `nav-*` crate.  It has no
//! `nav-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `WayId`, `ConnectionId`, `RouteId`, `VehicleId` |
//! | [`geo`]         | `GeoPoint`, `GeoCircle`, `GeoRect`                        |
//! | [`time`]        | `SimTime`                                                 |
//! | [`rng`]         | `SimRng`                                                  |
//! | [`config`]      | `NavConfig`, `CostFunction`                               |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CostFunction, NavConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoCircle, GeoPoint, GeoRect};
pub use ids::{ConnectionId, NodeId, RouteId, VehicleId, WayId};
pub use rng::SimRng;
pub use time::SimTime;
