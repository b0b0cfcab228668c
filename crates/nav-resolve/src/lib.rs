//! `nav-resolve`: lazy completion of partially-known entities.
//!
//! External simulators report what they know: a SUMO-like simulator names
//! the connection and an offset, a driving simulator names the two nodes
//! around the vehicle.  This crate fills in the rest from the
//! [`RoadNetworkDatabase`](nav_network::RoadNetworkDatabase).
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`lazy`]       | `Lazy<P, R>`, `LazyNode`, `LazyConnection`, `Identified`    |
//! | [`descriptor`] | node / connection / road-position descriptors, `RoadPosition` |
//! | [`resolve`]    | pure resolution functions                                   |
//! | [`resolver`]   | `EntityResolver` with memo caches                           |
//!
//! Unresolvable input never errors; missing fields simply stay `None`.

pub mod descriptor;
pub mod lazy;
pub mod resolve;
pub mod resolver;


pub use descriptor::{ConnectionDescriptor, NodeDescriptor, RoadPosition, RoadPositionDescriptor};
pub use lazy::{Identified, Lazy, LazyConnection, LazyNode};
pub use resolver::EntityResolver;
