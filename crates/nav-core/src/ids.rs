//! Strongly typed identifier wrappers.
//!
//! Every entity crossing a process boundary in the co-simulation is keyed by
//! an opaque string (SUMO edge names, OSM node ids, route numbers …), so the
//! wrappers hold a `String` rather than a dense integer index.  They are
//! `Ord + Hash` for use as map keys and implement `Borrow<str>` so maps keyed
//! by an id can be queried with a plain `&str`.

use std::borrow::Borrow;
use std::fmt;

/// Generate a typed id wrapper around an owned string.
macro_rules! string_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(String);

        impl $name {
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Id of a road-network node (intersection or shape point).
    pub struct NodeId;
}

string_id! {
    /// Id of a way, the typed road entity that owns one or more connections.
    pub struct WayId;
}

string_id! {
    /// Id of a directed connection.  Database connections follow the
    /// `<way>_<start-node>_<end-node>` naming scheme.
    pub struct ConnectionId;
}

string_id! {
    /// Id of a canonical, cross-process route.  Minted routes use decimal
    /// integers; bulk-loaded routes may use any string.
    pub struct RouteId;
}

string_id! {
    /// Name of a simulated vehicle.
    pub struct VehicleId;
}

impl ConnectionId {
    /// Compose the database id of the connection of `way` from `start` to `end`.
    pub fn compose(way: &WayId, start: &NodeId, end: &NodeId) -> Self {
        Self(format!("{way}_{start}_{end}"))
    }
}

impl RouteId {
    #[inline]
    pub fn from_number(n: u64) -> Self {
        Self(n.to_string())
    }

    /// Numeric value of the id, or `None` unless the id is a plain run of
    /// ASCII digits that fits in a `u64`.
    pub fn as_number(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}
