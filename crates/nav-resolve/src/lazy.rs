//! `Lazy<P, R>`: a partially-known descriptor or the entity it resolved to.
//!
//! Resolution is driven by plain functions (see [`crate::resolve`]); the
//! wrapper only remembers the outcome.  A failed resolution leaves the value
//! `Pending`, so a later attempt against the same database can still succeed
//! without the caller tracking anything.

use nav_core::{ConnectionId, GeoPoint, NodeId};
use nav_network::{Connection, Node, RoadNetworkDatabase};

use crate::descriptor::{ConnectionDescriptor, NodeDescriptor};
use crate::resolve;

/// Anything carrying the id used for equality of lazy values.
pub trait Identified {
    type Id: PartialEq;

    /// `None` when the id is not known yet.
    fn id(&self) -> Option<&Self::Id>;
}

/// Descriptor `P` awaiting resolution, or the resolved entity `R`.
#[derive(Clone, Debug)]
pub enum Lazy<P, R> {
    Pending(P),
    Resolved(R),
}

impl<P, R> Lazy<P, R> {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Lazy::Resolved(_))
    }

    /// The resolved entity, without attempting resolution.
    pub fn get(&self) -> Option<&R> {
        match self {
            Lazy::Resolved(r) => Some(r),
            Lazy::Pending(_) => None,
        }
    }

    /// The descriptor, while still pending.
    pub fn descriptor(&self) -> Option<&P> {
        match self {
            Lazy::Pending(p) => Some(p),
            Lazy::Resolved(_) => None,
        }
    }

    /// Resolve with `f` on first access; later calls return the cached entity.
    pub fn resolve_with<F>(&mut self, f: F) -> Option<&R>
    where
        F: FnOnce(&P) -> Option<R>,
    {
        if let Lazy::Pending(p) = self {
            if let Some(r) = f(p) {
                *self = Lazy::Resolved(r);
            }
        }
        self.get()
    }
}

impl<P, R> Lazy<P, R>
where
    P: Identified,
    R: Identified<Id = P::Id>,
{
    pub fn id(&self) -> Option<&P::Id> {
        match self {
            Lazy::Pending(p) => p.id(),
            Lazy::Resolved(r) => r.id(),
        }
    }
}

/// Two lazy values are equal when their ids are, whatever their state.
impl<P, R> PartialEq for Lazy<P, R>
where
    P: Identified,
    R: Identified<Id = P::Id>,
{
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

// ── Identified impls ──────────────────────────────────────────────────────────

impl Identified for NodeDescriptor {
    type Id = NodeId;
    fn id(&self) -> Option<&NodeId> {
        Some(&self.id)
    }
}

impl Identified for Node {
    type Id = NodeId;
    fn id(&self) -> Option<&NodeId> {
        Some(&self.id)
    }
}

impl Identified for ConnectionDescriptor {
    type Id = ConnectionId;
    fn id(&self) -> Option<&ConnectionId> {
        self.id.as_ref()
    }
}

impl Identified for Connection {
    type Id = ConnectionId;
    fn id(&self) -> Option<&ConnectionId> {
        Some(&self.id)
    }
}

// ── Aliases ───────────────────────────────────────────────────────────────────

pub type LazyNode = Lazy<NodeDescriptor, Node>;
pub type LazyConnection = Lazy<ConnectionDescriptor, Connection>;

impl LazyNode {
    pub fn pending(id: impl Into<NodeId>) -> Self {
        Lazy::Pending(NodeDescriptor::new(id))
    }

    pub fn resolve(&mut self, db: &RoadNetworkDatabase) -> Option<&Node> {
        self.resolve_with(|d| resolve::resolve_node(db, d).cloned())
    }

    /// Best known position: the database one once resolved, otherwise
    /// whatever the reporting simulator supplied.
    pub fn position(&self) -> Option<GeoPoint> {
        match self {
            Lazy::Resolved(n) => n.position,
            Lazy::Pending(d) => d.position,
        }
    }
}

impl LazyConnection {
    pub fn resolve(&mut self, db: &RoadNetworkDatabase) -> Option<&Connection> {
        self.resolve_with(|d| resolve::resolve_connection(db, d).cloned())
    }

    /// Start node once resolved, else the descriptor's start if it carries one.
    pub fn start(&self) -> Option<&NodeId> {
        match self {
            Lazy::Resolved(c) => Some(c.start()),
            Lazy::Pending(d) => d.start.as_ref(),
        }
    }

    pub fn end(&self) -> Option<&NodeId> {
        match self {
            Lazy::Resolved(c) => Some(c.end()),
            Lazy::Pending(d) => d.end.as_ref(),
        }
    }

    /// Length in metres; zero while unresolved.
    pub fn length_m(&self) -> f64 {
        self.get().map_or(0.0, |c| c.length_m)
    }
}
