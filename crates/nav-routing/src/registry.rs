//! Append-only store of canonical routes.

use rustc_hash::{FxHashMap, FxHashSet};

use nav_core::{ConnectionId, RouteId};

use crate::{Route, RoutingError, RoutingResult};

/// Id → [`Route`] map, iterated in registration order.
///
/// Routes are never removed or replaced; registering a known id is an error.
#[derive(Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    index:  FxHashMap<RouteId, usize>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, route: Route) -> RoutingResult<()> {
        if self.index.contains_key(&route.id) {
            return Err(RoutingError::DuplicateRoute(route.id));
        }
        self.index.insert(route.id.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    /// Register all of `routes` or, if any id is taken (or repeated within
    /// the batch), none of them.
    pub fn register_bulk(&mut self, routes: Vec<Route>) -> RoutingResult<()> {
        let mut seen = FxHashSet::default();
        for r in &routes {
            if self.index.contains_key(&r.id) || !seen.insert(&r.id) {
                return Err(RoutingError::DuplicateRoute(r.id.clone()));
            }
        }
        for route in routes {
            self.index.insert(route.id.clone(), self.routes.len());
            self.routes.push(route);
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Route> {
        self.index.get(id).map(|&i| &self.routes[i])
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// First registered route ending with `connections`.
    pub fn find_suffix_match(&self, connections: &[ConnectionId]) -> Option<&Route> {
        self.routes.iter().find(|r| r.ends_with(connections))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> + '_ {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
