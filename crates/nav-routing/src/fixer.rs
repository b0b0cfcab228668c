//! Repair of routes with gaps between consecutive connections.
//!
//! External route files sometimes skip connections (a short internal
//! junction connection, say).  The fixer bridges every gap with the shortest
//! chain of connections it finds within a bounded depth.

use log::{debug, error};

use nav_core::ConnectionId;
use nav_network::{Connection, RoadNetworkDatabase};

pub const DEFAULT_MAX_DEPTH: usize = 4;

pub struct RouteFixer {
    max_depth: usize,
}

impl Default for RouteFixer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl RouteFixer {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// `route` with every gap bridged.  When a connection is unknown or a
    /// gap cannot be bridged the input is returned unchanged.
    pub fn fix_route(&self, db: &RoadNetworkDatabase, route: &[ConnectionId]) -> Vec<ConnectionId> {
        match self.try_fix(db, route) {
            Ok(fixed) => fixed,
            Err(reason) => {
                error!("could not fix route [{}]: {reason}", join(route));
                route.to_vec()
            }
        }
    }

    fn try_fix(&self, db: &RoadNetworkDatabase, route: &[ConnectionId]) -> Result<Vec<ConnectionId>, String> {
        let mut fixed: Vec<ConnectionId> = Vec::with_capacity(route.len());
        let mut prev: Option<&Connection> = None;
        for id in route {
            let cur = db.connection(id.as_str()).ok_or_else(|| format!("unknown connection {id}"))?;
            match prev {
                Some(p) if p.end() != cur.start() => {
                    let bridge = self
                        .bridge(db, p, cur, self.max_depth)
                        .ok_or_else(|| format!("no connection chain from {} to {}", p.id, cur.id))?;
                    debug!("bridged {} -> {} with {} connection(s)", p.id, cur.id, bridge.len().saturating_sub(1));
                    fixed.extend(bridge.into_iter().map(|c| c.id.clone()));
                }
                _ => fixed.push(cur.id.clone()),
            }
            prev = Some(cur);
        }
        Ok(fixed)
    }

    /// Shortest chain of connections following `from` and ending with `to`
    /// (inclusive), at most `depth` connections long.
    fn bridge<'db>(
        &self,
        db:    &'db RoadNetworkDatabase,
        from:  &'db Connection,
        to:    &'db Connection,
        depth: usize,
    ) -> Option<Vec<&'db Connection>> {
        if depth == 0 {
            return None;
        }
        if from.id == to.id {
            return Some(Vec::new());
        }

        let mut shortest: Option<(f64, Vec<&'db Connection>)> = None;
        for next in db.successors(from).iter().filter_map(|id| db.connection(id.as_str())) {
            let Some(mut tail) = self.bridge(db, next, to, depth - 1) else { continue };
            tail.insert(0, next);
            let length: f64 = tail.iter().map(|c| c.length_m).sum();
            if shortest.as_ref().is_none_or(|(best, _)| length < *best) {
                shortest = Some((length, tail));
            }
        }
        shortest.map(|(_, chain)| chain)
    }
}

fn join(route: &[ConnectionId]) -> String {
    route.iter().map(ConnectionId::as_str).collect::<Vec<_>>().join(" ")
}
