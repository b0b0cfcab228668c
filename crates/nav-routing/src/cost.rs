//! Tie-break policies for parallel connections.
//!
//! When two connections join the same pair of adjacent nodes the
//! materializer keeps the one with the lowest [`ConnectionCost`].

use nav_core::CostFunction;
use nav_network::{Connection, RoadNetworkDatabase};

pub trait ConnectionCost {
    /// Lower is better.  Infinite for unusable connections.
    fn cost(&self, db: &RoadNetworkDatabase, con: &Connection) -> f64;
}

/// Travel time at the speed limit: `length / max_speed`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Fastest;

impl ConnectionCost for Fastest {
    fn cost(&self, db: &RoadNetworkDatabase, con: &Connection) -> f64 {
        let speed = db.max_speed_ms(con);
        if speed > 0.0 { con.length_m / speed } else { f64::INFINITY }
    }
}

/// Length only.
#[derive(Copy, Clone, Debug, Default)]
pub struct Shortest;

impl ConnectionCost for Shortest {
    fn cost(&self, _db: &RoadNetworkDatabase, con: &Connection) -> f64 {
        con.length_m
    }
}

impl ConnectionCost for CostFunction {
    fn cost(&self, db: &RoadNetworkDatabase, con: &Connection) -> f64 {
        match self {
            CostFunction::Fastest  => Fastest.cost(db, con),
            CostFunction::Shortest => Shortest.cost(db, con),
        }
    }
}
