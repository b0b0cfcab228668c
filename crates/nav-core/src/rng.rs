//! Deterministic simulation-level RNG.
//!
//! The navigation core draws random numbers only when sampling spawn points
//! inside origin/destination circles.  A single seeded `SmallRng` owned by
//! the coordinator keeps those draws reproducible for a given seed and call
//! order.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::GeoCircle;
use crate::GeoPoint;

/// Simulation-level RNG.  Used only in single-threaded contexts.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniformly distributed point inside `circle`.
    #[inline]
    pub fn point_in(&mut self, circle: &GeoCircle) -> GeoPoint {
        circle.random_point(&mut self.0)
    }
}
