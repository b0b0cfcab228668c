//! Navigation configuration.
//!
//! Typically deserialized from the application's scenario configuration by
//! the embedding process (with the `serde` feature) and handed to the route
//! coordinator at construction.

use crate::{CoreError, CoreResult};

/// Cost function a path finder minimises.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CostFunction {
    /// Minimise travel time (length / max speed).
    #[default]
    Fastest,
    /// Minimise travelled distance.
    Shortest,
}

/// Top-level navigation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Master RNG seed for origin/destination sampling.
    pub seed: u64,

    /// Cost function used for origin/destination route requests.
    pub cost_function: CostFunction,

    /// Alternatives requested (besides the best route) when origin/destination
    /// routes are created.  Only the best route is used; alternatives are
    /// there for callers of `find_routes`.
    pub alternative_routes: usize,

    /// Maximum deviation in degrees between a requested heading and an edge
    /// bearing for heading-aware road snapping.
    pub heading_tolerance_deg: f64,

    /// How many connections deep the route fixer searches for a bridge
    /// between two non-adjacent connections.
    pub route_fixer_max_depth: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            seed:                  0,
            cost_function:         CostFunction::Fastest,
            alternative_routes:    0,
            heading_tolerance_deg: 45.0,
            route_fixer_max_depth: 4,
        }
    }
}

impl NavConfig {
    /// Reject values that would make the coordinator misbehave silently.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=180.0).contains(&self.heading_tolerance_deg) {
            return Err(CoreError::Config(format!(
                "heading_tolerance_deg must be within [0, 180], got {}",
                self.heading_tolerance_deg
            )));
        }
        if self.route_fixer_max_depth == 0 {
            return Err(CoreError::Config(
                "route_fixer_max_depth must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}
