//! Simulation time.
//!
//! Time stamps are exchanged with the other simulation processes as integer
//! nanoseconds since simulation start, so all arithmetic stays exact.

use std::fmt;

/// An absolute simulation time in nanoseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub const NANOSECOND:  u64 = 1;
    pub const MILLISECOND: u64 = 1_000_000;
    pub const SECOND:      u64 = 1_000_000_000;

    #[inline]
    pub fn from_secs(secs: u64) -> Self {
        SimTime(secs * Self::SECOND)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / Self::SECOND as f64
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}
