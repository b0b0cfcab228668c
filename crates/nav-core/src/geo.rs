//! Geographic coordinate types and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude: route lengths and distances along
//! a route are sums over many short legs and are compared across processes,
//! so single precision would drift visibly.

use rand::Rng;

/// Mean Earth radius, metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial bearing from `self` towards `other` in degrees, `[0, 360)`,
    /// clockwise from north.
    pub fn bearing_deg(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// Point reached by travelling `distance_m` from `self` along `bearing_deg`.
    pub fn destination(self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());
        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }

    /// Closest point to `self` on the segment `a`–`b`.
    ///
    /// Projection happens in an equirectangular frame centred on `a`, which
    /// is exact enough for road segments of a few hundred metres.
    pub fn closest_point_on_segment(self, a: GeoPoint, b: GeoPoint) -> GeoPoint {
        let k = a.lat.to_radians().cos();
        let (bx, by) = ((b.lon - a.lon) * k, b.lat - a.lat);
        let (px, py) = ((self.lon - a.lon) * k, self.lat - a.lat);

        let len2 = bx * bx + by * by;
        if len2 == 0.0 {
            return a;
        }
        let t = ((px * bx + py * by) / len2).clamp(0.0, 1.0);
        GeoPoint::new(a.lat + t * (b.lat - a.lat), a.lon + t * (b.lon - a.lon))
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── GeoCircle ─────────────────────────────────────────────────────────────────

/// A circular area, used for origin/destination spawning zones.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoCircle {
    pub center:   GeoPoint,
    pub radius_m: f64,
}

impl GeoCircle {
    #[inline]
    pub fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    /// Sample a point uniformly distributed over the circle's area.
    ///
    /// The radial distance uses `r * sqrt(u)` so samples do not cluster at
    /// the centre.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> GeoPoint {
        if self.radius_m <= 0.0 {
            return self.center;
        }
        let bearing  = rng.gen_range(0.0..360.0);
        let distance = self.radius_m * rng.r#gen::<f64>().sqrt();
        self.center.destination(bearing, distance)
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.center.distance_m(p) <= self.radius_m
    }
}

// ── GeoRect ───────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in lat/lon space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoRect {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoRect {
    /// Smallest rectangle enclosing all `points`, or `None` for an empty input.
    pub fn enclosing(points: impl IntoIterator<Item = GeoPoint>) -> Option<GeoRect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut sw, mut ne) = (first, first);
        for p in iter {
            sw.lat = sw.lat.min(p.lat);
            sw.lon = sw.lon.min(p.lon);
            ne.lat = ne.lat.max(p.lat);
            ne.lon = ne.lon.max(p.lon);
        }
        Some(GeoRect { south_west: sw, north_east: ne })
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lon..=self.north_east.lon).contains(&p.lon)
    }
}
