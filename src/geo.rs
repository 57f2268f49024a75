//! Great-circle distance and the per-segment walk shared by the statistics
//! engine and the elevation profile builder.
//!
//! Distances are horizontal surface distances on a sphere. Elevation change
//! does not contribute to them; this is a known simplification, not a 3D
//! distance.

use crate::gpx_types::GeoPoint;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers, ignoring elevation.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// One consecutive point pair `(points[i - 1], points[i])`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Index of the segment's end point.
    pub index: usize,
    pub distance_km: f64,
    /// `Some` only when both ends carry an elevation.
    pub elevation_delta_m: Option<f64>,
    /// `Some` only when both ends carry a timestamp.
    pub time_delta_s: Option<f64>,
}

impl Segment {
    fn between(index: usize, from: &GeoPoint, to: &GeoPoint) -> Self {
        Self {
            index,
            distance_km: haversine_km(from, to),
            elevation_delta_m: from.elevation.zip(to.elevation).map(|(a, b)| b - a),
            time_delta_s: from.timestamp.zip(to.timestamp).map(|(a, b)| b - a),
        }
    }

    /// Climb contributed by this segment; zero when descending or unknown.
    pub fn gain_m(&self) -> f64 {
        self.elevation_delta_m.map_or(0.0, |d| d.max(0.0))
    }

    /// Descent contributed by this segment; zero when climbing or unknown.
    pub fn loss_m(&self) -> f64 {
        self.elevation_delta_m.map_or(0.0, |d| (-d).max(0.0))
    }

    /// Instantaneous speed in km/h, `None` without a positive time delta.
    pub fn speed_kmh(&self) -> Option<f64> {
        let hours = self.time_delta_s? / 3600.0;
        (hours > 0.0).then(|| self.distance_km / hours)
    }
}

/// Walk consecutive point pairs in order.
pub fn segments(points: &[GeoPoint]) -> impl Iterator<Item = Segment> + '_ {
    points
        .windows(2)
        .enumerate()
        .map(|(i, pair)| Segment::between(i + 1, &pair[0], &pair[1]))
}
