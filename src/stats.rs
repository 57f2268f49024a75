use serde::{Deserialize, Serialize};

use crate::geo::segments;
use crate::gpx_types::{GeoPoint, Track};

/// `((min_lat, min_lon), (max_lat, max_lon))`. `((0, 0), (0, 0))` for tracks
/// without a meaningful extent (fewer than two points).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    fn of(points: &[GeoPoint]) -> Self {
        points.iter().fold(
            Self {
                min_lat: f64::INFINITY,
                min_lon: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
                max_lon: f64::NEG_INFINITY,
            },
            |bb, p| Self {
                min_lat: bb.min_lat.min(p.latitude),
                min_lon: bb.min_lon.min(p.longitude),
                max_lat: bb.max_lat.max(p.latitude),
                max_lon: bb.max_lon.max(p.longitude),
            },
        )
    }
}

impl From<[[f64; 2]; 2]> for BoundingBox {
    fn from([[min_lat, min_lon], [max_lat, max_lon]]: [[f64; 2]; 2]) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }
}

impl From<BoundingBox> for [[f64; 2]; 2] {
    fn from(bb: BoundingBox) -> Self {
        [[bb.min_lat, bb.min_lon], [bb.max_lat, bb.max_lon]]
    }
}

/// Aggregate metrics of a track, computed once and never updated.
///
/// Distance and speeds are rounded to 2 decimals, elevation and duration to
/// 1 decimal. Accumulation runs at full precision; only the stored values are
/// rounded. The bounding box is not rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackStatistics {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub min_elevation_m: f64,
    pub max_elevation_m: f64,
    pub bounding_box: BoundingBox,
}

impl TrackStatistics {
    pub fn of(track: &Track) -> Self {
        compute_statistics(track.points())
    }
}

/// Reduce a point sequence to its statistics.
///
/// Missing elevations or timestamps only zero the metrics that need them.
/// Average speed is total distance over total duration, not the mean of the
/// per-segment speeds; maximum speed is the fastest single segment.
pub fn compute_statistics(points: &[GeoPoint]) -> TrackStatistics {
    if points.len() < 2 {
        return TrackStatistics::default();
    }

    let mut distance_km = 0.0;
    let mut gain = 0.0;
    let mut loss = 0.0;
    let mut max_speed = 0.0_f64;

    for seg in segments(points) {
        distance_km += seg.distance_km;
        gain += seg.gain_m();
        loss += seg.loss_m();
        if let Some(speed) = seg.speed_kmh() {
            max_speed = max_speed.max(speed);
        }
    }

    let (min_elevation, max_elevation) = points
        .iter()
        .filter_map(|p| p.elevation)
        .fold(None, |acc: Option<(f64, f64)>, e| match acc {
            Some((lo, hi)) => Some((lo.min(e), hi.max(e))),
            None => Some((e, e)),
        })
        .unwrap_or((0.0, 0.0));

    // First and last points that carry a time, wherever they sit in the track.
    let duration_minutes = match time_bounds(points) {
        Some((start, end)) => ((end - start) / 60.0).max(0.0),
        None => 0.0,
    };

    let avg_speed = if duration_minutes > 0.0 {
        distance_km / (duration_minutes / 60.0)
    } else {
        0.0
    };

    TrackStatistics {
        distance_km: round_to(distance_km, 2),
        duration_minutes: round_to(duration_minutes, 1),
        avg_speed_kmh: round_to(avg_speed, 2),
        max_speed_kmh: round_to(max_speed, 2),
        elevation_gain_m: round_to(gain, 1),
        elevation_loss_m: round_to(loss, 1),
        min_elevation_m: round_to(min_elevation, 1),
        max_elevation_m: round_to(max_elevation, 1),
        bounding_box: BoundingBox::of(points),
    }
}

/// Timestamps of the first and last points that carry one, in track order.
/// Untimed points before or after them are ignored.
pub fn time_bounds(points: &[GeoPoint]) -> Option<(f64, f64)> {
    let mut times = points.iter().filter_map(|p| p.timestamp);
    let start = times.next()?;
    Some((start, times.next_back().unwrap_or(start)))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
