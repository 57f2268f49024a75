use std::fmt::Write as _;

use serde::Serialize;

use crate::geo::segments;
use crate::gpx_types::{GeoPoint, Track};
use crate::options::ChartArea;

/// One profile sample per track point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileSample {
    pub distance_km: f64,
    /// Zero where the point has no elevation.
    pub elevation_m: f64,
}

/// A sample mapped into chart coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Cumulative distance vs. elevation, plus the extrema used for axis labels.
///
/// Distances come from the same segment walk as [`crate::stats`], so
/// `total_distance_km` agrees with the unrounded statistics distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationProfile {
    samples: Vec<ProfileSample>,
    min_elevation_m: f64,
    max_elevation_m: f64,
    total_distance_km: f64,
    elevation_range_m: f64,
}

impl ElevationProfile {
    /// `None` when there are fewer than two points: nothing to draw.
    pub fn build(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        if points.len() < 2 {
            return None;
        }

        let mut samples = Vec::with_capacity(points.len());
        samples.push(ProfileSample {
            distance_km: 0.0,
            elevation_m: first.elevation.unwrap_or(0.0),
        });

        let mut total = 0.0;
        for seg in segments(points) {
            total += seg.distance_km;
            samples.push(ProfileSample {
                distance_km: total,
                elevation_m: points[seg.index].elevation.unwrap_or(0.0),
            });
        }

        let min = samples.iter().map(|s| s.elevation_m).fold(f64::INFINITY, f64::min);
        let max = samples.iter().map(|s| s.elevation_m).fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            samples,
            min_elevation_m: min,
            max_elevation_m: max,
            total_distance_km: total,
            elevation_range_m: (max - min).max(1.0),
        })
    }

    pub fn of(track: &Track) -> Option<Self> {
        Self::build(track.points())
    }

    pub fn samples(&self) -> &[ProfileSample] {
        &self.samples
    }

    pub fn min_elevation_m(&self) -> f64 {
        self.min_elevation_m
    }

    pub fn max_elevation_m(&self) -> f64 {
        self.max_elevation_m
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    /// `max - min`, never below 1.
    pub fn elevation_range_m(&self) -> f64 {
        self.elevation_range_m
    }

    /// Map samples linearly into `area`: distance to x from the left padding,
    /// elevation to y upwards from the bottom padding.
    pub fn normalize(&self, area: &ChartArea) -> Vec<PlotPoint> {
        let bottom = area.height - area.padding;
        self.samples
            .iter()
            .map(|s| {
                let along = if self.total_distance_km > 0.0 {
                    s.distance_km / self.total_distance_km
                } else {
                    0.0
                };
                let up = (s.elevation_m - self.min_elevation_m) / self.elevation_range_m;
                PlotPoint {
                    x: area.padding + along * area.plot_width(),
                    y: bottom - up * area.plot_height(),
                }
            })
            .collect()
    }

    /// SVG path data for the profile line: `M x y L x y ...`.
    pub fn svg_line_path(&self, area: &ChartArea) -> String {
        let mut path = String::new();
        for (i, p) in self.normalize(area).iter().enumerate() {
            if i > 0 {
                path.push(' ');
            }
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(path, "{cmd} {} {}", p.x, p.y);
        }
        path
    }

    /// The line path closed along the bottom edge, for an area fill.
    pub fn svg_fill_path(&self, area: &ChartArea) -> String {
        let bottom = area.height - area.padding;
        format!(
            "{} L {} {bottom} L {} {bottom} Z",
            self.svg_line_path(area),
            area.width - area.padding,
            area.padding
        )
    }

    pub fn chart(&self, area: &ChartArea) -> ProfileChart {
        ProfileChart {
            points: self.normalize(area),
            line_path: self.svg_line_path(area),
            fill_path: self.svg_fill_path(area),
        }
    }
}

/// Plot-ready output for a vector chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileChart {
    pub points: Vec<PlotPoint>,
    pub line_path: String,
    pub fill_path: String,
}
