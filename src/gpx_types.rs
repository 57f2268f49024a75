use serde::{Deserialize, Serialize};

/// A single sample along a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    /// Meters. Many GPX sources omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    /// Seconds since the Unix epoch, fractional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            elevation: None,
            timestamp: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Whether latitude and longitude lie inside their valid degree ranges.
    /// The parser does not enforce this; corrupt files pass through as-is.
    pub fn is_in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// Where a track came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    Garmin,
    #[default]
    GpxImport,
    Manual,
}

/// An ordered, immutable point sequence plus display metadata owned by the
/// surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default)]
    source: TrackSource,
    points: Vec<GeoPoint>,
}

impl Track {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            name: None,
            description: None,
            color: None,
            source: TrackSource::default(),
            points,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_source(mut self, source: TrackSource) -> Self {
        self.source = source;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn source(&self) -> TrackSource {
        self.source
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Parsed GPX document: every track, route and waypoint it contains.
#[derive(Debug, Default)]
pub struct GpxData {
    /// `<metadata><name>`, if present.
    pub name: Option<String>,
    pub waypoints: Vec<GeoPoint>,
    pub routes: Vec<GpxRoute>,
    pub tracks: Vec<GpxTrack>,
}

/// A GPX route (<rte>).
#[derive(Debug, Default)]
pub struct GpxRoute {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub points: Vec<GeoPoint>,
}

/// A GPX track (<trk>).
#[derive(Debug, Default)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub segments: Vec<GpxSegment>,
}

impl GpxTrack {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Default)]
pub struct GpxSegment {
    pub points: Vec<GeoPoint>,
}

impl GpxData {
    /// First track with at least one point (segments joined in order), else
    /// the first such route. The document's metadata name is used when the
    /// chosen element has none.
    pub fn first_track(&self) -> Option<Track> {
        let (name, desc, points) = self
            .tracks
            .iter()
            .find(|t| t.point_count() > 0)
            .map(|t| {
                let points = t
                    .segments
                    .iter()
                    .flat_map(|s| s.points.iter().copied())
                    .collect::<Vec<_>>();
                (t.name.clone(), t.desc.clone(), points)
            })
            .or_else(|| {
                self.routes
                    .iter()
                    .find(|r| !r.points.is_empty())
                    .map(|r| (r.name.clone(), r.desc.clone(), r.points.clone()))
            })?;

        let mut track = Track::new(points).with_source(TrackSource::GpxImport);
        if let Some(name) = name.or_else(|| self.name.clone()) {
            track = track.with_name(name);
        }
        if let Some(desc) = desc {
            track = track.with_description(desc);
        }
        Some(track)
    }
}
