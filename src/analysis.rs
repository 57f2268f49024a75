use serde::Serialize;

use crate::error::GpxError;
use crate::gpx_types::{GeoPoint, Track};
use crate::options::{AnalyzeOptions, ChartArea};
use crate::parser::parse_track;
use crate::profile::{ElevationProfile, ProfileChart};
use crate::stats::{TrackStatistics, time_bounds};

/// A track together with everything derived from it, computed once.
///
/// The track cannot be changed through this value; analyzing a different
/// track means building a new `TrackAnalysis`.
#[derive(Debug, Clone)]
pub struct TrackAnalysis {
    track: Track,
    statistics: TrackStatistics,
    profile: Option<ElevationProfile>,
    chart: ChartArea,
}

impl TrackAnalysis {
    pub fn new(track: Track, opts: &AnalyzeOptions) -> Self {
        let statistics = TrackStatistics::of(&track);
        let profile = if opts.include_profile {
            ElevationProfile::of(&track)
        } else {
            None
        };
        Self {
            track,
            statistics,
            profile,
            chart: opts.chart,
        }
    }

    /// Parse a GPX document and analyze its first non-empty track or route.
    pub fn from_gpx(xml: &str, opts: &AnalyzeOptions) -> Result<Self, GpxError> {
        Ok(Self::new(parse_track(xml)?, opts))
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn statistics(&self) -> &TrackStatistics {
        &self.statistics
    }

    pub fn profile(&self) -> Option<&ElevationProfile> {
        self.profile.as_ref()
    }

    /// First and last timestamps of the track, in epoch seconds.
    pub fn time_bounds(&self) -> Option<(f64, f64)> {
        time_bounds(self.track.points())
    }

    pub fn into_track(self) -> Track {
        self.track
    }

    /// Serializable summary handed to the UI.
    pub fn report(&self, include_points: bool) -> AnalysisReport<'_> {
        let bounds = self.time_bounds();
        AnalysisReport {
            name: self.track.name(),
            point_count: self.track.len(),
            start_time: bounds.map(|(start, _)| start),
            end_time: bounds.map(|(_, end)| end),
            statistics: &self.statistics,
            profile: self.profile.as_ref().map(|profile| ProfileReport {
                profile,
                chart: profile.chart(&self.chart),
            }),
            path: crate::converter::lat_lng_path(&self.track),
            points: include_points.then(|| self.track.points()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub point_count: usize,
    /// Epoch seconds of the first timed point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    /// Epoch seconds of the last timed point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    pub statistics: &'a TrackStatistics,
    pub profile: Option<ProfileReport<'a>>,
    /// `[lat, lon]` pairs for drawing the track polyline.
    pub path: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<&'a [GeoPoint]>,
}

#[derive(Debug, Serialize)]
pub struct ProfileReport<'a> {
    #[serde(flatten)]
    pub profile: &'a ElevationProfile,
    pub chart: ProfileChart,
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<gpx version="1.1"><trk><name>Morgenpost</name><trkseg>
  <trkpt lat="61.0" lon="10.0"><ele>400</ele><time>2025-10-01T06:00:00Z</time></trkpt>
  <trkpt lat="61.01" lon="10.0"><ele>430</ele><time>2025-10-01T06:20:00Z</time></trkpt>
  <trkpt lat="61.02" lon="10.0"><ele>410</ele><time>2025-10-01T06:40:00Z</time></trkpt>
</trkseg></trk></gpx>"#;

    #[test]
    fn test_from_gpx_computes_everything_once() {
        let analysis = TrackAnalysis::from_gpx(XML, &AnalyzeOptions::default()).unwrap();
        assert_eq!(analysis.track().len(), 3);
        assert_eq!(analysis.statistics().duration_minutes, 40.0);
        assert_eq!(analysis.statistics().elevation_gain_m, 30.0);
        assert_eq!(analysis.statistics().elevation_loss_m, 20.0);
        let profile = analysis.profile().unwrap();
        assert_eq!(profile.samples().len(), 3);
        assert_eq!(
            (profile.total_distance_km() * 100.0).round() / 100.0,
            analysis.statistics().distance_km
        );
    }

    #[test]
    fn test_profile_can_be_skipped() {
        let opts = AnalyzeOptions {
            include_profile: false,
            ..Default::default()
        };
        let analysis = TrackAnalysis::from_gpx(XML, &opts).unwrap();
        assert!(analysis.profile().is_none());
    }

    #[test]
    fn test_report_shape() {
        let analysis = TrackAnalysis::from_gpx(XML, &AnalyzeOptions::default()).unwrap();
        let json = serde_json::to_value(analysis.report(false)).unwrap();
        assert_eq!(json["name"], "Morgenpost");
        assert_eq!(json["point_count"], 3);
        assert_eq!(json["path"][1], serde_json::json!([61.01, 10.0]));
        assert!(json.get("points").is_none());
        assert_eq!(json["profile"]["max_elevation_m"], 430.0);
        assert_eq!(json["profile"]["chart"]["points"].as_array().unwrap().len(), 3);
        assert!(json["profile"]["chart"]["line_path"].as_str().unwrap().starts_with("M 10 "));

        let json = serde_json::to_value(analysis.report(true)).unwrap();
        assert_eq!(json["points"][0]["elevation"], 400.0);
    }

    #[test]
    fn test_time_bounds_skip_untimed_ends() {
        let xml = r#"<gpx version="1.1"><trk><trkseg>
  <trkpt lat="61.0" lon="10.0"><ele>400</ele></trkpt>
  <trkpt lat="61.01" lon="10.0"><time>2025-10-01T06:00:00Z</time></trkpt>
  <trkpt lat="61.02" lon="10.0"/>
  <trkpt lat="61.03" lon="10.0"><time>2025-10-01T06:45:00Z</time></trkpt>
  <trkpt lat="61.04" lon="10.0"><ele>420</ele></trkpt>
</trkseg></trk></gpx>"#;
        let analysis = TrackAnalysis::from_gpx(xml, &AnalyzeOptions::default()).unwrap();
        assert_eq!(analysis.time_bounds(), Some((1759298400.0, 1759301100.0)));

        let json = serde_json::to_value(analysis.report(false)).unwrap();
        assert_eq!(json["start_time"], 1759298400.0);
        assert_eq!(json["end_time"], 1759301100.0);
        assert_eq!(json["statistics"]["duration_minutes"], 45.0);
    }

    #[test]
    fn test_untimed_track_has_no_time_bounds() {
        let xml = r#"<gpx version="1.1"><trk><trkseg>
  <trkpt lat="61.0" lon="10.0"/><trkpt lat="61.01" lon="10.0"/>
</trkseg></trk></gpx>"#;
        let analysis = TrackAnalysis::from_gpx(xml, &AnalyzeOptions::default()).unwrap();
        assert_eq!(analysis.time_bounds(), None);
        let json = serde_json::to_value(analysis.report(false)).unwrap();
        assert!(json.get("start_time").is_none());
        assert!(json.get("end_time").is_none());
    }

    #[test]
    fn test_single_point_track_reports_no_profile() {
        let xml = r#"<gpx version="1.1"><trk><trkseg><trkpt lat="61.0" lon="10.0"/></trkseg></trk></gpx>"#;
        let analysis = TrackAnalysis::from_gpx(xml, &AnalyzeOptions::default()).unwrap();
        assert_eq!(*analysis.statistics(), TrackStatistics::default());
        let json = serde_json::to_value(analysis.report(false)).unwrap();
        assert!(json["profile"].is_null());
    }
}
