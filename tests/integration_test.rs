use gpx_track_wasm::analysis::TrackAnalysis;
use gpx_track_wasm::converter::{track_from_feature, track_to_feature};
use gpx_track_wasm::error::{FormatError, GpxError};
use gpx_track_wasm::geo::{haversine_km, segments};
use gpx_track_wasm::options::{AnalyzeOptions, ChartArea};
use gpx_track_wasm::parser::{parse_gpx, parse_track};
use gpx_track_wasm::profile::ElevationProfile;
use gpx_track_wasm::stats::{BoundingBox, TrackStatistics};
use gpx_track_wasm::writer::write_gpx;

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

fn stats_of(path: &str) -> TrackStatistics {
    TrackStatistics::of(&parse_track(&load_fixture(path)).unwrap())
}

// ---- known geometry ----

#[test]
fn test_square_three_sides() {
    let stats = stats_of("square_open.gpx");
    // three 1 km edges
    assert!((stats.distance_km - 3.0).abs() / 3.0 < 0.01, "{}", stats.distance_km);
    assert_eq!(stats.duration_minutes, 30.0);
    assert!((stats.avg_speed_kmh - 6.0).abs() < 0.1);
    assert_eq!(stats.elevation_gain_m, 15.0);
    assert_eq!(stats.elevation_loss_m, 25.0);
    assert_eq!(stats.min_elevation_m, 190.0);
    assert_eq!(stats.max_elevation_m, 215.0);
}

#[test]
fn test_square_loop() {
    let stats = stats_of("square_loop.gpx");
    assert!((stats.distance_km - 4.0).abs() / 4.0 < 0.01, "{}", stats.distance_km);
    assert_eq!(stats.duration_minutes, 40.0);
    assert_eq!(stats.elevation_gain_m, stats.elevation_loss_m);
    assert_eq!(
        stats.bounding_box,
        BoundingBox {
            min_lat: 60.0,
            min_lon: 10.0,
            max_lat: 60.0089932,
            max_lon: 10.0179864,
        }
    );
}

// ---- missing data ----

#[test]
fn test_points_without_ele_or_time() {
    let track = parse_track(&load_fixture("no_ele_time.gpx")).unwrap();
    assert_eq!(track.len(), 4);

    let stats = TrackStatistics::of(&track);
    assert!(stats.distance_km > 0.0);
    assert_eq!(stats.elevation_gain_m, 0.0);
    assert_eq!(stats.elevation_loss_m, 0.0);
    assert_eq!(stats.duration_minutes, 0.0);
    assert_eq!(stats.avg_speed_kmh, 0.0);
    assert_eq!(stats.max_speed_kmh, 0.0);

    // Profile still draws, flat at zero.
    let profile = ElevationProfile::of(&track).unwrap();
    assert!(profile.samples().iter().all(|s| s.elevation_m == 0.0));
    assert_eq!(profile.elevation_range_m(), 1.0);
}

#[test]
fn test_garmin_export_with_gaps() {
    let gpx = load_fixture("garmin_multi_segment.gpx");
    let data = parse_gpx(&gpx).unwrap();
    assert_eq!(data.tracks[0].segments.len(), 2);
    assert_eq!(data.tracks[0].point_count(), 8);

    let track = parse_track(&gpx).unwrap();
    assert_eq!(track.name(), Some("Tiur og hund"));
    assert_eq!(track.len(), 8);
    assert_eq!(track.points()[5].elevation, None);
    assert_eq!(track.points()[6].timestamp, None);

    let stats = TrackStatistics::of(&track);
    // 07:00:00 -> 07:21:05
    assert_eq!(stats.duration_minutes, 21.1);
    assert!(stats.max_speed_kmh >= stats.avg_speed_kmh);
}

#[test]
fn test_route_only_file() {
    let track = parse_track(&load_fixture("route_only.gpx")).unwrap();
    assert_eq!(track.name(), Some("Drevrute"));
    assert_eq!(track.len(), 3);
}

// ---- failures ----

#[test]
fn test_not_xml() {
    let err = parse_track("not xml at all").unwrap_err();
    assert!(matches!(err, GpxError::InvalidGpxFormat(FormatError::MissingRoot)));
    assert!(err.to_string().starts_with("invalid GPX format"));
}

#[test]
fn test_waypoints_only() {
    let gpx = load_fixture("waypoints_only.gpx");
    assert_eq!(parse_gpx(&gpx).unwrap().waypoints.len(), 3);
    assert!(matches!(parse_track(&gpx), Err(GpxError::NoTrackFound)));
    assert!(matches!(
        TrackAnalysis::from_gpx(&gpx, &AnalyzeOptions::default()),
        Err(GpxError::NoTrackFound)
    ));
}

#[test]
fn test_truncated_fixture() {
    let gpx = load_fixture("square_open.gpx");
    let cut = &gpx[..gpx.find("</trkseg>").unwrap()];
    assert!(matches!(parse_track(cut), Err(GpxError::InvalidGpxFormat(_))));
}

// ---- component agreement ----

#[test]
fn test_profile_and_statistics_agree() {
    for fixture in [
        "square_open.gpx",
        "square_loop.gpx",
        "no_ele_time.gpx",
        "garmin_multi_segment.gpx",
        "route_only.gpx",
    ] {
        let analysis =
            TrackAnalysis::from_gpx(&load_fixture(fixture), &AnalyzeOptions::default()).unwrap();
        let profile = analysis.profile().unwrap();
        let rounded = (profile.total_distance_km() * 100.0).round() / 100.0;
        assert_eq!(rounded, analysis.statistics().distance_km, "{fixture}");

        let per_segment: f64 = segments(analysis.track().points())
            .map(|s| s.distance_km)
            .sum();
        assert_eq!(per_segment, profile.total_distance_km(), "{fixture}");

        for pair in profile.samples().windows(2) {
            assert!(pair[1].distance_km >= pair[0].distance_km, "{fixture}");
        }
    }
}

#[test]
fn test_vertical_only_movement() {
    let gpx = load_fixture("garmin_multi_segment.gpx");
    let track = parse_track(&gpx).unwrap();
    // points 2 and 3 share coordinates
    assert_eq!(haversine_km(&track.points()[2], &track.points()[3]), 0.0);
    let seg = segments(track.points()).nth(2).unwrap();
    assert_eq!(seg.distance_km, 0.0);
    assert!(seg.gain_m() > 0.0);
}

#[test]
fn test_custom_chart_area() {
    let opts: AnalyzeOptions =
        serde_json::from_str(r#"{"chart": {"width": 400, "height": 120, "padding": 0}}"#).unwrap();
    let analysis = TrackAnalysis::from_gpx(&load_fixture("square_open.gpx"), &opts).unwrap();
    let plot = analysis.profile().unwrap().normalize(&opts.chart);
    assert_eq!(plot[0].x, 0.0);
    assert!((plot[3].x - 400.0).abs() < 1e-9);
    // highest point touches the top, lowest the bottom
    assert!((plot[1].y - 0.0).abs() < 1e-9);
    assert!((plot[3].y - 120.0).abs() < 1e-9);
    assert_eq!(opts.chart, ChartArea { width: 400.0, height: 120.0, padding: 0.0 });
}

// ---- storage and export ----

#[test]
fn test_feature_round_trip_through_gpx_export() {
    let track = parse_track(&load_fixture("square_loop.gpx"))
        .unwrap()
        .with_color("#D4752E");
    let stats = TrackStatistics::of(&track);

    let feature = track_to_feature(&track, &stats);
    let restored = track_from_feature(&feature).unwrap();
    assert_eq!(restored.color(), Some("#D4752E"));
    assert_eq!(restored.points(), track.points());

    let exported = write_gpx(&[restored], "huntlog").unwrap();
    let reparsed = parse_track(&exported).unwrap();
    assert_eq!(TrackStatistics::of(&reparsed), stats);
}
