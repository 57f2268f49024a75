pub mod analysis;
pub mod converter;
pub mod error;
pub mod geo;
pub mod gpx_types;
pub mod options;
pub mod parser;
pub mod profile;
pub mod stats;
pub mod writer;

use geojson::Feature;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub use crate::analysis::TrackAnalysis;
pub use crate::error::{FormatError, GpxError};
pub use crate::gpx_types::{GeoPoint, Track, TrackSource};
pub use crate::options::{AnalyzeOptions, ChartArea};
pub use crate::profile::ElevationProfile;
pub use crate::stats::{BoundingBox, TrackStatistics};

/// Parse a GPX string and return its first non-empty track or route.
#[wasm_bindgen(js_name = parseGpxTrack)]
pub fn parse_gpx_track(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let track = parser::parse_track(gpx_string)?;
    to_js(&track)
}

/// Parse a GPX string and return statistics, elevation profile and map path,
/// as a JS object.
#[wasm_bindgen(js_name = analyzeGpx)]
pub fn analyze_gpx(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts: AnalyzeOptions = parse_options(options)?;
    let analysis = TrackAnalysis::from_gpx(gpx_string, &opts)?;
    to_js(&analysis.report(opts.include_points))
}

/// Same as `analyzeGpx`, returned as a JSON string.
#[wasm_bindgen(js_name = analyzeGpxString)]
pub fn analyze_gpx_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts: AnalyzeOptions = parse_options(options)?;
    let analysis = TrackAnalysis::from_gpx(gpx_string, &opts)?;
    serde_json::to_string(&analysis.report(opts.include_points))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse a GPX string into the stored form: a GeoJSON Feature whose geometry
/// is the track and whose properties carry name, source and statistics.
#[wasm_bindgen(js_name = gpxToTrackFeature)]
pub fn gpx_to_track_feature(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let track = parser::parse_track(gpx_string)?;
    let stats = TrackStatistics::of(&track);
    to_js(&converter::track_to_feature(&track, &stats))
}

/// Statistics of a stored GeoJSON LineString track.
#[wasm_bindgen(js_name = trackStatistics)]
pub fn track_statistics(geometry: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let track = track_from_js(geometry)?;
    to_js(&TrackStatistics::of(&track))
}

/// Elevation profile of a stored GeoJSON LineString track, or `null` when the
/// track has fewer than two points.
#[wasm_bindgen(js_name = elevationProfile)]
pub fn elevation_profile(geometry: JsValue, chart: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let area: ChartArea = parse_options(chart)?;
    let track = track_from_js(geometry)?;
    match ElevationProfile::of(&track) {
        Some(profile) => to_js(&analysis::ProfileReport {
            chart: profile.chart(&area),
            profile: &profile,
        }),
        None => Ok(JsValue::NULL),
    }
}

/// Export track Features (as produced by `gpxToTrackFeature`) as one GPX
/// document.
#[wasm_bindgen(js_name = tracksToGpx)]
pub fn tracks_to_gpx(features: js_sys::Array, creator: Option<String>) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let tracks = features
        .iter()
        .map(|value| {
            let feature: Feature = serde_wasm_bindgen::from_value(value)?;
            Ok(converter::track_from_feature(&feature)?)
        })
        .collect::<Result<Vec<_>, JsValue>>()?;
    Ok(writer::write_gpx(&tracks, creator.as_deref().unwrap_or("gpx-track-wasm"))?)
}

fn parse_options<T: DeserializeOwned + Default>(options: JsValue) -> Result<T, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(T::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn track_from_js(geometry: JsValue) -> Result<Track, JsValue> {
    let geometry: geojson::Geometry = serde_wasm_bindgen::from_value(geometry)?;
    Ok(converter::track_from_geometry(&geometry)?)
}

/// Plain JS objects rather than `Map`s, so the output can be fed to
/// `JSON.stringify` as-is.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
