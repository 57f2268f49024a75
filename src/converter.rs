use geojson::{Feature, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::error::GpxError;
use crate::gpx_types::{GeoPoint, Track, TrackSource};
use crate::stats::{TrackStatistics, time_bounds};

/// Convert a track to the stored GeoJSON form: a LineString whose positions
/// are `[lon, lat]`, `[lon, lat, ele]` or `[lon, lat, ele, time]`.
///
/// A time can only sit in the 4th slot, so a point with a time but no
/// elevation loses its time.
pub fn track_to_geometry(track: &Track) -> Geometry {
    let coords: Vec<Vec<f64>> = track.points().iter().map(point_coords).collect();
    Geometry::new(Value::LineString(coords))
}

/// Read a track back from its stored GeoJSON LineString.
pub fn track_from_geometry(geometry: &Geometry) -> Result<Track, GpxError> {
    let Value::LineString(coords) = &geometry.value else {
        return Err(GpxError::InvalidGeoJson(format!(
            "expected LineString, found {}",
            geometry_type(&geometry.value)
        )));
    };

    let points = coords
        .iter()
        .enumerate()
        .map(|(i, pos)| match pos.as_slice() {
            [lon, lat] => Ok(GeoPoint::new(*lon, *lat)),
            [lon, lat, ele] => Ok(GeoPoint::new(*lon, *lat).with_elevation(*ele)),
            [lon, lat, ele, time, ..] => Ok(GeoPoint::new(*lon, *lat)
                .with_elevation(*ele)
                .with_timestamp(*time)),
            _ => Err(GpxError::InvalidGeoJson(format!(
                "position {i} has {} values, expected at least 2",
                pos.len()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Track::new(points))
}

/// Parse a GeoJSON geometry from JSON text and read it as a track.
pub fn track_from_geojson_str(json: &str) -> Result<Track, GpxError> {
    let geometry: Geometry =
        serde_json::from_str(json).map_err(|e| GpxError::InvalidGeoJson(e.to_string()))?;
    track_from_geometry(&geometry)
}

/// Track as a GeoJSON Feature carrying its metadata, time bounds and
/// statistics.
pub fn track_to_feature(track: &Track, statistics: &TrackStatistics) -> Feature {
    let mut props = Map::new();
    insert_optional(&mut props, "name", track.name());
    insert_optional(&mut props, "description", track.description());
    insert_optional(&mut props, "color", track.color());
    props.insert(
        "source".to_string(),
        serde_json::to_value(track.source()).unwrap_or(JsonValue::Null),
    );
    if let Some((start, end)) = time_bounds(track.points()) {
        props.insert("start_time".to_string(), JsonValue::from(start));
        props.insert("end_time".to_string(), JsonValue::from(end));
    }
    props.insert(
        "statistics".to_string(),
        serde_json::to_value(statistics).unwrap_or(JsonValue::Null),
    );

    Feature {
        bbox: None,
        geometry: Some(track_to_geometry(track)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Read a track and its metadata back from a Feature made by
/// [`track_to_feature`]. Time bounds and statistics in the properties are
/// ignored.
pub fn track_from_feature(feature: &Feature) -> Result<Track, GpxError> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| GpxError::InvalidGeoJson("feature has no geometry".to_string()))?;
    let mut track = track_from_geometry(geometry)?;

    if let Some(name) = feature.property("name").and_then(JsonValue::as_str) {
        track = track.with_name(name);
    }
    if let Some(description) = feature.property("description").and_then(JsonValue::as_str) {
        track = track.with_description(description);
    }
    if let Some(color) = feature.property("color").and_then(JsonValue::as_str) {
        track = track.with_color(color);
    }
    if let Some(source) = feature
        .property("source")
        .and_then(|v| serde_json::from_value::<TrackSource>(v.clone()).ok())
    {
        track = track.with_source(source);
    }
    Ok(track)
}

/// `[lat, lon]` pairs in track order, the form map polylines take.
pub fn lat_lng_path(track: &Track) -> Vec<[f64; 2]> {
    track
        .points()
        .iter()
        .map(|p| [p.latitude, p.longitude])
        .collect()
}

fn point_coords(pt: &GeoPoint) -> Vec<f64> {
    match (pt.elevation, pt.timestamp) {
        (Some(ele), Some(time)) => vec![pt.longitude, pt.latitude, ele, time],
        (Some(ele), None) => vec![pt.longitude, pt.latitude, ele],
        _ => vec![pt.longitude, pt.latitude],
    }
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn insert_optional(props: &mut Map<String, JsonValue>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        props.insert(key.to_string(), JsonValue::String(v.to_string()));
    }
}
