use std::io::Write;

use chrono::{DateTime, SecondsFormat};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::GpxError;
use crate::gpx_types::{GeoPoint, Track};
use crate::stats::TrackStatistics;

type Result<T> = std::result::Result<T, GpxError>;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// Serialize tracks as a GPX 1.1 document, one `<trk>` with a single
/// `<trkseg>` per track.
pub fn write_gpx(tracks: &[Track], creator: &str) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("gpx").with_attributes([
        ("version", "1.1"),
        ("creator", creator),
        ("xmlns", GPX_NAMESPACE),
    ])))?;

    for track in tracks {
        write_track(&mut writer, track)?;
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_track<W: Write>(writer: &mut Writer<W>, track: &Track) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("trk")))?;

    if let Some(name) = track.name() {
        write_text_element(writer, "name", name)?;
    }
    let desc = match track.description() {
        Some(desc) => desc.to_string(),
        None => {
            let stats = TrackStatistics::of(track);
            format!(
                "Distance: {} km, Duration: {} min",
                stats.distance_km, stats.duration_minutes
            )
        }
    };
    write_text_element(writer, "desc", &desc)?;

    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;
    for point in track.points() {
        write_point(writer, point)?;
    }
    writer.write_event(Event::End(BytesEnd::new("trkseg")))?;

    writer.write_event(Event::End(BytesEnd::new("trk")))?;
    Ok(())
}

fn write_point<W: Write>(writer: &mut Writer<W>, point: &GeoPoint) -> Result<()> {
    let lat = point.latitude.to_string();
    let lon = point.longitude.to_string();
    let start = BytesStart::new("trkpt").with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]);

    let time = point.timestamp.and_then(format_timestamp);
    if point.elevation.is_none() && time.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(ele) = point.elevation {
        write_text_element(writer, "ele", &ele.to_string())?;
    }
    if let Some(time) = time {
        write_text_element(writer, "time", &time)?;
    }
    writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Seconds since the epoch as RFC 3339 UTC, fractional seconds only when present.
fn format_timestamp(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    let dt = DateTime::from_timestamp(whole as i64, nanos)?;
    Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
