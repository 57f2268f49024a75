use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FormatError, GpxError};
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, GpxError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Missing,
    Open,
    Closed,
}

/// Parse a GPX XML string into GpxData.
///
/// Fails with `InvalidGpxFormat` when the text is not well-formed XML, has no
/// `<gpx>` element, or ends before `</gpx>`.
pub fn parse_gpx(xml: &str) -> Result<GpxData> {
    let mut reader = Reader::from_str(xml);
    let mut data = GpxData::default();
    let mut root = Root::Missing;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"gpx" => root = Root::Open,
                b"metadata" => data.name = parse_metadata(&mut reader)?,
                b"wpt" => {
                    if let Some(pt) = parse_point(&e, &mut reader)? {
                        data.waypoints.push(pt);
                    }
                }
                b"rte" => data.routes.push(parse_route(&mut reader)?),
                b"trk" => data.tracks.push(parse_track_element(&mut reader)?),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"gpx" => root = Root::Closed,
                b"wpt" => {
                    if let Some(pt) = point_from_attributes(&e)? {
                        data.waypoints.push(pt);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"gpx" => root = Root::Closed,
            Event::Eof => break,
            _ => {}
        }
    }

    match root {
        Root::Missing => Err(FormatError::MissingRoot.into()),
        Root::Open => Err(FormatError::Truncated.into()),
        Root::Closed => {
            debug!(
                "parsed GPX: {} tracks, {} routes, {} waypoints",
                data.tracks.len(),
                data.routes.len(),
                data.waypoints.len()
            );
            Ok(data)
        }
    }
}

/// Parse a GPX XML string and select the first track (or, failing that, the
/// first route) with at least one point.
pub fn parse_track(xml: &str) -> Result<Track> {
    let data = parse_gpx(xml)?;
    let track = data.first_track().ok_or(GpxError::NoTrackFound)?;
    debug!(
        "selected track {:?} with {} points",
        track.name(),
        track.len()
    );
    Ok(track)
}

/// Parse lat/lon attributes from a point element's start tag.
///
/// Returns `None` when either attribute is missing or not a number; the
/// caller drops such points.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<Option<(f64, f64)>> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let val = std::str::from_utf8(&attr.value).unwrap_or_default().trim();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = parse_finite(val),
            b"lon" => lon = parse_finite(val),
            _ => {}
        }
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some((lat, lon))),
        _ => {
            warn!(
                "skipping <{}> without numeric lat/lon",
                String::from_utf8_lossy(e.local_name().as_ref())
            );
            Ok(None)
        }
    }
}

fn point_from_attributes(e: &BytesStart<'_>) -> Result<Option<GeoPoint>> {
    let Some((lat, lon)) = parse_lat_lon(e)? else {
        return Ok(None);
    };
    let point = GeoPoint::new(lon, lat);
    if !point.is_in_range() {
        warn!("point out of range: lat={lat}, lon={lon}");
    }
    Ok(Some(point))
}

/// Parse a point element (wpt, rtept, trkpt) and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Option<GeoPoint>> {
    let Some(mut point) = point_from_attributes(start)? else {
        reader.read_to_end(start.name())?;
        return Ok(None);
    };

    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    point.elevation = parse_finite(&text);
                    if point.elevation.is_none() {
                        warn!("ignoring unparseable elevation {text:?}");
                    }
                }
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    point.timestamp = parse_timestamp(&text);
                    if point.timestamp.is_none() {
                        warn!("ignoring unparseable time {text:?}");
                    }
                }
                _ => {
                    // name, sym, extensions, ...
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Some(point))
}

/// `str::parse::<f64>` also accepts "NaN" and "inf"; those count as unparseable.
fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an ISO-8601 / RFC 3339 timestamp into seconds since the epoch.
/// A value without an offset is taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let text = text.trim();
    let dt = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()?;
    Some(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9)
}

/// Parse a <metadata> element, keeping only its name.
fn parse_metadata<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Option<String>> {
    let mut name = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => name = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"metadata" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(name)
}

/// Parse a <rte> element.
fn parse_route<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxRoute> {
    let mut route = GpxRoute::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => route.name = Some(read_text_owned(reader, &e)?),
                b"desc" => route.desc = Some(read_text_owned(reader, &e)?),
                b"rtept" => {
                    if let Some(pt) = parse_point(&e, reader)? {
                        route.points.push(pt);
                    }
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"rtept" {
                    if let Some(pt) = point_from_attributes(&e)? {
                        route.points.push(pt);
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"rte" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(route)
}

/// Parse a <trk> element.
fn parse_track_element<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text_owned(reader, &e)?),
                b"desc" => track.desc = Some(read_text_owned(reader, &e)?),
                b"trkseg" => {
                    let seg = parse_segment(reader)?;
                    if !seg.points.is_empty() {
                        track.segments.push(seg);
                    }
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"trk" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxSegment> {
    let mut segment = GpxSegment::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(pt) = parse_point(&e, reader)? {
                        segment.points.push(pt);
                    }
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"trkpt" {
                    if let Some(pt) = point_from_attributes(&e)? {
                        segment.points.push(pt);
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"trkseg" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(segment)
}

/// Read text content of an element as an owned String, trimmed.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::CData(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}
