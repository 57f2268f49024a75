use quick_xml::events::attributes::AttrError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced by GPX parsing, GeoJSON interchange and GPX export.
///
/// Missing elevation or time on individual points is never an error; those
/// gaps degrade the affected statistics to zero instead.
#[derive(Error, Debug)]
pub enum GpxError {
    #[error("invalid GPX format: {0}")]
    InvalidGpxFormat(#[source] FormatError),
    #[error("no track or route with at least one point found")]
    NoTrackFound,
    #[error("invalid GeoJSON track: {0}")]
    InvalidGeoJson(String),
    #[error("failed to write GPX: {0}")]
    Write(#[from] std::io::Error),
}

/// Diagnostic attached to [`GpxError::InvalidGpxFormat`].
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("missing <gpx> root element")]
    MissingRoot,
    #[error("document ends before </gpx>")]
    Truncated,
}

impl From<FormatError> for GpxError {
    fn from(e: FormatError) -> Self {
        Self::InvalidGpxFormat(e)
    }
}

impl From<quick_xml::Error> for GpxError {
    fn from(e: quick_xml::Error) -> Self {
        Self::InvalidGpxFormat(FormatError::Xml(e))
    }
}

impl From<AttrError> for GpxError {
    fn from(e: AttrError) -> Self {
        Self::InvalidGpxFormat(FormatError::Attribute(e))
    }
}

impl From<GpxError> for JsValue {
    fn from(e: GpxError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
