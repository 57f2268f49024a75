use serde::Deserialize;

/// Display coordinate space an elevation profile is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartArea {
    /// Width of the plot space (default: 100)
    #[serde(default = "default_extent")]
    pub width: f64,

    /// Height of the plot space (default: 100)
    #[serde(default = "default_extent")]
    pub height: f64,

    /// Inset kept free on every side (default: 10)
    #[serde(default = "default_padding")]
    pub padding: f64,
}

impl Default for ChartArea {
    fn default() -> Self {
        Self {
            width: default_extent(),
            height: default_extent(),
            padding: default_padding(),
        }
    }
}

impl ChartArea {
    pub fn plot_width(&self) -> f64 {
        (self.width - 2.0 * self.padding).max(0.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - 2.0 * self.padding).max(0.0)
    }
}

/// Options for analyzing a GPX track.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    /// Build the elevation profile (default: true)
    #[serde(default = "default_true")]
    pub include_profile: bool,

    /// Include the raw point list of the track (default: false)
    #[serde(default)]
    pub include_points: bool,

    /// Profile chart space (default: 100 x 100, padding 10)
    #[serde(default)]
    pub chart: ChartArea,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            include_profile: true,
            include_points: false,
            chart: ChartArea::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_extent() -> f64 {
    100.0
}

fn default_padding() -> f64 {
    10.0
}
