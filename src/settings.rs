//! Figure defaults shared by every engine of a session.

use std::path::Path;

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::core::{Color, default_palette};
use crate::error::{PlotError, PlotResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Figure width in pixels
    pub figure_width: u32,
    /// Height / width, in (0, 1]
    pub figure_aspect_ratio: f64,
    pub marker_size: f64,
    pub line_width: f64,
    /// Resolution multiplier of `as_image` / `save` relative to on-screen size
    pub save_scale: f64,
    /// Default series colors, cycled per figure
    pub palette: Vec<Color>,
    /// Script URL the web engine loads plotly.js from
    pub plotly_src: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            figure_width: 800,
            figure_aspect_ratio: 0.6,
            marker_size: 6.0,
            line_width: 2.0,
            save_scale: 2.0,
            palette: default_palette(),
            plotly_src: "https://cdn.plot.ly/plotly-2.35.2.min.js".to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figure_width(mut self, width: u32) -> Self {
        self.figure_width = width;
        self
    }

    pub fn figure_aspect_ratio(mut self, ratio: f64) -> Self {
        self.figure_aspect_ratio = ratio;
        self
    }

    pub fn marker_size(mut self, size: f64) -> Self {
        self.marker_size = size;
        self
    }

    pub fn save_scale(mut self, scale: f64) -> Self {
        self.save_scale = scale;
        self
    }

    pub fn palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = palette;
        self
    }

    pub fn from_json(json: &str) -> PlotResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .change_context(PlotError::Configuration("invalid settings json".into()))
            .attach("Failed to parse uniplot settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> PlotResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .change_context(PlotError::Io)
            .attach(format!("Settings file: {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> PlotResult<()> {
        check_aspect_ratio(self.figure_aspect_ratio)?;
        if self.figure_width == 0 {
            return Err(PlotError::configuration("figure_width must be positive"));
        }
        if !(self.save_scale.is_finite() && self.save_scale > 0.0) {
            return Err(PlotError::configuration(format!(
                "save_scale must be positive, got {}",
                self.save_scale
            )));
        }
        if self.palette.is_empty() {
            return Err(PlotError::configuration("palette must not be empty"));
        }
        Ok(())
    }
}

pub(crate) fn check_aspect_ratio(ratio: f64) -> PlotResult<()> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(PlotError::configuration(format!(
            "aspect ratio must lie in (0, 1], got {ratio}"
        )))
    }
}
