use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Opaque engine-specific overrides, forwarded verbatim to the active engine.
pub type Extra = BTreeMap<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
    pub const fn with_a(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const BLUE: Self = Self::from_rgb8(0x1f, 0x77, 0xb4);
    pub const ORANGE: Self = Self::from_rgb8(0xff, 0x7f, 0x0e);
    pub const GREEN: Self = Self::from_rgb8(0x2c, 0xa0, 0x2c);
    pub const RED: Self = Self::from_rgb8(0xd6, 0x27, 0x28);
    pub const PURPLE: Self = Self::from_rgb8(0x94, 0x67, 0xbd);
    pub const BROWN: Self = Self::from_rgb8(0x8c, 0x56, 0x4b);
    pub const MAGENTA: Self = Self::from_rgb8(0xe3, 0x77, 0xc2);
    pub const GRAY: Self = Self::from_rgb8(0x7f, 0x7f, 0x7f);
    pub const YELLOW: Self = Self::from_rgb8(0xbc, 0xbd, 0x22);
    pub const CYAN: Self = Self::from_rgb8(0x17, 0xbe, 0xcf);

    /// Resolve a color spec: a palette name (`"red"`), a one letter
    /// shorthand (`"r"`, `"k"`), or a `#rrggbb` / `#rrggbbaa` hex string.
    pub fn parse(spec: &str) -> PlotResult<Self> {
        let spec = spec.trim();
        if let Some(hex) = spec.strip_prefix('#') {
            return Self::from_hex(hex).ok_or_else(|| {
                PlotError::lookup(format!("'{spec}' is not a valid hex color"))
            });
        }
        if spec.chars().count() == 1 {
            return match spec {
                "b" => Ok(Self::BLUE),
                "g" => Ok(Self::GREEN),
                "r" => Ok(Self::RED),
                "c" => Ok(Self::CYAN),
                "m" => Ok(Self::MAGENTA),
                "y" => Ok(Self::YELLOW),
                "k" => Ok(Self::BLACK),
                "w" => Ok(Self::WHITE),
                _ => Err(PlotError::lookup(format!(
                    "'{spec}' is not a valid color name, use one of: b g r c m y k w"
                ))),
            };
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == spec)
            .map(|(_, color)| *color)
            .ok_or_else(|| {
                let names: Vec<&str> = NAMED_COLORS.iter().map(|(name, _)| *name).collect();
                PlotError::lookup(format!(
                    "'{spec}' is not a valid color name, use one of: {}",
                    names.join(", ")
                ))
            })
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?).with_a(channel(6)? as f32 / 255.0)),
            _ => None,
        }
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        if self.a < 1.0 {
            let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}")
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = error_stack::Report<PlotError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).map_err(|report| report.to_string())
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Named colors in default cycling order.
pub const NAMED_COLORS: [(&str, Color); 10] = [
    ("blue", Color::BLUE),
    ("orange", Color::ORANGE),
    ("green", Color::GREEN),
    ("red", Color::RED),
    ("purple", Color::PURPLE),
    ("brown", Color::BROWN),
    ("magenta", Color::MAGENTA),
    ("gray", Color::GRAY),
    ("yellow", Color::YELLOW),
    ("cyan", Color::CYAN),
];

pub fn default_palette() -> Vec<Color> {
    NAMED_COLORS.iter().map(|(_, c)| *c).collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
    /// No connecting line: markers only.
    None,
}

impl LineStyle {
    /// matplotlib-style symbols: `-`, `--`, `:`, `-.`, and `" "` for no line.
    pub fn from_symbol(symbol: &str) -> PlotResult<Self> {
        match symbol {
            "-" => Ok(Self::Solid),
            "--" => Ok(Self::Dashed),
            ":" => Ok(Self::Dotted),
            "-." => Ok(Self::DashDot),
            " " | "" => Ok(Self::None),
            other => Err(PlotError::lookup(format!("unknown line style '{other}'"))),
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }

    pub(crate) fn plotly_dash(self) -> Option<&'static str> {
        match self {
            Self::Solid => Some("solid"),
            Self::Dashed => Some("dash"),
            Self::Dotted => Some("dot"),
            Self::DashDot => Some("dashdot"),
            Self::None => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerStyle {
    Point,
    Circle,
    TriangleDown,
    TriangleUp,
    Square,
    Diamond,
    Plus,
    Cross,
    Star,
}

impl MarkerStyle {
    pub fn from_symbol(symbol: &str) -> PlotResult<Self> {
        match symbol {
            "." => Ok(Self::Point),
            "o" => Ok(Self::Circle),
            "v" => Ok(Self::TriangleDown),
            "^" => Ok(Self::TriangleUp),
            "s" => Ok(Self::Square),
            "D" | "d" => Ok(Self::Diamond),
            "+" | "P" => Ok(Self::Plus),
            "x" | "X" => Ok(Self::Cross),
            "*" => Ok(Self::Star),
            other => Err(PlotError::lookup(format!("unknown marker style '{other}'"))),
        }
    }

    pub(crate) fn plotly_symbol(self) -> &'static str {
        match self {
            Self::Point => "circle",
            Self::Circle => "circle-open",
            Self::TriangleDown => "triangle-down",
            Self::TriangleUp => "triangle-up",
            Self::Square => "square",
            Self::Diamond => "diamond",
            Self::Plus => "cross-thin",
            Self::Cross => "x-thin",
            Self::Star => "star",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectMode {
    #[default]
    Auto,
    /// 1:1 between axes (a cube in 3-D).
    Equal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    Nearest,
    Linear,
    #[default]
    Cubic,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Colormap {
    #[default]
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Greys,
    Blues,
    Reds,
    Greens,
    RdBu,
    Jet,
    Hot,
}

impl Colormap {
    /// Map value in [0, 1] to a color.
    pub fn sample(&self, t: f32) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let stops = self.stops();
        let scaled = t * (stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let f = scaled - i as f32;
        let (a, b) = (stops[i], stops[i + 1]);
        Color::rgb(
            a.r + (b.r - a.r) * f,
            a.g + (b.g - a.g) * f,
            a.b + (b.b - a.b) * f,
        )
    }

    /// plotly.js colorscale name.
    pub fn plotly_name(&self) -> &'static str {
        match self {
            Colormap::Viridis => "Viridis",
            Colormap::Plasma => "Plasma",
            Colormap::Inferno => "Inferno",
            Colormap::Magma => "Magma",
            Colormap::Cividis => "Cividis",
            Colormap::Greys => "Greys",
            Colormap::Blues => "Blues",
            Colormap::Reds => "Reds",
            Colormap::Greens => "Greens",
            Colormap::RdBu => "RdBu",
            Colormap::Jet => "Jet",
            Colormap::Hot => "Hot",
        }
    }

    // Coarse five-stop approximations, enough for surface shading.
    fn stops(&self) -> [Color; 5] {
        const fn c(r: u8, g: u8, b: u8) -> Color {
            Color::from_rgb8(r, g, b)
        }
        match self {
            Colormap::Viridis => [c(68, 1, 84), c(59, 82, 139), c(33, 145, 140), c(94, 201, 98), c(253, 231, 37)],
            Colormap::Plasma => [c(13, 8, 135), c(126, 3, 168), c(204, 71, 120), c(248, 149, 64), c(240, 249, 33)],
            Colormap::Inferno => [c(0, 0, 4), c(87, 16, 110), c(188, 55, 84), c(249, 142, 9), c(252, 255, 164)],
            Colormap::Magma => [c(0, 0, 4), c(81, 18, 124), c(183, 55, 121), c(252, 137, 97), c(252, 253, 191)],
            Colormap::Cividis => [c(0, 32, 77), c(65, 77, 107), c(124, 123, 120), c(188, 175, 111), c(255, 234, 70)],
            Colormap::Greys => [c(255, 255, 255), c(217, 217, 217), c(150, 150, 150), c(82, 82, 82), c(0, 0, 0)],
            Colormap::Blues => [c(247, 251, 255), c(198, 219, 239), c(107, 174, 214), c(33, 113, 181), c(8, 48, 107)],
            Colormap::Reds => [c(255, 245, 240), c(252, 187, 161), c(251, 106, 74), c(203, 24, 29), c(103, 0, 13)],
            Colormap::Greens => [c(247, 252, 245), c(199, 233, 192), c(116, 196, 118), c(35, 139, 69), c(0, 68, 27)],
            Colormap::RdBu => [c(103, 0, 31), c(244, 165, 130), c(247, 247, 247), c(146, 197, 222), c(5, 48, 97)],
            Colormap::Jet => [c(0, 0, 131), c(0, 60, 170), c(5, 255, 255), c(255, 255, 0), c(128, 0, 0)],
            Colormap::Hot => [c(11, 0, 0), c(230, 0, 0), c(255, 210, 0), c(255, 255, 130), c(255, 255, 255)],
        }
    }
}

/// Which plotting primitive a call goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotKind {
    Plot,
    Scatter,
    Surface3d,
}

/// Per-series style of a plotting call.
///
/// `color` is kept as the caller's spec string and resolved when the series
/// is drawn, so an unknown name surfaces from the plotting call itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub name: Option<String>,
    pub color: Option<String>,
    pub line_style: Option<LineStyle>,
    pub marker_style: Option<MarkerStyle>,
    pub marker_size: Option<f64>,
    pub opacity: f64,
    pub legend_group: Option<String>,
    pub extra: Extra,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: None,
            color: None,
            line_style: None,
            marker_style: None,
            marker_size: None,
            opacity: 1.0,
            legend_group: None,
            extra: Extra::new(),
        }
    }
}

impl Style {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn line_style(mut self, line_style: LineStyle) -> Self {
        self.line_style = Some(line_style);
        self
    }

    pub fn marker_style(mut self, marker_style: MarkerStyle) -> Self {
        self.marker_style = Some(marker_style);
        self
    }

    pub fn marker_size(mut self, size: f64) -> Self {
        self.marker_size = Some(size);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn legend_group(mut self, group: impl Into<String>) -> Self {
        self.legend_group = Some(group.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
