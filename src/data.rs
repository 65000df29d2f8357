//! Arguments of the plotting calls: numeric series, surfaces and images.

use crate::core::{Colormap, Extra, Interpolation, LineStyle, MarkerStyle, Style};
use crate::plugin::PlotObject;

/// Anything that reads as a 1-D numeric sequence.
pub trait IntoValues {
    fn into_values(self) -> Vec<f64>;
}

impl IntoValues for Vec<f64> {
    fn into_values(self) -> Vec<f64> {
        self
    }
}

impl IntoValues for &Vec<f64> {
    fn into_values(self) -> Vec<f64> {
        self.clone()
    }
}

impl IntoValues for &[f64] {
    fn into_values(self) -> Vec<f64> {
        self.to_vec()
    }
}

impl<const N: usize> IntoValues for [f64; N] {
    fn into_values(self) -> Vec<f64> {
        self.to_vec()
    }
}

impl<const N: usize> IntoValues for &[f64; N] {
    fn into_values(self) -> Vec<f64> {
        self.to_vec()
    }
}

macro_rules! lossless_values {
    ($($t:ty),*) => {$(
        impl IntoValues for Vec<$t> {
            fn into_values(self) -> Vec<f64> {
                self.into_iter().map(f64::from).collect()
            }
        }

        impl IntoValues for &[$t] {
            fn into_values(self) -> Vec<f64> {
                self.iter().copied().map(f64::from).collect()
            }
        }

        impl<const N: usize> IntoValues for [$t; N] {
            fn into_values(self) -> Vec<f64> {
                self.into_iter().map(f64::from).collect()
            }
        }
    )*};
}

lossless_values!(f32, i32, u32, i16, u16, u8);

impl IntoValues for Vec<i64> {
    fn into_values(self) -> Vec<f64> {
        self.into_iter().map(|v| v as f64).collect()
    }
}

impl IntoValues for Vec<usize> {
    fn into_values(self) -> Vec<f64> {
        self.into_iter().map(|v| v as f64).collect()
    }
}

impl IntoValues for std::ops::Range<i32> {
    fn into_values(self) -> Vec<f64> {
        self.map(f64::from).collect()
    }
}

/// Primary argument of `plot` / `scatter` / `surface3d`: raw numbers or a
/// custom object to be routed through its plugin.
#[derive(Clone, Debug)]
pub enum PlotInput<'a> {
    Values(Vec<f64>),
    Object(PlotObject<'a>),
}

impl<T: IntoValues> From<T> for PlotInput<'_> {
    fn from(values: T) -> Self {
        Self::Values(values.into_values())
    }
}

impl<'a> From<PlotObject<'a>> for PlotInput<'a> {
    fn from(obj: PlotObject<'a>) -> Self {
        Self::Object(obj)
    }
}

/// Arguments of one `plot` / `scatter` call.
///
/// ```ignore
/// fig.plot(Series::xy([0.0, 1.0, 2.0], [1.0, 4.0, 9.0]).name("squares").color("r"))?;
/// fig.plot(PlotObject::new(&trajectory))?;
/// ```
#[derive(Clone, Debug)]
pub struct Series<'a> {
    pub x: PlotInput<'a>,
    pub y: Option<Vec<f64>>,
    pub z: Option<Vec<f64>>,
    pub style: Style,
}

impl<'a> Series<'a> {
    /// A lone sequence: plotted as y against its index.
    pub fn new(x: impl Into<PlotInput<'a>>) -> Self {
        Self {
            x: x.into(),
            y: None,
            z: None,
            style: Style::default(),
        }
    }

    pub fn xy(x: impl IntoValues, y: impl IntoValues) -> Self {
        Self {
            y: Some(y.into_values()),
            ..Self::new(PlotInput::Values(x.into_values()))
        }
    }

    pub fn xyz(x: impl IntoValues, y: impl IntoValues, z: impl IntoValues) -> Self {
        Self {
            z: Some(z.into_values()),
            ..Self::xy(x, y)
        }
    }

    pub fn object(obj: PlotObject<'a>) -> Self {
        Self::new(obj)
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.style.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    pub fn line_style(mut self, line_style: LineStyle) -> Self {
        self.style.line_style = Some(line_style);
        self
    }

    pub fn marker_style(mut self, marker_style: MarkerStyle) -> Self {
        self.style.marker_style = Some(marker_style);
        self
    }

    pub fn marker_size(mut self, size: f64) -> Self {
        self.style.marker_size = Some(size);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = opacity;
        self
    }

    pub fn legend_group(mut self, group: impl Into<String>) -> Self {
        self.style.legend_group = Some(group.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.style.extra.insert(key.into(), value.into());
        self
    }
}

impl<T: IntoValues> From<T> for Series<'_> {
    fn from(values: T) -> Self {
        Series::new(PlotInput::Values(values.into_values()))
    }
}

impl<'a> From<PlotObject<'a>> for Series<'a> {
    fn from(obj: PlotObject<'a>) -> Self {
        Series::object(obj)
    }
}

/// Heights of a surface.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceZ {
    /// `len(y)` rows of `len(x)` values over a uniform grid.
    Grid(Vec<Vec<f64>>),
    /// One height per scattered `(x[i], y[i])` point.
    Points(Vec<f64>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceOptions {
    pub show_colormap: bool,
    pub colormap: Colormap,
    pub interpolation: Interpolation,
    /// Side length of the grid scattered points are resampled onto.
    pub interpolation_range: usize,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            show_colormap: false,
            colormap: Colormap::Viridis,
            interpolation: Interpolation::Cubic,
            interpolation_range: 100,
        }
    }
}

/// Arguments of one `surface3d` call.
#[derive(Clone, Debug)]
pub struct Surface<'a> {
    pub x: PlotInput<'a>,
    pub y: Option<Vec<f64>>,
    pub z: Option<SurfaceZ>,
    pub options: SurfaceOptions,
    pub style: Style,
}

impl<'a> Surface<'a> {
    /// Uniform grid: `z[row][col]` is the height at `(x[col], y[row])`.
    pub fn grid(x: impl IntoValues, y: impl IntoValues, z: Vec<Vec<f64>>) -> Self {
        Self::with_z(x.into_values(), y.into_values(), SurfaceZ::Grid(z))
    }

    /// Scattered points, resampled onto a regular grid before drawing.
    pub fn points(x: impl IntoValues, y: impl IntoValues, z: impl IntoValues) -> Self {
        Self::with_z(x.into_values(), y.into_values(), SurfaceZ::Points(z.into_values()))
    }

    pub fn object(obj: PlotObject<'a>) -> Self {
        Self {
            x: PlotInput::Object(obj),
            y: None,
            z: None,
            options: SurfaceOptions::default(),
            style: Style::default(),
        }
    }

    fn with_z(x: Vec<f64>, y: Vec<f64>, z: SurfaceZ) -> Self {
        Self {
            x: PlotInput::Values(x),
            y: Some(y),
            z: Some(z),
            options: SurfaceOptions::default(),
            style: Style::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.style.name = Some(name.into());
        self
    }

    pub fn show_colormap(mut self, show: bool) -> Self {
        self.options.show_colormap = show;
        self
    }

    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.options.colormap = colormap;
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.options.interpolation = interpolation;
        self
    }

    pub fn interpolation_range(mut self, n: usize) -> Self {
        self.options.interpolation_range = n;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = opacity;
        self
    }

    pub fn legend_group(mut self, group: impl Into<String>) -> Self {
        self.style.legend_group = Some(group.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.style.extra.insert(key.into(), value.into());
        self
    }
}

impl<'a> From<PlotObject<'a>> for Surface<'a> {
    fn from(obj: PlotObject<'a>) -> Self {
        Surface::object(obj)
    }
}

/// Pixel samples of an image, row-major, channels interleaved.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F64(Vec<f64>),
}

impl ImageData {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get(&self, i: usize) -> f64 {
        match self {
            Self::U8(v) => f64::from(v[i]),
            Self::U16(v) => f64::from(v[i]),
            Self::F64(v) => v[i],
        }
    }
}

/// Argument of `imshow`: a gray (1 channel), RGB (3) or RGBA (4) image.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: ImageData,
    /// Explicit display range; inferred from the sample type when absent.
    pub value_range: Option<(f64, f64)>,
    pub extra: Extra,
}

impl Image {
    pub fn new(width: usize, height: usize, channels: usize, data: ImageData) -> Self {
        Self {
            width,
            height,
            channels,
            data,
            value_range: None,
            extra: Extra::new(),
        }
    }

    pub fn gray(width: usize, height: usize, data: ImageData) -> Self {
        Self::new(width, height, 1, data)
    }

    pub fn rgb(width: usize, height: usize, data: ImageData) -> Self {
        Self::new(width, height, 3, data)
    }

    pub fn value_range(mut self, min: f64, max: f64) -> Self {
        self.value_range = Some((min, max));
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_inputs_widen_to_f64() {
        let s: Series = vec![1i32, 2, 3].into();
        assert!(matches!(s.x, PlotInput::Values(ref v) if v == &[1.0, 2.0, 3.0]));
        assert!(s.y.is_none());

        let s = Series::xy([0u8, 1], vec![0.5f32, 1.5]);
        assert_eq!(s.y, Some(vec![0.5, 1.5]));

        let s = Series::new(0..3);
        assert!(matches!(s.x, PlotInput::Values(ref v) if v.len() == 3));
    }

    #[test]
    fn builders_fill_style() {
        let s = Series::xyz([0.0], [1.0], [2.0])
            .name("a")
            .color("k")
            .line_style(LineStyle::Dashed)
            .legend_group("g")
            .extra("width", 3);
        assert_eq!(s.style.name.as_deref(), Some("a"));
        assert_eq!(s.style.line_style, Some(LineStyle::Dashed));
        assert_eq!(s.style.extra["width"], serde_json::json!(3));
        assert_eq!(s.z, Some(vec![2.0]));

        let surf = Surface::points([0.0, 1.0], [0.0, 1.0], [1.0, 2.0]).interpolation_range(20);
        assert_eq!(surf.options.interpolation_range, 20);
        assert_eq!(surf.z, Some(SurfaceZ::Points(vec![1.0, 2.0])));
    }

    #[test]
    fn objects_become_object_inputs() {
        struct Probe;
        let p = Probe;
        let s: Series = PlotObject::new(&p).into();
        assert!(matches!(s.x, PlotInput::Object(_)));
        let surf: Surface = PlotObject::new(&p).into();
        assert!(surf.y.is_none() && surf.z.is_none());
    }
}
