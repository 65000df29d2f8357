//! Retained, engine-independent content of one figure.
//!
//! Every engine figure owns a [`Scene`]: the traces plotted so far, the
//! decorations, the figure's color scroller and its axes state machine. The
//! engines only differ in how they present a scene.

pub mod grid;
pub mod image;

use std::collections::HashMap;

use tracing::debug;

use crate::color::ColorScroller;
use crate::core::{AspectMode, Color, Colormap, Extra, LineStyle, MarkerStyle, Style};
use crate::data::{Image, SurfaceOptions, SurfaceZ};
use crate::error::{PlotError, PlotResult};
use crate::settings::Settings;
pub use image::ImageTrace;

/// Relative padding added on each side of an estimated axis limit.
pub const LIMIT_PADDING: f64 = 0.02;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxesState {
    #[default]
    Uninitialized,
    TwoD,
    ThreeD,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Option<Vec<f64>>,
    pub name: Option<String>,
    pub color: Color,
    pub line_style: LineStyle,
    pub marker_style: Option<MarkerStyle>,
    pub marker_size: f64,
    pub line_width: f64,
    pub opacity: f64,
    pub legend_group: Option<String>,
    /// First named series of its legend group: carries the group title.
    pub group_title: bool,
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// `y.len()` rows of `x.len()` heights.
    pub z: Vec<Vec<f64>>,
    pub name: Option<String>,
    pub colormap: Colormap,
    pub show_colormap: bool,
    pub opacity: f64,
    pub legend_group: Option<String>,
    pub group_title: bool,
    pub extra: Extra,
}

impl SurfaceTrace {
    pub fn z_range(&self) -> Option<(f64, f64)> {
        finite_range(self.z.iter().flatten().copied())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Trace {
    Line(LineTrace),
    Surface(SurfaceTrace),
    Image(ImageTrace),
}

impl Trace {
    pub fn name(&self) -> Option<&str> {
        match self {
            Trace::Line(l) => l.name.as_deref(),
            Trace::Surface(s) => s.name.as_deref(),
            Trace::Image(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendState {
    pub equal_marker_size: bool,
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Decorations {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub zlabel: Option<String>,
    /// `None` when no legend is shown; hiding drops the whole state.
    pub legend: Option<LegendState>,
    pub grid: bool,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub zlim: Option<(f64, f64)>,
    pub aspect: AspectMode,
    /// Ticks, grid and frame; hidden by `imshow`.
    pub axes_visible: bool,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            title: None,
            xlabel: None,
            ylabel: None,
            zlabel: None,
            legend: None,
            grid: false,
            xlim: None,
            ylim: None,
            zlim: None,
            aspect: AspectMode::Auto,
            axes_visible: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    width: u32,
    height: u32,
    marker_size: f64,
    line_width: f64,
    axes: AxesState,
    closed: bool,
    traces: Vec<Trace>,
    decorations: Decorations,
    colors: ColorScroller,
    groups: HashMap<Option<String>, usize>,
}

impl Scene {
    /// On-screen size is `width x round(width * aspect_ratio)`.
    pub fn new(width: u32, aspect_ratio: f64, settings: &Settings) -> Self {
        let height = ((f64::from(width) * aspect_ratio).round() as u32).max(1);
        Self {
            width: width.max(1),
            height,
            marker_size: settings.marker_size,
            line_width: settings.line_width,
            axes: AxesState::Uninitialized,
            closed: false,
            traces: Vec::new(),
            decorations: Decorations::default(),
            colors: ColorScroller::new(settings.palette.clone()),
            groups: HashMap::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn axes(&self) -> AxesState {
        self.axes
    }

    /// `None` until the first plotting call fixes the dimensionality.
    pub fn is_3d(&self) -> Option<bool> {
        match self.axes {
            AxesState::Uninitialized => None,
            AxesState::TwoD => Some(false),
            AxesState::ThreeD => Some(true),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    pub fn ensure_open(&self) -> PlotResult<()> {
        if self.closed {
            Err(error_stack::Report::new(PlotError::UseAfterClose))
        } else {
            Ok(())
        }
    }

    /// Enter 2-D or 3-D axes. Switching away from the other dimensionality
    /// drops all content plotted so far.
    fn enter(&mut self, target: AxesState) {
        if self.axes != AxesState::Uninitialized && self.axes != target {
            debug!(from = ?self.axes, to = ?target, dropped = self.traces.len(), "resetting axes");
            self.traces.clear();
            self.groups.clear();
            let title = self.decorations.title.take();
            self.decorations = Decorations {
                title,
                grid: self.decorations.grid,
                ..Decorations::default()
            };
        }
        self.axes = target;
    }

    /// Count a series against its legend group; true when it is the first
    /// named series of a named group.
    fn count_group(&mut self, name: Option<&str>, group: Option<&String>) -> bool {
        if name.is_none() {
            return false;
        }
        let count = self.groups.entry(group.cloned()).or_insert(0);
        *count += 1;
        group.is_some() && *count == 1
    }

    /// Number of named series counted against `group` so far.
    pub fn group_count(&self, group: Option<&str>) -> usize {
        self.groups
            .get(&group.map(str::to_string))
            .copied()
            .unwrap_or(0)
    }

    /// Add a line/marker series. A lone `x` is plotted against its index.
    pub fn add_line(
        &mut self,
        x: &[f64],
        y: Option<&[f64]>,
        z: Option<&[f64]>,
        style: &Style,
    ) -> PlotResult<()> {
        self.ensure_open()?;
        let (x, y) = match y {
            Some(y) => (x.to_vec(), y.to_vec()),
            None => ((0..x.len()).map(|i| i as f64).collect(), x.to_vec()),
        };
        if x.len() != y.len() {
            return Err(PlotError::shape(format!(
                "x has {} values but y has {}",
                x.len(),
                y.len()
            )));
        }
        if let Some(z) = z {
            if z.len() != x.len() {
                return Err(PlotError::shape(format!(
                    "z has {} values but x and y have {}",
                    z.len(),
                    x.len()
                )));
            }
        }
        // Resolve the color before touching any state so a bad name leaves
        // the figure as it was.
        let explicit = style.color.as_deref().map(Color::parse).transpose()?;

        self.enter(if z.is_some() {
            AxesState::ThreeD
        } else {
            AxesState::TwoD
        });
        let color = match explicit {
            Some(c) => c,
            None => self.colors.scroll_color(1),
        };
        let line_style = style.line_style.unwrap_or_default();
        let marker_style = match style.marker_style {
            None if line_style.is_none() => Some(MarkerStyle::Point),
            other => other,
        };
        let group_title = self.count_group(style.name.as_deref(), style.legend_group.as_ref());

        self.traces.push(Trace::Line(LineTrace {
            x,
            y,
            z: z.map(<[f64]>::to_vec),
            name: style.name.clone(),
            color,
            line_style,
            marker_style,
            marker_size: style.marker_size.unwrap_or(self.marker_size),
            line_width: self.line_width,
            opacity: style.opacity,
            legend_group: style.legend_group.clone(),
            group_title,
            extra: style.extra.clone(),
        }));
        Ok(())
    }

    /// Add a surface over a uniform grid, or over scattered points that are
    /// resampled first.
    pub fn add_surface(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &SurfaceZ,
        options: &SurfaceOptions,
        style: &Style,
    ) -> PlotResult<()> {
        self.ensure_open()?;
        let (x, y, z) = match z {
            SurfaceZ::Grid(rows) => {
                let ok = rows.len() == y.len() && rows.iter().all(|row| row.len() == x.len());
                if !ok {
                    let cols = rows.first().map_or(0, Vec::len);
                    return Err(PlotError::shape(format!(
                        "surface z must be {} rows of {} values (len(y) x len(x)), got {} rows of {}",
                        y.len(),
                        x.len(),
                        rows.len(),
                        cols
                    )));
                }
                (x.to_vec(), y.to_vec(), rows.clone())
            }
            SurfaceZ::Points(z) => {
                let g = grid::resample(x, y, z, options.interpolation_range, options.interpolation)?;
                (g.x, g.y, g.z)
            }
        };

        self.enter(AxesState::ThreeD);
        let group_title = self.count_group(style.name.as_deref(), style.legend_group.as_ref());
        self.traces.push(Trace::Surface(SurfaceTrace {
            x,
            y,
            z,
            name: style.name.clone(),
            colormap: options.colormap,
            show_colormap: options.show_colormap,
            opacity: style.opacity,
            legend_group: style.legend_group.clone(),
            group_title,
            extra: style.extra.clone(),
        }));
        Ok(())
    }

    pub fn add_image(&mut self, image: &Image) -> PlotResult<()> {
        self.ensure_open()?;
        let trace = image::normalize(image)?;
        self.enter(AxesState::TwoD);
        self.decorations.axes_visible = false;
        self.decorations.grid = false;
        self.traces.push(Trace::Image(trace));
        Ok(())
    }

    pub fn set_title(&mut self, text: &str) -> PlotResult<()> {
        self.ensure_open()?;
        self.decorations.title = Some(text.to_string());
        Ok(())
    }

    pub fn set_label(&mut self, axis: Axis, text: &str) -> PlotResult<()> {
        self.ensure_open()?;
        let slot = match axis {
            Axis::X => &mut self.decorations.xlabel,
            Axis::Y => &mut self.decorations.ylabel,
            Axis::Z if self.axes != AxesState::ThreeD => {
                debug!("zlabel ignored outside 3-D axes");
                return Ok(());
            }
            Axis::Z => &mut self.decorations.zlabel,
        };
        *slot = Some(text.to_string());
        Ok(())
    }

    pub fn has_named_series(&self) -> bool {
        self.traces.iter().any(|t| t.name().is_some())
    }

    pub fn set_legend(&mut self, show: bool, equal_marker_size: bool, extra: &Extra) -> PlotResult<()> {
        self.ensure_open()?;
        if !self.has_named_series() {
            debug!("legend ignored, no named series");
            return Ok(());
        }
        self.decorations.legend = show.then(|| LegendState {
            equal_marker_size,
            extra: extra.clone(),
        });
        Ok(())
    }

    pub fn set_grid(&mut self, show: bool) -> PlotResult<()> {
        self.ensure_open()?;
        self.decorations.grid = show;
        Ok(())
    }

    pub fn set_aspect(&mut self, mode: AspectMode) -> PlotResult<()> {
        self.ensure_open()?;
        self.decorations.aspect = mode;
        Ok(())
    }

    /// Set an axis range. A missing bound is estimated from the plotted
    /// data on that axis, padded by [`LIMIT_PADDING`] on each side.
    pub fn set_limit(&mut self, axis: Axis, min: Option<f64>, max: Option<f64>) -> PlotResult<()> {
        self.ensure_open()?;
        if axis == Axis::Z && self.axes != AxesState::ThreeD {
            debug!("zlim ignored outside 3-D axes");
            return Ok(());
        }
        let (min, max) = match (min, max) {
            (Some(min), Some(max)) => (min, max),
            (min, max) => {
                let (lo, hi) = self.padded_range(axis).ok_or_else(|| {
                    PlotError::lookup(format!(
                        "cannot estimate the {axis:?} limit, nothing plotted on that axis yet"
                    ))
                })?;
                (min.unwrap_or(lo), max.unwrap_or(hi))
            }
        };
        *self.limit_slot(axis) = Some((min, max));
        Ok(())
    }

    fn limit_slot(&mut self, axis: Axis) -> &mut Option<(f64, f64)> {
        match axis {
            Axis::X => &mut self.decorations.xlim,
            Axis::Y => &mut self.decorations.ylim,
            Axis::Z => &mut self.decorations.zlim,
        }
    }

    /// Union of the finite data plotted on `axis`.
    pub fn data_range(&self, axis: Axis) -> Option<(f64, f64)> {
        let ranges = self.traces.iter().filter_map(|trace| match (trace, axis) {
            (Trace::Line(l), Axis::X) => finite_range(l.x.iter().copied()),
            (Trace::Line(l), Axis::Y) => finite_range(l.y.iter().copied()),
            (Trace::Line(l), Axis::Z) => finite_range(l.z.iter().flatten().copied()),
            (Trace::Surface(s), Axis::X) => finite_range(s.x.iter().copied()),
            (Trace::Surface(s), Axis::Y) => finite_range(s.y.iter().copied()),
            (Trace::Surface(s), Axis::Z) => s.z_range(),
            (Trace::Image(i), Axis::X) => Some((0.0, i.width as f64)),
            (Trace::Image(i), Axis::Y) => Some((0.0, i.height as f64)),
            (Trace::Image(_), Axis::Z) => None,
        });
        ranges.reduce(|(a, b), (c, d)| (a.min(c), b.max(d)))
    }

    fn padded_range(&self, axis: Axis) -> Option<(f64, f64)> {
        let (lo, hi) = self.data_range(axis)?;
        let pad = if hi > lo {
            (hi - lo) * LIMIT_PADDING
        } else {
            lo.abs().max(1.0) * LIMIT_PADDING
        };
        Some((lo - pad, hi + pad))
    }

    /// Range an engine should draw `axis` over: the explicit limit if set,
    /// else the padded data range, else `(0, 1)`.
    pub fn view_range(&self, axis: Axis) -> (f64, f64) {
        let explicit = match axis {
            Axis::X => self.decorations.xlim,
            Axis::Y => self.decorations.ylim,
            Axis::Z => self.decorations.zlim,
        };
        explicit
            .or_else(|| self.padded_range(axis))
            .unwrap_or((0.0, 1.0))
    }

    pub fn current_color(&self) -> Color {
        self.colors.current_color()
    }

    pub fn scroll_color(&mut self, count: isize) -> Color {
        self.colors.scroll_color(count)
    }

    pub fn reset_color(&mut self) {
        self.colors.reset();
    }

    /// Drop all content; every later operation fails with `UseAfterClose`.
    pub fn close(&mut self) {
        self.traces.clear();
        self.groups.clear();
        self.closed = true;
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
