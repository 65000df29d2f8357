//! Software rasterization of a [`Scene`] with plotters.
//!
//! Used by every engine for `as_image` and for bitmap / SVG export. Only
//! geometry is drawn (series, surfaces, images, frame, grid, legend swatches
//! and colorbar); text such as titles and axis labels is left to the
//! interactive presentations.

use std::path::Path;

use error_stack::ResultExt;
use glam::DVec3;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Polygon, Rectangle};
use plotters::prelude::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::style::{RGBAColor, ShapeStyle, WHITE};

use crate::core::{AspectMode, Color, LineStyle, MarkerStyle};
use crate::error::{PlotError, PlotResult};
use crate::scene::{AxesState, Axis, ImageTrace, LineTrace, Scene, SurfaceTrace, Trace};

/// RGB pixels, row-major, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

fn render_err(err: impl std::fmt::Display) -> error_stack::Report<PlotError> {
    PlotError::render(err.to_string())
}

fn scaled_size(scene: &Scene, scale: f64) -> (u32, u32) {
    let (w, h) = scene.size();
    let s = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    (s(w), s(h))
}

pub fn render(scene: &Scene, scale: f64) -> PlotResult<Raster> {
    let (width, height) = scaled_size(scene, scale);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw(&root, scene, scale)?;
        root.present().map_err(render_err)?;
    }
    Ok(Raster {
        width,
        height,
        pixels,
    })
}

/// Encode to png / jpeg / bmp, picked by the file extension.
pub fn save_bitmap(scene: &Scene, path: &Path, scale: f64) -> PlotResult<()> {
    let size = scaled_size(scene, scale);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    draw(&root, scene, scale)?;
    root.present()
        .map_err(render_err)
        .attach(format!("Writing {}", path.display()))
}

pub fn render_svg(scene: &Scene) -> PlotResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, scene.size()).into_drawing_area();
        draw(&root, scene, 1.0)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Plot rectangle inside the canvas, in pixels.
#[derive(Clone, Copy, Debug)]
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn inside(width: u32, height: u32, scale: f64) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let margin = (0.08 * w.min(h)).max(4.0 * scale);
        Self {
            left: margin,
            top: margin,
            width: (w - 2.0 * margin).max(1.0),
            height: (h - 2.0 * margin).max(1.0),
        }
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn corners(&self) -> [(i32, i32); 2] {
        [px(self.left, self.top), px(self.right(), self.bottom())]
    }
}

fn px(x: f64, y: f64) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn rgba(color: Color, opacity: f64) -> RGBAColor {
    let [r, g, b] = color.to_rgb8();
    RGBAColor(r, g, b, (f64::from(color.a) * opacity).clamp(0.0, 1.0))
}

fn stroke(color: RGBAColor, width: f64) -> ShapeStyle {
    ShapeStyle {
        color,
        filled: false,
        stroke_width: width.round().max(1.0) as u32,
    }
}

fn fill(color: RGBAColor) -> ShapeStyle {
    ShapeStyle {
        color,
        filled: true,
        stroke_width: 0,
    }
}

const FRAME_GRAY: RGBAColor = RGBAColor(90, 90, 90, 1.0);
const GRID_GRAY: RGBAColor = RGBAColor(200, 200, 200, 1.0);

/// Data to pixel mapping of 2-D axes.
struct Flat {
    frame: Frame,
    x: (f64, f64),
    y: (f64, f64),
}

impl Flat {
    fn new(scene: &Scene, frame: Frame) -> Self {
        let mut x = scene.view_range(Axis::X);
        let mut y = scene.view_range(Axis::Y);
        if scene.decorations().aspect == AspectMode::Equal {
            let per_px = ((x.1 - x.0) / frame.width).max((y.1 - y.0) / frame.height);
            let widen = |(lo, hi): (f64, f64), pixels: f64| {
                let mid = (lo + hi) / 2.0;
                let half = per_px * pixels / 2.0;
                (mid - half, mid + half)
            };
            x = widen(x, frame.width);
            y = widen(y, frame.height);
        }
        Self { frame, x, y }
    }

    fn map(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let tx = (x - self.x.0) / span(self.x);
        let ty = (y - self.y.0) / span(self.y);
        Some((
            self.frame.left + tx * self.frame.width,
            self.frame.bottom() - ty * self.frame.height,
        ))
    }
}

fn span((lo, hi): (f64, f64)) -> f64 {
    if hi != lo { hi - lo } else { 1.0 }
}

/// Orthographic view of the unit cube the 3-D data is normalized into,
/// looking from azimuth -60 degrees, elevation 30 degrees.
struct Solid {
    lo: DVec3,
    extent: DVec3,
    right: DVec3,
    up: DVec3,
    toward: DVec3,
    center: (f64, f64),
    radius: f64,
}

impl Solid {
    const AZIMUTH: f64 = -60.0;
    const ELEVATION: f64 = 30.0;

    fn new(scene: &Scene, frame: Frame) -> Self {
        let (x, y, z) = (
            scene.view_range(Axis::X),
            scene.view_range(Axis::Y),
            scene.view_range(Axis::Z),
        );
        let lo = DVec3::new(x.0, y.0, z.0);
        let mut extent = DVec3::new(span(x), span(y), span(z));
        if scene.decorations().aspect == AspectMode::Equal {
            extent = DVec3::splat(extent.max_element());
        }
        let (az, el) = (Self::AZIMUTH.to_radians(), Self::ELEVATION.to_radians());
        Self {
            lo,
            extent,
            right: DVec3::new(-az.sin(), az.cos(), 0.0),
            up: DVec3::new(-el.sin() * az.cos(), -el.sin() * az.sin(), el.cos()),
            toward: DVec3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin()),
            center: (
                frame.left + frame.width / 2.0,
                frame.top + frame.height / 2.0,
            ),
            // Half the cube diagonal must fit the smaller frame side.
            radius: frame.width.min(frame.height) / 2.0 / 0.87,
        }
    }

    /// Screen position and depth (larger is nearer) of a data point.
    fn map(&self, p: DVec3) -> Option<(f64, f64, f64)> {
        if !p.is_finite() {
            return None;
        }
        let unit = (p - self.lo) / self.extent - DVec3::splat(0.5);
        Some((
            self.center.0 + unit.dot(self.right) * self.radius,
            self.center.1 - unit.dot(self.up) * self.radius,
            unit.dot(self.toward),
        ))
    }

    fn cube_corner(&self, i: usize) -> DVec3 {
        let bit = |b: usize| if i & (1 << b) != 0 { 1.0 } else { 0.0 };
        self.lo + DVec3::new(bit(0), bit(1), bit(2)) * self.extent
    }
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    scale: f64,
) -> PlotResult<()> {
    root.fill(&WHITE).map_err(render_err)?;
    let (w, h) = root.dim_in_pixel();
    let frame = Frame::inside(w, h, scale);

    match scene.axes() {
        AxesState::ThreeD => draw_solid(root, scene, &Solid::new(scene, frame), scale)?,
        AxesState::TwoD | AxesState::Uninitialized => {
            draw_flat(root, scene, &Flat::new(scene, frame), scale)?
        }
    }

    if scene.decorations().legend.is_some() {
        draw_legend(root, scene, frame, scale)?;
    }
    let colorbar = scene.traces().iter().find_map(|trace| match trace {
        Trace::Surface(s) if s.show_colormap => Some(s),
        _ => None,
    });
    if let Some(surface) = colorbar {
        draw_colorbar(root, surface, frame, scale)?;
    }
    Ok(())
}

fn draw_flat<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    view: &Flat,
    scale: f64,
) -> PlotResult<()> {
    let deco = scene.decorations();
    if deco.grid {
        for i in 1..5 {
            let t = f64::from(i) / 5.0;
            let gx = view.frame.left + t * view.frame.width;
            let gy = view.frame.top + t * view.frame.height;
            let style = stroke(GRID_GRAY, scale);
            root.draw(&PathElement::new(
                vec![px(gx, view.frame.top), px(gx, view.frame.bottom())],
                style,
            ))
            .map_err(render_err)?;
            root.draw(&PathElement::new(
                vec![px(view.frame.left, gy), px(view.frame.right(), gy)],
                style,
            ))
            .map_err(render_err)?;
        }
    }

    for trace in scene.traces() {
        match trace {
            Trace::Image(image) => draw_image(root, image, view)?,
            Trace::Line(line) => {
                let points: Vec<Option<(f64, f64)>> = line
                    .x
                    .iter()
                    .zip(&line.y)
                    .map(|(&x, &y)| view.map(x, y))
                    .collect();
                draw_series(root, line, &points, scale)?;
            }
            // Surfaces force 3-D axes.
            Trace::Surface(_) => {}
        }
    }

    if deco.axes_visible {
        root.draw(&Rectangle::new(view.frame.corners(), stroke(FRAME_GRAY, scale)))
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_solid<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    view: &Solid,
    scale: f64,
) -> PlotResult<()> {
    if scene.decorations().axes_visible {
        let edge = stroke(if scene.decorations().grid { FRAME_GRAY } else { GRID_GRAY }, scale);
        for a in 0..8usize {
            for b in [1usize, 2, 4] {
                if a & b != 0 {
                    continue;
                }
                let ends = [view.cube_corner(a), view.cube_corner(a | b)];
                let points: Vec<(i32, i32)> = ends
                    .iter()
                    .filter_map(|p| view.map(*p))
                    .map(|(x, y, _)| px(x, y))
                    .collect();
                root.draw(&PathElement::new(points, edge)).map_err(render_err)?;
            }
        }
    }

    // Painter's algorithm over all surface quads, far to near.
    let mut quads: Vec<(f64, Vec<(i32, i32)>, RGBAColor)> = Vec::new();
    for trace in scene.traces() {
        if let Trace::Surface(surface) = trace {
            collect_quads(surface, view, &mut quads);
        }
    }
    quads.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (_, points, color) in quads {
        root.draw(&Polygon::new(points, fill(color))).map_err(render_err)?;
    }

    for trace in scene.traces() {
        if let Trace::Line(line) = trace {
            let zs = line.z.as_deref().unwrap_or(&[]);
            let points: Vec<Option<(f64, f64)>> = line
                .x
                .iter()
                .zip(&line.y)
                .zip(zs)
                .map(|((&x, &y), &z)| view.map(DVec3::new(x, y, z)).map(|(sx, sy, _)| (sx, sy)))
                .collect();
            draw_series(root, line, &points, scale)?;
        }
    }
    Ok(())
}

fn collect_quads(
    surface: &SurfaceTrace,
    view: &Solid,
    out: &mut Vec<(f64, Vec<(i32, i32)>, RGBAColor)>,
) {
    let (zlo, zhi) = surface.z_range().unwrap_or((0.0, 1.0));
    let at = |r: usize, c: usize| DVec3::new(surface.x[c], surface.y[r], surface.z[r][c]);
    for r in 0..surface.y.len().saturating_sub(1) {
        for c in 0..surface.x.len().saturating_sub(1) {
            let corners = [at(r, c), at(r, c + 1), at(r + 1, c + 1), at(r + 1, c)];
            let projected: Option<Vec<(f64, f64, f64)>> =
                corners.iter().map(|p| view.map(*p)).collect();
            let Some(projected) = projected else {
                continue;
            };
            let depth = projected.iter().map(|p| p.2).sum::<f64>() / 4.0;
            let mean_z = corners.iter().map(|p| p.z).sum::<f64>() / 4.0;
            let t = ((mean_z - zlo) / span((zlo, zhi))) as f32;
            let color = rgba(surface.colormap.sample(t), surface.opacity);
            let points = projected.iter().map(|&(x, y, _)| px(x, y)).collect();
            out.push((depth, points, color));
        }
    }
}

/// Connected line (unless the style has none) plus markers. `None` points
/// break the line.
fn draw_series<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    line: &LineTrace,
    points: &[Option<(f64, f64)>],
    scale: f64,
) -> PlotResult<()> {
    let color = rgba(line.color, line.opacity);
    if !line.line_style.is_none() {
        let style = stroke(color, line.line_width * scale);
        for run in points.split(Option::is_none) {
            let run: Vec<(f64, f64)> = run.iter().flatten().copied().collect();
            for piece in dash(&run, line.line_style, scale) {
                if piece.len() > 1 {
                    root.draw(&PathElement::new(piece, style)).map_err(render_err)?;
                }
            }
        }
    }
    if let Some(marker) = line.marker_style {
        let radius = line.marker_size * scale / 2.0;
        for &(x, y) in points.iter().flatten() {
            draw_marker(root, marker, (x, y), radius, color, scale)?;
        }
    }
    Ok(())
}

/// Split a polyline into the visible pieces of its dash pattern.
fn dash(points: &[(f64, f64)], style: LineStyle, scale: f64) -> Vec<Vec<(i32, i32)>> {
    let pattern: &[f64] = match style {
        LineStyle::Dashed => &[7.0, 4.0],
        LineStyle::Dotted => &[1.5, 3.0],
        LineStyle::DashDot => &[7.0, 3.0, 1.5, 3.0],
        LineStyle::Solid | LineStyle::None => {
            return vec![points.iter().map(|&(x, y)| px(x, y)).collect()];
        }
    };
    let pattern: Vec<f64> = pattern.iter().map(|len| len * scale).collect();

    let mut pieces = Vec::new();
    let mut current: Vec<(i32, i32)> = Vec::new();
    let (mut slot, mut left) = (0usize, pattern[0]);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        let mut walked = 0.0;
        while walked < length {
            let step = left.min(length - walked);
            let lerp = |t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
            let from = lerp(walked / length);
            let to = lerp((walked + step) / length);
            if slot % 2 == 0 {
                if current.is_empty() {
                    current.push(px(from.0, from.1));
                }
                current.push(px(to.0, to.1));
            }
            walked += step;
            left -= step;
            if left <= 1e-9 {
                if slot % 2 == 0 {
                    pieces.push(std::mem::take(&mut current));
                }
                slot = (slot + 1) % pattern.len();
                left = pattern[slot];
            }
        }
    }
    if current.len() > 1 {
        pieces.push(current);
    }
    pieces
}

fn draw_marker<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    marker: MarkerStyle,
    (x, y): (f64, f64),
    r: f64,
    color: RGBAColor,
    scale: f64,
) -> PlotResult<()> {
    let outline = stroke(color, scale);
    let ring = |n: usize, phase: f64, radii: &[f64]| -> Vec<(i32, i32)> {
        (0..n)
            .map(|i| {
                let angle = phase + std::f64::consts::TAU * i as f64 / n as f64;
                let rr = r * radii[i % radii.len()];
                px(x + rr * angle.cos(), y - rr * angle.sin())
            })
            .collect()
    };
    let quarter = std::f64::consts::FRAC_PI_2;
    match marker {
        MarkerStyle::Point => root.draw(&Circle::new(px(x, y), r.max(1.0) as i32, fill(color))),
        MarkerStyle::Circle => root.draw(&Circle::new(px(x, y), r.max(1.0) as i32, outline)),
        MarkerStyle::Square => root.draw(&Rectangle::new(
            [px(x - r, y - r), px(x + r, y + r)],
            fill(color),
        )),
        MarkerStyle::TriangleUp => root.draw(&Polygon::new(ring(3, quarter, &[1.0]), fill(color))),
        MarkerStyle::TriangleDown => {
            root.draw(&Polygon::new(ring(3, -quarter, &[1.0]), fill(color)))
        }
        MarkerStyle::Diamond => root.draw(&Polygon::new(ring(4, 0.0, &[1.0]), fill(color))),
        MarkerStyle::Star => root.draw(&Polygon::new(ring(10, quarter, &[1.0, 0.45]), fill(color))),
        MarkerStyle::Plus | MarkerStyle::Cross => {
            let phase = if marker == MarkerStyle::Plus { 0.0 } else { quarter / 2.0 };
            let arms = ring(4, phase, &[1.0]);
            root.draw(&PathElement::new(vec![arms[0], arms[2]], outline))
                .and_then(|_| root.draw(&PathElement::new(vec![arms[1], arms[3]], outline)))
        }
    }
    .map_err(render_err)
}

fn draw_image<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    image: &ImageTrace,
    view: &Flat,
) -> PlotResult<()> {
    for (i, &[r, g, b, a]) in image.pixels.iter().enumerate() {
        let (col, row) = ((i % image.width) as f64, (i / image.width) as f64);
        // Row 0 is the top of the picture.
        let top = image.height as f64 - row;
        let (Some(p0), Some(p1)) = (view.map(col, top), view.map(col + 1.0, top - 1.0)) else {
            continue;
        };
        let color = RGBAColor(r, g, b, f64::from(a) / 255.0);
        root.draw(&Rectangle::new([px(p0.0, p0.1), px(p1.0, p1.1)], fill(color)))
            .map_err(render_err)?;
    }
    Ok(())
}

/// Swatches of the named series in the top right corner of the frame.
fn draw_legend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    frame: Frame,
    scale: f64,
) -> PlotResult<()> {
    let equal = scene
        .decorations()
        .legend
        .as_ref()
        .is_some_and(|legend| legend.equal_marker_size);
    let entries: Vec<&Trace> = scene.traces().iter().filter(|t| t.name().is_some()).collect();
    if entries.is_empty() {
        return Ok(());
    }
    let row = 14.0 * scale;
    let width = 30.0 * scale;
    let right = frame.right() - 6.0 * scale;
    let top = frame.top + 6.0 * scale;
    let box_style = fill(RGBAColor(255, 255, 255, 0.85));
    root.draw(&Rectangle::new(
        [px(right - width, top), px(right, top + row * entries.len() as f64)],
        box_style,
    ))
    .map_err(render_err)?;
    root.draw(&Rectangle::new(
        [px(right - width, top), px(right, top + row * entries.len() as f64)],
        stroke(GRID_GRAY, scale),
    ))
    .map_err(render_err)?;

    for (i, trace) in entries.into_iter().enumerate() {
        let cy = top + row * (i as f64 + 0.5);
        let (x0, x1) = (right - width + 5.0 * scale, right - 5.0 * scale);
        match trace {
            Trace::Line(line) => {
                let color = rgba(line.color, line.opacity);
                if !line.line_style.is_none() {
                    root.draw(&PathElement::new(
                        vec![px(x0, cy), px(x1, cy)],
                        stroke(color, line.line_width * scale),
                    ))
                    .map_err(render_err)?;
                }
                if let Some(marker) = line.marker_style {
                    let size = if equal { 6.0 } else { line.marker_size };
                    draw_marker(root, marker, ((x0 + x1) / 2.0, cy), size * scale / 2.0, color, scale)?;
                }
            }
            Trace::Surface(surface) => {
                let color = rgba(surface.colormap.sample(0.5), surface.opacity);
                root.draw(&Rectangle::new(
                    [px(x0, cy - 4.0 * scale), px(x1, cy + 4.0 * scale)],
                    fill(color),
                ))
                .map_err(render_err)?;
            }
            Trace::Image(_) => {}
        }
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    surface: &SurfaceTrace,
    frame: Frame,
    scale: f64,
) -> PlotResult<()> {
    let x0 = frame.right() + 4.0 * scale;
    let x1 = x0 + 10.0 * scale;
    let steps = 32;
    for i in 0..steps {
        let t = i as f64 / steps as f64;
        let y1 = frame.bottom() - t * frame.height;
        let y0 = frame.bottom() - (t + 1.0 / steps as f64) * frame.height;
        let color = rgba(surface.colormap.sample(t as f32), 1.0);
        root.draw(&Rectangle::new([px(x0, y0), px(x1, y1)], fill(color)))
            .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Style;
    use crate::data::{Image, ImageData, SurfaceOptions, SurfaceZ};
    use crate::settings::Settings;

    fn scene() -> Scene {
        Scene::new(200, 0.5, &Settings::default())
    }

    #[test]
    fn renders_at_scaled_size() {
        let mut s = scene();
        s.add_line(&[0.0, 1.0, 2.0], Some(&[0.0, 1.0, 0.0]), None, &Style::default())
            .unwrap();
        let raster = render(&s, 2.0).unwrap();
        assert_eq!((raster.width, raster.height), (400, 200));
        assert_eq!(raster.pixels.len(), 400 * 200 * 3);
        assert_eq!(raster.pixel(0, 0), Some([255, 255, 255]));
        assert_eq!(raster.pixel(400, 0), None);
    }

    #[test]
    fn series_color_reaches_the_canvas() {
        let mut s = scene();
        s.add_line(&[0.0, 1.0], Some(&[0.5, 0.5]), None, &Style::default().color("#ff0000"))
            .unwrap();
        let raster = render(&s, 1.0).unwrap();
        let reds = raster
            .pixels
            .chunks(3)
            .filter(|p| p[0] > 200 && p[1] < 60 && p[2] < 60)
            .count();
        assert!(reds > 50, "only {reds} red pixels");
    }

    #[test]
    fn image_fills_the_frame() {
        let mut s = scene();
        s.add_image(&Image::gray(2, 1, ImageData::U8(vec![0, 0]))).unwrap();
        let raster = render(&s, 1.0).unwrap();
        let center = raster.pixel(100, 50).unwrap();
        assert_eq!(center, [0, 0, 0]);
    }

    #[test]
    fn surfaces_render_in_3d() {
        let mut s = scene();
        let z = SurfaceZ::Grid(vec![vec![0.0, 1.0], vec![1.0, 2.0]]);
        s.add_surface(&[0.0, 1.0], &[0.0, 1.0], &z, &SurfaceOptions::default(), &Style::default())
            .unwrap();
        let raster = render(&s, 1.0).unwrap();
        assert!(raster.pixels.chunks(3).any(|p| p != [255, 255, 255]));
    }

    #[test]
    fn svg_output_is_markup() {
        let mut s = scene();
        s.add_line(&[0.0, 1.0], None, None, &Style::default()).unwrap();
        let svg = render_svg(&s).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("polyline") || svg.contains("path"));
    }

    #[test]
    fn dash_pattern_splits_long_segments() {
        let pieces = dash(&[(0.0, 0.0), (100.0, 0.0)], LineStyle::Dashed, 1.0);
        assert!(pieces.len() > 5);
        let solid = dash(&[(0.0, 0.0), (100.0, 0.0)], LineStyle::Solid, 1.0);
        assert_eq!(solid, vec![vec![(0, 0), (100, 0)]]);
    }
}
