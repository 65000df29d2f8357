//! Scene to mesh conversion. Pure functions; nothing here touches the ECS.

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

use crate::core::{AspectMode, LineStyle};
use crate::scene::{Axis, ImageTrace, Scene, SurfaceTrace};

pub fn to_bevy(color: crate::core::Color, opacity: f64) -> Color {
    Color::srgba(color.r, color.g, color.b, color.a * opacity as f32)
}

fn span((lo, hi): (f64, f64)) -> f64 {
    if hi != lo { hi - lo } else { 1.0 }
}

/// Plot rectangle in world units (logical pixels, origin at the window
/// center), leaving room for the title and axis labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub center: Vec2,
    pub size: Vec2,
}

impl PlotArea {
    pub fn for_window(width: f32, height: f32) -> Self {
        let (left, right, top, bottom) = (64.0, 24.0, 44.0, 52.0);
        let size = Vec2::new(
            (width - left - right).max(1.0),
            (height - top - bottom).max(1.0),
        );
        let center = Vec2::new((left - right) / 2.0, (bottom - top) / 2.0);
        Self { center, size }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.size / 2.0
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.size / 2.0
    }
}

/// Data to world mapping of 2-D axes.
#[derive(Clone, Copy, Debug)]
pub struct FlatView {
    pub area: PlotArea,
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl FlatView {
    pub fn new(scene: &Scene, area: PlotArea) -> Self {
        let mut x = scene.view_range(Axis::X);
        let mut y = scene.view_range(Axis::Y);
        if scene.decorations().aspect == AspectMode::Equal {
            let (w, h) = (f64::from(area.size.x), f64::from(area.size.y));
            let per_unit = (span(x) / w).max(span(y) / h);
            let widen = |(lo, hi): (f64, f64), len: f64| {
                let mid = (lo + hi) / 2.0;
                (mid - per_unit * len / 2.0, mid + per_unit * len / 2.0)
            };
            x = widen(x, w);
            y = widen(y, h);
        }
        Self { area, x, y }
    }

    pub fn map(&self, x: f64, y: f64) -> Option<Vec2> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let t = Vec2::new(
            ((x - self.x.0) / span(self.x)) as f32,
            ((y - self.y.0) / span(self.y)) as f32,
        );
        Some(self.area.min() + t * self.area.size)
    }
}

/// Maps 3-D data into the cube `[-1, 1]^3` with the data's z axis pointing
/// up (world +Y).
#[derive(Clone, Copy, Debug)]
pub struct SolidView {
    lo: [f64; 3],
    extent: [f64; 3],
}

impl SolidView {
    pub fn new(scene: &Scene) -> Self {
        let ranges = [Axis::X, Axis::Y, Axis::Z].map(|axis| scene.view_range(axis));
        let mut extent = ranges.map(span);
        if scene.decorations().aspect == AspectMode::Equal {
            let widest = extent.iter().copied().fold(f64::MIN, f64::max);
            extent = [widest; 3];
        }
        Self {
            lo: ranges.map(|r| r.0),
            extent,
        }
    }

    pub fn map(&self, x: f64, y: f64, z: f64) -> Option<Vec3> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return None;
        }
        let unit = |v: f64, i: usize| ((v - self.lo[i]) / self.extent[i] * 2.0 - 1.0) as f32;
        Some(Vec3::new(unit(x, 0), unit(z, 2), -unit(y, 1)))
    }
}

/// Dash pattern of a line style in world units, `None` for solid lines.
pub fn dash_pattern(style: LineStyle) -> Option<&'static [f32]> {
    match style {
        LineStyle::Dashed => Some(&[7.0, 4.0]),
        LineStyle::Dotted => Some(&[1.5, 3.0]),
        LineStyle::DashDot => Some(&[7.0, 3.0, 1.5, 3.0]),
        LineStyle::Solid | LineStyle::None => None,
    }
}

/// Segments of a 2-D polyline that are drawn under `pattern`.
pub fn dashed_segments(points: &[Vec2], pattern: Option<&[f32]>) -> Vec<(Vec2, Vec2)> {
    let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
        return points.windows(2).map(|w| (w[0], w[1])).collect();
    };
    let mut segments = Vec::new();
    let (mut slot, mut left) = (0usize, pattern[0]);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = a.distance(b);
        let mut walked = 0.0;
        while walked < length {
            let step = left.min(length - walked);
            if slot % 2 == 0 {
                segments.push((a.lerp(b, walked / length), a.lerp(b, (walked + step) / length)));
            }
            walked += step;
            left -= step;
            if left <= 1e-6 {
                slot = (slot + 1) % pattern.len();
                left = pattern[slot];
            }
        }
    }
    segments
}

/// Thick 2-D segments as a triangle list, two triangles per segment.
pub fn stroke_mesh(segments: &[(Vec2, Vec2)], width: f32, z: f32) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(segments.len() * 4);
    let mut indices: Vec<u32> = Vec::with_capacity(segments.len() * 6);
    for &(a, b) in segments {
        let normal = (b - a).perp().normalize_or_zero() * (width / 2.0);
        let base = positions.len() as u32;
        for p in [a + normal, a - normal, b - normal, b + normal] {
            positions.push([p.x, p.y, z]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_indices(Indices::U32(indices))
}

/// 3-D polyline; `None` points break the strip into separate pieces.
pub fn polyline_mesh(points: &[Option<Vec3>]) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    for pair in points.windows(2) {
        if let (Some(a), Some(b)) = (pair[0], pair[1]) {
            positions.push(a.to_array());
            positions.push(b.to_array());
        }
    }
    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Triangulated surface colored per vertex by the trace's colormap.
pub fn surface_mesh(surface: &SurfaceTrace, view: &SolidView) -> Mesh {
    let (zlo, zhi) = surface.z_range().unwrap_or((0.0, 1.0));
    let (cols, rows) = (surface.x.len(), surface.y.len());
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(rows * cols);
    let mut colors: Vec<[f32; 4]> = Vec::with_capacity(rows * cols);
    for (r, row) in surface.z.iter().enumerate() {
        for (c, &z) in row.iter().enumerate() {
            let p = view.map(surface.x[c], surface.y[r], z).unwrap_or(Vec3::NAN);
            positions.push(p.to_array());
            let t = if z.is_finite() { ((z - zlo) / span((zlo, zhi))) as f32 } else { 0.0 };
            let color = to_bevy(surface.colormap.sample(t), surface.opacity).to_linear();
            colors.push([color.red, color.green, color.blue, color.alpha]);
        }
    }

    let mut indices = Vec::new();
    for r in 0..rows.saturating_sub(1) {
        for c in 0..cols.saturating_sub(1) {
            let i0 = (r * cols + c) as u32;
            let (i1, i2) = (i0 + 1, i0 + cols as u32);
            let i3 = i2 + 1;
            let quad = [i0, i1, i2, i3];
            if quad.iter().any(|&i| positions[i as usize][0].is_nan()) {
                continue;
            }
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }
    for p in &mut positions {
        if p[0].is_nan() {
            *p = [0.0; 3];
        }
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
}

/// One colored quad per pixel, filling `area` with the top row first.
pub fn image_mesh(image: &ImageTrace, area: PlotArea, z: f32) -> Mesh {
    let cell = Vec2::new(
        area.size.x / image.width.max(1) as f32,
        area.size.y / image.height.max(1) as f32,
    );
    let top_left = Vec2::new(area.min().x, area.max().y);
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(image.pixels.len() * 4);
    let mut colors: Vec<[f32; 4]> = Vec::with_capacity(image.pixels.len() * 4);
    let mut indices: Vec<u32> = Vec::with_capacity(image.pixels.len() * 6);
    for (i, &[r, g, b, a]) in image.pixels.iter().enumerate() {
        let (col, row) = ((i % image.width) as f32, (i / image.width) as f32);
        let corner = top_left + Vec2::new(col * cell.x, -row * cell.y);
        let base = positions.len() as u32;
        for offset in [Vec2::ZERO, Vec2::new(cell.x, 0.0), Vec2::new(cell.x, -cell.y), Vec2::new(0.0, -cell.y)] {
            let p = corner + offset;
            positions.push([p.x, p.y, z]);
            let linear = Color::srgba_u8(r, g, b, a).to_linear();
            colors.push([linear.red, linear.green, linear.blue, linear.alpha]);
        }
        indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Style;
    use crate::settings::Settings;

    #[test]
    fn flat_view_maps_limits_to_area_corners() {
        let mut scene = Scene::new(400, 0.5, &Settings::default());
        scene
            .add_line(&[0.0, 10.0], Some(&[0.0, 5.0]), None, &Style::default())
            .unwrap();
        scene.set_limit(Axis::X, Some(0.0), Some(10.0)).unwrap();
        scene.set_limit(Axis::Y, Some(0.0), Some(5.0)).unwrap();
        let area = PlotArea::for_window(400.0, 200.0);
        let view = FlatView::new(&scene, area);
        assert_eq!(view.map(0.0, 0.0), Some(area.min()));
        assert_eq!(view.map(10.0, 5.0), Some(area.max()));
        assert_eq!(view.map(f64::NAN, 1.0), None);
    }

    #[test]
    fn solid_view_puts_data_z_up() {
        let mut scene = Scene::new(400, 0.5, &Settings::default());
        scene
            .add_line(&[0.0, 1.0], Some(&[0.0, 1.0]), Some(&[0.0, 1.0]), &Style::default())
            .unwrap();
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            scene.set_limit(axis, Some(0.0), Some(1.0)).unwrap();
        }
        let view = SolidView::new(&scene);
        assert_eq!(view.map(1.0, 0.0, 1.0), Some(Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(view.map(0.0, 1.0, 0.0), Some(Vec3::new(-1.0, -1.0, -1.0)));
    }

    #[test]
    fn dashes_cover_part_of_the_line() {
        let points = [Vec2::ZERO, Vec2::new(22.0, 0.0)];
        let solid = dashed_segments(&points, None);
        assert_eq!(solid.len(), 1);
        let dashed = dashed_segments(&points, dash_pattern(LineStyle::Dashed));
        // 7 on, 4 off, 7 on, 4 off
        assert_eq!(dashed.len(), 2);
        assert_eq!(dashed[1].0, Vec2::new(11.0, 0.0));
        let drawn: f32 = dashed.iter().map(|(a, b)| a.distance(*b)).sum();
        assert!((drawn - 14.0).abs() < 1e-4);
    }

    #[test]
    fn stroke_mesh_has_a_quad_per_segment() {
        let mesh = stroke_mesh(&[(Vec2::ZERO, Vec2::X), (Vec2::X, Vec2::ONE)], 2.0, 0.0);
        assert_eq!(mesh.count_vertices(), 8);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(12));
    }

    #[test]
    fn image_mesh_has_a_quad_per_pixel() {
        let image = ImageTrace {
            width: 2,
            height: 1,
            pixels: vec![[255, 0, 0, 255], [0, 0, 255, 255]],
            extra: Default::default(),
        };
        let mesh = image_mesh(&image, PlotArea::for_window(200.0, 100.0), 0.0);
        assert_eq!(mesh.count_vertices(), 8);
    }
}
