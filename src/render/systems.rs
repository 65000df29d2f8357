use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_camera::{OrthographicProjection, PerspectiveProjection, Projection, ScalingMode};

use super::geometry::*;
use super::resources::*;
use crate::core::MarkerStyle;
use crate::scene::{AxesState, LineTrace, Scene, Trace};

const FRAME: Color = Color::srgb(0.35, 0.35, 0.35);
const GRID: Color = Color::srgb(0.82, 0.82, 0.82);
const TEXT: Color = Color::srgb(0.1, 0.1, 0.1);

pub fn size_window(scene: Res<SceneRes>, mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };
    let (w, h) = scene.0.size();
    window.resolution.set(w as f32, h as f32);
}

/// Spawn the camera and every trace of the scene once at startup.
pub fn spawn_figure(
    mut commands: Commands,
    scene: Res<SceneRes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut flat_materials: ResMut<Assets<ColorMaterial>>,
    mut solid_materials: ResMut<Assets<StandardMaterial>>,
) {
    let scene = &scene.0;
    match scene.axes() {
        AxesState::ThreeD => spawn_solid(&mut commands, scene, &mut meshes, &mut solid_materials),
        AxesState::TwoD | AxesState::Uninitialized => {
            spawn_flat(&mut commands, scene, &mut meshes, &mut flat_materials)
        }
    }
}

fn spawn_flat(
    commands: &mut Commands,
    scene: &Scene,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    let (w, h) = scene.size();
    let mut ortho = OrthographicProjection::default_2d();
    ortho.scaling_mode = ScalingMode::FixedVertical {
        viewport_height: h as f32,
    };
    commands.spawn((
        Camera2d::default(),
        Projection::from(ortho),
        Transform::from_xyz(0.0, 0.0, 1000.0),
    ));

    let area = PlotArea::for_window(w as f32, h as f32);
    let view = FlatView::new(scene, area);
    let deco = scene.decorations();

    if deco.grid {
        let mut lines = Vec::new();
        for i in 1..5 {
            let t = i as f32 / 5.0;
            let x = area.min().x + t * area.size.x;
            let y = area.min().y + t * area.size.y;
            lines.push((Vec2::new(x, area.min().y), Vec2::new(x, area.max().y)));
            lines.push((Vec2::new(area.min().x, y), Vec2::new(area.max().x, y)));
        }
        spawn_stroke(commands, meshes, materials, &lines, 1.0, 0.0, GRID);
    }

    for (i, trace) in scene.traces().iter().enumerate() {
        let z = 1.0 + i as f32 * 0.01;
        match trace {
            Trace::Image(image) => {
                commands.spawn((
                    Mesh2d(meshes.add(image_mesh(image, area, z))),
                    MeshMaterial2d(materials.add(ColorMaterial::default())),
                    Transform::IDENTITY,
                ));
            }
            Trace::Line(line) => {
                let points: Vec<Option<Vec2>> =
                    line.x.iter().zip(&line.y).map(|(&x, &y)| view.map(x, y)).collect();
                spawn_flat_series(commands, meshes, materials, line, &points, z);
            }
            Trace::Surface(_) => {}
        }
    }

    if deco.axes_visible {
        let (lo, hi) = (area.min(), area.max());
        let corners = [lo, Vec2::new(hi.x, lo.y), hi, Vec2::new(lo.x, hi.y), lo];
        let frame: Vec<(Vec2, Vec2)> = corners.windows(2).map(|w| (w[0], w[1])).collect();
        spawn_stroke(commands, meshes, materials, &frame, 1.5, 5.0, FRAME);

        let font = |size: f32| TextFont {
            font_size: size,
            ..default()
        };
        for (x, value) in [(lo.x, view.x.0), (hi.x, view.x.1)] {
            commands.spawn((
                Text2d::new(tick_label(value)),
                font(11.0),
                TextColor(TEXT),
                Transform::from_xyz(x, lo.y - 12.0, 6.0),
            ));
        }
        for (y, value) in [(lo.y, view.y.0), (hi.y, view.y.1)] {
            commands.spawn((
                Text2d::new(tick_label(value)),
                font(11.0),
                TextColor(TEXT),
                Transform::from_xyz(lo.x - 28.0, y, 6.0),
            ));
        }
        if let Some(label) = &deco.xlabel {
            commands.spawn((
                Text2d::new(label.clone()),
                font(14.0),
                TextColor(TEXT),
                Transform::from_xyz(area.center.x, lo.y - 34.0, 6.0),
            ));
        }
        if let Some(label) = &deco.ylabel {
            commands.spawn((
                Text2d::new(label.clone()),
                font(14.0),
                TextColor(TEXT),
                Transform::from_xyz(lo.x - 50.0, area.center.y, 6.0)
                    .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            ));
        }
    }

    if let Some(title) = &deco.title {
        commands.spawn((
            Text2d::new(title.clone()),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(TEXT),
            Transform::from_xyz(area.center.x, area.max().y + 22.0, 6.0),
        ));
    }
    if deco.legend.is_some() {
        spawn_flat_legend(commands, scene, area, meshes, materials);
    }
}

fn spawn_stroke(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    segments: &[(Vec2, Vec2)],
    width: f32,
    z: f32,
    color: Color,
) {
    if segments.is_empty() {
        return;
    }
    commands.spawn((
        Mesh2d(meshes.add(stroke_mesh(segments, width, z))),
        MeshMaterial2d(materials.add(ColorMaterial::from(color))),
        Transform::IDENTITY,
    ));
}

fn spawn_flat_series(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    line: &LineTrace,
    points: &[Option<Vec2>],
    z: f32,
) {
    let color = to_bevy(line.color, line.opacity);
    if !line.line_style.is_none() {
        let pattern = dash_pattern(line.line_style);
        let mut segments = Vec::new();
        for run in points.split(Option::is_none) {
            let run: Vec<Vec2> = run.iter().flatten().copied().collect();
            segments.extend(dashed_segments(&run, pattern));
        }
        spawn_stroke(commands, meshes, materials, &segments, line.line_width as f32, z, color);
    }
    let Some(marker) = line.marker_style else {
        return;
    };
    let size = line.marker_size as f32;
    let shape = meshes.add(marker_mesh(marker, size));
    let material = materials.add(ColorMaterial::from(color));
    for p in points.iter().flatten() {
        commands.spawn((
            Mesh2d(shape.clone()),
            MeshMaterial2d(material.clone()),
            Transform::from_translation(p.extend(z + 0.005)),
        ));
    }
}

fn marker_mesh(marker: MarkerStyle, size: f32) -> Mesh {
    let r = size / 2.0;
    match marker {
        MarkerStyle::Point => Mesh::from(Circle::new(r)),
        MarkerStyle::Circle => Mesh::from(Annulus::new(r * 0.7, r)),
        MarkerStyle::Square => Mesh::from(Rectangle::new(size, size)),
        MarkerStyle::TriangleUp => Mesh::from(RegularPolygon::new(r, 3)),
        MarkerStyle::TriangleDown => {
            Mesh::from(RegularPolygon::new(r, 3)).rotated_by(Quat::from_rotation_z(std::f32::consts::PI))
        }
        MarkerStyle::Diamond => Mesh::from(Rhombus::new(size, size)),
        MarkerStyle::Star => Mesh::from(RegularPolygon::new(r, 5)),
        MarkerStyle::Plus => stroke_mesh(
            &[(Vec2::new(-r, 0.0), Vec2::new(r, 0.0)), (Vec2::new(0.0, -r), Vec2::new(0.0, r))],
            1.5,
            0.0,
        ),
        MarkerStyle::Cross => stroke_mesh(
            &[(Vec2::new(-r, -r), Vec2::new(r, r)), (Vec2::new(-r, r), Vec2::new(r, -r))],
            1.5,
            0.0,
        ),
    }
}

fn spawn_flat_legend(
    commands: &mut Commands,
    scene: &Scene,
    area: PlotArea,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    let swatch = meshes.add(Rectangle::new(14.0, 3.0));
    let named = scene.traces().iter().filter_map(|trace| match trace {
        Trace::Line(line) => line.name.as_deref().map(|name| (name, line.color, line.opacity)),
        _ => None,
    });
    let top_right = area.max() - Vec2::new(110.0, 14.0);
    for (i, (name, color, opacity)) in named.enumerate() {
        let at = top_right - Vec2::new(0.0, i as f32 * 18.0);
        commands.spawn((
            Mesh2d(swatch.clone()),
            MeshMaterial2d(materials.add(ColorMaterial::from(to_bevy(color, opacity)))),
            Transform::from_translation(at.extend(8.0)),
        ));
        commands.spawn((
            Text2d::new(name.to_string()),
            TextFont {
                font_size: 12.0,
                ..default()
            },
            TextColor(TEXT),
            // Text2d is centered on its translation.
            Transform::from_translation((at + Vec2::new(12.0 + name.len() as f32 * 3.5, 0.0)).extend(8.0)),
        ));
    }
}

fn spawn_solid(
    commands: &mut Commands,
    scene: &Scene,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let orbit = Orbit::default();
    commands.insert_resource(orbit);
    commands.insert_resource(AmbientLight {
        brightness: 600.0,
        ..default()
    });
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection::default()),
        orbit.transform(),
        OrbitCamera,
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            ..default()
        },
        Transform::from_xyz(2.0, 6.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let view = SolidView::new(scene);
    let deco = scene.decorations();
    if deco.axes_visible {
        let mut corners = Vec::new();
        for a in 0..8usize {
            for b in [1usize, 2, 4] {
                if a & b == 0 {
                    corners.push(Some(cube_corner(a)));
                    corners.push(Some(cube_corner(a | b)));
                    corners.push(None);
                }
            }
        }
        let color = if deco.grid { FRAME } else { GRID };
        commands.spawn((
            Mesh3d(meshes.add(polyline_mesh(&corners))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..default()
            })),
            Transform::IDENTITY,
        ));
    }

    for trace in scene.traces() {
        match trace {
            Trace::Surface(surface) => {
                commands.spawn((
                    Mesh3d(meshes.add(surface_mesh(surface, &view))),
                    MeshMaterial3d(materials.add(StandardMaterial {
                        base_color: Color::WHITE,
                        alpha_mode: if surface.opacity < 1.0 { AlphaMode::Blend } else { AlphaMode::Opaque },
                        unlit: true,
                        cull_mode: None,
                        double_sided: true,
                        ..default()
                    })),
                    Transform::IDENTITY,
                ));
            }
            Trace::Line(line) => spawn_solid_series(commands, meshes, materials, line, &view),
            Trace::Image(_) => {}
        }
    }

    let Some(title) = &deco.title else {
        return;
    };
    commands.spawn((
        Text::new(title.clone()),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(TEXT),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(14.0),
            ..default()
        },
    ));
}

fn cube_corner(i: usize) -> Vec3 {
    let bit = |b: usize| if i & (1 << b) != 0 { 1.0 } else { -1.0 };
    Vec3::new(bit(0), bit(2), -bit(1))
}

fn spawn_solid_series(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    line: &LineTrace,
    view: &SolidView,
) {
    let zs = line.z.as_deref().unwrap_or(&[]);
    let points: Vec<Option<Vec3>> = line
        .x
        .iter()
        .zip(&line.y)
        .zip(zs)
        .map(|((&x, &y), &z)| view.map(x, y, z))
        .collect();
    let material = materials.add(StandardMaterial {
        base_color: to_bevy(line.color, line.opacity),
        unlit: true,
        ..default()
    });
    if !line.line_style.is_none() {
        commands.spawn((
            Mesh3d(meshes.add(polyline_mesh(&points))),
            MeshMaterial3d(material.clone()),
            Transform::IDENTITY,
        ));
    }
    if line.marker_style.is_some() {
        let sphere = meshes.add(Sphere::new((line.marker_size as f32 * 0.006).max(0.01)));
        for p in points.iter().flatten() {
            commands.spawn((
                Mesh3d(sphere.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(*p),
            ));
        }
    }
}

/// Drag with the left button to rotate, scroll to zoom.
pub fn orbit_camera(
    orbit: Option<ResMut<Orbit>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    mut wheel: MessageReader<MouseWheel>,
    mut cameras: Query<&mut Transform, With<OrbitCamera>>,
) {
    let Some(mut orbit) = orbit else {
        return;
    };
    let mut drag = Vec2::ZERO;
    for event in motion.read() {
        drag += event.delta;
    }
    let scroll: f32 = wheel.read().map(|event| event.y).sum();

    let before = *orbit;
    if mouse.pressed(MouseButton::Left) {
        orbit.rotate(drag);
    }
    if scroll != 0.0 {
        orbit.zoom(scroll);
    }
    if *orbit == before {
        return;
    }
    for mut transform in cameras.iter_mut() {
        *transform = orbit.transform();
    }
}

fn tick_label(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e5).contains(&magnitude) {
        format!("{value:.2e}")
    } else {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(tick_label(2.5), "2.5");
        assert_eq!(tick_label(-1.0), "-1");
        assert_eq!(tick_label(0.0), "0");
        assert_eq!(tick_label(123456.0), "1.23e5");
    }

    #[test]
    fn cube_corners_span_the_unit_cube() {
        assert_eq!(cube_corner(0), Vec3::new(-1.0, -1.0, 1.0));
        assert_eq!(cube_corner(7), Vec3::new(1.0, 1.0, -1.0));
    }
}
