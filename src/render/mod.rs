pub mod geometry;
pub mod resources;
pub mod systems;

pub use resources::*;
use systems::*;

use bevy::prelude::*;

/// Presents the [`SceneRes`] figure: 2-D content with a fixed orthographic
/// camera, 3-D content with an orbiting perspective camera.
#[derive(Default)]
pub struct FigureRenderPlugin;

impl Plugin for FigureRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (size_window, spawn_figure))
            .add_systems(Update, orbit_camera);
    }
}
