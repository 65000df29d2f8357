use std::sync::atomic::{AtomicBool, Ordering};

use bevy::log::LogPlugin;
use bevy::prelude::*;
use tracing::info;

use crate::error::{PlotError, PlotResult};
use crate::render::{FigureRenderPlugin, SceneRes};
use crate::scene::Scene;

static WINDOW_OPENED: AtomicBool = AtomicBool::new(false);

/// Open a window showing `scene` and block until it is closed.
///
/// The windowing event loop can be created only once per process, so a
/// second call fails with `UnsupportedOperation`.
pub fn run_figure(scene: Scene) -> PlotResult<()> {
    if WINDOW_OPENED.swap(true, Ordering::SeqCst) {
        return Err(PlotError::unsupported(
            "a desktop window was already opened in this process; save the figure or use the web engine",
        ));
    }
    let title = scene
        .decorations()
        .title
        .clone()
        .unwrap_or_else(|| "uniplot".to_string());
    info!(%title, "opening figure window");

    App::new()
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(SceneRes::new(scene))
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title,
                        ..default()
                    }),
                    ..default()
                })
                .disable::<LogPlugin>(),
            FigureRenderPlugin,
        ))
        .run();
    Ok(())
}
