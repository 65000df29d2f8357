//! Native desktop engine: an interactive Bevy window, or a headless variant
//! that only exports files.

use std::path::Path;

use tracing::{debug, warn};

use super::{Engine, escape_html, has_display, save_scene};
use crate::error::PlotResult;
use crate::figure::FigureBackend;
use crate::raster::{self, Raster};
use crate::scene::Scene;
use crate::settings::Settings;

pub const DESKTOP: &str = "desktop";
pub const DESKTOP_NOGUI: &str = "desktop-nogui";

#[derive(Clone, Debug)]
pub struct DesktopEngine {
    settings: Settings,
    headless: bool,
}

impl DesktopEngine {
    /// Interactive engine; available when built with the `desktop` feature.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            headless: false,
        }
    }

    /// File-only engine; always available, `show` is a no-op.
    pub fn headless(settings: Settings) -> Self {
        Self {
            settings,
            headless: true,
        }
    }
}

impl Engine for DesktopEngine {
    fn name(&self) -> &str {
        if self.headless { DESKTOP_NOGUI } else { DESKTOP }
    }

    fn is_available(&self) -> bool {
        self.headless || cfg!(feature = "desktop")
    }

    fn figure(&self, width: u32, aspect_ratio: f64) -> Box<dyn FigureBackend> {
        Box::new(DesktopFigure {
            scene: Scene::new(width, aspect_ratio, &self.settings),
            save_scale: self.settings.save_scale,
            headless: self.headless,
        })
    }
}

#[derive(Debug)]
pub struct DesktopFigure {
    scene: Scene,
    save_scale: f64,
    headless: bool,
}

impl FigureBackend for DesktopFigure {
    fn engine_name(&self) -> &str {
        if self.headless { DESKTOP_NOGUI } else { DESKTOP }
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn as_image(&self) -> PlotResult<Raster> {
        raster::render(&self.scene, self.save_scale)
    }

    fn save(&mut self, path: &Path) -> PlotResult<()> {
        save_scene(&self.scene, path, self.save_scale, svg_page)
    }

    fn show(&mut self, block: bool) -> PlotResult<()> {
        if self.headless {
            debug!("headless desktop figure, nothing to show");
            return Ok(());
        }
        if !has_display() {
            warn!("no display available, desktop figure not shown");
            return Ok(());
        }
        if !block {
            debug!("desktop windows always block until closed");
        }
        present(&self.scene)
    }
}

/// `.html` export of the desktop engine: the SVG rendition in a bare page.
fn svg_page(scene: &Scene) -> PlotResult<String> {
    let svg = raster::render_svg(scene)?;
    let title = escape_html(scene.decorations().title.as_deref().unwrap_or("uniplot"));
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h3>{title}</h3>\n{svg}\n</body>\n</html>\n"
    ))
}

#[cfg(feature = "desktop")]
fn present(scene: &Scene) -> PlotResult<()> {
    crate::runtime::run_figure(scene.clone())
}

#[cfg(not(feature = "desktop"))]
fn present(_: &Scene) -> PlotResult<()> {
    Err(crate::error::PlotError::unsupported(
        "uniplot was built without the `desktop` feature, no window can be opened",
    ))
}
