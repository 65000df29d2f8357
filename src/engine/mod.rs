//! Rendering engines and the shared export path of their figures.

pub mod desktop;
pub mod registry;
pub mod web;

use std::ffi::OsStr;
use std::path::Path;

use error_stack::ResultExt;
use tracing::info;

use crate::error::{PlotError, PlotResult};
use crate::figure::FigureBackend;
use crate::raster;
use crate::scene::Scene;

pub use desktop::{DesktopEngine, DesktopFigure};
pub use registry::EngineRegistry;
pub use web::{WebEngine, WebFigure};

/// A rendering backend: a passive factory of figures.
pub trait Engine: Send + Sync {
    /// Name the engine registers under by default.
    fn name(&self) -> &str;

    /// Whether the engine can produce figures in this build and environment.
    fn is_available(&self) -> bool;

    /// A fresh figure of `width` pixels and `height = width * aspect_ratio`.
    /// The aspect ratio has already been validated to lie in `(0, 1]`.
    fn figure(&self, width: u32, aspect_ratio: f64) -> Box<dyn FigureBackend>;
}

/// Export `scene` to `path`, picking the format from the extension.
/// `markup` produces the engine's own `.html` rendition.
pub(crate) fn save_scene(
    scene: &Scene,
    path: &Path,
    scale: f64,
    markup: impl FnOnce(&Scene) -> PlotResult<String>,
) -> PlotResult<()> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "html" | "htm" => write_file(path, &markup(scene)?)?,
        "svg" => write_file(path, &raster::render_svg(scene)?)?,
        "png" | "jpg" | "jpeg" | "bmp" => raster::save_bitmap(scene, path, scale)?,
        other => {
            return Err(PlotError::unsupported(format!(
                "cannot save figures as '.{other}', use html, svg, png, jpg or bmp"
            )));
        }
    }
    info!(path = %path.display(), "figure saved");
    Ok(())
}

pub(crate) fn write_file(path: &Path, contents: &str) -> PlotResult<()> {
    std::fs::write(path, contents)
        .change_context(PlotError::Io)
        .attach(format!("Writing {}", path.display()))
}

/// Whether a graphical session is reachable from this process.
pub(crate) fn has_display() -> bool {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        return true;
    }
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Style;
    use crate::settings::Settings;

    fn scene() -> Scene {
        let mut scene = Scene::new(120, 0.5, &Settings::default());
        scene
            .add_line(&[0.0, 1.0, 2.0], Some(&[1.0, 0.0, 1.0]), None, &Style::default())
            .unwrap();
        scene
    }

    #[test]
    fn save_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let s = scene();
        let markup = |_: &Scene| Ok("<html></html>".to_string());

        save_scene(&s, &dir.path().join("a.HTML"), 1.0, markup).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.HTML")).unwrap(), "<html></html>");

        save_scene(&s, &dir.path().join("a.svg"), 1.0, markup).unwrap();
        assert!(std::fs::read_to_string(dir.path().join("a.svg")).unwrap().starts_with("<svg"));

        save_scene(&s, &dir.path().join("a.png"), 2.0, markup).unwrap();
        let png = std::fs::read(dir.path().join("a.png")).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn unknown_extensions_are_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "noext"] {
            let err = save_scene(&scene(), &dir.path().join(name), 1.0, |_| Ok(String::new()))
                .unwrap_err();
            assert!(matches!(err.current_context(), PlotError::UnsupportedOperation(_)));
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
