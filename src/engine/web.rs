//! Browser engine: figures become self-contained plotly.js pages.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use error_stack::ResultExt;
use serde_json::{Map, Value, json};
use tracing::info;

use super::{Engine, escape_html, has_display, save_scene, write_file};
use crate::core::{AspectMode, Extra};
use crate::error::{PlotError, PlotResult};
use crate::figure::FigureBackend;
use crate::raster::{self, Raster};
use crate::scene::{AxesState, Decorations, ImageTrace, LineTrace, Scene, SurfaceTrace, Trace};
use crate::settings::Settings;

pub const WEB: &str = "web";

#[derive(Clone, Debug)]
pub struct WebEngine {
    settings: Settings,
}

impl WebEngine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Engine for WebEngine {
    fn name(&self) -> &str {
        WEB
    }

    /// Pages are plain files; a browser is only needed to look at them.
    fn is_available(&self) -> bool {
        true
    }

    fn figure(&self, width: u32, aspect_ratio: f64) -> Box<dyn FigureBackend> {
        Box::new(WebFigure {
            scene: Scene::new(width, aspect_ratio, &self.settings),
            settings: self.settings.clone(),
            page: None,
        })
    }
}

#[derive(Debug)]
pub struct WebFigure {
    scene: Scene,
    settings: Settings,
    /// Where `show` last wrote the page.
    page: Option<PathBuf>,
}

impl WebFigure {
    pub fn page_path(&self) -> Option<&Path> {
        self.page.as_deref()
    }
}

impl FigureBackend for WebFigure {
    fn engine_name(&self) -> &str {
        WEB
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn as_image(&self) -> PlotResult<Raster> {
        raster::render(&self.scene, self.settings.save_scale)
    }

    fn save(&mut self, path: &Path) -> PlotResult<()> {
        let settings = &self.settings;
        save_scene(&self.scene, path, settings.save_scale, |scene| {
            Ok(html_page(scene, settings))
        })
    }

    /// Write the page to the temp directory and open it in the browser.
    /// The browser owns the page afterwards, so `block` has no effect.
    fn show(&mut self, _block: bool) -> PlotResult<()> {
        static PAGES: AtomicUsize = AtomicUsize::new(0);
        let path = self.page.clone().unwrap_or_else(|| {
            let n = PAGES.fetch_add(1, Ordering::Relaxed);
            std::env::temp_dir().join(format!("uniplot-{}-{n}.html", std::process::id()))
        });
        write_file(&path, &html_page(&self.scene, &self.settings))?;
        self.page = Some(path.clone());

        if !has_display() {
            info!(path = %path.display(), "no display available, figure page written");
            return Ok(());
        }
        open::that(&path)
            .change_context(PlotError::Io)
            .attach(format!("Opening {} in the browser", path.display()))?;
        info!(path = %path.display(), "figure opened in browser");
        Ok(())
    }
}

/// Standalone HTML page drawing `scene` with plotly.js.
pub fn html_page(scene: &Scene, settings: &Settings) -> String {
    let figure = plotly_figure(scene);
    // A literal "</" would end the script element early.
    let json = figure.to_string().replace("</", "<\\/");
    let title = escape_html(scene.decorations().title.as_deref().unwrap_or("uniplot"));
    let (w, h) = scene.size();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{src}"></script>
</head>
<body>
<div id="uniplot" style="width:{w}px;height:{h}px;"></div>
<script>
const figure = {json};
Plotly.newPlot("uniplot", figure.data, figure.layout, figure.config);
</script>
</body>
</html>
"#,
        src = escape_html(&settings.plotly_src),
    )
}

/// The plotly.js figure object (`data`, `layout`, `config`) for `scene`.
pub fn plotly_figure(scene: &Scene) -> Value {
    let three_d = scene.axes() == AxesState::ThreeD;
    let data: Vec<Value> = scene
        .traces()
        .iter()
        .map(|trace| match trace {
            Trace::Line(line) => line_trace(line, three_d),
            Trace::Surface(surface) => surface_trace(surface),
            Trace::Image(image) => image_trace(image),
        })
        .collect();
    json!({
        "data": data,
        "layout": layout(scene, three_d),
        "config": { "responsive": false, "displaylogo": false },
    })
}

fn line_trace(line: &LineTrace, three_d: bool) -> Value {
    let mode = match (line.line_style.is_none(), line.marker_style.is_some()) {
        (true, _) => "markers",
        (false, true) => "lines+markers",
        (false, false) => "lines",
    };
    let mut trace = json!({
        "type": if three_d { "scatter3d" } else { "scatter" },
        "mode": mode,
        "x": line.x,
        "y": line.y,
        "opacity": line.opacity,
        "showlegend": line.name.is_some(),
        "line": { "color": line.color.to_hex(), "width": line.line_width },
        "marker": { "color": line.color.to_hex(), "size": line.marker_size },
    });
    if let Some(z) = &line.z {
        trace["z"] = json!(z);
    }
    if let Some(dash) = line.line_style.plotly_dash() {
        trace["line"]["dash"] = json!(dash);
    }
    if let Some(marker) = line.marker_style {
        trace["marker"]["symbol"] = json!(marker.plotly_symbol());
    }
    naming(&mut trace, line.name.as_deref(), line.legend_group.as_deref(), line.group_title);
    merge(&mut trace, &line.extra);
    trace
}

fn surface_trace(surface: &SurfaceTrace) -> Value {
    let mut trace = json!({
        "type": "surface",
        "x": surface.x,
        "y": surface.y,
        "z": surface.z,
        "colorscale": surface.colormap.plotly_name(),
        "showscale": surface.show_colormap,
        "opacity": surface.opacity,
        "showlegend": surface.name.is_some(),
    });
    naming(
        &mut trace,
        surface.name.as_deref(),
        surface.legend_group.as_deref(),
        surface.group_title,
    );
    merge(&mut trace, &surface.extra);
    trace
}

fn image_trace(image: &ImageTrace) -> Value {
    let rows: Vec<Vec<[f64; 4]>> = image
        .pixels
        .chunks(image.width)
        .map(|row| {
            row.iter()
                .map(|&[r, g, b, a]| [f64::from(r), f64::from(g), f64::from(b), f64::from(a) / 255.0])
                .collect()
        })
        .collect();
    let mut trace = json!({
        "type": "image",
        "colormodel": "rgba",
        "z": rows,
        "hoverinfo": "x+y",
    });
    merge(&mut trace, &image.extra);
    trace
}

fn naming(trace: &mut Value, name: Option<&str>, group: Option<&str>, group_title: bool) {
    if let Some(name) = name {
        trace["name"] = json!(name);
    }
    if let Some(group) = group {
        trace["legendgroup"] = json!(group);
        if group_title {
            trace["legendgrouptitle"] = json!({ "text": group });
        }
    }
}

/// Engine-specific overrides are copied verbatim over the generated keys.
fn merge(target: &mut Value, extra: &Extra) {
    if let Value::Object(map) = target {
        for (key, value) in extra {
            map.insert(key.clone(), value.clone());
        }
    }
}

fn axis(title: Option<&str>, range: Option<(f64, f64)>, deco: &Decorations) -> Value {
    let mut axis = Map::new();
    if let Some(title) = title {
        axis.insert("title".into(), json!({ "text": title }));
    }
    if let Some((lo, hi)) = range {
        axis.insert("range".into(), json!([lo, hi]));
    }
    axis.insert("showgrid".into(), json!(deco.grid));
    if !deco.axes_visible {
        axis.insert("visible".into(), json!(false));
    }
    Value::Object(axis)
}

fn layout(scene: &Scene, three_d: bool) -> Value {
    let deco = scene.decorations();
    let (w, h) = scene.size();
    let mut layout = json!({
        "width": w,
        "height": h,
        "showlegend": deco.legend.is_some(),
        "margin": { "l": 50, "r": 30, "t": 50, "b": 50 },
    });
    if let Some(title) = &deco.title {
        layout["title"] = json!({ "text": title });
    }
    let x = axis(deco.xlabel.as_deref(), deco.xlim, deco);
    let y = axis(deco.ylabel.as_deref(), deco.ylim, deco);
    if three_d {
        let z = axis(deco.zlabel.as_deref(), deco.zlim, deco);
        let aspect = match deco.aspect {
            AspectMode::Auto => "auto",
            AspectMode::Equal => "cube",
        };
        layout["scene"] = json!({ "xaxis": x, "yaxis": y, "zaxis": z, "aspectmode": aspect });
    } else {
        layout["xaxis"] = x;
        layout["yaxis"] = y;
        if deco.aspect == AspectMode::Equal {
            layout["yaxis"]["scaleanchor"] = json!("x");
            layout["yaxis"]["scaleratio"] = json!(1);
        }
    }
    if let Some(legend) = &deco.legend {
        let sizing = if legend.equal_marker_size { "constant" } else { "trace" };
        let mut spec = json!({ "itemsizing": sizing });
        merge(&mut spec, &legend.extra);
        layout["legend"] = spec;
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LineStyle, MarkerStyle, Style};
    use crate::data::{Image, ImageData, SurfaceOptions, SurfaceZ};

    fn figure() -> Box<dyn FigureBackend> {
        WebEngine::new(Settings::default()).figure(400, 0.5)
    }

    #[test]
    fn line_traces_carry_style_and_groups() {
        let mut fig = figure();
        let style = Style::default()
            .name("a")
            .color("r")
            .line_style(LineStyle::Dashed)
            .marker_style(MarkerStyle::Square)
            .legend_group("sensors")
            .extra("hovertemplate", "%{y}");
        fig.plot(&[0.0, 1.0], Some(&[2.0, 3.0]), None, &style).unwrap();
        fig.plot(&[0.0, 1.0], Some(&[1.0, 1.0]), None, &style.clone().name("b"))
            .unwrap();

        let figure = plotly_figure(fig.scene());
        let first = &figure["data"][0];
        assert_eq!(first["type"], "scatter");
        assert_eq!(first["mode"], "lines+markers");
        assert_eq!(first["name"], "a");
        assert_eq!(first["line"]["dash"], "dash");
        assert_eq!(first["marker"]["symbol"], "square");
        assert_eq!(first["line"]["color"], "#d62728");
        assert_eq!(first["legendgrouptitle"]["text"], "sensors");
        assert_eq!(first["hovertemplate"], "%{y}");
        assert!(figure["data"][1].get("legendgrouptitle").is_none());
        assert_eq!(figure["data"][1]["legendgroup"], "sensors");
    }

    #[test]
    fn scatter_is_markers_only() {
        let mut fig = figure();
        fig.scatter(&[0.0, 1.0], None, None, &Style::default()).unwrap();
        let figure = plotly_figure(fig.scene());
        assert_eq!(figure["data"][0]["mode"], "markers");
        assert!(figure["data"][0]["line"].get("dash").is_none());
    }

    #[test]
    fn three_d_content_uses_scene_axes() {
        let mut fig = figure();
        fig.plot(&[0.0], Some(&[1.0]), Some(&[2.0]), &Style::default()).unwrap();
        fig.surface3d(
            &[0.0, 1.0],
            &[0.0, 1.0, 2.0],
            &SurfaceZ::Grid(vec![vec![0.0; 2]; 3]),
            &SurfaceOptions::default(),
            &Style::default(),
        )
        .unwrap();
        fig.zlabel("height").unwrap();
        fig.axis_aspect(AspectMode::Equal).unwrap();
        let figure = plotly_figure(fig.scene());
        assert_eq!(figure["data"][0]["type"], "scatter3d");
        assert_eq!(figure["data"][1]["type"], "surface");
        assert_eq!(figure["data"][1]["colorscale"], "Viridis");
        assert_eq!(figure["layout"]["scene"]["zaxis"]["title"]["text"], "height");
        assert_eq!(figure["layout"]["scene"]["aspectmode"], "cube");
        assert!(figure["layout"].get("xaxis").is_none());
    }

    #[test]
    fn layout_reflects_decorations() {
        let mut fig = figure();
        fig.plot(&[0.0, 4.0], None, None, &Style::default().name("a")).unwrap();
        fig.title("run").unwrap();
        fig.xlim(Some(-1.0), Some(1.0)).unwrap();
        fig.grid(true).unwrap();
        fig.legend(true, false, &Extra::new()).unwrap();
        let layout = &plotly_figure(fig.scene())["layout"];
        assert_eq!(layout["title"]["text"], "run");
        assert_eq!(layout["xaxis"]["range"], json!([-1.0, 1.0]));
        assert_eq!(layout["xaxis"]["showgrid"], true);
        assert_eq!(layout["showlegend"], true);
        assert_eq!(layout["legend"]["itemsizing"], "trace");
        assert_eq!((layout["width"].as_u64(), layout["height"].as_u64()), (Some(400), Some(200)));
    }

    #[test]
    fn images_hide_axes() {
        let mut fig = figure();
        fig.imshow(&Image::rgb(1, 2, ImageData::U8(vec![255, 0, 0, 0, 0, 255]))).unwrap();
        let figure = plotly_figure(fig.scene());
        assert_eq!(figure["data"][0]["z"], json!([[[255.0, 0.0, 0.0, 1.0]], [[0.0, 0.0, 255.0, 1.0]]]));
        assert_eq!(figure["layout"]["xaxis"]["visible"], false);
    }

    #[test]
    fn page_embeds_script_and_escapes_json() {
        let mut fig = figure();
        fig.plot(&[0.0], None, None, &Style::default().name("</script>")).unwrap();
        let page = html_page(fig.scene(), &Settings::default());
        assert!(page.contains("https://cdn.plot.ly/plotly-"));
        assert!(page.contains("Plotly.newPlot"));
        assert!(!page.contains("\"</script>\""));
        assert!(page.contains("<\\/script>"));
    }

    #[test]
    fn saves_html_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut fig = figure();
        fig.plot(&[0.0, 1.0], None, None, &Style::default()).unwrap();
        let path = dir.path().join("fig.html");
        fig.save(&path).unwrap();
        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains("\"type\":\"scatter\""));
    }
}
