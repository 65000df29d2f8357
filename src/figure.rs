//! The figure contract every engine implements, and the user-facing
//! [`Figure`] handle wrapping it.

use std::path::Path;

use crate::core::{AspectMode, Color, Extra, LineStyle, PlotKind, Style};
use crate::data::{Image, PlotInput, Series, Surface, SurfaceOptions, SurfaceZ};
use crate::error::{PlotError, PlotResult};
use crate::plugin::{Dispatch, SharedRegistry, dispatch};
use crate::raster::Raster;
use crate::scene::{Axis, Scene};

/// Operations every engine's figure supports.
///
/// Content and decorations are kept in a [`Scene`]; the provided methods
/// record into it and an engine only has to present it. Engines may override
/// any primitive to do more (the recording figure in the integration tests
/// counts calls this way).
pub trait FigureBackend: Send {
    fn engine_name(&self) -> &str;
    fn scene(&self) -> &Scene;
    fn scene_mut(&mut self) -> &mut Scene;

    /// Rasterize at the engine's save resolution.
    fn as_image(&self) -> PlotResult<Raster>;
    /// Export, with the format chosen by the file extension.
    fn save(&mut self, path: &Path) -> PlotResult<()>;
    /// Present the figure the way the current environment allows.
    fn show(&mut self, block: bool) -> PlotResult<()>;

    fn plot(&mut self, x: &[f64], y: Option<&[f64]>, z: Option<&[f64]>, style: &Style) -> PlotResult<()> {
        self.scene_mut().add_line(x, y, z, style)
    }

    fn scatter(&mut self, x: &[f64], y: Option<&[f64]>, z: Option<&[f64]>, style: &Style) -> PlotResult<()> {
        let style = Style {
            line_style: Some(LineStyle::None),
            ..style.clone()
        };
        self.plot(x, y, z, &style)
    }

    fn surface3d(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &SurfaceZ,
        options: &SurfaceOptions,
        style: &Style,
    ) -> PlotResult<()> {
        self.scene_mut().add_surface(x, y, z, options, style)
    }

    fn imshow(&mut self, image: &Image) -> PlotResult<()> {
        self.scene_mut().add_image(image)
    }

    fn title(&mut self, text: &str) -> PlotResult<()> {
        self.scene_mut().set_title(text)
    }

    fn xlabel(&mut self, text: &str) -> PlotResult<()> {
        self.scene_mut().set_label(Axis::X, text)
    }

    fn ylabel(&mut self, text: &str) -> PlotResult<()> {
        self.scene_mut().set_label(Axis::Y, text)
    }

    fn zlabel(&mut self, text: &str) -> PlotResult<()> {
        self.scene_mut().set_label(Axis::Z, text)
    }

    fn legend(&mut self, show: bool, equal_marker_size: bool, extra: &Extra) -> PlotResult<()> {
        self.scene_mut().set_legend(show, equal_marker_size, extra)
    }

    fn grid(&mut self, show: bool) -> PlotResult<()> {
        self.scene_mut().set_grid(show)
    }

    fn xlim(&mut self, min: Option<f64>, max: Option<f64>) -> PlotResult<()> {
        self.scene_mut().set_limit(Axis::X, min, max)
    }

    fn ylim(&mut self, min: Option<f64>, max: Option<f64>) -> PlotResult<()> {
        self.scene_mut().set_limit(Axis::Y, min, max)
    }

    fn zlim(&mut self, min: Option<f64>, max: Option<f64>) -> PlotResult<()> {
        self.scene_mut().set_limit(Axis::Z, min, max)
    }

    fn axis_aspect(&mut self, mode: AspectMode) -> PlotResult<()> {
        self.scene_mut().set_aspect(mode)
    }

    fn current_color(&self) -> PlotResult<Color> {
        self.scene().ensure_open()?;
        Ok(self.scene().current_color())
    }

    fn scroll_color(&mut self, count: isize) -> PlotResult<Color> {
        self.scene().ensure_open()?;
        Ok(self.scene_mut().scroll_color(count))
    }

    fn reset_color(&mut self) -> PlotResult<()> {
        self.scene().ensure_open()?;
        self.scene_mut().reset_color();
        Ok(())
    }

    fn is_3d(&self) -> Option<bool> {
        self.scene().is_3d()
    }

    fn close(&mut self) -> PlotResult<()> {
        self.scene().ensure_open()?;
        self.scene_mut().close();
        Ok(())
    }
}

/// A plot surface bound to one engine.
///
/// Every chainable call returns `PlotResult<&mut Figure>`:
///
/// ```ignore
/// let mut fig = uniplot::figure(None)?;
/// fig.plot(Series::xy(t, pos).name("position"))?
///     .title("run 7")?
///     .legend(true)?
///     .show()?;
/// ```
pub struct Figure {
    backend: Box<dyn FigureBackend>,
    plugins: SharedRegistry,
}

impl std::fmt::Debug for Figure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Figure")
            .field("engine", &self.backend.engine_name())
            .field("is_3d", &self.backend.is_3d())
            .field("traces", &self.backend.scene().traces().len())
            .finish()
    }
}

impl Figure {
    /// Custom objects passed to the plotting calls are looked up in `plugins`.
    pub fn new(backend: Box<dyn FigureBackend>, plugins: SharedRegistry) -> Self {
        Self { backend, plugins }
    }

    pub fn engine_name(&self) -> &str {
        self.backend.engine_name()
    }

    /// Read access to everything plotted so far.
    pub fn scene(&self) -> &Scene {
        self.backend.scene()
    }

    pub fn backend(&self) -> &dyn FigureBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn FigureBackend {
        self.backend.as_mut()
    }

    pub fn is_3d(&self) -> Option<bool> {
        self.backend.is_3d()
    }

    pub fn plot<'a>(&mut self, series: impl Into<Series<'a>>) -> PlotResult<&mut Self> {
        self.series(PlotKind::Plot, series.into())
    }

    /// Markers only: `plot` with the line style forced to none.
    pub fn scatter<'a>(&mut self, series: impl Into<Series<'a>>) -> PlotResult<&mut Self> {
        self.series(PlotKind::Scatter, series.into())
    }

    fn series(&mut self, kind: PlotKind, series: Series<'_>) -> PlotResult<&mut Self> {
        self.backend.scene().ensure_open()?;
        let Series { x, y, z, style } = series;
        match x {
            PlotInput::Values(x) => {
                line_primitive(self.backend.as_mut(), kind, &x, y.as_deref(), z.as_deref(), &style)?;
            }
            PlotInput::Object(obj) => {
                let backend = self.backend.as_mut();
                let coords_given = y.is_some() || z.is_some();
                let outcome = dispatch(&self.plugins, kind, &obj, coords_given, &style, |data, style| {
                    line_primitive(backend, kind, &data.x, Some(&data.y), data.z.as_deref(), &style)
                })?;
                if outcome == Dispatch::NotHandled {
                    return Err(unplottable(&obj, coords_given));
                }
            }
        }
        Ok(self)
    }

    pub fn surface3d<'a>(&mut self, surface: impl Into<Surface<'a>>) -> PlotResult<&mut Self> {
        let Surface {
            x,
            y,
            z,
            options,
            style,
        } = surface.into();
        self.backend.scene().ensure_open()?;
        match x {
            PlotInput::Values(x) => {
                let (Some(y), Some(z)) = (y, z) else {
                    return Err(PlotError::shape("surface3d needs x, y and z"));
                };
                self.backend.surface3d(&x, &y, &z, &options, &style)?;
            }
            PlotInput::Object(obj) => {
                let backend = self.backend.as_mut();
                let coords_given = y.is_some() || z.is_some();
                let outcome = dispatch(
                    &self.plugins,
                    PlotKind::Surface3d,
                    &obj,
                    coords_given,
                    &style,
                    |data, style| {
                        let z = data
                            .z
                            .ok_or_else(|| PlotError::shape("surface series extracted without z values"))?;
                        backend.surface3d(&data.x, &data.y, &SurfaceZ::Points(z), &options, &style)
                    },
                )?;
                if outcome == Dispatch::NotHandled {
                    return Err(unplottable(&obj, coords_given));
                }
            }
        }
        Ok(self)
    }

    pub fn imshow(&mut self, image: &Image) -> PlotResult<&mut Self> {
        self.backend.imshow(image)?;
        Ok(self)
    }

    pub fn title(&mut self, text: &str) -> PlotResult<&mut Self> {
        self.backend.title(text)?;
        Ok(self)
    }

    pub fn xlabel(&mut self, text: &str) -> PlotResult<&mut Self> {
        self.backend.xlabel(text)?;
        Ok(self)
    }

    pub fn ylabel(&mut self, text: &str) -> PlotResult<&mut Self> {
        self.backend.ylabel(text)?;
        Ok(self)
    }

    /// Ignored unless the figure has 3-D axes.
    pub fn zlabel(&mut self, text: &str) -> PlotResult<&mut Self> {
        self.backend.zlabel(text)?;
        Ok(self)
    }

    /// Show or remove the legend, with equally sized glyphs.
    pub fn legend(&mut self, show: bool) -> PlotResult<&mut Self> {
        self.legend_with(show, true, &Extra::new())
    }

    pub fn legend_with(&mut self, show: bool, equal_marker_size: bool, extra: &Extra) -> PlotResult<&mut Self> {
        self.backend.legend(show, equal_marker_size, extra)?;
        Ok(self)
    }

    pub fn grid(&mut self, show: bool) -> PlotResult<&mut Self> {
        self.backend.grid(show)?;
        Ok(self)
    }

    /// A `None` bound is estimated from the plotted data.
    pub fn xlim(&mut self, min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> PlotResult<&mut Self> {
        self.backend.xlim(min.into(), max.into())?;
        Ok(self)
    }

    pub fn ylim(&mut self, min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> PlotResult<&mut Self> {
        self.backend.ylim(min.into(), max.into())?;
        Ok(self)
    }

    pub fn zlim(&mut self, min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> PlotResult<&mut Self> {
        self.backend.zlim(min.into(), max.into())?;
        Ok(self)
    }

    pub fn axis_aspect(&mut self, mode: AspectMode) -> PlotResult<&mut Self> {
        self.backend.axis_aspect(mode)?;
        Ok(self)
    }

    pub fn current_color(&self) -> PlotResult<Color> {
        self.backend.current_color()
    }

    pub fn scroll_color(&mut self, count: isize) -> PlotResult<Color> {
        self.backend.scroll_color(count)
    }

    pub fn reset_color(&mut self) -> PlotResult<&mut Self> {
        self.backend.reset_color()?;
        Ok(self)
    }

    pub fn as_image(&self) -> PlotResult<Raster> {
        self.backend.scene().ensure_open()?;
        self.backend.as_image()
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> PlotResult<&mut Self> {
        self.backend.scene().ensure_open()?;
        self.backend.save(path.as_ref())?;
        Ok(self)
    }

    /// Present and wait for the window to be dismissed, where there is one.
    pub fn show(&mut self) -> PlotResult<&mut Self> {
        self.show_with(true)
    }

    pub fn show_with(&mut self, block: bool) -> PlotResult<&mut Self> {
        self.backend.scene().ensure_open()?;
        self.backend.show(block)?;
        Ok(self)
    }

    pub fn close(&mut self) -> PlotResult<()> {
        self.backend.close()
    }
}

fn line_primitive(
    backend: &mut dyn FigureBackend,
    kind: PlotKind,
    x: &[f64],
    y: Option<&[f64]>,
    z: Option<&[f64]>,
    style: &Style,
) -> PlotResult<()> {
    match kind {
        PlotKind::Scatter => backend.scatter(x, y, z, style),
        PlotKind::Plot | PlotKind::Surface3d => backend.plot(x, y, z, style),
    }
}

fn unplottable(obj: &crate::plugin::PlotObject<'_>, coords_given: bool) -> error_stack::Report<PlotError> {
    if coords_given {
        PlotError::shape(format!(
            "{obj:?} cannot be plotted against explicit coordinates, pass numeric arrays instead"
        ))
    } else {
        PlotError::lookup(format!("no plot plugin registered for {obj:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ImageData;
    use crate::plugin::{PlotData, PlotObject, PlotPlugin, TypeKey};
    use crate::settings::Settings;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scene-only backend: records, never presents.
    struct Offscreen(Scene);

    impl FigureBackend for Offscreen {
        fn engine_name(&self) -> &str {
            "offscreen"
        }
        fn scene(&self) -> &Scene {
            &self.0
        }
        fn scene_mut(&mut self) -> &mut Scene {
            &mut self.0
        }
        fn as_image(&self) -> PlotResult<Raster> {
            crate::raster::render(&self.0, 1.0)
        }
        fn save(&mut self, _: &Path) -> PlotResult<()> {
            Ok(())
        }
        fn show(&mut self, _: bool) -> PlotResult<()> {
            Ok(())
        }
    }

    fn figure(plugins: SharedRegistry) -> Figure {
        Figure::new(
            Box::new(Offscreen(Scene::new(100, 0.5, &Settings::default()))),
            plugins,
        )
    }

    struct Wave {
        samples: Vec<f64>,
    }

    struct WavePlugin;

    impl PlotPlugin for WavePlugin {
        fn extract_data(&self, obj: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
            let Some(wave) = obj.downcast_ref::<Wave>() else {
                return Ok(Vec::new());
            };
            let t: Vec<f64> = (0..wave.samples.len()).map(|i| i as f64).collect();
            Ok(vec![
                PlotData::new(t.clone(), wave.samples.clone()).with_name("raw"),
                PlotData::new(t.clone(), wave.samples.iter().map(|v| v * 2.0).collect())
                    .with_z(t),
            ])
        }
    }

    fn wave_plugins() -> SharedRegistry {
        let registry = SharedRegistry::default();
        registry
            .write()
            .register(TypeKey::of::<Wave>(), Arc::new(WavePlugin), false);
        registry
    }

    #[test]
    fn chained_calls_record_into_the_scene() {
        let mut fig = figure(SharedRegistry::default());
        fig.plot(Series::xy([0.0, 1.0], [2.0, 3.0]).name("a"))
            .unwrap()
            .scatter(vec![1.0, 2.0])
            .unwrap()
            .title("t")
            .unwrap()
            .legend(true)
            .unwrap()
            .xlim(None, 5.0)
            .unwrap();
        let scene = fig.scene();
        assert_eq!(scene.traces().len(), 2);
        assert_eq!(scene.decorations().title.as_deref(), Some("t"));
        assert!(scene.decorations().legend.is_some());
        assert_eq!(scene.decorations().xlim.map(|l| l.1), Some(5.0));
    }

    #[test]
    fn objects_go_through_their_plugin() {
        let mut fig = figure(wave_plugins());
        let wave = Wave {
            samples: vec![1.0, 2.0, 3.0],
        };
        fig.plot(Series::object(PlotObject::new(&wave)).name("caller")).unwrap();
        // The second series carries z, forcing 3-D axes and dropping the first.
        assert_eq!(fig.is_3d(), Some(true));
        assert_eq!(fig.scene().traces().len(), 1);
        assert_eq!(fig.scene().traces()[0].name(), Some("caller"));
    }

    #[test]
    fn unknown_objects_are_lookup_errors() {
        let mut fig = figure(SharedRegistry::default());
        let wave = Wave { samples: vec![1.0] };
        let err = fig.plot(PlotObject::new(&wave)).unwrap_err();
        let PlotError::Lookup(message) = err.current_context() else {
            panic!("expected a lookup error, got {err:?}");
        };
        assert!(message.contains("Wave"), "{message}");
    }

    #[test]
    fn surface_objects_use_extracted_points() {
        let mut fig = figure(wave_plugins());
        let wave = Wave {
            samples: vec![0.0, 1.0, 0.5],
        };
        let err = fig.surface3d(PlotObject::new(&wave)).unwrap_err();
        // The first extracted series has no z.
        assert!(matches!(err.current_context(), PlotError::Shape(_)));
    }

    #[test]
    fn closed_figures_refuse_everything() {
        let mut fig = figure(SharedRegistry::default());
        fig.plot(vec![1.0, 2.0]).unwrap();
        fig.close().unwrap();
        for err in [
            fig.plot(vec![1.0]).map(|_| ()).unwrap_err(),
            fig.title("late").map(|_| ()).unwrap_err(),
            fig.current_color().map(|_| ()).unwrap_err(),
            fig.as_image().map(|_| ()).unwrap_err(),
            fig.show().map(|_| ()).unwrap_err(),
            fig.close().unwrap_err(),
        ] {
            assert_eq!(err.current_context(), &PlotError::UseAfterClose);
        }
    }

    struct Counted;

    /// Counts extraction calls and never yields a series.
    struct CountingPlugin(Arc<AtomicUsize>);

    impl PlotPlugin for CountingPlugin {
        fn extract_data(&self, _: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[test]
    fn closed_figures_refuse_custom_objects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let plugins = SharedRegistry::default();
        plugins.write().register(
            TypeKey::of::<Counted>(),
            Arc::new(CountingPlugin(Arc::clone(&calls))),
            false,
        );
        let mut fig = figure(plugins);
        fig.plot(PlotObject::new(&Counted)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        fig.close().unwrap();

        let wave = Wave { samples: vec![1.0] };
        for err in [
            fig.plot(PlotObject::new(&Counted)).map(|_| ()).unwrap_err(),
            fig.scatter(PlotObject::new(&Counted)).map(|_| ()).unwrap_err(),
            fig.surface3d(PlotObject::new(&Counted)).map(|_| ()).unwrap_err(),
            fig.plot(PlotObject::new(&wave)).map(|_| ()).unwrap_err(),
        ] {
            assert_eq!(err.current_context(), &PlotError::UseAfterClose);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn color_passthrough() {
        let mut fig = figure(SharedRegistry::default());
        let first = fig.current_color().unwrap();
        assert_eq!(fig.scroll_color(1).unwrap(), first);
        assert_ne!(fig.current_color().unwrap(), first);
        fig.reset_color().unwrap();
        assert_eq!(fig.current_color().unwrap(), first);
    }

    #[test]
    fn imshow_forces_flat_axes() {
        let mut fig = figure(SharedRegistry::default());
        fig.plot(Series::xyz([0.0], [0.0], [0.0])).unwrap();
        fig.imshow(&Image::gray(1, 1, ImageData::F64(vec![0.5]))).unwrap();
        assert_eq!(fig.is_3d(), Some(false));
    }
}
