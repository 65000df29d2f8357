//! Figure creation: which engine, which plugins, which defaults.

use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::engine::{Engine, EngineRegistry};
use crate::error::{PlotError, PlotResult};
use crate::figure::Figure;
use crate::plugin::{self, SharedRegistry};
use crate::settings::{Settings, check_aspect_ratio};

/// Per-call overrides of the session defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FigureOptions {
    pub engine: Option<String>,
    pub width: Option<u32>,
    pub aspect_ratio: Option<f64>,
}

impl FigureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }
}

/// Everything a figure is created from, plus the engine the previous
/// figure was created with.
pub struct Session {
    engines: EngineRegistry,
    plugins: SharedRegistry,
    settings: Settings,
    current: Option<Arc<dyn Engine>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("engines", &self.engines)
            .field("current", &self.current.as_ref().map(|e| e.name().to_string()))
            .field("settings", &self.settings)
            .finish()
    }
}

impl Session {
    /// A session with the built-in engines and a private plugin registry.
    pub fn new(settings: Settings) -> PlotResult<Self> {
        settings.validate()?;
        Ok(Self {
            engines: EngineRegistry::with_builtin(&settings),
            plugins: SharedRegistry::default(),
            settings,
            current: None,
        })
    }

    pub fn with_engines(mut self, engines: EngineRegistry) -> Self {
        self.engines = engines;
        self.current = None;
        self
    }

    /// Share a plugin registry, for instance [`plugin::global`].
    pub fn with_plugins(mut self, plugins: SharedRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn engines(&self) -> &EngineRegistry {
        &self.engines
    }

    pub fn engines_mut(&mut self) -> &mut EngineRegistry {
        &mut self.engines
    }

    pub fn plugins(&self) -> &SharedRegistry {
        &self.plugins
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Engine the last figure was created with.
    pub fn current_engine(&self) -> Option<&str> {
        self.current.as_ref().map(|engine| engine.name())
    }

    /// A figure of the default size. `None` reuses the engine of the previous
    /// figure, or the registry default for the first one.
    pub fn figure(&mut self, engine: Option<&str>) -> PlotResult<Figure> {
        let options = FigureOptions {
            engine: engine.map(str::to_string),
            ..FigureOptions::default()
        };
        self.figure_with(&options)
    }

    pub fn figure_with(&mut self, options: &FigureOptions) -> PlotResult<Figure> {
        let width = options.width.unwrap_or(self.settings.figure_width);
        let aspect_ratio = options.aspect_ratio.unwrap_or(self.settings.figure_aspect_ratio);
        check_aspect_ratio(aspect_ratio)?;
        if width == 0 {
            return Err(PlotError::configuration("figure width must be positive"));
        }

        let engine = match (options.engine.as_deref(), &self.current) {
            (None, Some(current)) => Arc::clone(current),
            (name, _) => self.engines.get(name)?,
        };
        debug!(engine = engine.name(), width, aspect_ratio, "creating figure");
        let backend = engine.figure(width, aspect_ratio);
        self.current = Some(engine);
        Ok(Figure::new(backend, Arc::clone(&self.plugins)))
    }
}

static DEFAULT: LazyLock<Mutex<Option<Session>>> = LazyLock::new(|| Mutex::new(None));

/// The process-wide session behind [`figure`] and [`figure_with`], created
/// with default settings and the global plugin registry on first use.
pub fn default_session() -> PlotResult<MutexGuard<'static, Option<Session>>> {
    let mut guard = DEFAULT.lock();
    if guard.is_none() {
        let session = Session::new(Settings::default())?.with_plugins(Arc::clone(plugin::global()));
        debug!(engines = ?session.engines().available(), "default session ready");
        *guard = Some(session);
    }
    Ok(guard)
}

/// Create a figure in the default session.
///
/// `None` reuses the engine of the previous figure, or picks the first
/// available of `desktop`, `desktop-nogui` and `web`.
pub fn figure(engine: Option<&str>) -> PlotResult<Figure> {
    with_default(|session| session.figure(engine))
}

pub fn figure_with(options: &FigureOptions) -> PlotResult<Figure> {
    with_default(|session| session.figure_with(options))
}

fn with_default<T>(f: impl FnOnce(&mut Session) -> PlotResult<T>) -> PlotResult<T> {
    let mut guard = default_session()?;
    match guard.as_mut() {
        Some(session) => f(session),
        None => Err(PlotError::configuration("default session is not initialized")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DesktopEngine, WebEngine};

    fn session() -> Session {
        let mut engines = EngineRegistry::new();
        engines.register(Arc::new(DesktopEngine::headless(Settings::default())), "desktop-nogui");
        engines.register(Arc::new(WebEngine::new(Settings::default())), "web");
        Session::new(Settings::default()).unwrap().with_engines(engines)
    }

    #[test]
    fn remembers_last_engine() {
        let mut s = session();
        assert_eq!(s.current_engine(), None);
        assert_eq!(s.figure(None).unwrap().engine_name(), "desktop-nogui");
        assert_eq!(s.figure(Some("web")).unwrap().engine_name(), "web");
        assert_eq!(s.current_engine(), Some("web"));
        assert_eq!(s.figure(None).unwrap().engine_name(), "web");
    }

    #[test]
    fn failed_lookup_keeps_last_engine() {
        let mut s = session();
        s.figure(Some("web")).unwrap();
        assert!(s.figure(Some("missing")).is_err());
        assert_eq!(s.current_engine(), Some("web"));
    }

    #[test]
    fn validates_size() {
        let mut s = session();
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let err = s
                .figure_with(&FigureOptions::new().aspect_ratio(ratio))
                .unwrap_err();
            assert!(matches!(err.current_context(), PlotError::Configuration(_)));
        }
        let err = s.figure_with(&FigureOptions::new().width(0)).unwrap_err();
        assert!(matches!(err.current_context(), PlotError::Configuration(_)));
        assert_eq!(s.current_engine(), None);

        let fig = s
            .figure_with(&FigureOptions::new().width(500).aspect_ratio(1.0))
            .unwrap();
        assert_eq!(fig.scene().size(), (500, 500));
    }

    #[test]
    fn empty_session_is_a_configuration_error() {
        let mut s = Session::new(Settings::default())
            .unwrap()
            .with_engines(EngineRegistry::new());
        let err = s.figure(None).unwrap_err();
        assert!(matches!(err.current_context(), PlotError::Configuration(_)));
    }

    #[test]
    fn rejects_invalid_settings() {
        let settings = Settings::default().figure_aspect_ratio(2.0);
        assert!(Session::new(settings).is_err());
    }
}
