use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::desktop::{DESKTOP, DESKTOP_NOGUI, DesktopEngine};
use super::web::{WEB, WebEngine};
use super::Engine;
use crate::error::{PlotError, PlotResult};
use crate::settings::Settings;

/// Engines by case-insensitive name, in registration order. The first
/// registered engine is the default.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    entries: Vec<(String, Arc<dyn Engine>)>,
    aliases: HashMap<String, String>,
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.available())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The engines shipped with the crate: `desktop` (when built with the
    /// `desktop` feature), `desktop-nogui` and `web`.
    pub fn with_builtin(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DesktopEngine::new(settings.clone())), DESKTOP);
        registry.register(Arc::new(DesktopEngine::headless(settings.clone())), DESKTOP_NOGUI);
        registry.register(Arc::new(WebEngine::new(settings.clone())), WEB);
        registry.register_alias("gui", DESKTOP);
        registry.register_alias("nogui", DESKTOP_NOGUI);
        registry.register_alias("html", WEB);
        registry.register_alias("browser", WEB);
        registry
    }

    /// Add `engine` under `name`. Returns false, leaving the registry
    /// unchanged, when the engine is unavailable or the name is taken by an
    /// engine or an alias.
    pub fn register(&mut self, engine: Arc<dyn Engine>, name: &str) -> bool {
        let key = name.to_lowercase();
        if !engine.is_available() {
            debug!(engine = %key, "engine unavailable, not registered");
            return false;
        }
        if self.position(&key).is_some() {
            warn!(engine = %key, "an engine is already registered under this name");
            return false;
        }
        if let Some(target) = self.aliases.get(&key) {
            warn!(engine = %key, %target, "name is already an alias");
            return false;
        }
        debug!(engine = %key, "registered engine");
        self.entries.push((key, engine));
        true
    }

    /// Make `alias` resolve to the engine registered as `target`. Returns
    /// false when `target` is not registered or `alias` is already in use.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> bool {
        let (alias, target) = (alias.to_lowercase(), target.to_lowercase());
        if self.position(&target).is_none()
            || self.position(&alias).is_some()
            || self.aliases.contains_key(&alias)
        {
            return false;
        }
        self.aliases.insert(alias, target);
        true
    }

    /// The engine registered as `name`, or the default engine for `None`.
    pub fn get(&self, name: Option<&str>) -> PlotResult<Arc<dyn Engine>> {
        let Some(name) = name else {
            return self
                .entries
                .first()
                .map(|(_, engine)| Arc::clone(engine))
                .ok_or_else(|| PlotError::configuration("no plotting engine is available"));
        };
        let key = name.to_lowercase();
        let resolved = self.aliases.get(&key).unwrap_or(&key);
        self.position(resolved)
            .map(|i| Arc::clone(&self.entries[i].1))
            .ok_or_else(|| {
                PlotError::lookup(format!(
                    "engine '{name}' is not available, use one of: {}",
                    self.available().join(", ")
                ))
            })
    }

    /// Registered engine names, default first.
    pub fn available(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == key)
    }
}
