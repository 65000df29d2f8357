use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use super::PlotPlugin;

/// Identity a plot plugin is registered under.
///
/// `ListOf(T)` / `TupleOf(T)` are the inferred keys of homogeneous
/// collections; `List` / `Tuple` are the raw container keys that empty or
/// mixed collections fall back to. All of them differ from each other and
/// from `Type(..)` of any concrete collection type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Type(TypeId),
    ListOf(TypeId),
    TupleOf(TypeId),
    List,
    Tuple,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        Self::Type(TypeId::of::<T>())
    }

    pub fn list_of<T: Any>() -> Self {
        Self::ListOf(TypeId::of::<T>())
    }

    pub fn tuple_of<T: Any>() -> Self {
        Self::TupleOf(TypeId::of::<T>())
    }

    pub(crate) fn from_id(id: TypeId) -> Self {
        Self::Type(id)
    }
}

#[derive(Default)]
pub struct TypeRegistry {
    handlers: HashMap<TypeKey, Arc<dyn PlotPlugin>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `handler`. An already bound key is left untouched and
    /// `false` returned, unless `force` is set.
    pub fn register(&mut self, key: TypeKey, handler: Arc<dyn PlotPlugin>, force: bool) -> bool {
        if self.handlers.contains_key(&key) && !force {
            debug!(?key, "plot plugin already registered, keeping existing handler");
            return false;
        }
        self.handlers.insert(key, handler);
        true
    }

    pub fn is_registered(&self, key: &TypeKey) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn get_handler(&self, key: &TypeKey) -> Option<Arc<dyn PlotPlugin>> {
        self.handlers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Registry handle shared between a session and the figures it creates.
pub type SharedRegistry = Arc<RwLock<TypeRegistry>>;

static GLOBAL: LazyLock<SharedRegistry> = LazyLock::new(SharedRegistry::default);

/// Process-wide registry used by the default session.
pub fn global() -> &'static SharedRegistry {
    &GLOBAL
}

pub fn register(key: TypeKey, handler: Arc<dyn PlotPlugin>, force: bool) -> bool {
    GLOBAL.write().register(key, handler, force)
}

/// Register `handler` for objects of type `T` in the process-wide registry.
pub fn register_type<T: Any>(handler: impl PlotPlugin + 'static, force: bool) -> bool {
    register(TypeKey::of::<T>(), Arc::new(handler), force)
}

pub fn is_registered(key: &TypeKey) -> bool {
    GLOBAL.read().is_registered(key)
}

pub fn get_handler(key: &TypeKey) -> Option<Arc<dyn PlotPlugin>> {
    GLOBAL.read().get_handler(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotResult;
    use crate::plugin::{PlotData, PlotObject};

    struct Tagged(&'static str);

    impl PlotPlugin for Tagged {
        fn extract_data(&self, _: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
            Ok(vec![PlotData::new(vec![0.0], vec![0.0]).with_name(self.0)])
        }
    }

    fn tag(registry: &TypeRegistry, key: &TypeKey) -> Option<String> {
        let probe = 0u8;
        registry
            .get_handler(key)?
            .extract_data(&PlotObject::new(&probe))
            .ok()?
            .pop()?
            .name
    }

    struct Sample;

    #[test]
    fn second_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        let key = TypeKey::of::<Sample>();
        assert!(registry.register(key, Arc::new(Tagged("h1")), false));
        assert!(!registry.register(key, Arc::new(Tagged("h2")), false));
        assert_eq!(tag(&registry, &key).as_deref(), Some("h1"));
    }

    #[test]
    fn force_overwrites() {
        let mut registry = TypeRegistry::new();
        let key = TypeKey::of::<Sample>();
        registry.register(key, Arc::new(Tagged("h1")), false);
        assert!(registry.register(key, Arc::new(Tagged("h2")), true));
        assert_eq!(tag(&registry, &key).as_deref(), Some("h2"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn handler_identity_is_preserved() {
        let mut registry = TypeRegistry::new();
        let h1: Arc<dyn PlotPlugin> = Arc::new(Tagged("h1"));
        registry.register(TypeKey::of::<Sample>(), h1.clone(), false);
        let got = registry.get_handler(&TypeKey::of::<Sample>()).unwrap();
        assert!(Arc::ptr_eq(&got, &h1));
    }

    #[test]
    fn unknown_key_is_absent() {
        let registry = TypeRegistry::new();
        assert!(!registry.is_registered(&TypeKey::of::<Sample>()));
        assert!(registry.get_handler(&TypeKey::of::<Sample>()).is_none());
    }

    #[test]
    fn collection_keys_are_distinct() {
        let keys = [
            TypeKey::of::<Sample>(),
            TypeKey::list_of::<Sample>(),
            TypeKey::tuple_of::<Sample>(),
            TypeKey::of::<Vec<Sample>>(),
            TypeKey::List,
            TypeKey::Tuple,
        ];
        let mut registry = TypeRegistry::new();
        for key in keys {
            assert!(registry.register(key, Arc::new(Tagged("h")), false));
        }
        assert_eq!(registry.len(), keys.len());
    }

    #[test]
    fn global_helpers_share_one_table() {
        struct GlobalOnly;
        assert!(register_type::<GlobalOnly>(Tagged("g"), false));
        assert!(!register_type::<GlobalOnly>(Tagged("g2"), false));
        assert!(is_registered(&TypeKey::of::<GlobalOnly>()));
        assert!(get_handler(&TypeKey::of::<GlobalOnly>()).is_some());
    }
}
