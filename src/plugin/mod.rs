//! Plotting support for custom objects.
//!
//! A [`PlotPlugin`] turns an object of a registered type into one or more
//! [`PlotData`] series. Registration is keyed by [`TypeKey`]: a concrete Rust
//! type, or a homogeneous list/tuple of one.
//!
//! ```ignore
//! struct Trajectory { t: Vec<f64>, pos: Vec<f64> }
//!
//! struct TrajectoryPlugin;
//!
//! impl PlotPlugin for TrajectoryPlugin {
//!     fn extract_data(&self, obj: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
//!         let Some(t) = obj.downcast_ref::<Trajectory>() else { return Ok(vec![]) };
//!         Ok(vec![PlotData::new(t.t.clone(), t.pos.clone()).with_name("position")])
//!     }
//! }
//!
//! uniplot::plugin::register_type::<Trajectory>(TrajectoryPlugin, false);
//! fig.plot(PlotObject::new(&trajectory))?;
//! ```

pub mod dispatch;
pub mod registry;

use std::any::Any;

pub use crate::core::PlotKind;
use crate::core::Style;
use crate::error::PlotResult;
pub use dispatch::{Dispatch, dispatch};
pub use registry::{
    SharedRegistry, TypeKey, TypeRegistry, get_handler, global, is_registered, register,
    register_type,
};

/// One plottable series extracted from a custom object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Option<Vec<f64>>,
    pub name: Option<String>,
}

impl PlotData {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            z: None,
            name: None,
        }
    }

    pub fn with_z(mut self, z: Vec<f64>) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Borrowed view of a custom object handed to the plotting calls.
#[derive(Clone)]
pub enum PlotObject<'a> {
    Single {
        obj: &'a dyn Any,
        type_name: &'static str,
    },
    List {
        items: Vec<&'a dyn Any>,
        /// Element type name, when built from a typed slice.
        element: Option<&'static str>,
    },
    Tuple(Vec<&'a dyn Any>),
}

impl<'a> PlotObject<'a> {
    pub fn new<T: Any>(obj: &'a T) -> Self {
        Self::Single {
            obj,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// A homogeneous list; keyed as [`TypeKey::list_of::<T>()`] when non-empty.
    pub fn list<T: Any>(items: &'a [T]) -> Self {
        Self::List {
            items: items.iter().map(|item| item as &dyn Any).collect(),
            element: Some(std::any::type_name::<T>()),
        }
    }

    pub fn list_any(items: Vec<&'a dyn Any>) -> Self {
        Self::List { items, element: None }
    }

    pub fn tuple_any(items: Vec<&'a dyn Any>) -> Self {
        Self::Tuple(items)
    }

    /// The key a handler is looked up by.
    ///
    /// Lists and tuples sample their first element and confirm every element
    /// shares its type; empty or mixed collections fall back to the raw
    /// container key.
    pub fn type_key(&self) -> TypeKey {
        match self {
            Self::Single { obj, .. } => TypeKey::from_id((**obj).type_id()),
            Self::List { items, .. } => match homogeneous(items) {
                Some(id) => TypeKey::ListOf(id),
                None => TypeKey::List,
            },
            Self::Tuple(items) => match homogeneous(items) {
                Some(id) => TypeKey::TupleOf(id),
                None => TypeKey::Tuple,
            },
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match self {
            Self::Single { obj, .. } => {
                let obj: &'a dyn Any = *obj;
                obj.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    /// Elements of a list/tuple, if every one of them is a `T`.
    pub fn items<T: Any>(&self) -> Option<Vec<&'a T>> {
        match self {
            Self::List { items, .. } | Self::Tuple(items) => {
                items
                    .iter()
                    .map(|item| {
                        let item: &'a dyn Any = *item;
                        item.downcast_ref::<T>()
                    })
                    .collect()
            }
            Self::Single { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::List { items, .. } | Self::Tuple(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn homogeneous(items: &[&dyn Any]) -> Option<std::any::TypeId> {
    let first = (**items.first()?).type_id();
    items
        .iter()
        .all(|item| (**item).type_id() == first)
        .then_some(first)
}

impl std::fmt::Debug for PlotObject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single { type_name, .. } => write!(f, "{type_name}"),
            Self::List {
                items,
                element: Some(element),
            } => write!(f, "list of {} {element}", items.len()),
            Self::List { items, element: None } => write!(f, "PlotObject::List(len={})", items.len()),
            Self::Tuple(items) => write!(f, "PlotObject::Tuple(len={})", items.len()),
        }
    }
}

/// Data-extraction and style-adjustment strategy for one registered type.
pub trait PlotPlugin: Send + Sync {
    /// Extract the series to plot. Returning no series is not an error.
    fn extract_data(&self, obj: &PlotObject<'_>) -> PlotResult<Vec<PlotData>>;

    /// Fine-tune the style of series `data_index` out of `data_count`.
    ///
    /// `style` carries the caller's original style; `data_name` is the
    /// series' own name or, failing that, the caller's name.
    fn update_style(
        &self,
        kind: PlotKind,
        data_index: usize,
        data_count: usize,
        data_name: Option<&str>,
        group_name: Option<&str>,
        style: Style,
    ) -> Style {
        let _ = (kind, data_index, data_count, group_name);
        let mut style = style;
        if let Some(name) = data_name {
            style.name = Some(name.to_string());
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(u8);
    struct Other;

    #[test]
    fn single_object_key_is_its_type() {
        let p = Probe(1);
        assert_eq!(PlotObject::new(&p).type_key(), TypeKey::of::<Probe>());
        assert_eq!(PlotObject::new(&p).downcast_ref::<Probe>().map(|p| p.0), Some(1));
        assert!(PlotObject::new(&p).downcast_ref::<Other>().is_none());
    }

    #[test]
    fn collection_keys_sample_element_types() {
        let probes = [Probe(1), Probe(2)];
        assert_eq!(PlotObject::list(&probes).type_key(), TypeKey::list_of::<Probe>());

        let (a, b) = (Probe(3), Other);
        let mixed = PlotObject::tuple_any(vec![&a as &dyn Any, &b as &dyn Any]);
        assert_eq!(mixed.type_key(), TypeKey::Tuple);
        assert!(mixed.items::<Probe>().is_none());

        let same = PlotObject::tuple_any(vec![&a as &dyn Any, &probes[0] as &dyn Any]);
        assert_eq!(same.type_key(), TypeKey::tuple_of::<Probe>());
        assert_eq!(same.items::<Probe>().map(|v| v.len()), Some(2));

        let empty: [Probe; 0] = [];
        assert_eq!(PlotObject::list(&empty).type_key(), TypeKey::List);
    }

    #[test]
    fn debug_output_names_the_type() {
        let p = Probe(1);
        let single = format!("{:?}", PlotObject::new(&p));
        assert!(single.ends_with("Probe"), "{single}");
        assert!(!single.contains("TypeId"), "{single}");

        let probes = [Probe(1), Probe(2)];
        let list = format!("{:?}", PlotObject::list(&probes));
        assert!(list.starts_with("list of 2 "), "{list}");
        assert!(list.ends_with("Probe"), "{list}");
    }

    #[test]
    fn default_update_style_names_series() {
        struct Noop;
        impl PlotPlugin for Noop {
            fn extract_data(&self, _: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
                Ok(vec![])
            }
        }
        let base = Style::default().name("caller").color("red");
        let named = Noop.update_style(PlotKind::Plot, 0, 1, Some("s1"), None, base.clone());
        assert_eq!(named.name.as_deref(), Some("s1"));
        assert_eq!(named.color.as_deref(), Some("red"));
        let unnamed = Noop.update_style(PlotKind::Plot, 0, 1, None, None, base.clone());
        assert_eq!(unnamed, base);
    }
}
