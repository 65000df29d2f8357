//! Routing of plotting calls whose primary argument is a custom object.

use tracing::debug;

use super::{PlotData, PlotKind, PlotObject, SharedRegistry};
use crate::core::Style;
use crate::error::PlotResult;

/// Outcome of [`dispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler took the call and issued this many series (possibly zero).
    Handled(usize),
    /// Not a registered custom object; the caller continues on its numeric path.
    NotHandled,
}

impl Dispatch {
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// Offer a plotting call to the plugin registered for `obj`'s type.
///
/// `coords_given` is true when the call also carried explicit `y` or `z`
/// arrays, in which case the call is never a custom-object call. Otherwise
/// every series the handler extracts is styled through
/// [`PlotPlugin::update_style`](super::PlotPlugin::update_style) and fed to
/// `primitive`. A failing handler or primitive aborts the loop; series issued
/// before the failure stay drawn.
pub fn dispatch<F>(
    registry: &SharedRegistry,
    kind: PlotKind,
    obj: &PlotObject<'_>,
    coords_given: bool,
    style: &Style,
    mut primitive: F,
) -> PlotResult<Dispatch>
where
    F: FnMut(PlotData, Style) -> PlotResult<()>,
{
    if coords_given {
        return Ok(Dispatch::NotHandled);
    }

    let key = obj.type_key();
    // The lock is released before the handler runs so a handler may consult
    // or extend the registry itself.
    let Some(handler) = registry.read().get_handler(&key) else {
        debug!(?key, "no plot plugin registered");
        return Ok(Dispatch::NotHandled);
    };

    let items = handler.extract_data(obj)?;
    let count = items.len();
    debug!(?key, ?kind, count, "dispatching custom object");

    for (index, item) in items.into_iter().enumerate() {
        let data_name = item.name.clone().or_else(|| style.name.clone());
        let series_style = handler.update_style(
            kind,
            index,
            count,
            data_name.as_deref(),
            style.legend_group.as_deref(),
            style.clone(),
        );
        primitive(item, series_style)?;
    }

    Ok(Dispatch::Handled(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;
    use crate::plugin::{PlotPlugin, TypeKey};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Trio;

    struct ThreeSeries {
        calls: Mutex<Vec<(usize, usize, Option<String>)>>,
    }

    impl PlotPlugin for ThreeSeries {
        fn extract_data(&self, _: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
            Ok((0..3)
                .map(|i| {
                    let data = PlotData::new(vec![0.0, 1.0], vec![i as f64, i as f64]);
                    if i == 1 { data } else { data.with_name(format!("s{i}")) }
                })
                .collect())
        }

        fn update_style(
            &self,
            _: PlotKind,
            data_index: usize,
            data_count: usize,
            data_name: Option<&str>,
            group_name: Option<&str>,
            style: Style,
        ) -> Style {
            self.calls
                .lock()
                .push((data_index, data_count, data_name.map(str::to_string)));
            let mut style = style;
            style.name = data_name.map(str::to_string);
            style.legend_group = group_name.map(|g| format!("{g}/{data_index}"));
            style
        }
    }

    fn registry_with(key: TypeKey, handler: Arc<dyn PlotPlugin>) -> SharedRegistry {
        let registry = SharedRegistry::default();
        registry.write().register(key, handler, false);
        registry
    }

    #[test]
    fn explicit_coordinates_short_circuit() {
        struct Panicking;
        impl PlotPlugin for Panicking {
            fn extract_data(&self, _: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
                panic!("handler must not run");
            }
        }
        let registry = registry_with(TypeKey::of::<Trio>(), Arc::new(Panicking));
        let obj = Trio;
        let out = dispatch(
            &registry,
            PlotKind::Plot,
            &PlotObject::new(&obj),
            true,
            &Style::default(),
            |_, _| panic!("primitive must not run"),
        )
        .unwrap();
        assert_eq!(out, Dispatch::NotHandled);
    }

    #[test]
    fn unregistered_type_is_not_handled() {
        let registry = SharedRegistry::default();
        let obj = Trio;
        let out = dispatch(
            &registry,
            PlotKind::Scatter,
            &PlotObject::new(&obj),
            false,
            &Style::default(),
            |_, _| Ok(()),
        )
        .unwrap();
        assert!(!out.is_handled());
    }

    #[test]
    fn fans_out_one_call_per_series() {
        let handler = Arc::new(ThreeSeries {
            calls: Mutex::new(Vec::new()),
        });
        let registry = registry_with(TypeKey::of::<Trio>(), handler.clone());
        let obj = Trio;
        let style = Style::default().name("caller").legend_group("g");
        let mut issued = Vec::new();

        let out = dispatch(
            &registry,
            PlotKind::Plot,
            &PlotObject::new(&obj),
            false,
            &style,
            |data, style| {
                issued.push((data, style));
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(out, Dispatch::Handled(3));
        assert_eq!(
            *handler.calls.lock(),
            vec![
                (0, 3, Some("s0".to_string())),
                (1, 3, Some("caller".to_string())),
                (2, 3, Some("s2".to_string())),
            ]
        );
        let names: Vec<_> = issued.iter().map(|(_, s)| s.name.clone().unwrap()).collect();
        assert_eq!(names, ["s0", "caller", "s2"]);
        assert_eq!(issued[2].0.y, vec![2.0, 2.0]);
        assert_eq!(issued[1].1.legend_group.as_deref(), Some("g/1"));
    }

    #[test]
    fn empty_extraction_is_handled() {
        struct Nothing;
        impl PlotPlugin for Nothing {
            fn extract_data(&self, _: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
                Ok(Vec::new())
            }
        }
        let registry = registry_with(TypeKey::of::<Trio>(), Arc::new(Nothing));
        let obj = Trio;
        let out = dispatch(
            &registry,
            PlotKind::Surface3d,
            &PlotObject::new(&obj),
            false,
            &Style::default(),
            |_, _| panic!("nothing to draw"),
        )
        .unwrap();
        assert_eq!(out, Dispatch::Handled(0));
    }

    #[test]
    fn handler_errors_propagate_unchanged() {
        struct Broken;
        impl PlotPlugin for Broken {
            fn extract_data(&self, _: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
                Err(PlotError::shape("sensor trace has no samples"))
            }
        }
        let registry = registry_with(TypeKey::of::<Trio>(), Arc::new(Broken));
        let obj = Trio;
        let err = dispatch(
            &registry,
            PlotKind::Plot,
            &PlotObject::new(&obj),
            false,
            &Style::default(),
            |_, _| Ok(()),
        )
        .unwrap_err();
        assert_eq!(
            err.current_context(),
            &PlotError::Shape("sensor trace has no samples".into())
        );
    }

    #[test]
    fn primitive_failure_keeps_earlier_series() {
        let handler = Arc::new(ThreeSeries {
            calls: Mutex::new(Vec::new()),
        });
        let registry = registry_with(TypeKey::of::<Trio>(), handler);
        let obj = Trio;
        let mut drawn = 0;
        let err = dispatch(
            &registry,
            PlotKind::Plot,
            &PlotObject::new(&obj),
            false,
            &Style::default(),
            |_, _| {
                if drawn == 2 {
                    return Err(PlotError::lookup("unknown color"));
                }
                drawn += 1;
                Ok(())
            },
        );
        assert!(err.is_err());
        assert_eq!(drawn, 2);
    }

    #[test]
    fn homogeneous_lists_use_their_own_key() {
        let handler = Arc::new(ThreeSeries {
            calls: Mutex::new(Vec::new()),
        });
        let registry = registry_with(TypeKey::list_of::<Trio>(), handler);
        let objs = [Trio, Trio];
        let mut issued = 0;
        let out = dispatch(
            &registry,
            PlotKind::Plot,
            &PlotObject::list(&objs),
            false,
            &Style::default(),
            |_, _| {
                issued += 1;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(out, Dispatch::Handled(3));
        assert_eq!(issued, 3);

        let single = Trio;
        let out = dispatch(
            &registry,
            PlotKind::Plot,
            &PlotObject::new(&single),
            false,
            &Style::default(),
            |_, _| Ok(()),
        )
        .unwrap();
        assert_eq!(out, Dispatch::NotHandled);
    }
}
