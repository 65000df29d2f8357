//! Engine-agnostic plotting.
//!
//! A [`Figure`] is created from one of several interchangeable engines (a
//! native Bevy window, a headless file exporter, or plotly.js pages in the
//! browser) and accepts the same calls whichever engine backs it. Objects
//! that are not plain numeric arrays become plottable by registering a
//! [`PlotPlugin`] for their type.
//!
//! ```ignore
//! use uniplot::prelude::*;
//!
//! let mut fig = uniplot::figure(Some("web"))?;
//! fig.plot(Series::xy(vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 2.0]).name("run"))?
//!     .title("example")?
//!     .legend(true)?
//!     .save("example.html")?;
//! ```

pub mod color;
pub mod core;
pub mod data;
pub mod engine;
pub mod error;
pub mod figure;
pub mod plugin;
pub mod raster;
pub mod scene;
pub mod session;
pub mod settings;

#[cfg(feature = "desktop")]
pub mod render;
#[cfg(feature = "desktop")]
pub mod runtime;

pub use error::{PlotError, PlotResult};
pub use figure::{Figure, FigureBackend};
pub use plugin::{PlotData, PlotObject, PlotPlugin};
pub use session::{FigureOptions, Session, default_session, figure, figure_with};
pub use settings::Settings;

pub mod prelude {
    pub use crate::color::ColorScroller;
    pub use crate::core::*;
    pub use crate::data::*;
    pub use crate::engine::{Engine, EngineRegistry};
    pub use crate::error::{PlotError, PlotResult};
    pub use crate::figure::{Figure, FigureBackend};
    pub use crate::plugin::{PlotData, PlotObject, PlotPlugin, TypeKey, register_type};
    pub use crate::session::{FigureOptions, Session, figure, figure_with};
    pub use crate::settings::Settings;
}
