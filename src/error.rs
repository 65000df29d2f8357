//! Error types for uniplot

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    /// Array lengths or dimensionality do not line up.
    #[error("shape error: {0}")]
    Shape(String),

    /// Unknown color name, engine name, or nothing to estimate a limit from.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Invalid setup: empty engine registry, bad aspect ratio, bad settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("figure is closed")]
    UseAfterClose,

    #[error("render error: {0}")]
    Render(String),

    #[error("io error")]
    Io,
}

impl PlotError {
    pub fn shape(msg: impl Into<String>) -> error_stack::Report<Self> {
        error_stack::Report::new(Self::Shape(msg.into()))
    }

    pub fn lookup(msg: impl Into<String>) -> error_stack::Report<Self> {
        error_stack::Report::new(Self::Lookup(msg.into()))
    }

    pub fn configuration(msg: impl Into<String>) -> error_stack::Report<Self> {
        error_stack::Report::new(Self::Configuration(msg.into()))
    }

    pub fn unsupported(msg: impl Into<String>) -> error_stack::Report<Self> {
        error_stack::Report::new(Self::UnsupportedOperation(msg.into()))
    }

    pub fn render(msg: impl Into<String>) -> error_stack::Report<Self> {
        error_stack::Report::new(Self::Render(msg.into()))
    }
}

pub type PlotResult<T> = std::result::Result<T, error_stack::Report<PlotError>>;
