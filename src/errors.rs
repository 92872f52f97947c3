//! Typed error hierarchy for issueboard.
//!
//! One enum per subsystem:
//! - `TemplateError`: registering or looking up Handlebars templates
//! - `ViewError`: rendering a view
//! - `FetchError`: talking to the issues API
//! - `AppError`: routing and the composition root

use thiserror::Error;

/// Errors from loading the embedded template set.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{name}' is not embedded in the binary")]
    Missing { name: String },

    #[error("Template '{name}' is not valid UTF-8")]
    Encoding { name: String },

    #[error("Failed to compile template '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

/// Errors from rendering a view.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Failed to render template '{template}': {source}")]
    Render {
        template: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("View was rendered after it was disposed")]
    Disposed,
}

/// Errors from a single request against the issues API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed JSONP payload from {url}")]
    Jsonp { url: String },
}

/// Errors from the router and application shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No route matches fragment '{0}'")]
    UnknownRoute(String),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
