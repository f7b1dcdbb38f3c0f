//! Error types for resolution.

use std::path::PathBuf;

use weld_html::HtmlError;

use crate::template::TemplateError;

/// Error returned by a controller invocation.
pub type ControllerError = Box<dyn std::error::Error + Send + Sync>;

/// Registry lookup or load failure.
///
/// "Not found" and "found but broken" are distinct: only the latter is
/// reported as a resolution error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// No controller is registered under this name.
    #[error("controller not found: {0}")]
    ControllerNotFound(String),

    /// Controller exists but could not be instantiated.
    #[error("controller {name} failed to load: {message}")]
    ControllerLoad {
        /// Element name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// No template is registered under this name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template file could not be read.
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        /// Template or template directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure while resolving an element or a document.
///
/// All variants except [`ResolveError::Parse`] are contained to a single
/// element and recorded in the request diagnostics.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Controller exists but could not be loaded.
    #[error("{element}: {source}")]
    ControllerLoad {
        /// Element name.
        element: String,
        /// Registry failure.
        #[source]
        source: RegistryError,
    },

    /// Controller returned an error.
    #[error("{element}: controller failed: {source}")]
    Controller {
        /// Element name.
        element: String,
        /// Controller failure.
        #[source]
        source: ControllerError,
    },

    /// Template exists but could not be loaded.
    #[error("{element}: {source}")]
    TemplateLoad {
        /// Element name.
        element: String,
        /// Registry failure.
        #[source]
        source: RegistryError,
    },

    /// Template failed to render.
    #[error("{element}: template failed to render: {source}")]
    TemplateRender {
        /// Element name.
        element: String,
        /// Engine failure.
        #[source]
        source: TemplateError,
    },

    /// Controller produced structured data and no template exists to render it.
    #[error("{element}: controller returned structured data but no template exists")]
    MissingTemplate {
        /// Element name.
        element: String,
    },

    /// Resolved content could not be parsed into a fragment.
    #[error("{element}: resolved content is not valid markup: {source}")]
    Fragment {
        /// Element name.
        element: String,
        /// Parser failure.
        #[source]
        source: HtmlError,
    },

    /// Input markup could not be parsed at all.
    #[error("failed to parse HTML: {0}")]
    Parse(#[from] HtmlError),
}
