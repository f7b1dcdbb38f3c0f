//! Widget resolution engine.
//!
//! Finds widget markers in HTML (elements carrying a widget-type attribute or
//! a custom-element tag name) and replaces each with content produced by a
//! controller, a template, or both. Structured payloads are walked
//! recursively and every HTML-bearing string is resolved the same way.
//!
//! # Architecture
//!
//! ```text
//! PayloadResolver ──► DocumentResolver ──► ElementResolver ──► ControllerRegistry
//!   (JSON walk)        (parse, fan-out,      (controller,       TemplateRegistry
//!                       splice, serialize)    template, fragment) TemplateEngine
//! ```
//!
//! Every call runs against one shared [`RequestContext`] which carries request
//! metadata and collects diagnostics. Element and leaf failures are recorded
//! there and never abort the call; only unparseable input does.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use weld_resolver::{
//!     ControllerResult, ControllerSet, ElementResolver, MemoryTemplates, RequestContext,
//!     Resolver, controller_fn,
//! };
//!
//! let controllers = ControllerSet::new().with_controller(
//!     "greeting",
//!     controller_fn(|element, _, _| {
//!         Ok(ControllerResult::data(serde_json::json!({ "who": element.text_content() })))
//!     }),
//! );
//! let templates = MemoryTemplates::new().with_template("greeting", None, "<b>Hello {{ data.who }}</b>");
//! let resolver = Resolver::new(ElementResolver::new(Arc::new(controllers), Arc::new(templates)));
//!
//! let ctx = Arc::new(RequestContext::new("/page"));
//! let html = tokio_test::block_on(
//!     resolver.resolve_html(r#"<p><x-greeting data-widget-type="greeting">Ada</x-greeting></p>"#, &ctx),
//! )
//! .unwrap();
//!
//! assert_eq!(html, "<p><b>Hello Ada</b></p>");
//! ```

mod context;
mod controller;
mod document;
mod element;
mod error;
mod naming;
mod payload;
mod resolver;
mod template;

pub use context::{Diagnostics, RequestContext, parse_accept_language};
pub use controller::{
    Controller, ControllerRegistry, ControllerResult, ControllerSet, FnController, controller_fn,
};
pub use document::DocumentResolver;
pub use element::{ElementResolver, Resolution, element_data};
pub use error::{ControllerError, RegistryError, ResolveError};
pub use naming::{DEFAULT_WIDGET_ATTRIBUTE, ElementNaming, UnknownElementPolicy, unknown_element_marker};
pub use payload::{PathSegment, PayloadResolver, PropertyFilter, PropertyPath, looks_like_html};
pub use resolver::Resolver;
pub use template::{
    FsTemplates, JinjaEngine, MemoryTemplates, RenderContext, TemplateChain, TemplateEngine,
    TemplateError, TemplateLocation, TemplateRef, TemplateRegistry, language_candidates,
};
