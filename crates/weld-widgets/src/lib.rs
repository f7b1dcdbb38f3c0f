//! Built-in widgets.
//!
//! Each widget is a controller extracting data from the widget element, plus
//! (for all but `button`) a default template rendering that data:
//!
//! | Name        | Controller output                          | Template            |
//! |-------------|--------------------------------------------|---------------------|
//! | `button`    | `<button>` markup                          | none                |
//! | `infobox`   | `{title, body, onCard, type}`              | `<aside>`           |
//! | `accordion` | `{items: [{title, content}]}`              | `<details>` blocks  |
//! | `filelist`  | `{onCard, files: [{name, url, type}]}`     | `<ul>` of links     |
//!
//! Templates from a configured template directory take precedence over the
//! defaults when both are chained into a [`TemplateChain`](weld_resolver::TemplateChain).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use weld_resolver::{ElementResolver, RequestContext, Resolver};
//!
//! let resolver = Resolver::new(ElementResolver::new(
//!     Arc::new(weld_widgets::builtin_controllers()),
//!     Arc::new(weld_widgets::builtin_templates()),
//! ));
//!
//! let ctx = Arc::new(RequestContext::new("/"));
//! let html = tokio_test::block_on(resolver.resolve_html(
//!     r#"<div data-widget-type="Button" data-widget-conf-href="/next">Next</div>"#,
//!     &ctx,
//! ))
//! .unwrap();
//!
//! assert_eq!(html, r#"<button onclick="document.location='/next'">Next</button>"#);
//! ```

mod accordion;
mod button;
mod filelist;
mod infobox;

pub use accordion::AccordionController;
pub use button::ButtonController;
pub use filelist::FileListController;
pub use infobox::InfoboxController;

use weld_resolver::{ControllerSet, MemoryTemplates};

/// Names of the built-in widgets.
pub const BUILTIN_WIDGETS: &[&str] = &["accordion", "button", "filelist", "infobox"];

/// Add the built-in controllers to `set`.
#[must_use]
pub fn register_builtin(set: ControllerSet) -> ControllerSet {
    set.with_controller("accordion", AccordionController)
        .with_controller("button", ButtonController)
        .with_controller("filelist", FileListController)
        .with_controller("infobox", InfoboxController)
}

/// A controller set holding only the built-in controllers.
#[must_use]
pub fn builtin_controllers() -> ControllerSet {
    register_builtin(ControllerSet::new())
}

/// Language-neutral default templates for the built-in widgets.
#[must_use]
pub fn builtin_templates() -> MemoryTemplates {
    MemoryTemplates::new()
        .with_template("accordion", None, include_str!("../templates/accordion.jinja"))
        .with_template("filelist", None, include_str!("../templates/filelist.jinja"))
        .with_template("infobox", None, include_str!("../templates/infobox.jinja"))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use weld_resolver::{ElementResolver, RequestContext, Resolver};

    /// Resolve `html` with the built-in widgets only.
    pub(crate) async fn resolve(html: &str) -> (String, Arc<RequestContext>) {
        let resolver = Resolver::new(ElementResolver::new(
            Arc::new(super::builtin_controllers()),
            Arc::new(super::builtin_templates()),
        ));
        let ctx = Arc::new(RequestContext::new("/"));
        let html = resolver.resolve_html(html, &ctx).await.unwrap();
        (html, ctx)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use weld_resolver::{ControllerRegistry, TemplateRegistry};

    use super::*;

    #[test]
    fn test_every_builtin_has_a_controller() {
        let controllers = builtin_controllers();
        assert_eq!(controllers.names(), BUILTIN_WIDGETS.to_vec());
        for name in BUILTIN_WIDGETS {
            assert!(controllers.has_controller(name));
        }
    }

    #[test]
    fn test_templates_for_data_widgets() {
        let templates = builtin_templates();
        assert_eq!(templates.len(), 3);
        assert!(templates.find_template("infobox", &[]).is_some());
        assert!(templates.find_template("button", &[]).is_none());
    }
}
