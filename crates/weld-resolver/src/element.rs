//! Resolution of a single element.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;
use weld_html::{Document, Element, escape_attr};

use crate::context::RequestContext;
use crate::controller::{ControllerRegistry, ControllerResult};
use crate::error::ResolveError;
use crate::naming::{ElementNaming, UnknownElementPolicy, unknown_element_marker};
use crate::template::{JinjaEngine, RenderContext, TemplateEngine, TemplateRegistry};

/// What should happen to a resolved element in its document.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Delete the element.
    Remove,
    /// Leave the element untouched.
    Keep,
    /// Splice every top-level node of the fragment in place of the element.
    Replace(Document),
}

/// Resolves one element through its controller and template.
///
/// The pipeline, per element:
///
/// 1. Derive the element name.
/// 2. Invoke the controller, if one is registered. An empty result removes
///    the element.
/// 3. Render the best-matching template, if one exists, with the controller
///    output (or a description of the element) as `data`. Without a template
///    the controller output must already be markup.
/// 4. Turn the content into a fragment: parsed directly when it is a markup
///    element, otherwise wrapped in a `div` carrying `data-resolved-from`.
///
/// Elements with neither controller nor template follow the configured
/// [`UnknownElementPolicy`].
#[derive(Clone)]
pub struct ElementResolver {
    controllers: Arc<dyn ControllerRegistry>,
    templates: Arc<dyn TemplateRegistry>,
    engine: Arc<dyn TemplateEngine>,
    naming: ElementNaming,
    unknown: UnknownElementPolicy,
}

impl fmt::Debug for ElementResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementResolver")
            .field("naming", &self.naming)
            .field("unknown", &self.unknown)
            .finish_non_exhaustive()
    }
}

impl ElementResolver {
    /// Create a resolver using the Jinja engine and default naming.
    #[must_use]
    pub fn new(
        controllers: Arc<dyn ControllerRegistry>,
        templates: Arc<dyn TemplateRegistry>,
    ) -> Self {
        Self {
            controllers,
            templates,
            engine: Arc::new(JinjaEngine::new()),
            naming: ElementNaming::default(),
            unknown: UnknownElementPolicy::default(),
        }
    }

    /// Use a different template engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Use a different resolvable-element predicate and naming.
    #[must_use]
    pub fn with_naming(mut self, naming: ElementNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Set the behavior for elements with neither controller nor template.
    #[must_use]
    pub fn with_unknown_element(mut self, policy: UnknownElementPolicy) -> Self {
        self.unknown = policy;
        self
    }

    /// Naming rules in effect.
    #[must_use]
    pub fn naming(&self) -> &ElementNaming {
        &self.naming
    }

    /// Resolve one element snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the controller or template cannot be
    /// loaded, fails, or produces content that cannot become a fragment.
    pub async fn resolve(
        &self,
        mut element: Element,
        ctx: &RequestContext,
    ) -> Result<Resolution, ResolveError> {
        let name = self.naming.element_name(&element);
        let has_controller = self.controllers.has_controller(&name);
        let template = self.templates.find_template(&name, &ctx.languages());

        if !has_controller && template.is_none() {
            debug!(element = %name, policy = ?self.unknown, "Unknown element");
            return self.unknown_element(&name);
        }

        let mut output = None;
        if has_controller {
            let controller =
                self.controllers
                    .load_controller(&name)
                    .map_err(|source| ResolveError::ControllerLoad {
                        element: name.clone(),
                        source,
                    })?;
            let result = controller
                .resolve(&mut element, &name, ctx)
                .await
                .map_err(|source| ResolveError::Controller {
                    element: name.clone(),
                    source,
                })?
                .normalized();
            if result == ControllerResult::Removed {
                debug!(element = %name, "Controller removed element");
                return Ok(Resolution::Remove);
            }
            output = Some(result);
        }

        let content = match template {
            Some(template) => {
                let source = self.templates.load_template(&template).map_err(|source| {
                    ResolveError::TemplateLoad {
                        element: name.clone(),
                        source,
                    }
                })?;
                let data = match output {
                    Some(ControllerResult::Data(value)) => value,
                    Some(ControllerResult::Markup(markup)) => Value::String(markup),
                    _ => element_data(&element),
                };
                let context = RenderContext {
                    data: &data,
                    element_name: &name,
                    query: ctx.query(),
                    headers: ctx.headers(),
                    url: ctx.url(),
                };
                debug!(element = %name, language = ?template.language, "Rendering template");
                self.engine
                    .render(&source, &context)
                    .map_err(|source| ResolveError::TemplateRender {
                        element: name.clone(),
                        source,
                    })?
            }
            None => match output {
                Some(ControllerResult::Markup(markup) | ControllerResult::Data(Value::String(markup))) => {
                    markup
                }
                _ => return Err(ResolveError::MissingTemplate { element: name }),
            },
        };

        if content.trim().is_empty() {
            return Ok(Resolution::Remove);
        }
        build_fragment(&name, &content).map(Resolution::Replace)
    }

    fn unknown_element(&self, name: &str) -> Result<Resolution, ResolveError> {
        match self.unknown {
            UnknownElementPolicy::Keep => Ok(Resolution::Keep),
            UnknownElementPolicy::Remove => Ok(Resolution::Remove),
            UnknownElementPolicy::Comment => Document::parse(&unknown_element_marker(name))
                .map(Resolution::Replace)
                .map_err(|source| ResolveError::Fragment {
                    element: name.to_owned(),
                    source,
                }),
        }
    }
}

/// Describe an element for templates that have no controller output.
///
/// Shape: `{tag, attributes, text, html, outerHtml}`.
#[must_use]
pub fn element_data(element: &Element) -> Value {
    let attributes: Map<String, Value> = element
        .attrs()
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    json!({
        "tag": element.tag(),
        "attributes": attributes,
        "text": element.text_content(),
        "html": element.inner_html(),
        "outerHtml": element.outer_html(),
    })
}

fn build_fragment(name: &str, content: &str) -> Result<Document, ResolveError> {
    let trimmed = content.trim();
    let markup = if trimmed.starts_with('<') && trimmed.ends_with('>') {
        trimmed.to_owned()
    } else {
        format!(
            r#"<div data-resolved-from="{}">{content}</div>"#,
            escape_attr(name)
        )
    };
    Document::parse(&markup).map_err(|source| ResolveError::Fragment {
        element: name.to_owned(),
        source,
    })
}
