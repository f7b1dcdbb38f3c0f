//! Controller contract and registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use weld_html::Element;

use crate::context::RequestContext;
use crate::error::{ControllerError, RegistryError};

/// Outcome of invoking a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerResult {
    /// Delete the element without replacement.
    Removed,
    /// Structured data passed to the element's template.
    Data(Value),
    /// Final markup, used as-is when no template exists.
    Markup(String),
}

impl ControllerResult {
    /// Structured data result.
    #[must_use]
    pub fn data(value: Value) -> Self {
        Self::Data(value)
    }

    /// Literal markup result.
    #[must_use]
    pub fn markup(html: impl Into<String>) -> Self {
        Self::Markup(html.into())
    }

    /// Classify a loosely-typed value.
    ///
    /// `null`, `false` and the empty string mean [`ControllerResult::Removed`],
    /// any other string is markup, everything else is data.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Self::Removed,
            Value::String(s) if s.is_empty() => Self::Removed,
            Value::String(s) => Self::Markup(s),
            other => Self::Data(other),
        }
    }

    /// Fold falsy results (`null`, `false`, empty markup) into
    /// [`ControllerResult::Removed`].
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Data(value) => Self::from_value(value),
            Self::Markup(markup) if markup.is_empty() => Self::Removed,
            other => other,
        }
    }
}

/// A name-addressable unit computing data or markup for one element.
///
/// Controllers receive their own copy of the element and may modify it
/// freely; they never see sibling elements.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Resolve one element.
    async fn resolve(
        &self,
        element: &mut Element,
        element_name: &str,
        ctx: &RequestContext,
    ) -> Result<ControllerResult, ControllerError>;
}

/// Controller backed by a synchronous function.
pub struct FnController<F> {
    func: F,
}

impl<F> fmt::Debug for FnController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnController").finish_non_exhaustive()
    }
}

/// Wrap a function as a [`Controller`].
pub fn controller_fn<F>(func: F) -> FnController<F>
where
    F: Fn(&mut Element, &str, &RequestContext) -> Result<ControllerResult, ControllerError>
        + Send
        + Sync,
{
    FnController { func }
}

#[async_trait]
impl<F> Controller for FnController<F>
where
    F: Fn(&mut Element, &str, &RequestContext) -> Result<ControllerResult, ControllerError>
        + Send
        + Sync,
{
    async fn resolve(
        &self,
        element: &mut Element,
        element_name: &str,
        ctx: &RequestContext,
    ) -> Result<ControllerResult, ControllerError> {
        (self.func)(element, element_name, ctx)
    }
}

/// Lookup from element name to controller.
pub trait ControllerRegistry: Send + Sync {
    /// Whether a controller exists for `name`.
    fn has_controller(&self, name: &str) -> bool;

    /// Load the controller for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ControllerNotFound`] if none exists, or
    /// [`RegistryError::ControllerLoad`] if it exists but cannot be used.
    fn load_controller(&self, name: &str) -> Result<Arc<dyn Controller>, RegistryError>;
}

/// Controller registry populated at startup.
#[derive(Default, Clone)]
pub struct ControllerSet {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl fmt::Debug for ControllerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerSet")
            .field("names", &self.names())
            .finish()
    }
}

impl ControllerSet {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller (builder style).
    #[must_use]
    pub fn with_controller<C: Controller + 'static>(mut self, name: &str, controller: C) -> Self {
        self.insert(name, controller);
        self
    }

    /// Register a controller. Names are case-insensitive.
    pub fn insert<C: Controller + 'static>(&mut self, name: &str, controller: C) {
        self.controllers
            .insert(name.to_ascii_lowercase(), Arc::new(controller));
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ControllerRegistry for ControllerSet {
    fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    fn load_controller(&self, name: &str) -> Result<Arc<dyn Controller>, RegistryError> {
        self.controllers
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| RegistryError::ControllerNotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_value_classification() {
        assert_eq!(ControllerResult::from_value(Value::Null), ControllerResult::Removed);
        assert_eq!(ControllerResult::from_value(json!(false)), ControllerResult::Removed);
        assert_eq!(ControllerResult::from_value(json!("")), ControllerResult::Removed);
        assert_eq!(
            ControllerResult::from_value(json!("<b>x</b>")),
            ControllerResult::Markup("<b>x</b>".to_owned())
        );
        assert_eq!(
            ControllerResult::from_value(json!({"a": 1})),
            ControllerResult::Data(json!({"a": 1}))
        );
    }

    #[test]
    fn test_normalized_folds_falsy_results() {
        assert_eq!(ControllerResult::markup("").normalized(), ControllerResult::Removed);
        assert_eq!(ControllerResult::data(json!(false)).normalized(), ControllerResult::Removed);
        assert_eq!(ControllerResult::data(Value::Null).normalized(), ControllerResult::Removed);
        assert_eq!(
            ControllerResult::markup("<i>x</i>").normalized(),
            ControllerResult::Markup("<i>x</i>".to_owned())
        );
        assert_eq!(
            ControllerResult::data(json!([1])).normalized(),
            ControllerResult::Data(json!([1]))
        );
    }

    #[test]
    fn test_controller_set_names_case_insensitive() {
        let set = ControllerSet::new()
            .with_controller("Button", controller_fn(|_, _, _| Ok(ControllerResult::Removed)));

        assert!(set.has_controller("button"));
        assert!(!set.has_controller("accordion"));
        assert_eq!(set.names(), vec!["button"]);
    }

    #[test]
    fn test_load_missing_controller() {
        let set = ControllerSet::new();
        let err = set.load_controller("nope").err().unwrap();
        assert!(matches!(err, RegistryError::ControllerNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_fn_controller_receives_element() {
        let controller = controller_fn(|element, name, _| {
            Ok(ControllerResult::markup(format!("{name}:{}", element.text_content())))
        });
        let mut element = Element::from_html("<x-tag>hi</x-tag>").unwrap();
        let ctx = RequestContext::new("/");

        let result = controller.resolve(&mut element, "x-tag", &ctx).await.unwrap();

        assert_eq!(result, ControllerResult::Markup("x-tag:hi".to_owned()));
    }
}
