//! Which elements are resolvable and what they are called.

use serde::Deserialize;
use weld_html::{Document, Element, NodeId};

/// Attribute carrying an explicit widget type.
pub const DEFAULT_WIDGET_ATTRIBUTE: &str = "data-widget-type";

/// Resolvable-element predicate and element naming.
///
/// An element is resolvable when it carries the widget attribute or its tag
/// name contains a hyphen (custom-element convention). Its name is the
/// lower-cased attribute value, or the tag name when the attribute is absent
/// or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNaming {
    widget_attribute: String,
}

impl Default for ElementNaming {
    fn default() -> Self {
        Self::new(DEFAULT_WIDGET_ATTRIBUTE)
    }
}

impl ElementNaming {
    /// Use `widget_attribute` as the explicit widget-type marker.
    #[must_use]
    pub fn new(widget_attribute: &str) -> Self {
        Self {
            widget_attribute: widget_attribute.to_ascii_lowercase(),
        }
    }

    /// The widget-type attribute name.
    #[must_use]
    pub fn widget_attribute(&self) -> &str {
        &self.widget_attribute
    }

    /// Whether node `id` of `doc` should be resolved.
    #[must_use]
    pub fn is_resolvable(&self, doc: &Document, id: NodeId) -> bool {
        doc.tag(id)
            .is_some_and(|tag| tag.contains('-') || doc.has_attr(id, &self.widget_attribute))
    }

    /// Registry key for `element`.
    #[must_use]
    pub fn element_name(&self, element: &Element) -> String {
        element
            .attr(&self.widget_attribute)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| element.tag())
            .to_ascii_lowercase()
    }
}

/// What to do with a resolvable element that has neither controller nor template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownElementPolicy {
    /// Replace with a visible comment naming the element.
    #[default]
    Comment,
    /// Leave the element as it is.
    Keep,
    /// Delete the element.
    Remove,
}

/// Comment marker emitted for unknown elements.
#[must_use]
pub fn unknown_element_marker(name: &str) -> String {
    // `--` would end the comment early.
    format!("<!-- Unknown element: {} -->", name.replace("--", "-"))
}
