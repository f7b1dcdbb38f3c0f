//! Detached element snapshots.

use crate::document::{Document, NodeId};
use crate::selector::Selector;

/// A single element copied out of a [`Document`] together with its subtree.
///
/// Snapshots are owned and `Send`, so they can be handed to concurrently
/// running resolution tasks. Changes made to a snapshot never reach the
/// document it was taken from.
#[derive(Debug, Clone)]
pub struct Element {
    doc: Document,
    id: NodeId,
}

impl Element {
    pub(crate) fn new(doc: Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// Parse markup and return its first top-level element.
    ///
    /// Returns `None` if the markup cannot be parsed or has no element.
    #[must_use]
    pub fn from_html(html: &str) -> Option<Self> {
        let doc = Document::parse(html).ok()?;
        let id = doc
            .children(Document::ROOT)
            .iter()
            .copied()
            .find(|&child| doc.tag(child).is_some())?;
        Some(doc.snapshot(id))
    }

    /// Node id of the element inside [`Element::document`].
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The backing document (for querying descendants by id).
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Tag name (lower-cased).
    #[must_use]
    pub fn tag(&self) -> &str {
        self.doc.tag(self.id).unwrap_or_default()
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.doc.attr(self.id, name)
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.doc.has_attr(self.id, name)
    }

    /// All attributes in source order.
    #[must_use]
    pub fn attrs(&self) -> &[(String, String)] {
        self.doc.attrs(self.id)
    }

    /// Decoded text content.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.doc.text_content(self.id)
    }

    /// Markup of the element's children.
    #[must_use]
    pub fn inner_html(&self) -> String {
        self.doc.inner_html(self.id)
    }

    /// Markup of the element itself.
    #[must_use]
    pub fn outer_html(&self) -> String {
        self.doc.outer_html(self.id)
    }

    /// Descendants matching `selector`.
    #[must_use]
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.doc.select_within(self.id, selector)
    }

    /// First descendant matching `selector`.
    #[must_use]
    pub fn select_first(&self, selector: &Selector) -> Option<NodeId> {
        self.doc.select_first(self.id, selector)
    }

    /// Remove a descendant from the snapshot.
    pub fn remove(&mut self, id: NodeId) {
        if id != self.id {
            self.doc.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_html_skips_leading_text() {
        let element = Element::from_html("  <div data-widget-type=\"Button\">Go</div>").unwrap();
        assert_eq!(element.tag(), "div");
        assert_eq!(element.attr("data-widget-type"), Some("Button"));
        assert_eq!(element.text_content(), "Go");
    }

    #[test]
    fn test_from_html_without_element() {
        assert!(Element::from_html("just text").is_none());
    }

    #[test]
    fn test_select_descendants() {
        let element = Element::from_html(
            "<ul><li data-type=\"jpg\">a</li><li data-type=\"png\">b</li></ul>",
        )
        .unwrap();
        let items = element.select(&Selector::parse("li").unwrap());
        let types: Vec<_> = items
            .iter()
            .filter_map(|&id| element.document().attr(id, "data-type"))
            .collect();
        assert_eq!(types, vec!["jpg", "png"]);
    }

    #[test]
    fn test_remove_self_is_ignored() {
        let mut element = Element::from_html("<p>x</p>").unwrap();
        element.remove(element.id());
        assert_eq!(element.outer_html(), "<p>x</p>");
    }
}
