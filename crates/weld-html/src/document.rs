//! Arena-backed mutable document tree.

use crate::element::Element;
use crate::entities::decode_entities;
use crate::error::HtmlError;
use crate::selector::Selector;
use crate::{parser, serializer};

/// Handle to a node inside a [`Document`].
///
/// Ids stay valid for the lifetime of the document, including after the node
/// has been detached by [`Document::remove`] or [`Document::replace_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root. Holds the top-level nodes and is never serialized itself.
    Root,
    /// Element with lower-cased tag name and attributes in source order.
    Element {
        /// Tag name.
        tag: String,
        /// Attribute name/value pairs (values decoded).
        attrs: Vec<(String, String)>,
    },
    /// Text in source form (character references intact).
    Text(String),
    /// Comment body (without `<!--` / `-->`).
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Root node id.
    pub const ROOT: NodeId = NodeId(0);

    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse HTML markup (a fragment or a full document).
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be tokenized at all.
    pub fn parse(html: &str) -> Result<Self, HtmlError> {
        parser::parse(html)
    }

    /// Node payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Tag name, if the node is an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attributes of an element (empty for other nodes).
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Attribute value by name (case-insensitive).
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether an element carries the given attribute.
    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set (or overwrite) an attribute on an element. No-op for other nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            let name = name.to_ascii_lowercase();
            if let Some(slot) = attrs.iter_mut().find(|(key, _)| *key == name) {
                value.clone_into(&mut slot.1);
            } else {
                attrs.push((name, value.to_owned()));
            }
        }
    }

    /// Parent node, `None` for the root and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All descendants of `id` in document (pre-)order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        result
    }

    /// All attached elements in document order.
    #[must_use]
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|&id| self.tag(id).is_some())
            .collect()
    }

    /// Whether the node is still reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == Self::ROOT {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// The `<body>` element if the document has one, otherwise the root.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|&id| self.tag(id) == Some("body"))
            .unwrap_or(Self::ROOT)
    }

    /// Elements below the root matching `selector`, in document order.
    #[must_use]
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.select_within(Self::ROOT, selector)
    }

    /// Elements below `scope` matching `selector`, in document order.
    #[must_use]
    pub fn select_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// First element below `scope` matching `selector`.
    #[must_use]
    pub fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| selector.matches(self, id))
    }

    /// Concatenated text of all descendant text nodes, entities decoded.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let NodeKind::Text(raw) = self.kind(id) {
            text.push_str(&decode_entities(raw));
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(raw) = self.kind(node) {
                text.push_str(&decode_entities(raw));
            }
        }
        text
    }

    /// Markup of the node's children.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            serializer::write_node(self, child, &mut out);
        }
        out
    }

    /// Markup of the node itself.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serializer::write_node(self, id, &mut out);
        out
    }

    /// Detach a node from its parent. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Replace a node with every top-level node of `fragment`.
    ///
    /// The replaced node becomes detached. Detached targets are left alone.
    pub fn replace_with(&mut self, id: NodeId, fragment: &Document) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(index) = self.children(parent).iter().position(|&child| child == id) else {
            return;
        };

        let imported: Vec<NodeId> = fragment
            .children(Self::ROOT)
            .iter()
            .map(|&child| self.import(fragment, child, Some(parent)))
            .collect();

        self.nodes[parent.0]
            .children
            .splice(index..=index, imported);
        self.nodes[id.0].parent = None;
    }

    /// Copy an element and its subtree into a standalone [`Element`].
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> Element {
        let mut doc = Document::new();
        let copy = doc.import(self, id, Some(Self::ROOT));
        doc.nodes[Self::ROOT.0].children.push(copy);
        Element::new(doc, copy)
    }

    /// Append a new node as the last child of `parent`.
    pub(crate) fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append text to `parent`, merging with a trailing text node.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.children(parent).last()
            && let NodeKind::Text(existing) = &mut self.nodes[last.0].kind
        {
            existing.push_str(text);
            return;
        }
        self.append(parent, NodeKind::Text(text.to_owned()));
    }

    /// Deep-copy `src` from `other` into this arena without linking it into
    /// the parent's child list.
    fn import(&mut self, other: &Document, src: NodeId, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: other.kind(src).clone(),
            parent,
            children: Vec::new(),
        });
        let children: Vec<NodeId> = other
            .children(src)
            .iter()
            .map(|&child| self.import(other, child, Some(id)))
            .collect();
        self.nodes[id.0].children = children;
        id
    }
}
