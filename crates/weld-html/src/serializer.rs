//! Markup serialization.

use crate::document::{Document, NodeId, NodeKind};
use crate::entities::escape_attr;
use crate::parser::is_void;

/// Serialize a node and its subtree.
pub(crate) fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Root => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        NodeKind::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (key, value) in attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');

            if is_void(tag) {
                return;
            }

            for &child in doc.children(id) {
                write_node(doc, child, out);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Text(raw) => out.push_str(raw),
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_serialize_escapes_attribute_values() {
        let mut doc = Document::new();
        doc.append(
            Document::ROOT,
            NodeKind::Element {
                tag: "a".to_owned(),
                attrs: vec![("title".to_owned(), "say \"hi\" & go".to_owned())],
            },
        );

        assert_eq!(
            doc.inner_html(Document::ROOT),
            "<a title=\"say &quot;hi&quot; &amp; go\"></a>"
        );
    }

    #[test]
    fn test_serialize_void_without_end_tag() {
        let mut doc = Document::new();
        let p = doc.append(
            Document::ROOT,
            NodeKind::Element {
                tag: "p".to_owned(),
                attrs: Vec::new(),
            },
        );
        doc.append(
            p,
            NodeKind::Element {
                tag: "hr".to_owned(),
                attrs: Vec::new(),
            },
        );

        assert_eq!(doc.inner_html(Document::ROOT), "<p><hr></p>");
    }

    #[test]
    fn test_serialize_comment_and_text() {
        let mut doc = Document::new();
        doc.append_text(Document::ROOT, "a &amp; b");
        doc.append(Document::ROOT, NodeKind::Comment(" note ".to_owned()));

        assert_eq!(doc.inner_html(Document::ROOT), "a &amp; b<!-- note -->");
    }
}
