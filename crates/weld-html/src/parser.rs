//! Lenient HTML parser on top of `quick-xml` events.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::document::{Document, NodeId, NodeKind};
use crate::entities::{
    decode_entities, decode_entity, entity_to_unicode, escape_bare_ampersands, escape_bare_angles,
    escape_text,
};
use crate::error::HtmlError;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is kept verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Inline elements an open `<p>` is closed through when a new `<p>` starts.
const PHRASING_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "dfn", "em", "i", "kbd", "mark", "q", "s",
    "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse markup into a [`Document`].
pub(crate) fn parse(html: &str) -> Result<Document, HtmlError> {
    let html = escape_raw_text_bodies(html);
    let html = escape_bare_angles(&html);
    let html = escape_bare_ampersands(&html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut doc = Document::new();
    // Open elements; the root is always at the bottom.
    let mut open: Vec<NodeId> = vec![Document::ROOT];

    loop {
        let current = open.last().copied().unwrap_or(Document::ROOT);
        let event = match reader.read_event() {
            Ok(event) => event,
            // Syntax errors are only raised at end of input inside unfinished
            // markup; the leftover becomes text.
            Err(quick_xml::Error::Syntax(_)) => {
                let start = usize::try_from(reader.error_position()).unwrap_or(html.len());
                let rest = html.get(start..).unwrap_or_default();
                doc.append_text(current, &rest.replace('<', "&lt;"));
                break;
            }
            Err(err) => return Err(err.into()),
        };
        match event {
            Event::Start(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                let attrs = decode_attrs(&reader, &e);
                if let Some(pos) = implied_end(&doc, &open, &tag) {
                    open.truncate(pos);
                }
                let parent = open.last().copied().unwrap_or(Document::ROOT);
                let id = doc.append(
                    parent,
                    NodeKind::Element {
                        tag: tag.clone(),
                        attrs,
                    },
                );
                if !is_void(&tag) {
                    open.push(id);
                }
            }
            Event::Empty(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                let attrs = decode_attrs(&reader, &e);
                doc.append(current, NodeKind::Element { tag, attrs });
            }
            Event::End(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                // Close the nearest matching open element and everything above it.
                // Stray end tags are dropped.
                if let Some(pos) = open
                    .iter()
                    .rposition(|&id| doc.tag(id) == Some(tag.as_str()))
                {
                    open.truncate(pos);
                }
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                doc.append_text(current, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                if is_raw_text(&doc, current) {
                    let text = decode_entity(&entity).unwrap_or_else(|| format!("&{entity};"));
                    doc.append_text(current, &text);
                } else {
                    doc.append_text(current, &format!("&{entity};"));
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e);
                doc.append_text(current, &escape_text(&text));
            }
            Event::Comment(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                doc.append(current, NodeKind::Comment(text));
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    Ok(doc)
}

fn is_raw_text(doc: &Document, id: NodeId) -> bool {
    doc.tag(id).is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag))
}

/// Position in `open` of an element that the start of `tag` closes.
///
/// `li`, `dt`/`dd`, `option` and `p` end an open sibling of the same kind.
fn implied_end(doc: &Document, open: &[NodeId], tag: &str) -> Option<usize> {
    let (closes, boundaries): (&[&str], &[&str]) = match tag {
        "li" => (&["li"], &["ul", "ol", "menu", "table"]),
        "dt" | "dd" => (&["dt", "dd"], &["dl", "table"]),
        "option" => (&["option"], &["select", "datalist", "optgroup"]),
        "p" => (&["p"], &[]),
        _ => return None,
    };
    for (pos, &id) in open.iter().enumerate().rev() {
        let open_tag = doc.tag(id)?;
        if closes.contains(&open_tag) {
            return Some(pos);
        }
        let stops = if tag == "p" {
            !PHRASING_ELEMENTS.contains(&open_tag)
        } else {
            boundaries.contains(&open_tag)
        };
        if stops {
            return None;
        }
    }
    None
}

/// Escape `&` and `<` inside `<script>` and `<style>` bodies.
///
/// The tokenizer then sees plain text there, and the parser decodes it back
/// so the body is stored exactly as written.
fn escape_raw_text_bodies(html: &str) -> Cow<'_, str> {
    // ASCII lower-casing keeps byte offsets.
    let lower = html.to_ascii_lowercase();
    let mut out = String::new();
    let mut copied = 0;
    let mut from = 0;

    while let Some((open_at, tag)) = find_raw_text_start(&lower, from) {
        let Some(gt) = lower[open_at..].find('>') else {
            break;
        };
        let body_start = open_at + gt + 1;
        let close = format!("</{tag}");
        let body_end = lower[body_start..]
            .find(&close)
            .map_or(html.len(), |pos| body_start + pos);

        out.push_str(&html[copied..body_start]);
        for ch in html[body_start..body_end].chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                _ => out.push(ch),
            }
        }
        copied = body_end;
        if body_end >= html.len() {
            break;
        }
        from = body_end + close.len();
    }

    if copied == 0 {
        return Cow::Borrowed(html);
    }
    out.push_str(&html[copied..]);
    Cow::Owned(out)
}

fn find_raw_text_start(lower: &str, from: usize) -> Option<(usize, &'static str)> {
    RAW_TEXT_ELEMENTS
        .iter()
        .filter_map(|&tag| {
            let needle = format!("<{tag}");
            let mut at = from;
            while let Some(pos) = lower.get(at..)?.find(&needle) {
                let start = at + pos;
                let next = lower.as_bytes().get(start + needle.len());
                if next.is_none_or(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/') {
                    return Some((start, tag));
                }
                at = start + needle.len();
            }
            None
        })
        .min_by_key(|&(pos, _)| pos)
}

fn decode_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader
        .decoder()
        .decode(name)
        .unwrap_or_else(|_| String::from_utf8_lossy(name))
        .to_ascii_lowercase()
}

fn decode_attrs(reader: &Reader<&[u8]>, e: &BytesStart) -> Vec<(String, String)> {
    e.html_attributes()
        .flatten()
        .map(|attr| {
            let key = decode_name(reader, attr.key.as_ref());
            // Unknown references fail strict unescaping; keep them literal.
            let value = attr
                .decode_and_unescape_value_with(reader.decoder(), entity_to_unicode)
                .map_or_else(
                    |_| decode_entities(&String::from_utf8_lossy(&attr.value)).into_owned(),
                    Cow::into_owned,
                );
            (key, value)
        })
        .collect()
}
