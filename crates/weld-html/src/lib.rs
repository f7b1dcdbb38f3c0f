//! Mutable HTML tree for widget resolution.
//!
//! Parses HTML fragments and documents into an arena-backed [`Document`],
//! supports simple selector queries, in-place node replacement and
//! serialization back to markup.
//!
//! The parser is lenient: it is built on `quick-xml` events but accepts
//! HTML conventions (void elements, unquoted and valueless attributes,
//! unclosed elements, raw `script`/`style` bodies).
//!
//! # Example
//!
//! ```
//! use weld_html::{Document, Selector};
//!
//! let mut doc = Document::parse("<p>Hello <x-name></x-name></p>").unwrap();
//! let target = doc.select(&Selector::parse("x-name").unwrap())[0];
//! let fragment = Document::parse("<b>World</b>").unwrap();
//! doc.replace_with(target, &fragment);
//!
//! assert_eq!(doc.inner_html(doc.body()), "<p>Hello <b>World</b></p>");
//! ```

mod document;
mod element;
mod entities;
mod error;
mod parser;
mod selector;
mod serializer;

pub use document::{Document, NodeId, NodeKind};
pub use element::Element;
pub use entities::{decode_entities, escape_attr, escape_text};
pub use error::HtmlError;
pub use selector::Selector;
