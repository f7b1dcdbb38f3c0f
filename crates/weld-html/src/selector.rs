//! Minimal selector support.
//!
//! Supported forms: `*`, `tag`, `[attr]`, `[attr=value]`, `tag[attr]`,
//! `tag[attr=value]`. Values may be bare or quoted.

use crate::document::{Document, NodeId};
use crate::error::HtmlError;

/// Attribute condition of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

/// Compiled selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    attr: Option<AttrCondition>,
}

impl Selector {
    /// Parse a selector.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Selector`] for empty input or unsupported syntax.
    pub fn parse(input: &str) -> Result<Self, HtmlError> {
        let input = input.trim();
        let invalid = || HtmlError::Selector(input.to_owned());

        let (tag_part, attr_part) = match input.find('[') {
            Some(start) => {
                let attr = input[start + 1..].strip_suffix(']').ok_or_else(invalid)?;
                (&input[..start], Some(attr))
            }
            None => (input, None),
        };

        if tag_part.is_empty() && attr_part.is_none() {
            return Err(invalid());
        }
        if !tag_part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '*') {
            return Err(invalid());
        }

        let tag = match tag_part {
            "" | "*" => None,
            tag => Some(tag.to_ascii_lowercase()),
        };

        let attr = attr_part
            .map(|condition| {
                let (name, value) = match condition.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                        (name.trim(), Some(value.to_owned()))
                    }
                    None => (condition.trim(), None),
                };
                if name.is_empty() || name.contains(char::is_whitespace) {
                    return Err(invalid());
                }
                Ok(AttrCondition {
                    name: name.to_ascii_lowercase(),
                    value,
                })
            })
            .transpose()?;

        Ok(Self { tag, attr })
    }

    /// Whether the node satisfies this selector.
    #[must_use]
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag(id) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|expected| expected != tag) {
            return false;
        }
        match &self.attr {
            None => true,
            Some(AttrCondition { name, value: None }) => doc.has_attr(id, name),
            Some(AttrCondition {
                name,
                value: Some(expected),
            }) => doc.attr(id, name) == Some(expected.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(html: &str, selector: &str) -> usize {
        let doc = Document::parse(html).unwrap();
        doc.select(&Selector::parse(selector).unwrap()).len()
    }

    #[test]
    fn test_tag_selector() {
        assert_eq!(count("<div><li>a</li><LI>b</LI></div>", "li"), 2);
    }

    #[test]
    fn test_attribute_presence() {
        assert_eq!(
            count("<div data-panel><div data-title>x</div></div>", "[data-panel]"),
            1
        );
    }

    #[test]
    fn test_tag_and_attribute() {
        assert_eq!(
            count("<div data-panel></div><span data-panel></span>", "div[data-panel]"),
            1
        );
    }

    #[test]
    fn test_attribute_value_quoted() {
        let html = "<a data-type=\"jpg\"></a><a data-type=\"png\"></a>";
        assert_eq!(count(html, "a[data-type=\"png\"]"), 1);
        assert_eq!(count(html, "a[data-type=jpg]"), 1);
    }

    #[test]
    fn test_universal_selector() {
        assert_eq!(count("<a></a><b><c></c></b>", "*"), 3);
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div[").is_err());
        assert!(Selector::parse("div > p").is_err());
        assert!(Selector::parse("[]").is_err());
    }
}
