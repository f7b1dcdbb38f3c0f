//! Entity decoding and markup escaping.
//!
//! Text nodes keep their source form (entities intact) so that untouched
//! markup round-trips. Decoding only happens when callers ask for text
//! content.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Named, decimal and hexadecimal character references.
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex")
});

/// A character reference at the start of the input.
static LEADING_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);")
        .expect("invalid reference regex")
});

/// Decode character references to their Unicode characters.
///
/// Unknown named references are left as-is.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY_PATTERN.replace_all(text, |caps: &regex::Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_owned())
    })
}

/// Decode a single reference body (the part between `&` and `;`).
pub(crate) fn decode_entity(entity: &str) -> Option<String> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = if let Some(hex) = numeric.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            numeric.parse::<u32>().ok()
        };
        return code.and_then(char::from_u32).map(String::from);
    }
    entity_to_unicode(entity).map(String::from)
}

/// Map an HTML entity name to its Unicode character.
pub(crate) fn entity_to_unicode(name: &str) -> Option<&'static str> {
    Some(match name {
        // XML entities
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",

        // Common entities
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",

        // Symbols
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{00b0}",
        "times" => "\u{00d7}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",

        _ => return None,
    })
}

/// Escape `&` characters that do not start a character reference.
///
/// HTML tolerates a bare ampersand in text ("Q&A"), the tokenizer does not.
pub(crate) fn escape_bare_ampersands(html: &str) -> Cow<'_, str> {
    if !html.contains('&') {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 16);
    let mut rest = html;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        out.push_str(if LEADING_REFERENCE.is_match(tail) {
            "&"
        } else {
            "&amp;"
        });
        rest = &tail[1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Escape `<` characters that cannot open a tag, comment or declaration.
///
/// Only `<` followed by a letter, `/`, `!` or `?` is markup ("1 < 2" is text).
pub(crate) fn escape_bare_angles(html: &str) -> Cow<'_, str> {
    let bare = |(pos, _): &(usize, char)| {
        !html[pos + 1..]
            .chars()
            .next()
            .is_some_and(|next| next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?'))
    };
    if !html.char_indices().filter(|&(_, ch)| ch == '<').any(|c| bare(&c)) {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 16);
    for entry in html.char_indices() {
        match entry {
            (_, '<') if bare(&entry) => out.push_str("&lt;"),
            (_, ch) => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Escape text for use as element content.
pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attr(text: &str) -> String {
    escape(text, true)
}

fn escape(text: &str, attribute: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '"' if attribute => result.push_str("&quot;"),
            '<' if !attribute => result.push_str("&lt;"),
            '>' if !attribute => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}
