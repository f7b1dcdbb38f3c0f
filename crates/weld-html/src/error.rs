//! Error types for HTML parsing and querying.

/// Error raised while parsing markup or selectors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HtmlError {
    /// Markup could not be tokenized.
    #[error("HTML parse error")]
    Xml(#[from] quick_xml::Error),

    /// Encoding error while decoding tag or text content.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Selector syntax is not supported.
    #[error("invalid selector: {0}")]
    Selector(String),
}
