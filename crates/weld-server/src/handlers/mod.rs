//! HTTP request handlers.

pub(crate) mod health;
pub(crate) mod html;
pub(crate) mod payload;

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderValue, Method, Uri};
use weld_resolver::RequestContext;

/// Build the per-call context from the inbound request.
///
/// Header values that are not valid UTF-8 are skipped.
pub(crate) fn request_context(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    query: BTreeMap<String, String>,
) -> RequestContext {
    let ctx = RequestContext::new(uri.to_string()).with_method(method.as_str());
    let ctx = headers.iter().fold(ctx, |ctx, (name, value)| {
        match value.to_str() {
            Ok(value) => ctx.with_header(name.as_str(), value),
            Err(_) => ctx,
        }
    });
    query
        .into_iter()
        .fold(ctx, |ctx, (name, value)| ctx.with_query_param(name, value))
}

/// `X-Request-Id` header value for a context.
pub(crate) fn request_id_header(ctx: &RequestContext) -> HeaderValue {
    HeaderValue::from_str(&ctx.request_id().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

/// Log the errors collected for one call.
pub(crate) fn log_errors(ctx: &RequestContext, verbose: bool) {
    let diagnostics = ctx.diagnostics();
    if diagnostics.errors.is_empty() {
        return;
    }
    if verbose {
        for error in &diagnostics.errors {
            tracing::warn!(request_id = %ctx.request_id(), error = %error, "Resolution error");
        }
    } else {
        tracing::debug!(
            request_id = %ctx.request_id(),
            errors = diagnostics.errors.len(),
            "Resolution finished with errors"
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_request_context_from_parts() {
        let uri: Uri = "/resolve?lang=en&page=2".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("Accept-Language", HeaderValue::from_static("fr-CH, en;q=0.5"));
        headers.insert("x-binary", HeaderValue::from_bytes(b"\xff").unwrap());
        let query = BTreeMap::from([("lang".to_owned(), "en".to_owned())]);

        let ctx = request_context(&Method::POST, &uri, &headers, query);

        assert_eq!(ctx.method(), "POST");
        assert_eq!(ctx.url(), "/resolve?lang=en&page=2");
        assert_eq!(ctx.query().get("lang").map(String::as_str), Some("en"));
        assert_eq!(ctx.languages(), vec!["fr-ch", "en"]);
        assert_eq!(ctx.header("x-binary"), None);
    }
}
