//! Entry points for the two call shapes: raw HTML and structured payloads.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use crate::context::RequestContext;
use crate::document::DocumentResolver;
use crate::element::ElementResolver;
use crate::error::ResolveError;
use crate::payload::{PayloadResolver, PropertyFilter};

/// Resolver facade shared by all inbound calls.
///
/// Each call runs inside [`RequestContext::scope`] and records a
/// `Resolution time: N ms` note in its context.
#[derive(Debug, Clone)]
pub struct Resolver {
    documents: Arc<DocumentResolver>,
    payloads: PayloadResolver,
}

impl Resolver {
    /// Create a resolver around an element resolver.
    #[must_use]
    pub fn new(elements: ElementResolver) -> Self {
        let documents = Arc::new(DocumentResolver::new(elements));
        let payloads = PayloadResolver::new(Arc::clone(&documents));
        Self {
            documents,
            payloads,
        }
    }

    /// Restrict payload resolution to the given property paths.
    #[must_use]
    pub fn with_property_filter(mut self, filter: PropertyFilter) -> Self {
        self.payloads = self.payloads.with_filter(filter);
        self
    }

    /// Resolve widgets in an HTML string.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Parse`] if the markup cannot be parsed.
    pub async fn resolve_html(
        &self,
        html: &str,
        ctx: &Arc<RequestContext>,
    ) -> Result<String, ResolveError> {
        let started = Instant::now();
        let result =
            RequestContext::scope(Arc::clone(ctx), self.documents.resolve(html, ctx)).await;
        record_timing(ctx, started);
        result
    }

    /// Resolve HTML-bearing strings inside `payload` in place.
    ///
    /// Returns the number of strings that were resolved. Failures are
    /// recorded in `ctx`.
    pub async fn resolve_payload(&self, payload: &mut Value, ctx: &Arc<RequestContext>) -> usize {
        let started = Instant::now();
        let resolved =
            RequestContext::scope(Arc::clone(ctx), self.payloads.resolve(payload, ctx)).await;
        record_timing(ctx, started);
        resolved
    }
}

fn record_timing(ctx: &RequestContext, started: Instant) {
    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(request_id = %ctx.request_id(), elapsed_ms = elapsed, "Resolution finished");
    ctx.add_note(format!("Resolution time: {elapsed} ms"));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::controller::{ControllerResult, ControllerSet, controller_fn};
    use crate::template::MemoryTemplates;

    fn resolver() -> Resolver {
        let controllers = ControllerSet::new().with_controller(
            "x-hello",
            controller_fn(|_, _, _| Ok(ControllerResult::markup("<b>hello</b>"))),
        );
        Resolver::new(ElementResolver::new(
            Arc::new(controllers),
            Arc::new(MemoryTemplates::new()),
        ))
    }

    #[tokio::test]
    async fn test_resolve_html_records_timing() {
        let ctx = Arc::new(RequestContext::new("/"));

        let html = resolver()
            .resolve_html("<div><x-hello></x-hello></div>", &ctx)
            .await
            .unwrap();

        assert_eq!(html, "<div><b>hello</b></div>");
        let notes = ctx.diagnostics().notes;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("Resolution time: "));
        assert!(notes[0].ends_with(" ms"));
    }

    #[tokio::test]
    async fn test_resolve_payload_with_filter() {
        let resolver = resolver().with_property_filter(PropertyFilter::new(["body"]));
        let ctx = Arc::new(RequestContext::new("/"));
        let mut payload = json!({"body": "<x-hello></x-hello>", "other": "<x-hello></x-hello>"});

        let count = resolver.resolve_payload(&mut payload, &ctx).await;

        assert_eq!(count, 1);
        assert_eq!(
            payload,
            json!({"body": "<b>hello</b>", "other": "<x-hello></x-hello>"})
        );
    }

    #[tokio::test]
    async fn test_unknown_elements_do_not_error() {
        let ctx = Arc::new(RequestContext::new("/"));

        let html = resolver()
            .resolve_html("<x-other>y</x-other>", &ctx)
            .await
            .unwrap();

        assert_eq!(html, "<!-- Unknown element: x-other -->");
        assert!(ctx.diagnostics().errors.is_empty());
    }
}
