//! Resolution of a whole HTML document.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};
use weld_html::{Document, NodeId};

use crate::context::RequestContext;
use crate::element::{ElementResolver, Resolution};
use crate::error::ResolveError;

/// Resolves every widget element of a document concurrently.
///
/// Resolvable elements are snapshotted before any resolution begins, so
/// markup produced by one element is never resolved in the same pass. Each
/// snapshot is resolved on its own task; results are spliced back in
/// document order once all tasks finish. When an element sits inside another
/// resolvable element that was replaced or removed, its own result is
/// discarded.
#[derive(Debug, Clone)]
pub struct DocumentResolver {
    elements: Arc<ElementResolver>,
}

impl DocumentResolver {
    /// Create a document resolver around an element resolver.
    #[must_use]
    pub fn new(elements: ElementResolver) -> Self {
        Self {
            elements: Arc::new(elements),
        }
    }

    /// The underlying element resolver.
    #[must_use]
    pub fn elements(&self) -> &ElementResolver {
        &self.elements
    }

    /// Resolve `html` and return the serialized body content.
    ///
    /// Element failures are recorded in `ctx` and leave the element untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Parse`] if the markup cannot be parsed.
    pub async fn resolve(
        &self,
        html: &str,
        ctx: &Arc<RequestContext>,
    ) -> Result<String, ResolveError> {
        let mut doc = Document::parse(html)?;
        let body = doc.body();
        let naming = self.elements.naming();
        let targets: Vec<NodeId> = doc
            .descendants(body)
            .into_iter()
            .filter(|&id| naming.is_resolvable(&doc, id))
            .collect();

        if targets.is_empty() {
            return Ok(doc.inner_html(body));
        }
        debug!(request_id = %ctx.request_id(), elements = targets.len(), "Resolving document");

        let mut tasks = JoinSet::new();
        for (index, &id) in targets.iter().enumerate() {
            let element = doc.snapshot(id);
            let resolver = Arc::clone(&self.elements);
            let task_ctx = Arc::clone(ctx);
            tasks.spawn(RequestContext::scope(Arc::clone(ctx), async move {
                (index, resolver.resolve(element, &task_ctx).await)
            }));
        }

        let mut results: Vec<Option<Resolution>> = vec![None; targets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(resolution))) => results[index] = Some(resolution),
                Ok((_, Err(err))) => {
                    warn!(request_id = %ctx.request_id(), error = %err, "Element resolution failed");
                    ctx.add_error(err.to_string());
                }
                Err(err) => {
                    warn!(request_id = %ctx.request_id(), error = %err, "Element task aborted");
                    ctx.add_error(format!("element task aborted: {err}"));
                }
            }
        }

        for (id, resolution) in targets.into_iter().zip(results) {
            if !doc.is_attached(id) {
                continue;
            }
            match resolution {
                Some(Resolution::Replace(fragment)) => doc.replace_with(id, &fragment),
                Some(Resolution::Remove) => doc.remove(id),
                Some(Resolution::Keep) | None => {}
            }
        }

        Ok(doc.inner_html(body))
    }
}
