//! Raw HTML endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, Method, Uri};
use axum::response::{Html, IntoResponse, Response};

use crate::error::ServerError;
use crate::handlers::{log_errors, request_context, request_id_header};
use crate::state::AppState;

/// Handle POST {html_endpoint}.
///
/// Responds with the resolved markup. Element failures do not fail the call.
pub(crate) async fn resolve_html(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, ServerError> {
    let ctx = Arc::new(request_context(&method, &uri, &headers, query));
    let html = state.resolver.resolve_html(&body, &ctx).await?;
    log_errors(&ctx, state.verbose);

    Ok((
        [(HeaderName::from_static("x-request-id"), request_id_header(&ctx))],
        Html(html),
    )
        .into_response())
}
