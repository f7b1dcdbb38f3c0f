//! JSON payload endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, Method, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::error::ServerError;
use crate::handlers::{log_errors, request_context, request_id_header};
use crate::state::AppState;

/// Handle POST {payload_endpoint}.
///
/// Resolves HTML-bearing strings in the JSON body and returns the same
/// document. Object bodies get the call's diagnostics (`notes`, `errors`)
/// under the configured key.
pub(crate) async fn resolve_payload(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let mut payload: Value =
        serde_json::from_slice(&body).map_err(|err| ServerError::InvalidBody(err.to_string()))?;

    let ctx = Arc::new(request_context(&method, &uri, &headers, query));
    let resolved = state.resolver.resolve_payload(&mut payload, &ctx).await;
    log_errors(&ctx, state.verbose);
    tracing::debug!(request_id = %ctx.request_id(), resolved, "Payload resolved");

    if let Value::Object(map) = &mut payload {
        let diagnostics = ctx.diagnostics();
        map.insert(
            state.diagnostics_key.clone(),
            json!({"notes": diagnostics.notes, "errors": diagnostics.errors}),
        );
    }

    Ok((
        [(HeaderName::from_static("x-request-id"), request_id_header(&ctx))],
        Json(payload),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use crate::app::testing::send;

    fn post(body: &str) -> Request<Body> {
        Request::post("/resolve")
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_payload_attaches_diagnostics() {
        let request = json!({
            "title": "Plain",
            "content": r#"<div data-widget-type="button" data-widget-conf-href="/x">X</div>"#,
            "count": 3,
        });

        let (response, body) = send(post(&request.to_string())).await;
        let mut value: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let diagnostics = value
            .as_object_mut()
            .unwrap()
            .remove("_diagnostics")
            .unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Plain",
                "content": r#"<button onclick="document.location='/x'">X</button>"#,
                "count": 3,
            })
        );
        assert_eq!(diagnostics["errors"], json!([]));
        assert!(
            diagnostics["notes"][0]
                .as_str()
                .unwrap()
                .starts_with("Resolution time: ")
        );
    }

    #[tokio::test]
    async fn test_resolve_payload_array_has_no_diagnostics() {
        let (response, body) = send(post(r#"["<x-a></x-a>", 1]"#)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!(["<!-- Unknown element: x-a -->", 1])
        );
    }

    #[tokio::test]
    async fn test_resolve_payload_reports_structured_data_without_template() {
        let request = Request::post("/resolve?lang=en")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"body": r#"<div data-widget-type="infobox"><h1>T</h1></div>"#}).to_string(),
            ))
            .unwrap();

        let (response, body) = send(request).await;
        let value: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(value["body"].as_str().unwrap().starts_with("<aside"));
        assert_eq!(value["_diagnostics"]["errors"], json!([]));
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let (response, body) = send(post("{not json")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body.starts_with("invalid request body"));
    }
}
