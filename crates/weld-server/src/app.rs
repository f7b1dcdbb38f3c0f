//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::ServerConfig;
use crate::handlers;
use crate::middleware::headers;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let [nosniff, no_frames, no_store] = headers::response_headers();

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(&config.html_endpoint, post(handlers::html::resolve_html))
        .route(
            &config.payload_endpoint,
            post(handlers::payload::resolve_payload),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(nosniff)
                .layer(no_frames)
                .layer(no_store),
        )
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;

    use super::testing::send;

    #[tokio::test]
    async fn test_response_headers() {
        let (response, _) = send(Request::get("/health").body(Body::empty()).unwrap()).await;

        for (name, value) in crate::middleware::headers::RESPONSE_HEADERS {
            assert_eq!(response.headers()[name], value);
        }
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (response, _) = send(Request::get("/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resolve_routes_reject_get() {
        let (response, _) = send(Request::get("/resolve").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
