//! Liveness check.

/// Handle GET /health.
pub(crate) async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;

    use crate::app::testing::send;

    #[tokio::test]
    async fn test_health() {
        let (response, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
