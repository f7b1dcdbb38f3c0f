//! HTTP server for the weld resolver.
//!
//! Exposes the two resolution call shapes over HTTP:
//! - `POST /resolve-html`: raw HTML in, resolved HTML out
//! - `POST /resolve`: JSON in, the same JSON out with embedded HTML resolved
//!   and a diagnostics block attached
//! - `GET /health`: liveness check
//!
//! Both resolution routes are configurable. Every call gets its own
//! [`RequestContext`](weld_resolver::RequestContext) built from the request
//! method, URI, query string and headers.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use weld_resolver::{ElementResolver, Resolver};
//! use weld_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = Resolver::new(ElementResolver::new(
//!         Arc::new(weld_widgets::builtin_controllers()),
//!         Arc::new(weld_widgets::builtin_templates()),
//!     ));
//!
//!     run_server(ServerConfig::default(), resolver).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (weld-server)
//!                       │
//!                       ├─► POST html_endpoint ──► Resolver::resolve_html
//!                       │
//!                       ├─► POST payload_endpoint ──► Resolver::resolve_payload
//!                       │                               + diagnostics block
//!                       └─► GET /health
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use state::AppState;
use weld_resolver::Resolver;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Route accepting raw HTML.
    pub html_endpoint: String,
    /// Route accepting JSON payloads.
    pub payload_endpoint: String,
    /// Key under which payload responses carry diagnostics.
    pub diagnostics_key: String,
    /// Log every resolution error as a warning.
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            html_endpoint: "/resolve-html".to_owned(),
            payload_endpoint: "/resolve".to_owned(),
            diagnostics_key: "_diagnostics".to_owned(),
            verbose: false,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot be bound.
pub async fn run_server(config: ServerConfig, resolver: Resolver) -> Result<(), ServerError> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))
        .map_err(|_| ServerError::Address(format!("{}:{}", config.host, config.port)))?;

    let app = router(&config, resolver);

    tracing::info!(
        address = %addr,
        html = %config.html_endpoint,
        payload = %config.payload_endpoint,
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router without binding a listener.
#[must_use]
pub fn router(config: &ServerConfig, resolver: Resolver) -> Router {
    app::create_router(Arc::new(AppState::new(resolver, config)), config)
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from weld config.
#[must_use]
pub fn server_config_from_weld_config(config: &weld_config::Config, verbose: bool) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        html_endpoint: config.server.html_endpoint.clone(),
        payload_endpoint: config.server.payload_endpoint.clone(),
        diagnostics_key: config.resolver_resolved.diagnostics_key.clone(),
        verbose,
    }
}
