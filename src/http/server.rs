//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the echo handler
//! - Wire up middleware (CORS, timeout, request ID, tracing)
//! - Bind server to listener
//! - Stop on the shutdown signal

use std::time::Duration;

use axum::{
    http::{HeaderMap, Method, Uri},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::lint_cors;
use crate::config::FilterConfig;
use crate::cors::{CorsLayer, PolicyConfig};
use crate::http::request::{RequestIdMaker, X_REQUEST_ID};
use crate::lifecycle::ShutdownSignal;

/// HTTP server that answers every path through the CORS filter.
pub struct HttpServer {
    router: Router,
    config: FilterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        for warning in lint_cors(&config.cors) {
            tracing::warn!(%warning, "Suspicious CORS policy entry");
        }

        let policy = PolicyConfig::from_config(&config.cors);
        tracing::info!(
            allow_all_origins = policy.allow_all_origins(),
            plain_origins = policy.plain_origins().len(),
            wildcard_origins = policy.wildcard_origins().len(),
            allowed_methods = ?policy.allowed_methods(),
            allow_credentials = policy.allow_credentials(),
            options_passthrough = policy.options_passthrough(),
            "CORS policy loaded"
        );

        let router = Self::build_router(&config, policy);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FilterConfig, policy: PolicyConfig) -> Router {
        Router::new()
            .route("/{*path}", any(echo_handler))
            .route("/", any(echo_handler))
            .layer(CorsLayer::new(policy))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(RequestIdMaker))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

/// Describes the request back to the caller.
async fn echo_handler(method: Method, uri: Uri, headers: HeaderMap) -> Json<Value> {
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        "Echoing request"
    );

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "request_id": request_id,
    }))
}
