//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the filter
//! and its demo server. All types derive Serde traits for deserialization
//! from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// CORS policy.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// What happens to a rejected preflight when `options_passthrough` is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreflightRejection {
    /// The application still builds the response; the filter forces 401.
    #[default]
    Forward,
    /// The filter answers 401 itself and the application never runs.
    ShortCircuit,
}

/// Raw CORS policy as written by the operator.
///
/// Nothing here is normalized; see [`crate::cors::PolicyConfig`] for the
/// precomputed form the filter matches against.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact origins, `*`, or single-`*` patterns like `https://*.example.com`.
    pub allowed_origins: Vec<String>,

    /// Methods permitted on cross-origin requests. Empty allows nothing.
    pub allowed_methods: Vec<String>,

    /// Request headers a preflight may ask for. `*` allows any.
    pub allowed_headers: Vec<String>,

    /// Response headers exposed to scripts on actual requests.
    pub exposed_headers: Vec<String>,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds (0 = header omitted).
    pub max_age: u64,

    /// Forward preflights to the application for the response body.
    pub options_passthrough: bool,

    /// Rejected-preflight handling under `options_passthrough`.
    pub preflight_rejection: PreflightRejection,

    /// Emit per-decision diagnostics.
    pub debug: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
