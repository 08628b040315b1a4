//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of server settings (serde handles syntactic)
//! - Validate value ranges and addresses
//! - Lint the CORS policy for entries that can never match
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - The CORS policy is never rejected; malformed entries are literals
//!   that don't match, so they only produce warnings

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{CorsConfig, FilterConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A setting that prevents the server from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check the server settings.
pub fn validate_config(config: &FilterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Advisory finding about a CORS policy entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsWarning {
    /// More than one `*`: treated as a literal and never matches.
    MultipleWildcards(String),
    /// Not a `scheme://host[:port]` origin, so no browser will send it.
    NotAnOrigin(String),
    /// `*` with credentials: the origin is echoed instead of `*`.
    WildcardWithCredentials,
    /// No methods configured: every preflight is rejected.
    NoMethods,
}

impl fmt::Display for CorsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsWarning::MultipleWildcards(o) => {
                write!(f, "origin '{}' has several '*' and will never match", o)
            }
            CorsWarning::NotAnOrigin(o) => {
                write!(f, "origin '{}' is not a serialized origin and will never match", o)
            }
            CorsWarning::WildcardWithCredentials => write!(
                f,
                "'*' origin with credentials: the request origin is echoed instead of '*'"
            ),
            CorsWarning::NoMethods => {
                write!(f, "allowed_methods is empty: every cross-origin request is refused")
            }
        }
    }
}

/// Find CORS entries that are legal but almost certainly mistakes.
pub fn lint_cors(cors: &CorsConfig) -> Vec<CorsWarning> {
    let mut warnings = Vec::new();

    for origin in &cors.allowed_origins {
        match origin.matches('*').count() {
            0 if !is_serialized_origin(origin) => {
                warnings.push(CorsWarning::NotAnOrigin(origin.clone()));
            }
            0 | 1 => {}
            _ => warnings.push(CorsWarning::MultipleWildcards(origin.clone())),
        }
    }

    if cors.allow_credentials && cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push(CorsWarning::WildcardWithCredentials);
    }
    if cors.allowed_methods.is_empty() {
        warnings.push(CorsWarning::NoMethods);
    }

    warnings
}

fn is_serialized_origin(origin: &str) -> bool {
    // Browsers send "null" for opaque origins.
    if origin.eq_ignore_ascii_case("null") {
        return true;
    }
    match Url::parse(origin) {
        Ok(url) => url.origin().ascii_serialization() == origin.to_lowercase(),
        Err(_) => false,
    }
}
