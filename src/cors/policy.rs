//! Normalized, immutable CORS policy.
//!
//! # Responsibilities
//! - Turn a raw [`CorsConfig`] into precomputed match sets
//! - Answer the three policy questions: origin, method, headers
//!
//! # Design Decisions
//! - Construction never fails; malformed entries become literals that
//!   simply never match
//! - Origins and headers are compared lower-cased, methods upper-cased
//! - An empty method list allows nothing, not even `OPTIONS`

use std::collections::HashSet;

use axum::http::HeaderValue;

use crate::config::{CorsConfig, PreflightRejection};

const WILDCARD: &str = "*";
const OPTIONS: &str = "OPTIONS";

/// An origin pattern with exactly one `*`, matched by prefix and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardOrigin {
    prefix: String,
    suffix: String,
}

impl WildcardOrigin {
    /// Split a lower-cased pattern at its single `*`.
    ///
    /// Returns `None` when the pattern has zero or several wildcards.
    pub fn parse(pattern: &str) -> Option<Self> {
        if pattern.matches('*').count() != 1 {
            return None;
        }
        let (prefix, suffix) = pattern.split_once('*')?;
        Some(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Prefix and suffix regions may overlap only down to their combined
    /// length; anything shorter never matches.
    pub fn matches(&self, origin: &str) -> bool {
        origin.len() >= self.prefix.len() + self.suffix.len()
            && origin.starts_with(&self.prefix)
            && origin.ends_with(&self.suffix)
    }
}

/// The precomputed policy a [`crate::cors::CorsFilter`] matches against.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    allow_all_origins: bool,
    plain_origins: HashSet<String>,
    wildcard_origins: Vec<WildcardOrigin>,
    allow_all_headers: bool,
    allowed_headers: HashSet<String>,
    allowed_methods: HashSet<String>,
    exposed_headers: Vec<String>,
    allow_credentials: bool,
    max_age: u64,
    options_passthrough: bool,
    preflight_rejection: PreflightRejection,
    debug: bool,

    // Response header values that never depend on the request.
    expose_headers_value: Option<HeaderValue>,
    max_age_value: Option<HeaderValue>,
}

impl PolicyConfig {
    /// Normalize a raw policy.
    pub fn from_config(config: &CorsConfig) -> Self {
        let mut allow_all_origins = false;
        let mut plain_origins = HashSet::new();
        let mut wildcard_origins = Vec::new();

        for origin in &config.allowed_origins {
            let origin = origin.to_lowercase();
            if origin == WILDCARD {
                // Later entries are irrelevant once everything matches.
                allow_all_origins = true;
                break;
            }
            match WildcardOrigin::parse(&origin) {
                Some(pattern) => wildcard_origins.push(pattern),
                None => {
                    plain_origins.insert(origin);
                }
            }
        }

        // Browsers may list Origin itself in Access-Control-Request-Headers.
        let mut raw_headers = config.allowed_headers.clone();
        raw_headers.push("Origin".to_string());

        let allow_all_headers = raw_headers.iter().any(|h| h == WILDCARD);
        let allowed_headers = raw_headers.iter().map(|h| h.to_lowercase()).collect();

        let allowed_methods = config
            .allowed_methods
            .iter()
            .map(|m| m.to_uppercase())
            .collect();

        let mut exposed_headers: Vec<String> = Vec::new();
        for header in &config.exposed_headers {
            let header = header.to_lowercase();
            if !exposed_headers.contains(&header) {
                exposed_headers.push(header);
            }
        }

        let expose_headers_value = if exposed_headers.is_empty() {
            None
        } else {
            let joined = exposed_headers.join(", ");
            match HeaderValue::from_str(&joined) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(exposed_headers = %joined, "Exposed headers are not a valid header value; omitting");
                    None
                }
            }
        };

        let max_age_value = (config.max_age > 0).then(|| HeaderValue::from(config.max_age));

        Self {
            allow_all_origins,
            plain_origins,
            wildcard_origins,
            allow_all_headers,
            allowed_headers,
            allowed_methods,
            exposed_headers,
            allow_credentials: config.allow_credentials,
            max_age: config.max_age,
            options_passthrough: config.options_passthrough,
            preflight_rejection: config.preflight_rejection,
            debug: config.debug,
            expose_headers_value,
            max_age_value,
        }
    }

    /// Whether `origin` may make cross-origin requests.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.allow_all_origins {
            return true;
        }
        let origin = origin.to_lowercase();
        if self.plain_origins.contains(&origin) {
            return true;
        }
        self.wildcard_origins.iter().any(|w| w.matches(&origin))
    }

    /// Whether `method` is permitted.
    ///
    /// `OPTIONS` always passes unless no method at all is configured.
    pub fn is_method_allowed(&self, method: &str) -> bool {
        if self.allowed_methods.is_empty() {
            return false;
        }
        let method = method.to_uppercase();
        if method == OPTIONS {
            return true;
        }
        self.allowed_methods.contains(&method)
    }

    /// Whether every (already lower-cased) header in `headers` is permitted.
    pub fn are_headers_allowed(&self, headers: &[String]) -> bool {
        if self.allow_all_headers || self.allowed_headers.is_empty() {
            return true;
        }
        headers.iter().all(|h| self.allowed_headers.contains(h))
    }

    /// Value for `Access-Control-Allow-Origin`.
    ///
    /// `*` is only ever sent when credentials are off; otherwise the
    /// request's own origin is echoed back.
    pub fn allow_origin_value(&self, origin: &HeaderValue) -> HeaderValue {
        if self.allow_all_origins && !self.allow_credentials {
            HeaderValue::from_static(WILDCARD)
        } else {
            origin.clone()
        }
    }

    pub fn allow_all_origins(&self) -> bool {
        self.allow_all_origins
    }

    pub fn allow_all_headers(&self) -> bool {
        self.allow_all_headers
    }

    pub fn plain_origins(&self) -> &HashSet<String> {
        &self.plain_origins
    }

    pub fn wildcard_origins(&self) -> &[WildcardOrigin] {
        &self.wildcard_origins
    }

    pub fn allowed_headers(&self) -> &HashSet<String> {
        &self.allowed_headers
    }

    pub fn allowed_methods(&self) -> &HashSet<String> {
        &self.allowed_methods
    }

    pub fn exposed_headers(&self) -> &[String] {
        &self.exposed_headers
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    pub fn options_passthrough(&self) -> bool {
        self.options_passthrough
    }

    pub fn preflight_rejection(&self) -> PreflightRejection {
        self.preflight_rejection
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn expose_headers_value(&self) -> Option<&HeaderValue> {
        self.expose_headers_value.as_ref()
    }

    pub(crate) fn max_age_value(&self) -> Option<&HeaderValue> {
        self.max_age_value.as_ref()
    }
}

impl From<&CorsConfig> for PolicyConfig {
    fn from(config: &CorsConfig) -> Self {
        Self::from_config(config)
    }
}
