//! Ordered request checks.
//!
//! Each request kind has a fixed list of named checks. They run in order
//! and the first failure decides the outcome, so the decision can be
//! inspected without building a response.

use std::borrow::Cow;
use std::fmt;

use axum::http::header::{ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use axum::http::{HeaderMap, HeaderValue, Method};

use crate::cors::headers::parse_header_list;
use crate::cors::policy::PolicyConfig;

/// The CORS-relevant slice of a request.
#[derive(Debug, Clone)]
pub struct RequestView {
    /// Method exactly as received.
    pub method: Method,
    /// `Origin`, if present and non-empty.
    pub origin: Option<HeaderValue>,
    /// `Access-Control-Request-Method`, verbatim.
    pub request_method: Option<String>,
    /// `Access-Control-Request-Headers`, parsed and lower-cased.
    pub request_headers: Vec<String>,
}

impl RequestView {
    pub fn new(method: &Method, headers: &HeaderMap) -> Self {
        let origin = headers
            .get(ORIGIN)
            .filter(|v| !v.as_bytes().is_empty())
            .cloned();

        let request_method = headers
            .get(ACCESS_CONTROL_REQUEST_METHOD)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // Several header lines are one list.
        let request_headers = headers
            .get_all(ACCESS_CONTROL_REQUEST_HEADERS)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_header_list)
            .collect();

        Self {
            method: method.clone(),
            origin,
            request_method,
            request_headers,
        }
    }

    /// The origin as text. Non-ASCII bytes are replaced, so such an origin
    /// can only match `*` or a pattern that accepts the replacement.
    pub fn origin_str(&self) -> Option<Cow<'_, str>> {
        self.origin
            .as_ref()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
    }
}

/// A named step in a check sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Origin,
    Method,
    Headers,
}

impl Check {
    pub fn as_str(&self) -> &'static str {
        match self {
            Check::Origin => "origin",
            Check::Method => "method",
            Check::Headers => "headers",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request failed its checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingOrigin,
    OriginNotAllowed(String),
    MissingRequestMethod,
    MethodNotAllowed(String),
    HeadersNotAllowed(Vec<String>),
}

impl Rejection {
    /// The check that produced this rejection.
    pub fn check(&self) -> Check {
        match self {
            Rejection::MissingOrigin | Rejection::OriginNotAllowed(_) => Check::Origin,
            Rejection::MissingRequestMethod | Rejection::MethodNotAllowed(_) => Check::Method,
            Rejection::HeadersNotAllowed(_) => Check::Headers,
        }
    }

    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::MissingOrigin => "missing_origin",
            Rejection::OriginNotAllowed(_) => "origin_not_allowed",
            Rejection::MissingRequestMethod => "missing_request_method",
            Rejection::MethodNotAllowed(_) => "method_not_allowed",
            Rejection::HeadersNotAllowed(_) => "headers_not_allowed",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingOrigin => write!(f, "no Origin header"),
            Rejection::OriginNotAllowed(o) => write!(f, "origin '{}' not allowed", o),
            Rejection::MissingRequestMethod => write!(f, "no Access-Control-Request-Method header"),
            Rejection::MethodNotAllowed(m) => write!(f, "method '{}' not allowed", m),
            Rejection::HeadersNotAllowed(h) => write!(f, "headers [{}] not allowed", h.join(", ")),
        }
    }
}

pub type CheckFn = fn(&PolicyConfig, &RequestView) -> Result<(), Rejection>;

/// Preflight: origin, then requested method, then requested headers.
pub const PREFLIGHT_CHECKS: &[(Check, CheckFn)] = &[
    (Check::Origin, check_origin),
    (Check::Method, check_requested_method),
    (Check::Headers, check_requested_headers),
];

/// Actual request: origin, then the request's own method.
pub const ACTUAL_CHECKS: &[(Check, CheckFn)] = &[
    (Check::Origin, check_origin),
    (Check::Method, check_method),
];

/// Run `checks` in order, stopping at the first failure.
pub fn run_checks(
    checks: &[(Check, CheckFn)],
    policy: &PolicyConfig,
    view: &RequestView,
) -> Result<(), Rejection> {
    for (check, run) in checks {
        match run(policy, view) {
            Ok(()) => {
                cors_debug!(policy, check = %check, passed = true, "CORS check");
            }
            Err(rejection) => {
                cors_debug!(policy, check = %check, passed = false, reason = %rejection, "CORS check");
                return Err(rejection);
            }
        }
    }
    Ok(())
}

fn check_origin(policy: &PolicyConfig, view: &RequestView) -> Result<(), Rejection> {
    let origin = view.origin_str().ok_or(Rejection::MissingOrigin)?;
    if policy.is_origin_allowed(&origin) {
        Ok(())
    } else {
        Err(Rejection::OriginNotAllowed(origin.into_owned()))
    }
}

fn check_requested_method(policy: &PolicyConfig, view: &RequestView) -> Result<(), Rejection> {
    let method = view
        .request_method
        .as_deref()
        .ok_or(Rejection::MissingRequestMethod)?;
    if policy.is_method_allowed(method) {
        Ok(())
    } else {
        Err(Rejection::MethodNotAllowed(method.to_string()))
    }
}

fn check_requested_headers(policy: &PolicyConfig, view: &RequestView) -> Result<(), Rejection> {
    if policy.are_headers_allowed(&view.request_headers) {
        Ok(())
    } else {
        let denied = view
            .request_headers
            .iter()
            .filter(|h| !policy.allowed_headers().contains(*h))
            .cloned()
            .collect();
        Err(Rejection::HeadersNotAllowed(denied))
    }
}

fn check_method(policy: &PolicyConfig, view: &RequestView) -> Result<(), Rejection> {
    let method = view.method.as_str();
    if policy.is_method_allowed(method) {
        Ok(())
    } else {
        Err(Rejection::MethodNotAllowed(method.to_string()))
    }
}
