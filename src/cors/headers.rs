//! CORS header parsing and emission.

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS,
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, VARY,
};

/// `Vary` sent on every preflight response.
pub const PREFLIGHT_VARY: &str = "Origin, Access-Control-Request-Method, Access-Control-Request-Headers";

/// `Vary` added to decorated actual responses.
pub const ACTUAL_VARY: &str = "Origin";

/// Split a comma-separated header list into trimmed, lower-cased tokens.
///
/// Empty tokens are dropped, so `"X-Foo, x-bar ,,X-Baz"` yields
/// `["x-foo", "x-bar", "x-baz"]`.
pub fn parse_header_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Add a `Vary` entry without disturbing any the response already has.
pub fn append_vary(headers: &mut HeaderMap, value: &'static str) {
    headers.append(VARY, HeaderValue::from_static(value));
}

/// Remove every `Access-Control-*` header, whoever set it.
pub fn strip_cors_headers(headers: &mut HeaderMap) {
    let names: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with("access-control-"))
        .cloned()
        .collect();
    for name in names {
        headers.remove(name);
    }
}

/// Accumulates CORS response headers, then writes them in one go.
///
/// Nothing touches the response until [`CorsHeaders::apply`], so a
/// rejected request can never leave a partial set behind.
#[derive(Debug, Default, Clone)]
pub struct CorsHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl CorsHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.entries.push((name, value));
        self
    }

    pub fn allow_origin(self, value: HeaderValue) -> Self {
        self.with(ACCESS_CONTROL_ALLOW_ORIGIN, value)
    }

    /// Skipped if the method can't be a header value.
    pub fn allow_method(self, method: &str) -> Self {
        match HeaderValue::from_str(&method.to_uppercase()) {
            Ok(value) => self.with(ACCESS_CONTROL_ALLOW_METHODS, value),
            Err(_) => self,
        }
    }

    /// Skipped when `headers` is empty.
    pub fn allow_headers(self, headers: &[String]) -> Self {
        if headers.is_empty() {
            return self;
        }
        match HeaderValue::from_str(&headers.join(", ")) {
            Ok(value) => self.with(ACCESS_CONTROL_ALLOW_HEADERS, value),
            Err(_) => self,
        }
    }

    pub fn allow_credentials(self, allow: bool) -> Self {
        if allow {
            self.with(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"))
        } else {
            self
        }
    }

    pub fn max_age(self, value: Option<&HeaderValue>) -> Self {
        match value {
            Some(value) => self.with(ACCESS_CONTROL_MAX_AGE, value.clone()),
            None => self,
        }
    }

    pub fn expose_headers(self, value: Option<&HeaderValue>) -> Self {
        match value {
            Some(value) => self.with(ACCESS_CONTROL_EXPOSE_HEADERS, value.clone()),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header names in emission order, for diagnostics.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Write every accumulated header, replacing existing values.
    pub fn apply(self, headers: &mut HeaderMap) {
        for (name, value) in self.entries {
            headers.insert(name, value);
        }
    }
}
