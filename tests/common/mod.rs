//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use cors_filter::config::CorsConfig;
use cors_filter::cors::{CorsLayer, CorsService};
use tower::{Layer, Service};

/// Application stand-in: answers 200 with `x-app: yes`, counting calls.
#[derive(Clone, Default)]
pub struct CountingApp {
    calls: Arc<AtomicUsize>,
}

impl CountingApp {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Service<Request<Body>> for CountingApp {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<Body>) -> Self::Future {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(Response::builder()
            .status(StatusCode::OK)
            .header("x-app", "yes")
            .body(Body::from("app"))
            .unwrap()))
    }
}

/// Wrap a [`CountingApp`] in a CORS layer built from `config`.
pub fn cors_app(config: CorsConfig) -> (CorsService<CountingApp>, CountingApp) {
    let app = CountingApp::default();
    (CorsLayer::from_config(&config).layer(app.clone()), app)
}

/// Build a request with the given method and headers.
pub fn request(method: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri("/resource");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Header value as a string, if present.
pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// True if any `Access-Control-*` header is present.
pub fn has_cors_headers(response: &Response<Body>) -> bool {
    response
        .headers()
        .keys()
        .any(|name| name.as_str().starts_with("access-control-"))
}

/// Collect all headers as sorted `(name, value)` pairs.
pub fn header_pairs(response: &Response<Body>) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    pairs.sort();
    pairs
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
