//! The CORS filter: one link in a request/response chain.
//!
//! # Responsibilities
//! - Classify requests as preflight (`OPTIONS`) or actual
//! - Run the matching check sequence against the policy
//! - Reject preflights with 401, or decorate responses with CORS headers
//! - Invoke the rest of the chain (`next`) at most once
//!
//! # Design Decisions
//! - Method classification is case-sensitive: only `OPTIONS` is a preflight
//! - Checks are decided before `next` runs; `next` only supplies a response
//! - Errors from `next` are returned untouched

use std::future::Future;
use std::sync::Arc;

use axum::http::{Method, Request, Response, StatusCode};

use crate::config::{CorsConfig, PreflightRejection};
use crate::cors::check::{run_checks, RequestView, ACTUAL_CHECKS, PREFLIGHT_CHECKS};
use crate::cors::headers::{
    append_vary, strip_cors_headers, CorsHeaders, ACTUAL_VARY, PREFLIGHT_VARY,
};
use crate::cors::policy::PolicyConfig;
use crate::observability::metrics;

/// The rest of the chain, as seen from the filter.
///
/// Taken by value: the filter can call it once or drop it, never more.
/// Any `FnOnce(Request) -> impl Future<Output = Result<Response, E>>`
/// qualifies.
pub trait Next<ReqBody, ResBody> {
    type Error;
    type Future: Future<Output = Result<Response<ResBody>, Self::Error>>;

    fn run(self, request: Request<ReqBody>) -> Self::Future;
}

impl<F, Fut, ReqBody, ResBody, E> Next<ReqBody, ResBody> for F
where
    F: FnOnce(Request<ReqBody>) -> Fut,
    Fut: Future<Output = Result<Response<ResBody>, E>>,
{
    type Error = E;
    type Future = Fut;

    fn run(self, request: Request<ReqBody>) -> Self::Future {
        self(request)
    }
}

/// CORS decision engine over a shared, immutable policy.
#[derive(Debug, Clone)]
pub struct CorsFilter {
    policy: Arc<PolicyConfig>,
}

impl CorsFilter {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(PolicyConfig::from_config(config))
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Evaluate one request, calling `next` when the request may proceed
    /// (or when passthrough asks the application for a preflight body).
    pub async fn evaluate<ReqBody, ResBody, N>(
        &self,
        request: Request<ReqBody>,
        next: N,
    ) -> Result<Response<ResBody>, N::Error>
    where
        N: Next<ReqBody, ResBody>,
        ResBody: Default,
    {
        if request.method() == Method::OPTIONS {
            self.handle_preflight(request, next).await
        } else {
            self.handle_actual(request, next).await
        }
    }

    async fn handle_preflight<ReqBody, ResBody, N>(
        &self,
        request: Request<ReqBody>,
        next: N,
    ) -> Result<Response<ResBody>, N::Error>
    where
        N: Next<ReqBody, ResBody>,
        ResBody: Default,
    {
        let policy = &*self.policy;
        let view = RequestView::new(request.method(), request.headers());
        let verdict = run_checks(PREFLIGHT_CHECKS, policy, &view);

        let forward = policy.options_passthrough()
            && (verdict.is_ok() || policy.preflight_rejection() == PreflightRejection::Forward);

        let mut response = if forward {
            next.run(request).await?
        } else {
            Response::default()
        };
        append_vary(response.headers_mut(), PREFLIGHT_VARY);

        let origin = match (verdict, view.origin.as_ref()) {
            (Ok(()), Some(origin)) => origin,
            (Err(rejection), _) => {
                metrics::record_preflight(rejection.label());
                cors_debug!(
                    policy,
                    reason = %rejection,
                    forwarded = forward,
                    "Preflight rejected"
                );
                // A forwarded response may carry the application's own CORS headers.
                strip_cors_headers(response.headers_mut());
                *response.status_mut() = StatusCode::UNAUTHORIZED;
                return Ok(response);
            }
            // The origin check cannot pass without an origin.
            (Ok(()), None) => return Ok(response),
        };

        let headers = CorsHeaders::new()
            .allow_origin(policy.allow_origin_value(origin))
            .allow_method(view.request_method.as_deref().unwrap_or_default())
            .allow_headers(&view.request_headers)
            .allow_credentials(policy.allow_credentials())
            .max_age(policy.max_age_value());

        metrics::record_preflight("allowed");
        cors_debug!(
            policy,
            origin = ?origin,
            headers = ?headers.names(),
            forwarded = forward,
            "Preflight allowed"
        );
        headers.apply(response.headers_mut());
        Ok(response)
    }

    async fn handle_actual<ReqBody, ResBody, N>(
        &self,
        request: Request<ReqBody>,
        next: N,
    ) -> Result<Response<ResBody>, N::Error>
    where
        N: Next<ReqBody, ResBody>,
    {
        let policy = &*self.policy;
        let view = RequestView::new(request.method(), request.headers());
        let verdict = run_checks(ACTUAL_CHECKS, policy, &view);

        let mut response = next.run(request).await?;

        let origin = match (verdict, view.origin.as_ref()) {
            (Ok(()), Some(origin)) => origin,
            (Err(rejection), _) => {
                metrics::record_actual(rejection.label());
                cors_debug!(policy, reason = %rejection, "Actual request left undecorated");
                return Ok(response);
            }
            (Ok(()), None) => return Ok(response),
        };

        let headers = CorsHeaders::new()
            .allow_origin(policy.allow_origin_value(origin))
            .expose_headers(policy.expose_headers_value())
            .allow_credentials(policy.allow_credentials());

        metrics::record_actual("allowed");
        cors_debug!(
            policy,
            origin = ?origin,
            headers = ?headers.names(),
            "Actual request decorated"
        );
        append_vary(response.headers_mut(), ACTUAL_VARY);
        headers.apply(response.headers_mut());
        Ok(response)
    }
}
