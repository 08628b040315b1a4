//! Tower adapter for [`CorsFilter`].

use std::task::{Context, Poll};

use axum::http::{Request, Response};
use futures_util::future::{BoxFuture, FutureExt};
use tower::{Layer, Service};

use crate::config::CorsConfig;
use crate::cors::filter::CorsFilter;
use crate::cors::policy::PolicyConfig;

/// Layer that puts a [`CorsFilter`] in front of a service.
#[derive(Debug, Clone)]
pub struct CorsLayer {
    filter: CorsFilter,
}

impl CorsLayer {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            filter: CorsFilter::new(policy),
        }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            filter: CorsFilter::from_config(config),
        }
    }

    pub fn filter(&self) -> &CorsFilter {
        &self.filter
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = CorsService<S>;

    fn layer(&self, service: S) -> Self::Service {
        CorsService {
            inner: service,
            filter: self.filter.clone(),
        }
    }
}

/// Service produced by [`CorsLayer`].
#[derive(Debug, Clone)]
pub struct CorsService<S> {
    inner: S,
    filter: CorsFilter,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Keep the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let filter = self.filter.clone();

        async move {
            filter
                .evaluate(req, move |req: Request<ReqBody>| inner.call(req))
                .await
        }
        .boxed()
    }
}
