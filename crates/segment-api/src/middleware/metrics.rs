//! Prometheus request metrics.
//!
//! Records `segments_http_requests_total{route,status}` and the request
//! latency histogram for every response, timeouts included.

use axum::{body::Body, http::Request, response::Response};
use segment_telemetry::{HTTP_REQUESTS, HTTP_REQUEST_DURATION};
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::router::routes;

/// Route label for a request path. Unknown paths share one label so the
/// metric cardinality stays bounded.
pub fn route_label(path: &str) -> &'static str {
    routes::ALL
        .iter()
        .copied()
        .find(|route| *route == path)
        .unwrap_or("unmatched")
}

/// Metrics layer
#[derive(Clone, Default)]
pub struct MetricsLayer;

impl MetricsLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

/// Metrics service
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for MetricsService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let route = route_label(req.uri().path());

        Box::pin(async move {
            let _timer = HTTP_REQUEST_DURATION
                .with_label_values(&[route])
                .start_timer();
            let result = inner.call(req).await;
            if let Ok(response) = &result {
                HTTP_REQUESTS
                    .with_label_values(&[route, response.status().as_str()])
                    .inc();
            }
            result
        })
    }
}
