//! Request span middleware.
//!
//! Every client request runs inside a `combiner_request` span. The endpoint
//! handler fills in `session_id` once the body is parsed; this layer records
//! the final status and latency.

use axum::body::Body;
use axum::http::{Request, Response};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{field, info, info_span, Instrument, Span};

/// Layer that wraps each request in a `combiner_request` span.
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

/// Service produced by [`TracingLayer`].
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S, ResBody> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let span = request_span(&req);

        Box::pin(
            async move {
                let started = Instant::now();
                let result = inner.call(req).await;

                if let Ok(response) = &result {
                    let status = response.status().as_u16();
                    Span::current().record("status", status);
                    info!(
                        status,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Request completed"
                    );
                }

                result
            }
            .instrument(span),
        )
    }
}

fn request_span<B>(req: &Request<B>) -> Span {
    info_span!(
        "combiner_request",
        http.method = %req.method(),
        http.target = %req.uri().path(),
        session_id = field::Empty,
        status = field::Empty,
    )
}
