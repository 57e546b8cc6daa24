//! HTTP routes.

use axum::http::HeaderMap;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use bytes::Bytes;
use shared_types::{CombinerEndpoint, StatusResponse};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::actions::{
    DisableDomainAction, DomainQuotaStatusAction, DomainSignAction, EndpointAction, PnpQuotaAction,
    PnpSignAction,
};
use crate::handler::EndpointHandler;
use crate::middleware::TracingLayer;
use crate::VERSION;

/// One handler per client endpoint.
#[derive(Clone)]
pub struct CombinerRoutes {
    pub pnp_sign: EndpointHandler<PnpSignAction>,
    pub pnp_quota: EndpointHandler<PnpQuotaAction>,
    pub domain_sign: EndpointHandler<DomainSignAction>,
    pub domain_quota_status: EndpointHandler<DomainQuotaStatusAction>,
    pub disable_domain: EndpointHandler<DisableDomainAction>,
}

impl CombinerRoutes {
    pub fn into_router(self, max_body_bytes: usize) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(TracingLayer::new())
            .layer(RequestBodyLimitLayer::new(max_body_bytes));

        Router::new()
            .route(CombinerEndpoint::PnpSign.path(), endpoint(self.pnp_sign))
            .route(CombinerEndpoint::PnpQuota.path(), endpoint(self.pnp_quota))
            .route(CombinerEndpoint::DomainSign.path(), endpoint(self.domain_sign))
            .route(
                CombinerEndpoint::DomainQuotaStatus.path(),
                endpoint(self.domain_quota_status),
            )
            .route(CombinerEndpoint::DisableDomain.path(), endpoint(self.disable_domain))
            .route(CombinerEndpoint::Status.path(), get(status))
            .layer(middleware)
    }
}

fn endpoint<A: EndpointAction>(handler: EndpointHandler<A>) -> MethodRouter {
    post(move |headers: HeaderMap, body: Bytes| async move { handler.handle(headers, body).await })
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        version: VERSION.to_string(),
    })
}
