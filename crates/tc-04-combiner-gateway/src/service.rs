//! Combiner service: wires configuration, transport and authentication into
//! the HTTP router and runs it until shutdown.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tc_02_state_reconciler::StateReconciler;
use tc_03_signer_dispatch::{SignerDispatcher, SignerTransport};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::actions::{
    DisableDomainAction, DomainQuotaStatusAction, DomainSignAction, PnpQuotaAction, PnpSignAction,
};
use crate::domain::config::CombinerConfig;
use crate::domain::error::GatewayError;
use crate::handler::{EndpointHandler, ServiceContext};
use crate::ports::outbound::RequestAuthenticator;
use crate::router::CombinerRoutes;

pub struct CombinerService {
    config: Arc<CombinerConfig>,
    routes: CombinerRoutes,
}

impl CombinerService {
    /// Validate `config` and build the endpoint handlers.
    pub fn new(
        config: CombinerConfig,
        transport: Arc<dyn SignerTransport>,
        authenticator: Arc<dyn RequestAuthenticator>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let pnp = Arc::new(ServiceContext::from_config(&config.phone_number_privacy)?);
        let domains = Arc::new(ServiceContext::from_config(&config.domains)?);
        let dispatcher = SignerDispatcher::new(transport);
        let reconciler = Arc::new(StateReconciler::new(config.discrepancy.clone()));

        for (name, service) in [("phone_number_privacy", &pnp), ("domains", &domains)] {
            if service.is_enabled() {
                info!(
                    service = name,
                    signers = service.replicas.len(),
                    timeout_ms = service.dispatch.timeout.as_millis() as u64,
                    "Service enabled"
                );
            } else {
                warn!(service = name, "Service disabled, its endpoints answer 501");
            }
        }

        let routes = CombinerRoutes {
            pnp_sign: EndpointHandler::new(
                PnpSignAction,
                Arc::clone(&pnp),
                dispatcher.clone(),
                Arc::clone(&authenticator),
                Arc::clone(&reconciler),
            ),
            pnp_quota: EndpointHandler::new(
                PnpQuotaAction,
                pnp,
                dispatcher.clone(),
                Arc::clone(&authenticator),
                Arc::clone(&reconciler),
            ),
            domain_sign: EndpointHandler::new(
                DomainSignAction,
                Arc::clone(&domains),
                dispatcher.clone(),
                Arc::clone(&authenticator),
                Arc::clone(&reconciler),
            ),
            domain_quota_status: EndpointHandler::new(
                DomainQuotaStatusAction,
                Arc::clone(&domains),
                dispatcher.clone(),
                Arc::clone(&authenticator),
                Arc::clone(&reconciler),
            ),
            disable_domain: EndpointHandler::new(
                DisableDomainAction,
                domains,
                dispatcher,
                authenticator,
                reconciler,
            ),
        };

        Ok(Self {
            config: Arc::new(config),
            routes,
        })
    }

    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        self.routes
            .clone()
            .into_router(self.config.server.max_body_bytes)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.server_addr()).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener.local_addr()?;
        info!(%addr, "Combiner listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Combiner stopped");
        Ok(())
    }
}
