//! # Endpoint Handler
//!
//! The request pipeline shared by every endpoint:
//!
//! ```text
//! enabled? ──► parse + validate ──► authenticate ──► resolve key version
//!    501            400                 401                 400
//!
//!   ──► begin ──► dispatch to signers ──► combine ──► respond once
//! ```
//!
//! Panics inside the pipeline are caught and answered with 500
//! `UNKNOWN_ERROR`.

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures::FutureExt;
use shared_types::{ErrorMessage, OdisRequest, SignerReplica, WarningMessage, KEY_VERSION_HEADER};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tc_02_state_reconciler::StateReconciler;
use tc_03_signer_dispatch::{DispatchOptions, Session, SignerDispatcher, SignerRequest};
use tracing::{debug, error, warn, Span};

use crate::actions::{CombineContext, EndpointAction};
use crate::domain::config::ServiceConfig;
use crate::domain::error::{ApiError, GatewayError};
use crate::domain::key_versions::KeyVersionRegistry;
use crate::domain::responder::Responder;
use crate::domain::validation::parse_client_request;
use crate::ports::outbound::{AuthRequest, RequestAuthenticator};

/// Read-only settings of one service (PNP or domains), built at startup.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pub replicas: Vec<SignerReplica>,
    /// `None` when the service is disabled
    pub keys: Option<KeyVersionRegistry>,
    pub dispatch: DispatchOptions,
}

impl ServiceContext {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, GatewayError> {
        let keys = if config.enabled {
            Some(KeyVersionRegistry::new(&config.keys)?)
        } else {
            None
        };
        Ok(Self {
            replicas: config.signers.clone(),
            keys,
            dispatch: DispatchOptions {
                timeout: config.timeout,
                should_check_key_version: config.should_check_key_version,
            },
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.keys.is_some()
    }
}

/// Runs the shared pipeline around one [`EndpointAction`].
pub struct EndpointHandler<A> {
    action: Arc<A>,
    service: Arc<ServiceContext>,
    dispatcher: SignerDispatcher,
    authenticator: Arc<dyn RequestAuthenticator>,
    reconciler: Arc<StateReconciler>,
}

impl<A> Clone for EndpointHandler<A> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            service: Arc::clone(&self.service),
            dispatcher: self.dispatcher.clone(),
            authenticator: Arc::clone(&self.authenticator),
            reconciler: Arc::clone(&self.reconciler),
        }
    }
}

impl<A: EndpointAction> EndpointHandler<A> {
    pub fn new(
        action: A,
        service: Arc<ServiceContext>,
        dispatcher: SignerDispatcher,
        authenticator: Arc<dyn RequestAuthenticator>,
        reconciler: Arc<StateReconciler>,
    ) -> Self {
        Self {
            action: Arc::new(action),
            service,
            dispatcher,
            authenticator,
            reconciler,
        }
    }

    /// Answer one client request. Always produces exactly one response.
    pub async fn handle(&self, headers: HeaderMap, body: Bytes) -> Response {
        let mut responder = Responder::<A::Response>::new();
        let outcome = AssertUnwindSafe(self.process(&headers, body, &mut responder))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(response)) => {
                responder.send(StatusCode::OK, &response);
            }
            Ok(Err(err)) => {
                warn!(
                    endpoint = %A::ENDPOINT,
                    status = err.status.as_u16(),
                    error = %err.error,
                    "Request failed"
                );
                responder.send_error(&err);
            }
            Err(_) => {
                error!(endpoint = %A::ENDPOINT, "{}: handler panicked", ErrorMessage::UnknownError);
                responder.send_error(&ApiError::unknown());
            }
        }
        responder.finish()
    }

    async fn process(
        &self,
        headers: &HeaderMap,
        body: Bytes,
        responder: &mut Responder<A::Response>,
    ) -> Result<A::Response, ApiError> {
        let keys = self.service.keys.as_ref().ok_or_else(ApiError::unavailable)?;

        let request = parse_client_request::<A::Request>(&body)
            .and_then(|request| self.action.validate(&request).map(|_| request))
            .map_err(|e| {
                warn!(endpoint = %A::ENDPOINT, error = %e, "{}", WarningMessage::InvalidInput);
                ApiError::invalid_input()
            })?;
        if let Some(session_id) = request.session_id() {
            Span::current().record("session_id", session_id);
        }

        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let authenticated = self
            .authenticator
            .authenticate(AuthRequest {
                endpoint: A::ENDPOINT,
                authorization,
                body: &body,
            })
            .await;
        if !authenticated {
            return Err(ApiError::unauthenticated());
        }

        let key_header = headers
            .get(KEY_VERSION_HEADER)
            .map(|v| v.to_str().unwrap_or_default());
        let key = keys.resolve(key_header)?;
        responder.set_key_version(key.key_version);

        let mut state = self.action.begin(&request, key)?;
        let replicas = &self.service.replicas;
        let mut session = Session::<A::Response>::new(key.threshold, replicas.len(), key.key_version);
        debug!(
            endpoint = %A::ENDPOINT,
            session = %session.id(),
            key_version = key.key_version,
            threshold = key.threshold,
            "Dispatching request"
        );

        let signer_request = SignerRequest {
            endpoint: A::SIGNER_ENDPOINT,
            key_version: key.key_version,
            authorization: authorization.map(str::to_owned),
            body,
        };
        let action = self.action.as_ref();
        let summary = self
            .dispatcher
            .dispatch(
                &mut session,
                replicas,
                signer_request,
                self.service.dispatch,
                |url, response| action.receive(&mut state, url, response),
            )
            .await;

        action.combine(
            state,
            CombineContext {
                session: &mut session,
                summary: &summary,
                reconciler: &self.reconciler,
            },
        )
    }
}
