//! # Endpoint Actions
//!
//! One [`EndpointAction`] per client endpoint. An action supplies only what
//! differs between endpoints: validation, how shares are folded in as
//! they arrive, and how the collected responses become the client response.
//! The pipeline around it lives in [`crate::handler::EndpointHandler`].
//!
//! | Action | Combination |
//! |--------|-------------|
//! | [`PnpSignAction`] | BLS combine, quota reconciliation |
//! | [`PnpQuotaAction`] | quota reconciliation |
//! | [`DomainSignAction`] | POPRF aggregation, domain-state reconciliation |
//! | [`DomainQuotaStatusAction`] | domain-state reconciliation |
//! | [`DisableDomainAction`] | domain-state reconciliation, must be disabled |

pub mod disable_domain;
pub mod domain_quota_status;
pub mod domain_sign;
pub mod pnp_quota;
pub mod pnp_sign;

pub use disable_domain::DisableDomainAction;
pub use domain_quota_status::DomainQuotaStatusAction;
pub use domain_sign::DomainSignAction;
pub use pnp_quota::PnpQuotaAction;
pub use pnp_sign::PnpSignAction;

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use shared_types::{
    CombinerEndpoint, ErrorType, KeyVersionInfo, OdisRequest, SignerEndpoint, WarningMessage,
};
use tc_01_crypto_combiner::{PartialSignatureShare, ThresholdCombiner};
use tc_02_state_reconciler::{ReconcileError, StateReconciler};
use tc_03_signer_dispatch::{DispatchSummary, Session};
use tracing::warn;

use crate::domain::error::{ApiError, ClientResponse};
use crate::domain::validation::CodecError;

/// Everything an action sees once dispatch has finished.
pub struct CombineContext<'a, R> {
    pub session: &'a mut Session<R>,
    pub summary: &'a DispatchSummary,
    pub reconciler: &'a StateReconciler,
}

impl<R> CombineContext<'_, R> {
    /// Successful responses recorded during dispatch.
    pub fn responses(&self) -> impl Iterator<Item = &R> {
        self.session.responses().iter().map(|r| &r.response)
    }

    /// Successful responses keyed by replica URL.
    pub fn responses_by_url(&self) -> impl Iterator<Item = (&str, &R)> {
        self.session
            .responses()
            .iter()
            .map(|r| (r.url.as_str(), &r.response))
    }
}

/// Per-endpoint behaviour plugged into the generic handler.
pub trait EndpointAction: Send + Sync + 'static {
    type Request: OdisRequest;
    /// Signer and client response envelope
    type Response: ClientResponse;
    /// Per-request state threaded from `begin` through `receive` to `combine`
    type State: Send;

    const ENDPOINT: CombinerEndpoint;
    const SIGNER_ENDPOINT: SignerEndpoint;

    fn validate(&self, request: &Self::Request) -> Result<(), CodecError>;

    /// Prepare per-request state for key version `key`.
    fn begin(&self, request: &Self::Request, key: &KeyVersionInfo) -> Result<Self::State, ApiError>;

    /// Fold in one successful signer response. Returning `true` ends the
    /// dispatch early.
    fn receive(&self, _state: &mut Self::State, _url: &str, _response: &Self::Response) -> bool {
        false
    }

    /// Build the client response from what was collected.
    fn combine(
        &self,
        state: Self::State,
        ctx: CombineContext<'_, Self::Response>,
    ) -> Result<Self::Response, ApiError>;
}

/// Add a base64 partial signature to `combiner` and try to combine.
///
/// Returns the combined result once the threshold is reached and combining
/// succeeds.
pub(crate) fn add_share_and_combine<C: ThresholdCombiner>(
    combiner: &mut C,
    url: &str,
    encoded: Option<&str>,
    message: &[u8],
) -> Option<Vec<u8>> {
    let bytes = match encoded.map(|s| BASE64.decode(s)) {
        Some(Ok(bytes)) => bytes,
        _ => {
            warn!(signer = url, "Signer returned an undecodable signature");
            return None;
        }
    };
    combiner.add_share(PartialSignatureShare::new(url, bytes));
    if !combiner.has_sufficient_shares() {
        return None;
    }
    combiner.combine(message).ok()
}

/// Client error for a failed quota reconciliation.
pub(crate) fn quota_failure(
    err: &ReconcileError,
    majority_error_code: Option<u16>,
    fallback: impl Into<ErrorType>,
) -> ApiError {
    match err {
        ReconcileError::InconsistentQuota { .. } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            WarningMessage::InconsistentSignerQuotaMeasurements,
        ),
        _ => ApiError::from_majority(majority_error_code, fallback),
    }
}

pub(crate) fn encode_signature(signature: &[u8]) -> String {
    BASE64.encode(signature)
}
