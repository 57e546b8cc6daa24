//! Permanently disable a domain.
//!
//! Succeeds only when the reconciled state says the domain is disabled,
//! i.e. too few replicas remain enabled to ever serve it again.

use shared_types::{
    CombinerEndpoint, DisableDomainRequest, DisableDomainResponse, ErrorMessage, KeyVersionInfo,
    SignerEndpoint,
};
use tracing::warn;

use super::{CombineContext, EndpointAction};
use crate::domain::error::ApiError;
use crate::domain::validation::{validate_domain_request, CodecError};
use crate::VERSION;

#[derive(Debug, Clone, Copy, Default)]
pub struct DisableDomainAction;

impl EndpointAction for DisableDomainAction {
    type Request = DisableDomainRequest;
    type Response = DisableDomainResponse;
    type State = ();

    const ENDPOINT: CombinerEndpoint = CombinerEndpoint::DisableDomain;
    const SIGNER_ENDPOINT: SignerEndpoint = SignerEndpoint::DisableDomain;

    fn validate(&self, request: &DisableDomainRequest) -> Result<(), CodecError> {
        validate_domain_request(request)
    }

    fn begin(&self, _request: &DisableDomainRequest, _key: &KeyVersionInfo) -> Result<(), ApiError> {
        Ok(())
    }

    fn combine(
        &self,
        _state: (),
        ctx: CombineContext<'_, DisableDomainResponse>,
    ) -> Result<DisableDomainResponse, ApiError> {
        ctx.reconciler.log_domain_discrepancies(ctx.responses_by_url());
        let failure = || {
            ApiError::from_majority(
                ctx.summary.majority_error_code,
                ErrorMessage::ThresholdDisableDomainFailure,
            )
        };
        let domain = ctx
            .reconciler
            .reconcile_domain(ctx.session.threshold(), ctx.session.total_replicas(), ctx.responses())
            .map_err(|_| failure())?;
        if !domain.state.disabled {
            warn!(
                successes = ctx.session.responses().len(),
                "Domain still enabled on a threshold of signers"
            );
            return Err(failure());
        }
        ctx.session.extend_warnings(domain.warnings);

        Ok(DisableDomainResponse::ok(
            VERSION,
            domain.state,
            ctx.session.warnings().to_vec(),
        ))
    }
}
