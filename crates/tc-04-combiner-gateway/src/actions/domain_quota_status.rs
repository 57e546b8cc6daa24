//! Domain rate-limit state.

use shared_types::{
    CombinerEndpoint, DomainQuotaStatusRequest, DomainQuotaStatusResponse, ErrorMessage,
    KeyVersionInfo, SignerEndpoint,
};

use super::{CombineContext, EndpointAction};
use crate::domain::error::ApiError;
use crate::domain::validation::{validate_domain_request, CodecError};
use crate::VERSION;

#[derive(Debug, Clone, Copy, Default)]
pub struct DomainQuotaStatusAction;

impl EndpointAction for DomainQuotaStatusAction {
    type Request = DomainQuotaStatusRequest;
    type Response = DomainQuotaStatusResponse;
    type State = ();

    const ENDPOINT: CombinerEndpoint = CombinerEndpoint::DomainQuotaStatus;
    const SIGNER_ENDPOINT: SignerEndpoint = SignerEndpoint::DomainQuotaStatus;

    fn validate(&self, request: &DomainQuotaStatusRequest) -> Result<(), CodecError> {
        validate_domain_request(request)
    }

    fn begin(&self, _request: &DomainQuotaStatusRequest, _key: &KeyVersionInfo) -> Result<(), ApiError> {
        Ok(())
    }

    fn combine(
        &self,
        _state: (),
        ctx: CombineContext<'_, DomainQuotaStatusResponse>,
    ) -> Result<DomainQuotaStatusResponse, ApiError> {
        ctx.reconciler.log_domain_discrepancies(ctx.responses_by_url());
        let domain = ctx
            .reconciler
            .reconcile_domain(ctx.session.threshold(), ctx.session.total_replicas(), ctx.responses())
            .map_err(|_| {
                ApiError::from_majority(
                    ctx.summary.majority_error_code,
                    ErrorMessage::ThresholdDomainQuotaStatusFailure,
                )
            })?;
        ctx.session.extend_warnings(domain.warnings);

        Ok(DomainQuotaStatusResponse::ok(
            VERSION,
            domain.state,
            ctx.session.warnings().to_vec(),
        ))
    }
}
