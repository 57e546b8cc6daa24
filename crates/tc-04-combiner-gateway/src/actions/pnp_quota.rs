//! Phone-number-privacy quota status.

use shared_types::{
    CombinerEndpoint, ErrorMessage, KeyVersionInfo, PnpQuotaRequest, PnpQuotaResponse,
    SignerEndpoint,
};

use super::{quota_failure, CombineContext, EndpointAction};
use crate::domain::error::ApiError;
use crate::domain::validation::{validate_account, CodecError};
use crate::VERSION;

#[derive(Debug, Clone, Copy, Default)]
pub struct PnpQuotaAction;

impl EndpointAction for PnpQuotaAction {
    type Request = PnpQuotaRequest;
    type Response = PnpQuotaResponse;
    type State = ();

    const ENDPOINT: CombinerEndpoint = CombinerEndpoint::PnpQuota;
    const SIGNER_ENDPOINT: SignerEndpoint = SignerEndpoint::PnpQuota;

    fn validate(&self, request: &PnpQuotaRequest) -> Result<(), CodecError> {
        validate_account(&request.account)
    }

    fn begin(&self, _request: &PnpQuotaRequest, _key: &KeyVersionInfo) -> Result<(), ApiError> {
        Ok(())
    }

    fn combine(&self, _state: (), ctx: CombineContext<'_, PnpQuotaResponse>) -> Result<PnpQuotaResponse, ApiError> {
        ctx.reconciler.log_pnp_discrepancies(ctx.responses_by_url());
        let quota = ctx
            .reconciler
            .reconcile_quota(ctx.session.threshold(), ctx.responses())
            .map_err(|e| {
                quota_failure(
                    &e,
                    ctx.summary.majority_error_code,
                    ErrorMessage::ThresholdPnpQuotaStatusFailure,
                )
            })?;
        ctx.session.extend_warnings(quota.warnings.iter().cloned());

        Ok(PnpQuotaResponse::ok(
            VERSION,
            quota.performed_query_count,
            quota.total_quota,
            quota.block_number,
            ctx.session.warnings().to_vec(),
        ))
    }
}
