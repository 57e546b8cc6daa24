//! Phone-number-privacy blind signature.
//!
//! Partial signatures are combined as they arrive; the dispatch ends as soon
//! as a combined signature verifies. The quota reported with it is the
//! threshold-ranked reconciliation of the signers that answered.

use axum::http::StatusCode;
use shared_types::{
    CombinerEndpoint, ErrorMessage, KeyVersionInfo, SignMessageRequest, SignMessageResponse,
    SignerEndpoint, WarningMessage,
};
use tc_01_crypto_combiner::BlsCombiner;
use tracing::error;

use super::{add_share_and_combine, encode_signature, quota_failure, CombineContext, EndpointAction};
use crate::domain::error::ApiError;
use crate::domain::validation::{validate_account, validate_blinded_g1, CodecError};
use crate::VERSION;

const FORBIDDEN: u16 = 403;

#[derive(Debug, Clone, Copy, Default)]
pub struct PnpSignAction;

pub struct PnpSignState {
    combiner: BlsCombiner,
    blinded_message: Vec<u8>,
    signature: Option<Vec<u8>>,
}

impl EndpointAction for PnpSignAction {
    type Request = SignMessageRequest;
    type Response = SignMessageResponse;
    type State = PnpSignState;

    const ENDPOINT: CombinerEndpoint = CombinerEndpoint::PnpSign;
    const SIGNER_ENDPOINT: SignerEndpoint = SignerEndpoint::PnpSign;

    fn validate(&self, request: &SignMessageRequest) -> Result<(), CodecError> {
        validate_account(&request.account)?;
        validate_blinded_g1(&request.blinded_query_phone_number)?;
        Ok(())
    }

    fn begin(&self, request: &SignMessageRequest, key: &KeyVersionInfo) -> Result<PnpSignState, ApiError> {
        let blinded_message =
            validate_blinded_g1(&request.blinded_query_phone_number).map_err(|_| ApiError::invalid_input())?;
        let combiner = BlsCombiner::from_key_version(key).map_err(|e| {
            error!(key_version = key.key_version, error = %e, "Key material unusable");
            ApiError::unknown()
        })?;
        Ok(PnpSignState {
            combiner,
            blinded_message,
            signature: None,
        })
    }

    fn receive(&self, state: &mut PnpSignState, url: &str, response: &SignMessageResponse) -> bool {
        if state.signature.is_some() {
            return true;
        }
        state.signature = add_share_and_combine(
            &mut state.combiner,
            url,
            response.signature.as_deref(),
            &state.blinded_message,
        );
        state.signature.is_some()
    }

    fn combine(
        &self,
        state: PnpSignState,
        ctx: CombineContext<'_, SignMessageResponse>,
    ) -> Result<SignMessageResponse, ApiError> {
        ctx.reconciler.log_pnp_discrepancies(ctx.responses_by_url());
        let quota = ctx
            .reconciler
            .reconcile_quota(ctx.session.threshold(), ctx.responses());
        let majority = ctx.summary.majority_error_code;

        let Some(signature) = state.signature else {
            let mut err = if majority == Some(FORBIDDEN) {
                ApiError::new(StatusCode::FORBIDDEN, WarningMessage::ExceededQuota)
            } else {
                ApiError::from_majority(majority, ErrorMessage::NotEnoughPartialSignatures)
            };
            if let Ok(quota) = &quota {
                err = err.with_quota(quota.fields());
            }
            return Err(err);
        };

        let quota = quota.map_err(|e| {
            error!(error = %e, "Signature combined but quota could not be reconciled");
            quota_failure(&e, majority, ErrorMessage::NotEnoughPartialSignatures)
        })?;
        ctx.session.extend_warnings(quota.warnings.iter().cloned());

        Ok(SignMessageResponse::ok(
            VERSION,
            encode_signature(&signature),
            quota.performed_query_count,
            quota.total_quota,
            quota.block_number,
            ctx.session.warnings().to_vec(),
        ))
    }
}
