//! Domain-restricted signature (POPRF).
//!
//! Partial evaluations are blind-aggregated once a threshold has arrived.
//! The rate-limit state returned alongside is reconciled from the same
//! responses.

use shared_types::{
    CombinerEndpoint, DomainRestrictedSignatureRequest, DomainRestrictedSignatureResponse,
    ErrorMessage, KeyVersionInfo, SignerEndpoint,
};
use tc_01_crypto_combiner::PoprfCombiner;

use super::{add_share_and_combine, encode_signature, CombineContext, EndpointAction};
use crate::domain::error::ApiError;
use crate::domain::validation::{validate_blinded_g2, validate_domain_request, CodecError};
use crate::VERSION;

#[derive(Debug, Clone, Copy, Default)]
pub struct DomainSignAction;

pub struct DomainSignState {
    combiner: PoprfCombiner,
    signature: Option<Vec<u8>>,
}

impl EndpointAction for DomainSignAction {
    type Request = DomainRestrictedSignatureRequest;
    type Response = DomainRestrictedSignatureResponse;
    type State = DomainSignState;

    const ENDPOINT: CombinerEndpoint = CombinerEndpoint::DomainSign;
    const SIGNER_ENDPOINT: SignerEndpoint = SignerEndpoint::DomainSign;

    fn validate(&self, request: &DomainRestrictedSignatureRequest) -> Result<(), CodecError> {
        validate_domain_request(request)?;
        validate_blinded_g2(&request.blinded_message)?;
        Ok(())
    }

    fn begin(
        &self,
        _request: &DomainRestrictedSignatureRequest,
        key: &KeyVersionInfo,
    ) -> Result<DomainSignState, ApiError> {
        Ok(DomainSignState {
            combiner: PoprfCombiner::from_key_version(key),
            signature: None,
        })
    }

    fn receive(
        &self,
        state: &mut DomainSignState,
        url: &str,
        response: &DomainRestrictedSignatureResponse,
    ) -> bool {
        if state.signature.is_some() {
            return true;
        }
        state.signature =
            add_share_and_combine(&mut state.combiner, url, response.signature.as_deref(), &[]);
        state.signature.is_some()
    }

    fn combine(
        &self,
        state: DomainSignState,
        ctx: CombineContext<'_, DomainRestrictedSignatureResponse>,
    ) -> Result<DomainRestrictedSignatureResponse, ApiError> {
        ctx.reconciler.log_domain_discrepancies(ctx.responses_by_url());
        let domain = ctx.reconciler.reconcile_domain(
            ctx.session.threshold(),
            ctx.session.total_replicas(),
            ctx.responses(),
        );
        let majority = ctx.summary.majority_error_code;

        let Some(signature) = state.signature else {
            let mut err = ApiError::from_majority(majority, ErrorMessage::NotEnoughPartialSignatures);
            if let Ok(domain) = &domain {
                err = err.with_domain_state(domain.state);
            }
            return Err(err);
        };

        let domain = domain.map_err(|_| {
            ApiError::from_majority(majority, ErrorMessage::ThresholdDomainQuotaStatusFailure)
        })?;
        ctx.session.extend_warnings(domain.warnings);

        Ok(DomainRestrictedSignatureResponse::ok(
            VERSION,
            encode_signature(&signature),
            domain.state,
            ctx.session.warnings().to_vec(),
        ))
    }
}
