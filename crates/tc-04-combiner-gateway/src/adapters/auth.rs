//! Header-presence authenticator.
//!
//! PNP requests must carry a non-empty `Authorization` header; whether it
//! is a valid account signature is for the signers to decide. Domain
//! requests are authenticated by the signers against the domain's EIP-712
//! signature and pass through.

use async_trait::async_trait;
use shared_types::CombinerEndpoint;
use tracing::debug;

use crate::ports::outbound::{AuthRequest, RequestAuthenticator};

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderAuthenticator;

impl HeaderAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RequestAuthenticator for HeaderAuthenticator {
    async fn authenticate(&self, request: AuthRequest<'_>) -> bool {
        match request.endpoint {
            CombinerEndpoint::PnpSign | CombinerEndpoint::PnpQuota => {
                let present = request
                    .authorization
                    .is_some_and(|value| !value.trim().is_empty());
                if !present {
                    debug!(endpoint = %request.endpoint, "Missing authorization header");
                }
                present
            }
            _ => true,
        }
    }
}
