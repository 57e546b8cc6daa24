//! # Outbound Ports
//!
//! How the dispatcher reaches a signer replica.

use async_trait::async_trait;
use bytes::Bytes;
use shared_types::SignerEndpoint;

use crate::domain::errors::TransportError;

/// One request as forwarded to every replica.
#[derive(Debug, Clone)]
pub struct SignerRequest {
    pub endpoint: SignerEndpoint,
    /// Key version sent in the key-version header.
    pub key_version: u32,
    /// Client `Authorization` header, forwarded verbatim.
    pub authorization: Option<String>,
    /// Client JSON body, forwarded verbatim.
    pub body: Bytes,
}

/// Raw replica answer, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerHttpResponse {
    pub status: u16,
    /// Value of the key-version response header, if present.
    pub key_version: Option<String>,
    pub body: Bytes,
}

impl SignerHttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport to a replica.
///
/// Implementations return `Err` only for transport-level failures; any
/// received HTTP response, whatever its status, is `Ok`.
#[async_trait]
pub trait SignerTransport: Send + Sync + 'static {
    /// POST `request` to `base_url` joined with the endpoint path.
    async fn send(
        &self,
        base_url: &str,
        request: &SignerRequest,
    ) -> Result<SignerHttpResponse, TransportError>;
}
