//! Outbound ports for the combiner gateway.

use async_trait::async_trait;
use shared_types::CombinerEndpoint;

/// What an authenticator gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct AuthRequest<'a> {
    pub endpoint: CombinerEndpoint,
    /// `Authorization` header, if the client sent one
    pub authorization: Option<&'a str>,
    /// Raw request body
    pub body: &'a [u8],
}

/// Decides whether a client may call an endpoint.
///
/// Account verification lives outside the combiner; implementations may
/// call out to it, so the check is async.
#[async_trait]
pub trait RequestAuthenticator: Send + Sync + 'static {
    async fn authenticate(&self, request: AuthRequest<'_>) -> bool;
}
