//! Transport error types.

use thiserror::Error;

/// Failure to complete an HTTP exchange with a replica.
///
/// Application-level failures (non-2xx, `success: false`) are not transport
/// errors; they arrive as a [`crate::SignerHttpResponse`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to build signer request: {0}")]
    InvalidRequest(String),

    #[error("Signer request failed: {0}")]
    Request(String),

    #[error("Failed to read signer response body: {0}")]
    Body(String),
}
