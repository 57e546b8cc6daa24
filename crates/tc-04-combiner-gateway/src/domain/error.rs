//! Gateway error types.
//!
//! [`ApiError`] is what a client sees: an HTTP status plus a catalogue
//! message, optionally with the quota or domain state known at the time.

use axum::http::StatusCode;
use shared_types::{
    DisableDomainResponse, DomainQuotaStatusResponse, DomainRestrictedSignatureResponse,
    DomainState, ErrorMessage, ErrorType, OdisResponse, PnpQuotaResponse, QuotaFields,
    SignMessageResponse, WarningMessage,
};
use std::fmt;

use super::config::ConfigError;
use super::key_versions::KeyVersionError;

/// Failure reported to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: ErrorType,
    /// Quota known when a PNP request failed
    pub quota: Option<QuotaFields>,
    /// Domain state known when a domain request failed
    pub domain_state: Option<DomainState>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<ErrorType>) -> Self {
        Self {
            status,
            error: error.into(),
            quota: None,
            domain_state: None,
        }
    }

    /// Status taken from the signers' majority error code, 500 if none.
    pub fn from_majority(majority_error_code: Option<u16>, error: impl Into<ErrorType>) -> Self {
        let status = majority_error_code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, error)
    }

    pub fn with_quota(mut self, quota: QuotaFields) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn with_domain_state(mut self, state: DomainState) -> Self {
        self.domain_state = Some(state);
        self
    }

    pub fn unavailable() -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, WarningMessage::ApiUnavailable)
    }

    pub fn invalid_input() -> Self {
        Self::new(StatusCode::BAD_REQUEST, WarningMessage::InvalidInput)
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, WarningMessage::UnauthenticatedUser)
    }

    pub fn unknown() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorMessage::UnknownError)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.error)
    }
}

impl std::error::Error for ApiError {}

impl From<KeyVersionError> for ApiError {
    fn from(_: KeyVersionError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, WarningMessage::InvalidKeyVersionRequest)
    }
}

/// A response envelope the combiner can send to clients.
pub trait ClientResponse: OdisResponse {
    /// Failure envelope for `error`, keeping whatever extra state the
    /// endpoint reports on failure.
    fn from_api_error(version: &str, error: &ApiError) -> Self;
}

impl ClientResponse for SignMessageResponse {
    fn from_api_error(version: &str, error: &ApiError) -> Self {
        Self::failure(version, error.error, error.quota.unwrap_or_default())
    }
}

impl ClientResponse for PnpQuotaResponse {
    fn from_api_error(version: &str, error: &ApiError) -> Self {
        Self::failure(version, error.error)
    }
}

impl ClientResponse for DomainRestrictedSignatureResponse {
    fn from_api_error(version: &str, error: &ApiError) -> Self {
        Self::failure(version, error.error, error.domain_state)
    }
}

impl ClientResponse for DomainQuotaStatusResponse {
    fn from_api_error(version: &str, error: &ApiError) -> Self {
        Self::failure(version, error.error)
    }
}

impl ClientResponse for DisableDomainResponse {
    fn from_api_error(version: &str, error: &ApiError) -> Self {
        Self::failure(version, error.error)
    }
}

/// Errors starting or running the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("key version error: {0}")]
    KeyVersion(#[from] KeyVersionError),
    #[error("signer transport error: {0}")]
    Transport(#[from] tc_03_signer_dispatch::TransportError),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
