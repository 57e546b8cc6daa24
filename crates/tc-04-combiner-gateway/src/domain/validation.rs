//! # Client Request Validation
//!
//! Shape checks run on a parsed request body before anything is sent to the
//! signers. Every failure surfaces to the client as 400 `INVALID_INPUT`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use shared_crypto::points::{decode_g1, decode_g2};
use shared_types::{
    DomainRequest, OdisRequest, SEQUENTIAL_DELAY_DOMAIN_NAME, SEQUENTIAL_DELAY_DOMAIN_VERSION,
};
use thiserror::Error;

/// Longest accepted `sessionID`.
pub const MAX_SESSION_ID_LEN: usize = 256;

const ACCOUNT_HEX_LEN: usize = 40;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed request body: {0}")]
    Malformed(String),
    #[error("invalid account address")]
    InvalidAccount,
    #[error("invalid blinded message: {0}")]
    InvalidBlindedMessage(String),
    #[error("session id longer than {MAX_SESSION_ID_LEN} characters")]
    SessionIdTooLong,
    #[error("request type does not match endpoint")]
    WrongRequestType,
    #[error("unsupported domain {name} version {version}")]
    UnsupportedDomain { name: String, version: String },
    #[error("domain has no stages")]
    NoStages,
    #[error("nonce is required when a signature is present")]
    MissingNonce,
}

/// Parse a request body and apply the checks every request shares.
pub fn parse_client_request<Q: OdisRequest>(body: &[u8]) -> Result<Q, CodecError> {
    let request: Q =
        serde_json::from_slice(body).map_err(|e| CodecError::Malformed(e.to_string()))?;
    validate_session_id(request.session_id())?;
    Ok(request)
}

pub fn validate_session_id(session_id: Option<&str>) -> Result<(), CodecError> {
    match session_id {
        Some(id) if id.chars().count() > MAX_SESSION_ID_LEN => Err(CodecError::SessionIdTooLong),
        _ => Ok(()),
    }
}

/// `0x` followed by 40 hex characters.
pub fn validate_account(account: &str) -> Result<(), CodecError> {
    let hex_part = account
        .strip_prefix("0x")
        .or_else(|| account.strip_prefix("0X"))
        .ok_or(CodecError::InvalidAccount)?;
    if hex_part.len() != ACCOUNT_HEX_LEN || hex::decode(hex_part).is_err() {
        return Err(CodecError::InvalidAccount);
    }
    Ok(())
}

/// Base64 blinded phone number: a compressed G1 point.
pub fn validate_blinded_g1(encoded: &str) -> Result<Vec<u8>, CodecError> {
    let bytes = decode_base64(encoded)?;
    decode_g1(&bytes).map_err(|e| CodecError::InvalidBlindedMessage(e.to_string()))?;
    Ok(bytes)
}

/// Base64 blinded POPRF input: a compressed G2 point.
pub fn validate_blinded_g2(encoded: &str) -> Result<Vec<u8>, CodecError> {
    let bytes = decode_base64(encoded)?;
    decode_g2(&bytes).map_err(|e| CodecError::InvalidBlindedMessage(e.to_string()))?;
    Ok(bytes)
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>, CodecError> {
    BASE64
        .decode(encoded)
        .map_err(|e| CodecError::InvalidBlindedMessage(e.to_string()))
}

/// Checks shared by the three domain requests.
pub fn validate_domain_request<Q: DomainRequest>(request: &Q) -> Result<(), CodecError> {
    if request.request_type() != Q::TYPE {
        return Err(CodecError::WrongRequestType);
    }

    let domain = request.domain();
    if domain.name != SEQUENTIAL_DELAY_DOMAIN_NAME || domain.version != SEQUENTIAL_DELAY_DOMAIN_VERSION {
        return Err(CodecError::UnsupportedDomain {
            name: domain.name.clone(),
            version: domain.version.clone(),
        });
    }
    if domain.stages.is_empty() {
        return Err(CodecError::NoStages);
    }

    let options = request.options();
    if options.signature.get().is_some() && options.nonce.get().is_none() {
        return Err(CodecError::MissingNonce);
    }
    Ok(())
}
