//! Signer response parsing.

use shared_types::OdisResponse;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseCodecError {
    #[error("Signer response is not valid JSON for this endpoint: {0}")]
    Malformed(String),

    #[error("Signer response is missing fields required when success={success}")]
    Incomplete { success: bool },
}

/// Parse and schema-check a signer response body.
pub fn parse_signer_response<R: OdisResponse>(body: &[u8]) -> Result<R, ResponseCodecError> {
    let response: R =
        serde_json::from_slice(body).map_err(|e| ResponseCodecError::Malformed(e.to_string()))?;
    if !response.is_well_formed() {
        return Err(ResponseCodecError::Incomplete {
            success: response.success(),
        });
    }
    Ok(response)
}
