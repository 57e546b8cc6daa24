//! # Combine Errors

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors from combining partial signatures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CombineError {
    /// Not enough usable shares to reconstruct a result.
    #[error("Not enough partial signatures {have}/{need}")]
    NotEnoughPartialSignatures { have: usize, need: usize },

    /// The message being signed is not a valid blinded point.
    ///
    /// Reported without pruning, since no share is at fault.
    #[error("Invalid blinded message: {0}")]
    InvalidMessage(CryptoError),

    /// Key material for the requested version does not decode.
    #[error("Invalid key material: {0}")]
    InvalidKey(CryptoError),
}
