//! Crypto error types.

use thiserror::Error;

/// Threshold cryptography errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid encoded length
    #[error("Invalid length for {what}: expected {expected}, got {actual}")]
    InvalidLength {
        /// Which value was being decoded
        what: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Bytes do not encode a point in the prime-order subgroup
    #[error("Invalid {0} point encoding")]
    InvalidPoint(&'static str),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Empty or malformed public polynomial
    #[error("Invalid public polynomial: {0}")]
    InvalidPolynomial(String),

    /// Fewer shares than the threshold
    #[error("Not enough shares: have {have}, need {need}")]
    NotEnoughShares {
        /// Usable shares supplied
        have: usize,
        /// Threshold
        need: usize,
    },

    /// Two shares claim the same index
    #[error("Duplicate share index {0}")]
    DuplicateShareIndex(u32),

    /// Threshold of zero
    #[error("Threshold must be at least 1")]
    ZeroThreshold,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}
