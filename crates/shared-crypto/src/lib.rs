//! # Shared Crypto - Threshold BLS Primitives
//!
//! Curve arithmetic needed by the combiner to reconstruct threshold results
//! from signer shares. The combiner never holds private key material.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `points` | BLS12-381 point codec | Input validation, share parsing |
//! | `lagrange` | Interpolation at zero | Share reconstruction |
//! | `polynomial` | Public (verification) polynomial | Per-share public keys |
//! | `threshold` | Min-sig threshold BLS | Blind signature combine/verify |
//! | `poprf` | Blind aggregation in G2 | Domain-restricted evaluations |
//!
//! ## Orientation
//!
//! Signatures and blinded messages live in G1 (48 bytes compressed), public
//! keys and POPRF evaluations in G2 (96 bytes compressed). A share on the
//! wire is a 4-byte little-endian index followed by the compressed point;
//! share `i` is the polynomial evaluated at `x = i + 1`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod lagrange;
pub mod points;
pub mod polynomial;
pub mod poprf;
pub mod threshold;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use errors::CryptoError;
pub use polynomial::PublicPolynomial;
pub use poprf::{blind_aggregate, PoprfShare};
pub use threshold::{
    combine_signatures, verify_blind_signature, verify_partial_signature, SignatureShare,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
