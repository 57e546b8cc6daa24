//! Threshold BLS blind signatures (min-sig orientation).
//!
//! Signers return partial signatures over a client-blinded G1 point. The
//! combiner interpolates `threshold` of them into the group signature and
//! checks it with a single pairing equation before handing it back.

use std::collections::HashSet;

use blstrs::{pairing, G1Projective, G2Projective};
use group::{Curve, Group};

use crate::lagrange::interpolate_at_zero;
use crate::points::{decode_g1, decode_g2, encode_g1, split_share, G1_COMPRESSED_LEN, SHARE_INDEX_LEN};
use crate::polynomial::PublicPolynomial;
use crate::CryptoError;

/// Size of one partial signature on the wire.
pub const SIGNATURE_SHARE_LEN: usize = SHARE_INDEX_LEN + G1_COMPRESSED_LEN;

/// One signer's partial signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureShare {
    /// Share index (0-based).
    pub index: u32,
    /// Partial signature point.
    pub point: G1Projective,
}

impl SignatureShare {
    /// Parse `index || compressed G1`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let (index, point) = split_share(bytes, G1_COMPRESSED_LEN)?;
        Ok(Self {
            index,
            point: decode_g1(point)?,
        })
    }

    /// Serialize to `index || compressed G1`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNATURE_SHARE_LEN);
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&encode_g1(&self.point));
        out
    }
}

/// Combine the first `threshold` distinct-index shares of a concatenated
/// share buffer.
///
/// Returns the compressed group signature. Repeated indices after the first
/// are skipped. Fails if the buffer holds fewer than `threshold` distinct
/// indices or if a share read before the threshold is met does not decode.
pub fn combine_signatures(threshold: usize, shares: &[u8]) -> Result<[u8; G1_COMPRESSED_LEN], CryptoError> {
    if threshold == 0 {
        return Err(CryptoError::ZeroThreshold);
    }
    if shares.len() % SIGNATURE_SHARE_LEN != 0 {
        return Err(CryptoError::InvalidLength {
            what: "share buffer",
            expected: SIGNATURE_SHARE_LEN * threshold,
            actual: shares.len(),
        });
    }
    let available = shares.len() / SIGNATURE_SHARE_LEN;
    if available < threshold {
        return Err(CryptoError::NotEnoughShares {
            have: available,
            need: threshold,
        });
    }

    let mut seen = HashSet::new();
    let mut points = Vec::with_capacity(threshold);
    for chunk in shares.chunks_exact(SIGNATURE_SHARE_LEN) {
        let share = SignatureShare::from_bytes(chunk)?;
        if seen.insert(share.index) {
            points.push((share.index, share.point));
            if points.len() == threshold {
                break;
            }
        }
    }
    if points.len() < threshold {
        return Err(CryptoError::NotEnoughShares {
            have: points.len(),
            need: threshold,
        });
    }

    let combined = interpolate_at_zero(&points)?;
    Ok(encode_g1(&combined))
}

/// Check `e(signature, g2) == e(message, public_key)`.
fn pairing_check(
    public_key: &G2Projective,
    message: &G1Projective,
    signature: &G1Projective,
) -> Result<(), CryptoError> {
    if bool::from(signature.is_identity()) || bool::from(public_key.is_identity()) {
        return Err(CryptoError::SignatureVerificationFailed);
    }
    let lhs = pairing(&signature.to_affine(), &G2Projective::generator().to_affine());
    let rhs = pairing(&message.to_affine(), &public_key.to_affine());
    if lhs == rhs {
        Ok(())
    } else {
        Err(CryptoError::SignatureVerificationFailed)
    }
}

/// Verify a combined blind signature against the group public key.
///
/// `message` is the compressed blinded G1 point the client submitted.
pub fn verify_blind_signature(
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let public_key = decode_g2(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    let message = decode_g1(message)?;
    let signature = decode_g1(signature)?;
    pairing_check(&public_key, &message, &signature)
}

/// Verify one partial signature against the share public key derived from
/// the public polynomial.
pub fn verify_partial_signature(
    polynomial: &PublicPolynomial,
    message: &[u8],
    share: &[u8],
) -> Result<(), CryptoError> {
    let message = decode_g1(message)?;
    let share = SignatureShare::from_bytes(share)?;
    pairing_check(&polynomial.share_public_key(share.index), &message, &share.point)
}
