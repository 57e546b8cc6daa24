//! Compressed point codec for BLS12-381.

use blstrs::{G1Affine, G1Projective, G2Affine, G2Projective};
use group::Curve;

use crate::CryptoError;

/// Compressed G1 point size.
pub const G1_COMPRESSED_LEN: usize = 48;

/// Compressed G2 point size.
pub const G2_COMPRESSED_LEN: usize = 96;

/// Little-endian share index prefix size.
pub const SHARE_INDEX_LEN: usize = 4;

/// Decode a compressed G1 point, rejecting anything off the subgroup.
pub fn decode_g1(bytes: &[u8]) -> Result<G1Projective, CryptoError> {
    let arr: [u8; G1_COMPRESSED_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
        what: "G1 point",
        expected: G1_COMPRESSED_LEN,
        actual: bytes.len(),
    })?;
    Option::<G1Affine>::from(G1Affine::from_compressed(&arr))
        .map(G1Projective::from)
        .ok_or(CryptoError::InvalidPoint("G1"))
}

/// Decode a compressed G2 point, rejecting anything off the subgroup.
pub fn decode_g2(bytes: &[u8]) -> Result<G2Projective, CryptoError> {
    let arr: [u8; G2_COMPRESSED_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
        what: "G2 point",
        expected: G2_COMPRESSED_LEN,
        actual: bytes.len(),
    })?;
    Option::<G2Affine>::from(G2Affine::from_compressed(&arr))
        .map(G2Projective::from)
        .ok_or(CryptoError::InvalidPoint("G2"))
}

/// Compress a G1 point.
pub fn encode_g1(point: &G1Projective) -> [u8; G1_COMPRESSED_LEN] {
    point.to_affine().to_compressed()
}

/// Compress a G2 point.
pub fn encode_g2(point: &G2Projective) -> [u8; G2_COMPRESSED_LEN] {
    point.to_affine().to_compressed()
}

/// Split a share into its index and point bytes.
pub(crate) fn split_share(bytes: &[u8], point_len: usize) -> Result<(u32, &[u8]), CryptoError> {
    if bytes.len() != SHARE_INDEX_LEN + point_len {
        return Err(CryptoError::InvalidLength {
            what: "share",
            expected: SHARE_INDEX_LEN + point_len,
            actual: bytes.len(),
        });
    }
    let (index, point) = bytes.split_at(SHARE_INDEX_LEN);
    let mut raw = [0u8; SHARE_INDEX_LEN];
    raw.copy_from_slice(index);
    Ok((u32::from_le_bytes(raw), point))
}
