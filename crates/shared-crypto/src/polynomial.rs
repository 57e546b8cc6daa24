//! Public (verification) polynomial of a threshold key.
//!
//! The wire form is the concatenation of compressed G2 coefficients, constant
//! term first. The constant term is the group public key and the polynomial
//! evaluated at `index + 1` is the public key of share `index`.

use blstrs::G2Projective;
use group::Group;

use crate::lagrange::evaluation_point;
use crate::points::{decode_g2, encode_g2, G2_COMPRESSED_LEN};
use crate::CryptoError;

/// Commitments to the coefficients of the secret sharing polynomial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPolynomial {
    coefficients: Vec<G2Projective>,
}

impl PublicPolynomial {
    /// Build from coefficients, constant term first.
    pub fn new(coefficients: Vec<G2Projective>) -> Result<Self, CryptoError> {
        if coefficients.is_empty() {
            return Err(CryptoError::InvalidPolynomial("no coefficients".into()));
        }
        Ok(Self { coefficients })
    }

    /// Parse the concatenated wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.is_empty() || bytes.len() % G2_COMPRESSED_LEN != 0 {
            return Err(CryptoError::InvalidPolynomial(format!(
                "length {} is not a positive multiple of {}",
                bytes.len(),
                G2_COMPRESSED_LEN
            )));
        }
        let coefficients = bytes
            .chunks_exact(G2_COMPRESSED_LEN)
            .map(decode_g2)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(coefficients)
    }

    /// Serialize to the concatenated wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.coefficients.iter().flat_map(|c| encode_g2(c)).collect()
    }

    /// Reconstruction threshold implied by the degree.
    pub fn threshold(&self) -> usize {
        self.coefficients.len()
    }

    /// Group public key.
    pub fn public_key(&self) -> G2Projective {
        self.coefficients[0]
    }

    /// Public key of share `index` (Horner evaluation at `index + 1`).
    pub fn share_public_key(&self, index: u32) -> G2Projective {
        let x = evaluation_point(index);
        self.coefficients
            .iter()
            .rev()
            .fold(G2Projective::identity(), |acc, c| acc * x + c)
    }
}
