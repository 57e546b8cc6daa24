//! Dealer-generated threshold keys for tests.
//!
//! Mints real partial signatures and POPRF evaluations so combiner tests run
//! against genuine curve arithmetic instead of canned bytes.

use blstrs::{G1Projective, G2Projective, Scalar};
use ff::Field;
use group::Group;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::lagrange::evaluation_point;
use crate::points::{decode_g1, decode_g2, encode_g1, encode_g2};
use crate::polynomial::PublicPolynomial;
use crate::poprf::PoprfShare;
use crate::threshold::SignatureShare;
use crate::CryptoError;

const G1_HASH_DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";
const G2_HASH_DST: &[u8] = b"POPRF_BLS12381G2_XMD:SHA-256_SSWU_RO_TEST_";

/// A secret sharing polynomial and the public material derived from it.
#[derive(Debug, Clone)]
pub struct ThresholdKeySet {
    coefficients: Vec<Scalar>,
    replicas: usize,
}

impl ThresholdKeySet {
    /// Random key set.
    pub fn generate(threshold: usize, replicas: usize) -> Self {
        Self::with_rng(threshold, replicas, &mut rand::thread_rng())
    }

    /// Deterministic key set, for reproducible tests.
    pub fn from_seed(threshold: usize, replicas: usize, seed: u64) -> Self {
        Self::with_rng(threshold, replicas, &mut StdRng::seed_from_u64(seed))
    }

    fn with_rng<R: RngCore>(threshold: usize, replicas: usize, rng: &mut R) -> Self {
        assert!(
            threshold >= 1 && threshold <= replicas,
            "threshold {threshold} out of range for {replicas} replicas"
        );
        let coefficients = (0..threshold).map(|_| Scalar::random(&mut *rng)).collect();
        Self {
            coefficients,
            replicas,
        }
    }

    /// Shares needed to reconstruct.
    pub fn threshold(&self) -> usize {
        self.coefficients.len()
    }

    /// Number of shares dealt.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    fn secret_share(&self, index: u32) -> Scalar {
        let x = evaluation_point(index);
        self.coefficients
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, c| acc * x + c)
    }

    fn secret(&self) -> Scalar {
        self.coefficients[0]
    }

    /// Compressed group public key.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        encode_g2(&(G2Projective::generator() * self.secret())).to_vec()
    }

    /// Public polynomial in wire form.
    pub fn polynomial_bytes(&self) -> Vec<u8> {
        let commitments = self
            .coefficients
            .iter()
            .map(|c| G2Projective::generator() * c)
            .collect();
        PublicPolynomial::new(commitments)
            .expect("at least one coefficient")
            .to_bytes()
    }

    /// Hash a message to a compressed G1 point, standing in for a blinded query.
    pub fn blind_message(message: &[u8]) -> Vec<u8> {
        encode_g1(&G1Projective::hash_to_curve(message, G1_HASH_DST, &[])).to_vec()
    }

    /// Hash a message to a compressed G2 point, standing in for a POPRF input.
    pub fn poprf_input(message: &[u8]) -> Vec<u8> {
        encode_g2(&G2Projective::hash_to_curve(message, G2_HASH_DST, &[])).to_vec()
    }

    /// Partial signature of share `index` over a blinded G1 message.
    pub fn sign_partial(&self, index: u32, blinded: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let message = decode_g1(blinded)?;
        Ok(SignatureShare {
            index,
            point: message * self.secret_share(index),
        }
        .to_bytes())
    }

    /// Signature under the full secret, for comparing against combined output.
    pub fn sign(&self, blinded: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let message = decode_g1(blinded)?;
        Ok(encode_g1(&(message * self.secret())).to_vec())
    }

    /// Partial POPRF evaluation of share `index`.
    pub fn evaluate_poprf_partial(&self, index: u32, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let point = decode_g2(input)?;
        Ok(PoprfShare {
            index,
            point: point * self.secret_share(index),
        }
        .to_bytes())
    }

    /// POPRF evaluation under the full secret.
    pub fn evaluate_poprf(&self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let point = decode_g2(input)?;
        Ok(encode_g2(&(point * self.secret())).to_vec())
    }
}
