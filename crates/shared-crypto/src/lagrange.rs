//! Lagrange interpolation at zero over either curve group.

use blstrs::Scalar;
use ff::Field;
use group::Group;

use crate::CryptoError;

/// Evaluation point of share `index`.
pub fn evaluation_point(index: u32) -> Scalar {
    Scalar::from(u64::from(index) + 1)
}

/// Reconstruct `f(0)` from `(index, f(index + 1))` pairs.
///
/// Uses every supplied point; callers pick exactly `threshold` of them.
pub fn interpolate_at_zero<G>(points: &[(u32, G)]) -> Result<G, CryptoError>
where
    G: Group<Scalar = Scalar>,
{
    let xs: Vec<Scalar> = points.iter().map(|(i, _)| evaluation_point(*i)).collect();

    let mut acc = G::identity();
    for (i, (index, point)) in points.iter().enumerate() {
        let mut numerator = Scalar::ONE;
        let mut denominator = Scalar::ONE;
        for (j, xj) in xs.iter().enumerate() {
            if i == j {
                continue;
            }
            numerator *= *xj;
            denominator *= *xj - xs[i];
        }
        let inverse = Option::<Scalar>::from(denominator.invert())
            .ok_or(CryptoError::DuplicateShareIndex(*index))?;
        acc += *point * (numerator * inverse);
    }
    Ok(acc)
}
