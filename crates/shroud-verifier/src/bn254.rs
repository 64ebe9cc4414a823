//! BN254 G1/G2 operations for the pairing side of verification.
//!
//! Points are held in the 64-byte big-endian affine wire form and all group
//! arithmetic goes through the `alt_bn128` operations, which run natively
//! off-chain. Curve membership is checked once at parse time so every
//! `G1Point` in circulation is either the identity or on the curve.

use ark_ff::Field;
use solana_bn254::prelude::{alt_bn128_addition, alt_bn128_multiplication, alt_bn128_pairing};

use shroud_crypto::fields::{fq_from_be_bytes, fq_to_be_bytes, fr_to_be_bytes, Fq, Fr};

use crate::constants::{G1_AFFINE_SIZE, SRS_G2_GENERATOR, SRS_G2_X};
use crate::error::VerifierError;

/// An affine BN254 G1 point, `x_be || y_be`. All zeros is the identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct G1Point([u8; G1_AFFINE_SIZE]);

/// An affine BN254 G2 point in EIP-197 layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct G2Point(pub [u8; 128]);

impl G1Point {
    pub fn identity() -> Self {
        Self([0u8; G1_AFFINE_SIZE])
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The BN254 G1 generator `(1, 2)`.
    pub fn generator() -> Self {
        let mut bytes = [0u8; G1_AFFINE_SIZE];
        bytes[31] = 1;
        bytes[63] = 2;
        Self(bytes)
    }

    /// Parse and validate 64 affine bytes.
    ///
    /// Coordinates must be canonical base-field elements and the point must
    /// satisfy `y^2 = x^3 + 3` (or be the all-zero identity).
    pub fn from_affine_bytes(bytes: &[u8]) -> Result<Self, VerifierError> {
        if bytes.len() != G1_AFFINE_SIZE {
            return Err(VerifierError::PointNotOnCurve);
        }
        let mut arr = [0u8; G1_AFFINE_SIZE];
        arr.copy_from_slice(bytes);
        let point = Self(arr);
        if point.is_identity() {
            return Ok(point);
        }

        let x = fq_from_be_bytes(arr[..32].try_into().unwrap())
            .map_err(|_| VerifierError::PointNotOnCurve)?;
        let y = fq_from_be_bytes(arr[32..].try_into().unwrap())
            .map_err(|_| VerifierError::PointNotOnCurve)?;
        if y.square() != x.square() * x + Fq::from(3u64) {
            return Err(VerifierError::PointNotOnCurve);
        }
        Ok(point)
    }

    pub fn as_bytes(&self) -> &[u8; G1_AFFINE_SIZE] {
        &self.0
    }

    /// `-P = (x, q - y)`.
    pub fn negate(&self) -> Self {
        if self.is_identity() {
            return *self;
        }
        let y = fq_from_be_bytes(self.0[32..].try_into().unwrap())
            .expect("validated at parse time");
        let mut out = self.0;
        out[32..].copy_from_slice(&fq_to_be_bytes(&-y));
        Self(out)
    }

    pub fn add(&self, other: &Self) -> Result<Self, VerifierError> {
        if self.is_identity() {
            return Ok(*other);
        }
        if other.is_identity() {
            return Ok(*self);
        }
        let mut input = [0u8; 128];
        input[..64].copy_from_slice(&self.0);
        input[64..].copy_from_slice(&other.0);
        let result =
            alt_bn128_addition(&input).map_err(|_| VerifierError::Bn254Backend)?;
        let mut out = [0u8; G1_AFFINE_SIZE];
        out.copy_from_slice(&result);
        Ok(Self(out))
    }

    /// Scalar multiplication by an `Fr` element.
    pub fn mul(&self, scalar: &Fr) -> Result<Self, VerifierError> {
        let scalar_bytes = fr_to_be_bytes(scalar);
        if self.is_identity() || scalar_bytes == [0u8; 32] {
            return Ok(Self::identity());
        }
        let mut input = [0u8; 96];
        input[..64].copy_from_slice(&self.0);
        input[64..].copy_from_slice(&scalar_bytes);
        let result =
            alt_bn128_multiplication(&input).map_err(|_| VerifierError::Bn254Backend)?;
        let mut out = [0u8; G1_AFFINE_SIZE];
        out.copy_from_slice(&result);
        Ok(Self(out))
    }
}

impl G2Point {
    pub fn srs_generator() -> Self {
        Self(SRS_G2_GENERATOR)
    }

    pub fn srs_x() -> Self {
        Self(SRS_G2_X)
    }
}

/// Multi-scalar multiplication: `sum(scalars[i] * points[i])`.
pub fn msm(points: &[G1Point], scalars: &[Fr]) -> Result<G1Point, VerifierError> {
    if points.len() != scalars.len() {
        return Err(VerifierError::Bn254Backend);
    }
    let mut acc = G1Point::identity();
    for (point, scalar) in points.iter().zip(scalars.iter()) {
        let term = point.mul(scalar)?;
        acc = acc.add(&term)?;
    }
    Ok(acc)
}

/// Product-of-pairings check: `prod e(P_i, Q_i) == 1`.
pub fn pairing_check(pairs: &[(G1Point, G2Point)]) -> Result<bool, VerifierError> {
    let mut input = Vec::with_capacity(pairs.len() * 192);
    for (g1, g2) in pairs {
        input.extend_from_slice(g1.as_bytes());
        input.extend_from_slice(&g2.0);
    }
    let result = alt_bn128_pairing(&input).map_err(|_| VerifierError::Bn254Backend)?;
    Ok(result.len() == 32 && result[31] == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_parses_as_on_curve() {
        let g = G1Point::generator();
        assert!(G1Point::from_affine_bytes(g.as_bytes()).is_ok());
    }

    #[test]
    fn off_curve_point_is_rejected() {
        let mut bytes = [0u8; 64];
        bytes[31] = 1;
        bytes[63] = 3; // (1, 3) is not on y^2 = x^3 + 3
        assert_eq!(
            G1Point::from_affine_bytes(&bytes),
            Err(VerifierError::PointNotOnCurve)
        );
    }

    #[test]
    fn addition_and_doubling_agree() {
        let g = G1Point::generator();
        let two_g = g.add(&g).unwrap();
        let two_g_mul = g.mul(&Fr::from(2u64)).unwrap();
        assert_eq!(two_g, two_g_mul);
    }

    #[test]
    fn negation_cancels() {
        let g = G1Point::generator();
        let sum = g.add(&g.negate()).unwrap();
        assert!(sum.is_identity());
    }

    #[test]
    fn msm_matches_manual_combination() {
        let g = G1Point::generator();
        let five_g = msm(&[g, g], &[Fr::from(2u64), Fr::from(3u64)]).unwrap();
        assert_eq!(five_g, g.mul(&Fr::from(5u64)).unwrap());
    }

    #[test]
    fn pairing_generator_identity() {
        // e(G1, G2) * e(-G1, G2) == 1
        let g = G1Point::generator();
        let ok = pairing_check(&[
            (g, G2Point::srs_generator()),
            (g.negate(), G2Point::srs_generator()),
        ])
        .unwrap();
        assert!(ok);
    }

    #[test]
    fn pairing_detects_mismatch() {
        let g = G1Point::generator();
        let two_g = g.add(&g).unwrap();
        let ok = pairing_check(&[
            (two_g, G2Point::srs_generator()),
            (g.negate(), G2Point::srs_generator()),
        ])
        .unwrap();
        assert!(!ok);
    }
}
