//! Grumpkin group operations.
//!
//! Grumpkin is the curve `y^2 = x^3 - 17` over the BN254 scalar field `Fr`,
//! with group order equal to the BN254 base modulus `q`. The cycle is what
//! makes Grumpkin arithmetic cheap inside a BN254 SNARK: every coordinate is
//! already a circuit field element.
//!
//! Points are affine with `(0, 0)` as the identity sentinel, which is safe
//! because `(0, 0)` does not satisfy the curve equation. The compressed wire
//! form is 33 bytes: a `0x02`/`0x03` prefix carrying the parity of `y`,
//! followed by `x` in big-endian.

use ark_ff::{BigInteger, Field, PrimeField, Zero};

use crate::error::CryptoError;
use crate::fields::{fr_from_be_bytes, fr_to_be_bytes, Fq, Fr};

/// Compressed point width: parity prefix plus the x-coordinate.
pub const COMPRESSED_POINT_SIZE: usize = 33;

/// Curve constant `b` in `y^2 = x^3 + b`.
fn curve_b() -> Fr {
    -Fr::from(17u64)
}

/// An affine Grumpkin point.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GrumpkinPoint {
    pub x: Fr,
    pub y: Fr,
}

impl GrumpkinPoint {
    /// The identity sentinel `(0, 0)`.
    pub fn identity() -> Self {
        Self {
            x: Fr::zero(),
            y: Fr::zero(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// The fixed generator: the point with `x = 1` and even `y`.
    pub fn generator() -> Self {
        Self::from_x_coordinate(Fr::from(1u64), false)
            .expect("x = 1 lies on Grumpkin")
    }

    /// Recover the point with the given x-coordinate and y-parity.
    pub fn from_x_coordinate(x: Fr, y_is_odd: bool) -> Result<Self, CryptoError> {
        let rhs = x.square() * x + curve_b();
        let y = rhs.sqrt().ok_or(CryptoError::NotQuadraticResidue)?;
        let y = if y_parity(&y) == y_is_odd { y } else { -y };
        Ok(Self { x, y })
    }

    pub fn is_on_curve(&self) -> bool {
        if self.is_identity() {
            return true;
        }
        self.y.square() == self.x.square() * self.x + curve_b()
    }

    /// Point addition, covering identity, inverse and doubling cases.
    pub fn add(&self, other: &Self) -> Self {
        if self.is_identity() {
            return *other;
        }
        if other.is_identity() {
            return *self;
        }
        if self.x == other.x {
            if self.y == -other.y {
                return Self::identity();
            }
            return self.double();
        }
        let slope = (other.y - self.y)
            * (other.x - self.x)
                .inverse()
                .expect("distinct x-coordinates");
        let x3 = slope.square() - self.x - other.x;
        let y3 = slope * (self.x - x3) - self.y;
        Self { x: x3, y: y3 }
    }

    pub fn double(&self) -> Self {
        if self.is_identity() || self.y.is_zero() {
            return Self::identity();
        }
        let slope = (self.x.square() * Fr::from(3u64))
            * (self.y.double()).inverse().expect("y is nonzero");
        let x3 = slope.square() - self.x.double();
        let y3 = slope * (self.x - x3) - self.y;
        Self { x: x3, y: y3 }
    }

    pub fn negate(&self) -> Self {
        if self.is_identity() {
            return *self;
        }
        Self {
            x: self.x,
            y: -self.y,
        }
    }

    /// Scalar multiplication by a Grumpkin scalar (an `Fq` element).
    ///
    /// Walks the full fixed-width bit string of the scalar and computes the
    /// addition on every step, selecting the result by the bit, so the
    /// operation count does not depend on the scalar value.
    pub fn mul(&self, scalar: &Fq) -> Self {
        let mut acc = Self::identity();
        for bit in scalar.into_bigint().to_bits_be() {
            acc = acc.double();
            let with_base = acc.add(self);
            if bit {
                acc = with_base;
            }
        }
        acc
    }

    /// Shorthand for `generator() * scalar`.
    pub fn mul_generator(scalar: &Fq) -> Self {
        Self::generator().mul(scalar)
    }

    /// Compress to the 33-byte wire form. The identity has no encoding.
    pub fn to_compressed(&self) -> Result<[u8; COMPRESSED_POINT_SIZE], CryptoError> {
        if self.is_identity() {
            return Err(CryptoError::IdentityPoint);
        }
        let mut out = [0u8; COMPRESSED_POINT_SIZE];
        out[0] = if y_parity(&self.y) { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&fr_to_be_bytes(&self.x));
        Ok(out)
    }

    /// Decompress from the 33-byte wire form.
    ///
    /// Rejects unknown prefixes, non-canonical x encodings, x-coordinates
    /// whose cube-plus-b is a non-residue, and the all-zero point.
    pub fn from_compressed(bytes: &[u8; COMPRESSED_POINT_SIZE]) -> Result<Self, CryptoError> {
        let y_is_odd = match bytes[0] {
            0x02 => false,
            0x03 => true,
            _ => return Err(CryptoError::InvalidCompressionPrefix),
        };
        let mut x_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&bytes[1..]);
        let x = fr_from_be_bytes(&x_bytes)?;
        let point = Self::from_x_coordinate(x, y_is_odd)?;
        if point.is_identity() {
            return Err(CryptoError::IdentityPoint);
        }
        Ok(point)
    }
}

/// Parity of a coordinate, read off its canonical integer representation.
fn y_parity(y: &Fr) -> bool {
    y.into_bigint().is_odd()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fq_reduce_be_bytes;
    use proptest::prelude::*;

    fn test_scalar(seed: u64) -> Fq {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&seed.to_be_bytes());
        bytes[0] = 0x17;
        fq_reduce_be_bytes(&bytes)
    }

    #[test]
    fn generator_is_on_curve() {
        let g = GrumpkinPoint::generator();
        assert!(g.is_on_curve());
        assert_eq!(g.x, Fr::from(1u64));
        assert!(!y_parity(&g.y));
    }

    #[test]
    fn add_is_commutative_and_has_identity() {
        let g = GrumpkinPoint::generator();
        let h = g.double();
        assert_eq!(g.add(&h), h.add(&g));
        assert_eq!(g.add(&GrumpkinPoint::identity()), g);
        assert_eq!(GrumpkinPoint::identity().add(&g), g);
    }

    #[test]
    fn point_plus_negation_is_identity() {
        let p = GrumpkinPoint::generator().mul(&test_scalar(7));
        assert!(p.add(&p.negate()).is_identity());
    }

    #[test]
    fn scalar_mul_matches_repeated_addition() {
        let g = GrumpkinPoint::generator();
        let five = g.mul(&Fq::from(5u64));
        let mut acc = GrumpkinPoint::identity();
        for _ in 0..5 {
            acc = acc.add(&g);
        }
        assert_eq!(five, acc);
    }

    #[test]
    fn scalar_mul_distributes_over_scalar_addition() {
        let a = test_scalar(1001);
        let b = test_scalar(2002);
        let lhs = GrumpkinPoint::mul_generator(&(a + b));
        let rhs = GrumpkinPoint::mul_generator(&a).add(&GrumpkinPoint::mul_generator(&b));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn ecdh_agrees() {
        let a = test_scalar(31337);
        let b = test_scalar(42424242);
        let pub_a = GrumpkinPoint::mul_generator(&a);
        let pub_b = GrumpkinPoint::mul_generator(&b);
        assert_eq!(pub_a.mul(&b), pub_b.mul(&a));
    }

    #[test]
    fn compression_roundtrip_on_derived_points() {
        for seed in [1u64, 2, 3, 0xdead_beef, u64::MAX] {
            let p = GrumpkinPoint::mul_generator(&test_scalar(seed));
            let compressed = p.to_compressed().unwrap();
            let back = GrumpkinPoint::from_compressed(&compressed).unwrap();
            assert_eq!(back, p);
            assert_eq!(back.to_compressed().unwrap(), compressed);
        }
    }

    #[test]
    fn decompression_rejects_bad_prefix() {
        let p = GrumpkinPoint::generator();
        let mut compressed = p.to_compressed().unwrap();
        compressed[0] = 0x04;
        assert_eq!(
            GrumpkinPoint::from_compressed(&compressed),
            Err(CryptoError::InvalidCompressionPrefix)
        );
    }

    #[test]
    fn decompression_rejects_non_residue() {
        // Walk x values until one is off-curve, then require rejection.
        let mut x = Fr::from(2u64);
        loop {
            let rhs = x.square() * x + curve_b();
            if rhs.sqrt().is_none() {
                break;
            }
            x += Fr::from(1u64);
        }
        let mut bytes = [0u8; 33];
        bytes[0] = 0x02;
        bytes[1..].copy_from_slice(&fr_to_be_bytes(&x));
        assert_eq!(
            GrumpkinPoint::from_compressed(&bytes),
            Err(CryptoError::NotQuadraticResidue)
        );
    }

    #[test]
    fn identity_has_no_encoding() {
        assert_eq!(
            GrumpkinPoint::identity().to_compressed(),
            Err(CryptoError::IdentityPoint)
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn random_points_compress_roundtrip(seed in any::<[u8; 32]>()) {
            let scalar = fq_reduce_be_bytes(&seed);
            let p = GrumpkinPoint::mul_generator(&scalar);
            if !p.is_identity() {
                let c = p.to_compressed().unwrap();
                prop_assert_eq!(GrumpkinPoint::from_compressed(&c).unwrap(), p);
            }
        }
    }
}
