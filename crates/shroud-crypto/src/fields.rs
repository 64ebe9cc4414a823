//! BN254 field elements and byte codecs.
//!
//! All 32-byte integer encodings in the protocol are big-endian. Two parse
//! modes exist and the distinction matters:
//! - *strict* (`fr_from_be_bytes`): rejects values >= the modulus. Used for
//!   anything that arrives off the wire and claims to already be a field
//!   element (commitments, roots, public inputs).
//! - *reducing* (`fr_reduce_be_bytes`): interprets the bytes as an integer
//!   and reduces. Used for hash outputs (hash-to-scalar) only.

use ark_ff::{BigInteger, PrimeField};

use crate::error::CryptoError;

/// BN254 scalar field (Grumpkin base field). Modulus `r`.
pub type Fr = ark_bn254::Fr;

/// BN254 base field (Grumpkin scalar field). Modulus `q`.
pub type Fq = ark_bn254::Fq;

/// Serialize an `Fr` element as 32 big-endian bytes.
pub fn fr_to_be_bytes(x: &Fr) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&x.into_bigint().to_bytes_be());
    out
}

/// Serialize an `Fq` element as 32 big-endian bytes.
pub fn fq_to_be_bytes(x: &Fq) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&x.into_bigint().to_bytes_be());
    out
}

/// Strict parse: the bytes must encode an integer below `r`.
pub fn fr_from_be_bytes(bytes: &[u8; 32]) -> Result<Fr, CryptoError> {
    let candidate = Fr::from_be_bytes_mod_order(bytes);
    if fr_to_be_bytes(&candidate) == *bytes {
        Ok(candidate)
    } else {
        Err(CryptoError::NonCanonicalFieldElement)
    }
}

/// Strict parse: the bytes must encode an integer below `q`.
pub fn fq_from_be_bytes(bytes: &[u8; 32]) -> Result<Fq, CryptoError> {
    let candidate = Fq::from_be_bytes_mod_order(bytes);
    if fq_to_be_bytes(&candidate) == *bytes {
        Ok(candidate)
    } else {
        Err(CryptoError::NonCanonicalFieldElement)
    }
}

/// Hash-to-scalar reduction into `Fr`: interpret big-endian, reduce mod `r`.
pub fn fr_reduce_be_bytes(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Hash-to-scalar reduction into `Fq`: interpret big-endian, reduce mod `q`.
pub fn fq_reduce_be_bytes(bytes: &[u8]) -> Fq {
    Fq::from_be_bytes_mod_order(bytes)
}

/// Embed a `u64` amount into `Fr` (right-aligned, as the circuits expect).
pub fn fr_from_u64(value: u64) -> Fr {
    Fr::from(value)
}

/// A Grumpkin scalar may exceed `r`, so it is reduced into `Fr` before it
/// can feed a Poseidon hash. The circuits perform the same reduction
/// implicitly when the witness enters the BN254 constraint system.
pub fn fq_scalar_into_fr(scalar: &Fq) -> Fr {
    Fr::from_be_bytes_mod_order(&fq_to_be_bytes(scalar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, Zero};

    #[test]
    fn fr_roundtrip() {
        let x = Fr::from(123_456_789u64);
        let bytes = fr_to_be_bytes(&x);
        assert_eq!(fr_from_be_bytes(&bytes).unwrap(), x);
    }

    const R_BYTES: [u8; 32] =
        hex_literal::hex!("30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001");

    #[test]
    fn fr_strict_parse_rejects_modulus() {
        // r itself is not canonical
        assert_eq!(
            fr_from_be_bytes(&R_BYTES),
            Err(CryptoError::NonCanonicalFieldElement)
        );
        // but the reducing parse maps it to zero
        assert!(fr_reduce_be_bytes(&R_BYTES).is_zero());
    }

    #[test]
    fn fq_strict_parse_accepts_r() {
        // r < q, so r is a canonical Fq element
        assert!(fq_from_be_bytes(&R_BYTES).is_ok());
    }

    #[test]
    fn amount_embedding_is_right_aligned() {
        let x = fr_from_u64(10_000);
        let bytes = fr_to_be_bytes(&x);
        assert_eq!(&bytes[..24], &[0u8; 24]);
        assert_eq!(u64::from_be_bytes(bytes[24..32].try_into().unwrap()), 10_000);
    }

    #[test]
    fn one_encodes_as_expected() {
        let bytes = fr_to_be_bytes(&Fr::one());
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(bytes, expected);
    }
}
