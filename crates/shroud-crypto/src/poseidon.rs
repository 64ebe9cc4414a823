//! Poseidon hashing over the BN254 scalar field.
//!
//! Uses the Circom BN254 parameter set, which is what the Noir circuits and
//! the deployed syscall agree on. The permutation width follows the input
//! count (t = n + 1), so `hash1`, `hash2` and `hash3` are three instances of
//! the same sponge. Every other hash name in the repository is an alias of
//! one of these three.
//!
//! The parameter table is baked into the `light-poseidon` build; callers
//! must run [`check_parameters`] once at startup. A mismatch means the
//! binary was built against a drifted table and must not serve traffic.

use light_poseidon::{Poseidon, PoseidonHasher};

use crate::error::CryptoError;
use crate::fields::{fr_from_be_bytes, fr_to_be_bytes, Fr};

/// `hash2(0, 0)` with the expected parameter table. This equals level 1 of
/// the commitment tree's zero-hash chain.
pub const HASH2_ZERO_ZERO: [u8; 32] = [
    0x20, 0x98, 0xf5, 0xfb, 0x9e, 0x23, 0x9e, 0xab, 0x3c, 0xea, 0xc3, 0xf2, 0x7b, 0x81, 0xe4,
    0x81, 0xdc, 0x31, 0x24, 0xd5, 0x5f, 0xfe, 0xd5, 0x23, 0xa8, 0x39, 0xee, 0x84, 0x46, 0xb6,
    0x48, 0x64,
];

/// `hash2(z1, z1)` where `z1 = hash2(0, 0)`; level 2 of the zero chain.
pub const HASH2_ZERO_CHAIN_2: [u8; 32] = [
    0x10, 0x69, 0x67, 0x3d, 0xcd, 0xb1, 0x22, 0x63, 0xdf, 0x30, 0x1a, 0x6f, 0xf5, 0x84, 0xa7,
    0xec, 0x26, 0x1a, 0x44, 0xcb, 0x9d, 0xc6, 0x8d, 0xf0, 0x67, 0xa4, 0x77, 0x44, 0x60, 0xb1,
    0xf1, 0xe1,
];

fn hash_n(inputs: &[Fr]) -> Result<Fr, CryptoError> {
    let mut hasher =
        Poseidon::<Fr>::new_circom(inputs.len()).map_err(|_| CryptoError::PoseidonInput)?;
    hasher.hash(inputs).map_err(|_| CryptoError::PoseidonInput)
}

/// Single-input sponge. Used for the outer nullifier hash.
pub fn hash1(a: &Fr) -> Result<Fr, CryptoError> {
    hash_n(&[*a])
}

/// Two-input sponge. Used for commitments, nullifiers and Merkle nodes.
pub fn hash2(a: &Fr, b: &Fr) -> Result<Fr, CryptoError> {
    hash_n(&[*a, *b])
}

/// Three-input sponge.
pub fn hash3(a: &Fr, b: &Fr, c: &Fr) -> Result<Fr, CryptoError> {
    hash_n(&[*a, *b, *c])
}

/// Byte-oriented `hash2` for callers that store 32-byte big-endian nodes.
/// Inputs must be canonical field elements.
pub fn hash2_bytes(left: &[u8; 32], right: &[u8; 32]) -> Result<[u8; 32], CryptoError> {
    let l = fr_from_be_bytes(left)?;
    let r = fr_from_be_bytes(right)?;
    Ok(fr_to_be_bytes(&hash2(&l, &r)?))
}

/// Byte-oriented `hash1`.
pub fn hash1_bytes(input: &[u8; 32]) -> Result<[u8; 32], CryptoError> {
    let x = fr_from_be_bytes(input)?;
    Ok(fr_to_be_bytes(&hash1(&x)?))
}

/// Verify the baked-in parameter table against fixed vectors.
///
/// Run once at startup. Failure is a fatal boot condition, not a runtime
/// error: a drifted table silently breaks every commitment in the tree.
pub fn check_parameters() -> Result<(), CryptoError> {
    let z1 = hash2_bytes(&[0u8; 32], &[0u8; 32])?;
    if z1 != HASH2_ZERO_ZERO {
        return Err(CryptoError::PoseidonConstantsCorrupted);
    }
    let z2 = hash2_bytes(&z1, &z1)?;
    if z2 != HASH2_ZERO_CHAIN_2 {
        return Err(CryptoError::PoseidonConstantsCorrupted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_self_check_passes() {
        check_parameters().unwrap();
    }

    #[test]
    fn hash2_is_deterministic_and_order_sensitive() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);
        assert_eq!(hash2(&a, &b).unwrap(), hash2(&a, &b).unwrap());
        assert_ne!(hash2(&a, &b).unwrap(), hash2(&b, &a).unwrap());
    }

    #[test]
    fn arities_are_domain_separated() {
        let a = Fr::from(5u64);
        let h1 = hash1(&a).unwrap();
        let h2 = hash2(&a, &Fr::from(0u64)).unwrap();
        let h3 = hash3(&a, &Fr::from(0u64), &Fr::from(0u64)).unwrap();
        assert_ne!(h1, h2);
        assert_ne!(h2, h3);
    }

    #[test]
    fn bytes_variant_matches_field_variant() {
        let a = Fr::from(77u64);
        let b = Fr::from(88u64);
        let via_field = fr_to_be_bytes(&hash2(&a, &b).unwrap());
        let via_bytes =
            hash2_bytes(&fr_to_be_bytes(&a), &fr_to_be_bytes(&b)).unwrap();
        assert_eq!(via_field, via_bytes);
    }

    #[test]
    fn bytes_variant_rejects_non_canonical_input() {
        let too_big = [0xffu8; 32];
        assert!(hash2_bytes(&too_big, &[0u8; 32]).is_err());
    }
}
