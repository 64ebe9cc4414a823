//! Keccak-256 Fiat-Shamir transcript.
//!
//! Challenge derivation matches the barretenberg keccak transcript: each
//! squeeze hashes the previous *reduced* challenge followed by everything
//! absorbed since the last squeeze. The very first squeeze has no previous
//! challenge and hashes only the absorbed bytes. Every digest is reduced
//! mod r immediately and the reduced 32-byte form is what seeds the next
//! round, so prover and verifier stay bit-exact.

use sha3::{Digest, Keccak256};

use shroud_crypto::fields::{fr_from_be_bytes, fr_reduce_be_bytes, fr_to_be_bytes, Fr};

use crate::error::VerifierError;

/// Fiat-Shamir transcript state.
pub struct Transcript {
    /// Reduced bytes of the previous challenge; empty before the first squeeze.
    previous: Option<[u8; 32]>,
    /// Bytes absorbed since the last squeeze.
    buffer: Vec<u8>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            previous: None,
            buffer: Vec::with_capacity(1024),
        }
    }

    pub fn absorb_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn absorb_fr(&mut self, value: &Fr) {
        self.absorb_bytes(&fr_to_be_bytes(value));
    }

    /// Absorb a 64-byte affine G1 point as `x || y`.
    pub fn absorb_g1(&mut self, point_bytes: &[u8]) {
        debug_assert_eq!(point_bytes.len(), 64);
        self.absorb_bytes(&point_bytes[0..32]);
        self.absorb_bytes(&point_bytes[32..64]);
    }

    /// Squeeze one challenge: `keccak256(previous || buffer)` reduced mod r.
    ///
    /// A zero challenge aborts verification; a zero scalar would let a
    /// malicious prover cancel whole terms of the batched claim.
    pub fn squeeze(&mut self) -> Result<Fr, VerifierError> {
        let mut hasher = Keccak256::new();
        if let Some(prev) = &self.previous {
            hasher.update(prev);
        }
        hasher.update(&self.buffer);
        let digest: [u8; 32] = hasher.finalize().into();

        let challenge = fr_reduce_be_bytes(&digest);
        let reduced = fr_to_be_bytes(&challenge);
        self.previous = Some(reduced);
        self.buffer.clear();

        if challenge == Fr::from(0u64) {
            return Err(VerifierError::ChallengeZero);
        }
        Ok(challenge)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Slice a challenge into a 127-bit low part and the remaining high part.
///
/// Used whenever two independent challenges are taken from one squeeze
/// (beta/gamma) or when only a short challenge is needed.
pub fn split_challenge(challenge: &Fr) -> (Fr, Fr) {
    let bytes = fr_to_be_bytes(challenge);

    // Low 127 bits: bytes 16..32 with the top bit of byte 16 cleared.
    let mut lo_bytes = [0u8; 32];
    lo_bytes[16..32].copy_from_slice(&bytes[16..32]);
    lo_bytes[16] &= 0x7f;

    // High part: the value shifted right by 127 bits, i.e. the top 16 bytes
    // shifted left by one bit, pulling in the top bit of byte 16.
    let mut hi_bytes = [0u8; 32];
    let mut carry = (bytes[16] >> 7) & 1;
    for i in (0..16).rev() {
        hi_bytes[16 + i] = (bytes[i] << 1) | carry;
        carry = bytes[i] >> 7;
    }

    // Both halves are far below r, so the strict parse cannot fail.
    let lo = fr_from_be_bytes(&lo_bytes).expect("127-bit value is canonical");
    let hi = fr_from_be_bytes(&hi_bytes).expect("129-bit value is canonical");
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_deterministic() {
        let mut a = Transcript::new();
        let mut b = Transcript::new();
        a.absorb_bytes(b"same data");
        b.absorb_bytes(b"same data");
        assert_eq!(a.squeeze().unwrap(), b.squeeze().unwrap());
    }

    #[test]
    fn different_absorptions_diverge() {
        let mut a = Transcript::new();
        let mut b = Transcript::new();
        a.absorb_bytes(b"data-1");
        b.absorb_bytes(b"data-2");
        assert_ne!(a.squeeze().unwrap(), b.squeeze().unwrap());
    }

    #[test]
    fn squeeze_chains_previous_challenge() {
        // Two empty squeezes after the same absorption must differ, because
        // the second one hashes the first reduced challenge.
        let mut t = Transcript::new();
        t.absorb_bytes(b"seed");
        let c1 = t.squeeze().unwrap();
        let c2 = t.squeeze().unwrap();
        assert_ne!(c1, c2);
    }

    #[test]
    fn first_squeeze_has_no_prefix() {
        // A fresh transcript squeezing over `x` must equal keccak(x) mod r.
        let mut t = Transcript::new();
        t.absorb_bytes(b"x");
        let c = t.squeeze().unwrap();

        let digest: [u8; 32] = Keccak256::digest(b"x").into();
        assert_eq!(c, fr_reduce_be_bytes(&digest));
    }

    #[test]
    fn split_challenge_roundtrip() {
        let bytes: [u8; 32] = core::array::from_fn(|i| (i as u8) + 1);
        let challenge = fr_from_be_bytes(&bytes).unwrap();
        let (lo, hi) = split_challenge(&challenge);

        // challenge == lo + hi * 2^127
        let two_127 = {
            let mut b = [0u8; 32];
            b[16] = 0x80;
            fr_from_be_bytes(&b).unwrap()
        };
        assert_eq!(lo + hi * two_127, challenge);
    }

    #[test]
    fn split_challenge_low_part_fits_127_bits() {
        let bytes = [0xffu8; 32];
        let challenge = fr_reduce_be_bytes(&bytes);
        let (lo, _) = split_challenge(&challenge);
        let lo_bytes = fr_to_be_bytes(&lo);
        assert_eq!(&lo_bytes[..16], &[0u8; 16]);
        assert_eq!(lo_bytes[16] & 0x80, 0);
    }
}
