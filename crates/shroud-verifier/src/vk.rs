//! Verification key parsing and fingerprinting.
//!
//! Two byte formats exist in the wild and both are accepted:
//! - the canonical *affine* form: 96 bytes of metadata followed by 28
//!   affine G1 points (1888 bytes total);
//! - the bb.js *split* export: the same metadata followed by 28 points with
//!   each coordinate split into a 136-bit low limb and a high limb
//!   (3680 bytes total).
//!
//! The fingerprint is always computed over the canonical affine form:
//! Keccak-256 of the 1888-byte buffer, reduced mod r, re-encoded as 32
//! big-endian bytes. A registry binds one fingerprint per circuit and the
//! dispatcher rejects proofs whose VK digest disagrees.

use sha3::{Digest, Keccak256};

use shroud_crypto::fields::{fr_reduce_be_bytes, fr_to_be_bytes};

use crate::bn254::G1Point;
use crate::constants::{
    G1_AFFINE_SIZE, G1_SPLIT_SIZE, MAX_LOG_CIRCUIT_SIZE, VK_AFFINE_SIZE, VK_METADATA_SIZE,
    VK_NUM_COMMITMENTS, VK_SPLIT_SIZE,
};
use crate::error::VerifierError;

/// A parsed verification key.
///
/// Commitments are stored in WIRE enum order (entities 0-27): the fourteen
/// selectors, sigma_1-4, id_1-4, table_1-4, lagrange_first, lagrange_last.
#[derive(Clone, Debug)]
pub struct VerificationKey {
    pub circuit_size: u64,
    pub log_n: u8,
    pub num_public_inputs: u32,
    pub pub_inputs_offset: u64,
    pub commitments: [G1Point; VK_NUM_COMMITMENTS],
}

impl VerificationKey {
    /// Parse either supported byte format, chosen by length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifierError> {
        match bytes.len() {
            VK_AFFINE_SIZE => Self::parse(bytes, G1_AFFINE_SIZE, parse_affine_point),
            VK_SPLIT_SIZE => Self::parse(bytes, G1_SPLIT_SIZE, parse_split_point),
            _ => Err(VerifierError::InvalidVerificationKey),
        }
    }

    fn parse(
        bytes: &[u8],
        point_size: usize,
        parse_point: fn(&[u8]) -> Result<G1Point, VerifierError>,
    ) -> Result<Self, VerifierError> {
        // Metadata words are right-aligned 32-byte big-endian values.
        let log_n = bytes[31];
        if log_n == 0 || log_n as usize > MAX_LOG_CIRCUIT_SIZE {
            return Err(VerifierError::InvalidVerificationKey);
        }
        let circuit_size = 1u64 << log_n;
        let num_public_inputs = u32::from_be_bytes(bytes[60..64].try_into().unwrap());
        let pub_inputs_offset = u64::from_be_bytes(bytes[88..96].try_into().unwrap());

        let mut commitments = [G1Point::identity(); VK_NUM_COMMITMENTS];
        for (i, slot) in commitments.iter_mut().enumerate() {
            let start = VK_METADATA_SIZE + i * point_size;
            *slot = parse_point(&bytes[start..start + point_size])?;
        }

        Ok(Self {
            circuit_size,
            log_n,
            num_public_inputs,
            pub_inputs_offset,
            commitments,
        })
    }

    /// Re-encode into the canonical 1888-byte affine layout.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(VK_AFFINE_SIZE);

        let mut word = [0u8; 32];
        word[24..32].copy_from_slice(&self.circuit_size.to_be_bytes());
        out.extend_from_slice(&word);

        let mut word = [0u8; 32];
        word[28..32].copy_from_slice(&self.num_public_inputs.to_be_bytes());
        out.extend_from_slice(&word);

        let mut word = [0u8; 32];
        word[24..32].copy_from_slice(&self.pub_inputs_offset.to_be_bytes());
        out.extend_from_slice(&word);

        for commitment in &self.commitments {
            out.extend_from_slice(commitment.as_bytes());
        }
        out
    }

    /// Compute the fingerprint: reduced Keccak-256 of the canonical form.
    pub fn fingerprint(&self) -> [u8; 32] {
        let digest: [u8; 32] = Keccak256::digest(self.canonical_bytes()).into();
        fr_to_be_bytes(&fr_reduce_be_bytes(&digest))
    }
}

fn parse_affine_point(bytes: &[u8]) -> Result<G1Point, VerifierError> {
    G1Point::from_affine_bytes(bytes)
}

/// Reassemble a split-format point into affine form.
///
/// Each 32-byte limb is right-aligned: the low limb holds 136 bits
/// (17 bytes), the high limb the remaining 118 bits (15 bytes), so
/// `coord = hi << 136 | lo`.
fn parse_split_point(bytes: &[u8]) -> Result<G1Point, VerifierError> {
    let mut affine = [0u8; G1_AFFINE_SIZE];

    let x_lo = &bytes[0..32];
    let x_hi = &bytes[32..64];
    let y_lo = &bytes[64..96];
    let y_hi = &bytes[96..128];

    affine[0..15].copy_from_slice(&x_hi[17..32]);
    affine[15..32].copy_from_slice(&x_lo[15..32]);
    affine[32..47].copy_from_slice(&y_hi[17..32]);
    affine[47..64].copy_from_slice(&y_lo[15..32]);

    G1Point::from_affine_bytes(&affine)
}
