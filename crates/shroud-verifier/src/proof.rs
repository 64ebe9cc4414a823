//! Zero-copy view over the keccak non-ZK proof byte layout.
//!
//! The proof is a fixed function of `log_n` (from the VK):
//!
//! ```text
//! [0 .. 512)                 16 x 32   pairing-accumulator preamble
//! [512 .. 1024)              8 x 64    witness commitments, transcript order:
//!                                      w1 w2 w3 lrc lrt w4 li zperm
//! then  log_n x 8 x 32                 sumcheck univariates (one row per round)
//! then  41 x 32                        multilinear entity evaluations
//! then  (log_n - 1) x 64               Gemini fold commitments
//! then  log_n x 32                     Gemini a-evaluations
//! then  64                             Shplonk Q commitment
//! then  64                             KZG quotient commitment
//! ```
//!
//! The total length is checked before any transcript work, so a truncated
//! proof fails with `ProofTooShort` before the first challenge squeeze.

use crate::constants::{
    BATCHED_RELATION_PARTIAL_LENGTH, G1_AFFINE_SIZE, MAX_LOG_CIRCUIT_SIZE, NUMBER_OF_ENTITIES,
    NUM_WITNESS_COMMITMENTS, PAIRING_POINTS_SIZE, SCALAR_SIZE,
};
use crate::error::VerifierError;

/// Borrowed proof with precomputed section offsets.
pub struct ProofSlice<'a> {
    data: &'a [u8],
    pub log_n: usize,
    witness_start: usize,
    sumcheck_univ_start: usize,
    sumcheck_eval_start: usize,
    gemini_comms_start: usize,
    gemini_evals_start: usize,
    shplonk_q_start: usize,
    kzg_quotient_start: usize,
}

/// Exact proof length for a circuit of the given size.
pub fn expected_len(log_n: usize) -> usize {
    PAIRING_POINTS_SIZE * SCALAR_SIZE
        + NUM_WITNESS_COMMITMENTS * G1_AFFINE_SIZE
        + log_n * BATCHED_RELATION_PARTIAL_LENGTH * SCALAR_SIZE
        + NUMBER_OF_ENTITIES * SCALAR_SIZE
        + (log_n - 1) * G1_AFFINE_SIZE
        + log_n * SCALAR_SIZE
        + 2 * G1_AFFINE_SIZE
}

impl<'a> ProofSlice<'a> {
    pub fn new(bytes: &'a [u8], log_n: usize) -> Result<Self, VerifierError> {
        if log_n == 0 || log_n > MAX_LOG_CIRCUIT_SIZE {
            return Err(VerifierError::InvalidVerificationKey);
        }
        if bytes.len() != expected_len(log_n) {
            return Err(VerifierError::ProofTooShort);
        }

        let witness_start = PAIRING_POINTS_SIZE * SCALAR_SIZE;
        let sumcheck_univ_start = witness_start + NUM_WITNESS_COMMITMENTS * G1_AFFINE_SIZE;
        let sumcheck_eval_start =
            sumcheck_univ_start + log_n * BATCHED_RELATION_PARTIAL_LENGTH * SCALAR_SIZE;
        let gemini_comms_start = sumcheck_eval_start + NUMBER_OF_ENTITIES * SCALAR_SIZE;
        let gemini_evals_start = gemini_comms_start + (log_n - 1) * G1_AFFINE_SIZE;
        let shplonk_q_start = gemini_evals_start + log_n * SCALAR_SIZE;
        let kzg_quotient_start = shplonk_q_start + G1_AFFINE_SIZE;

        Ok(Self {
            data: bytes,
            log_n,
            witness_start,
            sumcheck_univ_start,
            sumcheck_eval_start,
            gemini_comms_start,
            gemini_evals_start,
            shplonk_q_start,
            kzg_quotient_start,
        })
    }

    /// Preamble field element `i` (`i < 16`) as raw bytes.
    #[inline]
    pub fn preamble_fr(&self, i: usize) -> &'a [u8] {
        let start = i * SCALAR_SIZE;
        &self.data[start..start + SCALAR_SIZE]
    }

    /// Witness commitment `i` (`i < 8`, transcript order) as 64 affine bytes.
    #[inline]
    pub fn witness_g1(&self, i: usize) -> &'a [u8] {
        let start = self.witness_start + i * G1_AFFINE_SIZE;
        &self.data[start..start + G1_AFFINE_SIZE]
    }

    /// Sumcheck univariate scalar `(round, i)` as raw bytes.
    #[inline]
    pub fn sumcheck_univariate(&self, round: usize, i: usize) -> &'a [u8] {
        let start = self.sumcheck_univ_start
            + round * BATCHED_RELATION_PARTIAL_LENGTH * SCALAR_SIZE
            + i * SCALAR_SIZE;
        &self.data[start..start + SCALAR_SIZE]
    }

    /// Entity evaluation `i` (`i < 41`) as raw bytes.
    #[inline]
    pub fn sumcheck_evaluation(&self, i: usize) -> &'a [u8] {
        let start = self.sumcheck_eval_start + i * SCALAR_SIZE;
        &self.data[start..start + SCALAR_SIZE]
    }

    /// Gemini fold commitment `i` (`i < log_n - 1`) as 64 affine bytes.
    #[inline]
    pub fn gemini_fold_comm(&self, i: usize) -> &'a [u8] {
        let start = self.gemini_comms_start + i * G1_AFFINE_SIZE;
        &self.data[start..start + G1_AFFINE_SIZE]
    }

    /// Gemini a-evaluation `i` (`i < log_n`) as raw bytes.
    #[inline]
    pub fn gemini_a_evaluation(&self, i: usize) -> &'a [u8] {
        let start = self.gemini_evals_start + i * SCALAR_SIZE;
        &self.data[start..start + SCALAR_SIZE]
    }

    #[inline]
    pub fn shplonk_q(&self) -> &'a [u8] {
        &self.data[self.shplonk_q_start..self.shplonk_q_start + G1_AFFINE_SIZE]
    }

    #[inline]
    pub fn kzg_quotient(&self) -> &'a [u8] {
        &self.data[self.kzg_quotient_start..self.kzg_quotient_start + G1_AFFINE_SIZE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_len_log15() {
        // preamble 512 + witness 512 + 15*256 + 41*32 + 14*64 + 15*32 + 128
        assert_eq!(expected_len(15), 7680);
    }

    #[test]
    fn truncation_by_any_amount_is_too_short() {
        let full = expected_len(4);
        for cut in [1usize, 31, 32, 64, 100] {
            let buf = vec![0u8; full - cut];
            assert!(matches!(
                ProofSlice::new(&buf, 4),
                Err(VerifierError::ProofTooShort)
            ));
        }
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        let buf = vec![0u8; expected_len(4) + 1];
        assert!(ProofSlice::new(&buf, 4).is_err());
    }

    #[test]
    fn section_offsets_line_up() {
        let log_n = 2;
        let mut buf = vec![0u8; expected_len(log_n)];
        // witness starts after the 512-byte preamble
        buf[512] = 0xaa;
        // sumcheck univariates after 8 witness points
        buf[1024] = 0xbb;
        // evaluations after log_n rounds of univariates
        buf[1024 + 2 * 8 * 32] = 0xcc;
        let eval_end = 1024 + 2 * 8 * 32 + 41 * 32;
        buf[eval_end] = 0xdd; // first gemini fold commitment
        buf[eval_end + 64] = 0xee; // first gemini evaluation
        buf[eval_end + 64 + 2 * 32] = 0xf1; // shplonk q
        buf[eval_end + 64 + 2 * 32 + 64] = 0xf2; // kzg quotient

        let proof = ProofSlice::new(&buf, log_n).unwrap();
        assert_eq!(proof.witness_g1(0)[0], 0xaa);
        assert_eq!(proof.sumcheck_univariate(0, 0)[0], 0xbb);
        assert_eq!(proof.sumcheck_evaluation(0)[0], 0xcc);
        assert_eq!(proof.gemini_fold_comm(0)[0], 0xdd);
        assert_eq!(proof.gemini_a_evaluation(0)[0], 0xee);
        assert_eq!(proof.shplonk_q()[0], 0xf1);
        assert_eq!(proof.kzg_quotient()[0], 0xf2);
    }

    #[test]
    fn zero_log_n_is_rejected() {
        let buf = vec![0u8; 1024];
        assert!(ProofSlice::new(&buf, 0).is_err());
    }
}
