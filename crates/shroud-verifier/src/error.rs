//! Verifier errors

use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum VerifierError {
    #[error("proof buffer shorter than the layout requires")]
    ProofTooShort,

    #[error("verification key bytes are malformed")]
    InvalidVerificationKey,

    #[error("verification key fingerprint mismatch")]
    VkMismatch,

    #[error("G1 point is not on the curve")]
    PointNotOnCurve,

    #[error("field element encoding is not canonical")]
    InvalidFieldElement,

    #[error("Fiat-Shamir transcript produced a zero challenge")]
    ChallengeZero,

    #[error("sumcheck round consistency check failed")]
    SumcheckRejected,

    #[error("final pairing check rejected the proof")]
    PairingRejected,

    #[error("BN254 backend operation failed")]
    Bn254Backend,
}
