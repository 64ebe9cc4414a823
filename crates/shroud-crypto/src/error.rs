//! Crypto layer errors

use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum CryptoError {
    #[error("byte string is not a canonical field element")]
    NonCanonicalFieldElement,

    #[error("point is not on the Grumpkin curve")]
    PointNotOnCurve,

    #[error("x-coordinate has no square root (not a valid compressed point)")]
    NotQuadraticResidue,

    #[error("invalid compression prefix byte")]
    InvalidCompressionPrefix,

    #[error("the identity point cannot be encoded")]
    IdentityPoint,

    #[error("Poseidon parameter table failed its self-check")]
    PoseidonConstantsCorrupted,

    #[error("Poseidon hasher rejected the input")]
    PoseidonInput,
}
