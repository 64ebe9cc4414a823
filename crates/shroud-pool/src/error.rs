//! Error definitions for the pool engine.
//!
//! Every recoverable failure maps to a stable numeric code starting at 6000
//! so instruction responses stay identical across releases. Fatal failures
//! get their own type: they indicate a corrupted build or an internal bug,
//! and the process is expected to abort rather than continue serving.

use thiserror::Error;

/// Recoverable operation failures. Operations are atomic: any of these
/// means no state was mutated and no tokens moved.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PoolError {
    #[error("pool is paused")]
    Paused,

    #[error("amount outside the configured deposit bounds")]
    AmountOutOfRange,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("root is neither current nor in the recent-root history")]
    RootStale,

    #[error("verification key fingerprint mismatch")]
    VkMismatch,

    #[error("point is not on the curve")]
    PointNotOnCurve,

    #[error("malformed stealth or link encoding")]
    DecodeError,

    #[error("malformed instruction encoding")]
    BadEncoding,

    #[error("nullifier already spent")]
    AlreadySpent,

    #[error("announcement already exists for this ephemeral key")]
    AnnouncementCollision,

    #[error("commitment tree is full")]
    TreeFull,

    #[error("pool already initialized")]
    AlreadyInitialized,

    #[error("pool not initialized")]
    NotInitialized,

    #[error("proof rejected by the verifier")]
    ProofInvalid,

    #[error("final pairing check rejected the proof")]
    PairingRejected,

    #[error("transcript produced a zero challenge")]
    ChallengeZero,

    #[error("proof buffer shorter than the layout requires")]
    ProofTooShort,

    #[error("token backend failed: {0}")]
    TokenCpiFailed(String),

    #[error("caller is not the pool authority")]
    Unauthorized,

    #[error("insufficient shielded funds")]
    InsufficientFunds,

    #[error("pool bookkeeping overflow")]
    Overflow,
}

impl PoolError {
    /// Stable numeric code for instruction responses.
    pub fn error_code(&self) -> u32 {
        match self {
            PoolError::Paused => 6000,
            PoolError::AmountOutOfRange => 6001,
            PoolError::ZeroAmount => 6002,
            PoolError::RootStale => 6003,
            PoolError::VkMismatch => 6004,
            PoolError::PointNotOnCurve => 6005,
            PoolError::DecodeError => 6006,
            PoolError::BadEncoding => 6007,
            PoolError::AlreadySpent => 6008,
            PoolError::AnnouncementCollision => 6009,
            PoolError::TreeFull => 6010,
            PoolError::AlreadyInitialized => 6011,
            PoolError::NotInitialized => 6012,
            PoolError::ProofInvalid => 6013,
            PoolError::PairingRejected => 6014,
            PoolError::ChallengeZero => 6015,
            PoolError::ProofTooShort => 6016,
            PoolError::TokenCpiFailed(_) => 6017,
            PoolError::Unauthorized => 6018,
            PoolError::InsufficientFunds => 6019,
            PoolError::Overflow => 6020,
        }
    }
}

/// Abort-class failures. These are never caused by input; they mean the
/// binary itself is wrong.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum FatalError {
    #[error("Poseidon parameter table failed its self-check")]
    PoseidonConstantsCorrupted,

    #[error("hash arity domains collide")]
    HashDomainMismatch,

    #[error("internal field arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<shroud_crypto::CryptoError> for PoolError {
    fn from(e: shroud_crypto::CryptoError) -> Self {
        use shroud_crypto::CryptoError;
        match e {
            CryptoError::PointNotOnCurve
            | CryptoError::NotQuadraticResidue
            | CryptoError::InvalidCompressionPrefix
            | CryptoError::IdentityPoint => PoolError::PointNotOnCurve,
            CryptoError::NonCanonicalFieldElement => PoolError::BadEncoding,
            CryptoError::PoseidonConstantsCorrupted | CryptoError::PoseidonInput => {
                PoolError::BadEncoding
            }
        }
    }
}

impl From<shroud_verifier::VerifierError> for PoolError {
    fn from(e: shroud_verifier::VerifierError) -> Self {
        use shroud_verifier::VerifierError;
        match e {
            VerifierError::ProofTooShort => PoolError::ProofTooShort,
            VerifierError::VkMismatch => PoolError::VkMismatch,
            VerifierError::PointNotOnCurve => PoolError::PointNotOnCurve,
            VerifierError::ChallengeZero => PoolError::ChallengeZero,
            VerifierError::PairingRejected => PoolError::PairingRejected,
            VerifierError::SumcheckRejected
            | VerifierError::InvalidFieldElement
            | VerifierError::InvalidVerificationKey
            | VerifierError::Bn254Backend => PoolError::ProofInvalid,
        }
    }
}
