//! UltraHonk proof verification for the Shroud privacy engine.
//!
//! Verifies barretenberg keccak-flavored non-ZK UltraHonk proofs:
//!
//! 1. Parse the proof byte layout (strict length check up front).
//! 2. Re-derive the prover's Fiat-Shamir challenge schedule bit-exactly
//!    (Keccak-256 chain, every challenge reduced mod r, 127-bit splits).
//! 3. Check sumcheck round consistency.
//! 4. Collapse the Shplemini/KZG opening claims into two pairing operands
//!    and run the product-of-pairings check.
//!
//! The verification key is identified by a fingerprint: Keccak-256 over the
//! canonical 1888-byte affine VK layout, reduced mod r. Callers register
//! fingerprints out-of-band and reject proofs whose VK digest disagrees.

pub mod bn254;
pub mod constants;
pub mod error;
pub mod proof;
pub mod transcript;
pub mod verifier;
pub mod vk;

pub use error::VerifierError;
pub use proof::ProofSlice;
pub use verifier::{derive_challenges, verify, Challenges, PairingOperands};
pub use vk::VerificationKey;
