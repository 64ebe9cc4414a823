//! Field, curve and hash primitives for the Shroud privacy engine.
//!
//! Everything here operates on the BN254 / Grumpkin curve cycle:
//! - `Fr` is the BN254 scalar field. Commitments, nullifiers, Merkle nodes
//!   and Grumpkin point coordinates all live in `Fr`.
//! - `Fq` is the BN254 base field, which is also the Grumpkin scalar field.
//!   Spending, viewing, ephemeral and stealth private keys are `Fq` scalars.
//!
//! Poseidon hashing uses the Circom BN254 parameter set (the set the
//! deployed syscall runs), exposed as `hash1`/`hash2`/`hash3`.

pub mod error;
pub mod fields;
pub mod grumpkin;
pub mod poseidon;

pub use error::CryptoError;
pub use fields::{Fq, Fr};
pub use grumpkin::GrumpkinPoint;
