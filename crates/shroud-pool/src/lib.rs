//! Shroud shielded pool engine.
//!
//! A shielded token backed 1:1 by deposited BTC. Value lives as Poseidon
//! commitments in an append-only Merkle tree; transfers, splits and
//! partial-public spends consume UltraHonk proofs and reveal nothing beyond
//! their public inputs. Recipients are addressed through Grumpkin stealth
//! addresses and discover incoming notes by scanning announcements with
//! their viewing key.
//!
//! The crate is organized around a single-writer reducer ([`engine::Engine`])
//! that applies byte-tagged operations atomically: on any failure no tree
//! append, no nullifier insert and no token movement has happened.
//!
//! External collaborators (token mint, proof upload buffers, wall clock,
//! nullifier storage) enter through the capability traits in [`verify`] and
//! [`state::registry`], so deployments choose their own backing.

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod logging;
pub mod note;
pub mod state;
pub mod stealth;
pub mod verify;
pub mod wallet;

pub use engine::{Effects, Engine, Operation};
pub use error::{FatalError, PoolError};
pub use stealth::{MetaAddress, ScannedNote, StealthKeys};
pub use wallet::Wallet;
