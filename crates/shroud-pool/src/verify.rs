//! Capability seams to the engine's external collaborators.
//!
//! The reducer only ever talks to a proof verifier, a token vault, a proof
//! buffer store and a clock through these traits. Production wires them to
//! the UltraHonk verifier, the token program, the upload-buffer program and
//! the runtime clock; tests substitute deterministic fakes at the same
//! seams.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use shroud_verifier::VerificationKey;

use crate::error::PoolError;

/// The circuits the pool consumes proofs from.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum CircuitKind {
    Claim,
    Split,
    SpendPartialPublic,
    Redemption,
    PoolDeposit,
    PoolWithdraw,
    PoolClaimYield,
}

impl CircuitKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Claim),
            1 => Some(Self::Split),
            2 => Some(Self::SpendPartialPublic),
            3 => Some(Self::Redemption),
            4 => Some(Self::PoolDeposit),
            5 => Some(Self::PoolWithdraw),
            6 => Some(Self::PoolClaimYield),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Claim => 0,
            Self::Split => 1,
            Self::SpendPartialPublic => 2,
            Self::Redemption => 3,
            Self::PoolDeposit => 4,
            Self::PoolWithdraw => 5,
            Self::PoolClaimYield => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Split => "split",
            Self::SpendPartialPublic => "spend_partial_public",
            Self::Redemption => "redemption",
            Self::PoolDeposit => "pool_deposit",
            Self::PoolWithdraw => "pool_withdraw",
            Self::PoolClaimYield => "pool_claim_yield",
        }
    }
}

/// Proof verification capability.
pub trait ProofVerifier {
    /// Verify `proof` for `circuit` against the given public inputs. The
    /// fingerprint is the registered one; implementations must reject any
    /// key material that does not hash to it.
    fn verify(
        &self,
        circuit: CircuitKind,
        proof: &[u8],
        public_inputs: &[[u8; 32]],
        vk_fingerprint: &[u8; 32],
    ) -> Result<(), PoolError>;
}

/// Production verifier: holds the provisioned verification keys and runs
/// the full UltraHonk pipeline per proof.
#[derive(Default)]
pub struct UltraHonkVerifier {
    keys: BTreeMap<CircuitKind, VerificationKey>,
}

impl UltraHonkVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the verification key for a circuit, returning its
    /// fingerprint for registration.
    pub fn install_vk(
        &mut self,
        circuit: CircuitKind,
        vk_bytes: &[u8],
    ) -> Result<[u8; 32], PoolError> {
        let vk = VerificationKey::from_bytes(vk_bytes).map_err(PoolError::from)?;
        let fingerprint = vk.fingerprint();
        self.keys.insert(circuit, vk);
        Ok(fingerprint)
    }
}

impl ProofVerifier for UltraHonkVerifier {
    fn verify(
        &self,
        circuit: CircuitKind,
        proof: &[u8],
        public_inputs: &[[u8; 32]],
        vk_fingerprint: &[u8; 32],
    ) -> Result<(), PoolError> {
        let vk = self.keys.get(&circuit).ok_or(PoolError::VkMismatch)?;
        shroud_verifier::verify(vk, proof, public_inputs, vk_fingerprint).map_err(PoolError::from)
    }
}

/// Token vault capability. Mirrors the token program's mint/transfer/burn
/// surface; failures carry the backend's message.
pub trait TokenVault {
    fn mint(&mut self, amount: u64) -> Result<(), PoolError>;
    fn release(&mut self, recipient: &[u8; 32], amount: u64) -> Result<(), PoolError>;
    fn burn(&mut self, amount: u64) -> Result<(), PoolError>;
    fn balance(&self) -> u64;
}

/// In-memory vault for tests and single-process runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryVault {
    balance: u64,
    /// Ledger of releases, newest last.
    pub transfers: Vec<([u8; 32], u64)>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenVault for MemoryVault {
    fn mint(&mut self, amount: u64) -> Result<(), PoolError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| PoolError::TokenCpiFailed("mint overflow".into()))?;
        Ok(())
    }

    fn release(&mut self, recipient: &[u8; 32], amount: u64) -> Result<(), PoolError> {
        if amount > self.balance {
            return Err(PoolError::TokenCpiFailed("vault balance too low".into()));
        }
        self.balance -= amount;
        self.transfers.push((*recipient, amount));
        Ok(())
    }

    fn burn(&mut self, amount: u64) -> Result<(), PoolError> {
        if amount > self.balance {
            return Err(PoolError::TokenCpiFailed("vault balance too low".into()));
        }
        self.balance -= amount;
        Ok(())
    }

    fn balance(&self) -> u64 {
        self.balance
    }
}

/// Resolver for proofs passed by handle instead of inline.
pub trait ProofBuffers {
    fn resolve(&self, handle: &[u8; 32]) -> Option<&[u8]>;
}

/// Deployment without an upload-buffer backend: handles never resolve.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBuffers;

impl ProofBuffers for NoBuffers {
    fn resolve(&self, _handle: &[u8; 32]) -> Option<&[u8]> {
        None
    }
}

/// In-memory buffer store.
#[derive(Clone, Debug, Default)]
pub struct MemoryBuffers {
    buffers: BTreeMap<[u8; 32], Vec<u8>>,
}

impl MemoryBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&mut self, handle: [u8; 32], bytes: Vec<u8>) {
        self.buffers.insert(handle, bytes);
    }
}

impl ProofBuffers for MemoryBuffers {
    fn resolve(&self, handle: &[u8; 32]) -> Option<&[u8]> {
        self.buffers.get(handle).map(|v| v.as_slice())
    }
}

/// Wall-clock capability for announcement timestamps.
pub trait Clock {
    fn unix_timestamp(&self) -> i64;
}

/// Real time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Fixed time for deterministic tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.0
    }
}
