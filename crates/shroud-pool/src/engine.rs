//! The pool state machine.
//!
//! A single-writer reducer: each operation runs to completion against
//! exclusively-owned state, and either commits all of its effects or none.
//! The implementation enforces that shape mechanically: every fallible step
//! (gate checks, proof verification, tree appends on a scratch copy, the
//! token backend call) happens before the first write to durable state, so
//! an error at any point leaves the pool exactly as it was.
//!
//! Effect visibility follows the required ordering: a nullifier lands in
//! the registry together with the appends of the same operation, and
//! announcements only appear once their commitment is in the tree.

use tracing::info;

use shroud_crypto::fields::fq_reduce_be_bytes;
use shroud_crypto::grumpkin::GrumpkinPoint;
use shroud_crypto::poseidon;

use crate::dispatch::{validate_proof, ProofKind, VkFingerprints};
use crate::error::{FatalError, PoolError};
use crate::state::redemption::MAX_BTC_ADDRESS_LEN;
use crate::state::{
    AnnouncementIndex, CommitmentTree, MemoryNullifierSet, NullifierSet, PoolState,
    RedemptionRequest, StealthAnnouncement,
};
use crate::stealth::{
    create_stealth_deposit, create_stealth_deposit_with_ephemeral, derive_keys, MetaAddress,
    StealthDeposit, META_ADDRESS_BYTES,
};
use crate::verify::{CircuitKind, Clock, ProofVerifier, TokenVault};

use sha2::{Digest, Sha256};

/// Amount minted by the demo-note path.
pub const DEMO_NOTE_AMOUNT: u64 = 100_000;

/// Announcement payload attached to operations that create outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnouncementData {
    pub ephemeral_pub: [u8; 33],
    pub encrypted_amount: [u8; 8],
}

/// One top-level state transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Initialize {
        authority: [u8; 32],
        token_mint: [u8; 32],
        vault: [u8; 32],
        min_deposit: u64,
        max_deposit: u64,
        vk_fingerprints: Vec<(CircuitKind, [u8; 32])>,
    },
    SetPaused {
        authority: [u8; 32],
        paused: bool,
    },
    AddDemoNote {
        authority: [u8; 32],
        secret_seed: [u8; 32],
    },
    AddDemoStealth {
        authority: [u8; 32],
        meta_address: [u8; META_ADDRESS_BYTES],
        amount_sats: u64,
    },
    Claim {
        proof: Vec<u8>,
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        amount_sats: u64,
        recipient: [u8; 32],
    },
    Split {
        proof: Vec<u8>,
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        output_commitment_1: [u8; 32],
        output_commitment_2: [u8; 32],
        announcement_1: AnnouncementData,
        announcement_2: AnnouncementData,
    },
    SpendPartialPublic {
        proof: Vec<u8>,
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        public_amount: u64,
        change_commitment: [u8; 32],
        recipient: [u8; 32],
        change_announcement: AnnouncementData,
    },
    RequestRedemption {
        proof: Vec<u8>,
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        amount_sats: u64,
        btc_address: String,
    },
    PoolDeposit {
        proof: Vec<u8>,
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        pool_commitment: [u8; 32],
        amount_sats: u64,
    },
    PoolWithdraw {
        proof: Vec<u8>,
        pool_root: [u8; 32],
        pool_nullifier_hash: [u8; 32],
        amount_sats: u64,
        output_commitment: [u8; 32],
        output_announcement: AnnouncementData,
    },
    PoolClaimYield {
        proof: Vec<u8>,
        pool_root: [u8; 32],
        pool_nullifier_hash: [u8; 32],
        new_pool_commitment: [u8; 32],
        yield_amount: u64,
        recipient: [u8; 32],
    },
}

/// What a committed operation did; also drives the structured log line.
#[derive(Clone, Debug)]
pub struct Effects {
    pub operation: &'static str,
    pub leaf_indices: Vec<u64>,
    pub nullifier_hash: Option<[u8; 32]>,
    pub root_after: Option<[u8; 32]>,
    pub amount_released: Option<u64>,
}

impl Effects {
    fn op(operation: &'static str) -> Self {
        Self {
            operation,
            leaf_indices: Vec::new(),
            nullifier_hash: None,
            root_after: None,
            amount_released: None,
        }
    }
}

/// The engine. Generic over its collaborator capabilities so deployments
/// and tests wire their own backends.
pub struct Engine<V: ProofVerifier, T: TokenVault, C: Clock> {
    verifier: V,
    vault: T,
    clock: C,
    pool: Option<PoolState>,
    fingerprints: VkFingerprints,
    tree: CommitmentTree,
    nullifiers: Box<dyn NullifierSet>,
    announcements: AnnouncementIndex,
    pool_tree: CommitmentTree,
    pool_nullifiers: Box<dyn NullifierSet>,
    redemptions: Vec<RedemptionRequest>,
}

impl<V: ProofVerifier, T: TokenVault, C: Clock> Engine<V, T, C> {
    /// Build an engine with in-memory nullifier backing. Runs the Poseidon
    /// parameter self-check; a drifted table refuses to boot.
    pub fn new(verifier: V, vault: T, clock: C) -> Result<Self, FatalError> {
        Self::with_registries(
            verifier,
            vault,
            clock,
            Box::new(MemoryNullifierSet::new()),
            Box::new(MemoryNullifierSet::new()),
        )
    }

    /// Build with deployment-chosen nullifier storage.
    pub fn with_registries(
        verifier: V,
        vault: T,
        clock: C,
        nullifiers: Box<dyn NullifierSet>,
        pool_nullifiers: Box<dyn NullifierSet>,
    ) -> Result<Self, FatalError> {
        poseidon::check_parameters().map_err(|_| FatalError::PoseidonConstantsCorrupted)?;
        // The arities must be domain-separated; a sponge that collapses
        // hash1 into hash2 would merge nullifiers with commitments.
        let zero = shroud_crypto::fields::fr_from_u64(0);
        let h1 = poseidon::hash1(&zero).map_err(|_| FatalError::PoseidonConstantsCorrupted)?;
        let h2 =
            poseidon::hash2(&zero, &zero).map_err(|_| FatalError::PoseidonConstantsCorrupted)?;
        if h1 == h2 {
            return Err(FatalError::HashDomainMismatch);
        }

        Ok(Self {
            verifier,
            vault,
            clock,
            pool: None,
            fingerprints: VkFingerprints::new(),
            tree: CommitmentTree::new(),
            nullifiers,
            announcements: AnnouncementIndex::new(),
            pool_tree: CommitmentTree::new(),
            pool_nullifiers,
            redemptions: Vec::new(),
        })
    }

    // Read access for scanners, indexers and tests.

    pub fn tree(&self) -> &CommitmentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut CommitmentTree {
        &mut self.tree
    }

    pub fn pool_tree(&self) -> &CommitmentTree {
        &self.pool_tree
    }

    pub fn announcements(&self) -> &AnnouncementIndex {
        &self.announcements
    }

    pub fn pool_state(&self) -> Option<&PoolState> {
        self.pool.as_ref()
    }

    pub fn vault(&self) -> &T {
        &self.vault
    }

    pub fn redemptions(&self) -> &[RedemptionRequest] {
        &self.redemptions
    }

    pub fn nullifiers(&self) -> &dyn NullifierSet {
        &*self.nullifiers
    }

    /// Apply one operation atomically.
    pub fn apply(&mut self, operation: Operation) -> Result<Effects, PoolError> {
        let effects = match operation {
            Operation::Initialize {
                authority,
                token_mint,
                vault,
                min_deposit,
                max_deposit,
                vk_fingerprints,
            } => self.initialize(
                authority,
                token_mint,
                vault,
                min_deposit,
                max_deposit,
                vk_fingerprints,
            )?,
            Operation::SetPaused { authority, paused } => self.set_paused(authority, paused)?,
            Operation::AddDemoNote {
                authority,
                secret_seed,
            } => self.add_demo_note(authority, secret_seed)?,
            Operation::AddDemoStealth {
                authority,
                meta_address,
                amount_sats,
            } => self.add_demo_stealth(authority, meta_address, amount_sats)?,
            Operation::Claim {
                proof,
                root,
                nullifier_hash,
                amount_sats,
                recipient,
            } => self.claim(&proof, root, nullifier_hash, amount_sats, recipient)?,
            Operation::Split {
                proof,
                root,
                nullifier_hash,
                output_commitment_1,
                output_commitment_2,
                announcement_1,
                announcement_2,
            } => self.split(
                &proof,
                root,
                nullifier_hash,
                output_commitment_1,
                output_commitment_2,
                announcement_1,
                announcement_2,
            )?,
            Operation::SpendPartialPublic {
                proof,
                root,
                nullifier_hash,
                public_amount,
                change_commitment,
                recipient,
                change_announcement,
            } => self.spend_partial_public(
                &proof,
                root,
                nullifier_hash,
                public_amount,
                change_commitment,
                recipient,
                change_announcement,
            )?,
            Operation::RequestRedemption {
                proof,
                root,
                nullifier_hash,
                amount_sats,
                btc_address,
            } => self.request_redemption(&proof, root, nullifier_hash, amount_sats, btc_address)?,
            Operation::PoolDeposit {
                proof,
                root,
                nullifier_hash,
                pool_commitment,
                amount_sats,
            } => self.pool_deposit(&proof, root, nullifier_hash, pool_commitment, amount_sats)?,
            Operation::PoolWithdraw {
                proof,
                pool_root,
                pool_nullifier_hash,
                amount_sats,
                output_commitment,
                output_announcement,
            } => self.pool_withdraw(
                &proof,
                pool_root,
                pool_nullifier_hash,
                amount_sats,
                output_commitment,
                output_announcement,
            )?,
            Operation::PoolClaimYield {
                proof,
                pool_root,
                pool_nullifier_hash,
                new_pool_commitment,
                yield_amount,
                recipient,
            } => self.pool_claim_yield(
                &proof,
                pool_root,
                pool_nullifier_hash,
                new_pool_commitment,
                yield_amount,
                recipient,
            )?,
        };

        log_effects(&effects);
        Ok(effects)
    }

    fn initialize(
        &mut self,
        authority: [u8; 32],
        token_mint: [u8; 32],
        vault: [u8; 32],
        min_deposit: u64,
        max_deposit: u64,
        vk_fingerprints: Vec<(CircuitKind, [u8; 32])>,
    ) -> Result<Effects, PoolError> {
        if self.pool.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }
        if min_deposit > max_deposit {
            return Err(PoolError::BadEncoding);
        }

        let mut fingerprints = VkFingerprints::new();
        for (circuit, fingerprint) in vk_fingerprints {
            fingerprints.register(circuit, fingerprint);
        }

        self.fingerprints = fingerprints;
        self.tree = CommitmentTree::new();
        self.pool_tree = CommitmentTree::new();
        self.announcements.clear();
        self.redemptions.clear();

        let mut pool = PoolState::new(authority, token_mint, vault, min_deposit, max_deposit);
        pool.tree_root = self.tree.root();
        pool.last_update = self.clock.unix_timestamp();
        self.pool = Some(pool);

        let mut effects = Effects::op("initialize");
        effects.root_after = Some(self.tree.root());
        Ok(effects)
    }

    fn set_paused(&mut self, authority: [u8; 32], paused: bool) -> Result<Effects, PoolError> {
        let pool = self.pool.as_mut().ok_or(PoolError::NotInitialized)?;
        if pool.authority != authority {
            return Err(PoolError::Unauthorized);
        }
        pool.set_paused(paused);
        pool.last_update = self.clock.unix_timestamp();
        Ok(Effects::op(if paused { "pause" } else { "unpause" }))
    }

    /// An owned snapshot of the pool, ready for a state-mutating
    /// operation. The mutated copy is written back only on commit.
    fn active_pool(&self) -> Result<PoolState, PoolError> {
        let pool = self.pool.as_ref().ok_or(PoolError::NotInitialized)?;
        if pool.is_paused() {
            return Err(PoolError::Paused);
        }
        Ok(pool.clone())
    }

    fn require_authority(&self, authority: &[u8; 32]) -> Result<(), PoolError> {
        let pool = self.pool.as_ref().ok_or(PoolError::NotInitialized)?;
        if &pool.authority != authority {
            return Err(PoolError::Unauthorized);
        }
        Ok(())
    }

    fn make_announcement(
        clock: &C,
        data: &AnnouncementData,
        commitment: [u8; 32],
        leaf_index: u64,
    ) -> StealthAnnouncement {
        StealthAnnouncement {
            ephemeral_pub: data.ephemeral_pub,
            encrypted_amount: data.encrypted_amount,
            commitment,
            leaf_index,
            created_at: clock.unix_timestamp(),
        }
    }

    /// The ephemeral key must decode to a curve point and must not collide
    /// with an existing announcement.
    fn check_announcement_key(&self, data: &AnnouncementData) -> Result<(), PoolError> {
        GrumpkinPoint::from_compressed(&data.ephemeral_pub)
            .map_err(|_| PoolError::PointNotOnCurve)?;
        if self.announcements.contains(&data.ephemeral_pub) {
            return Err(PoolError::AnnouncementCollision);
        }
        Ok(())
    }

    /// Shared deposit path for the demo operations: mint the amount,
    /// append the commitment, announce it.
    fn apply_deposit(
        &mut self,
        deposit: &StealthDeposit,
        amount_sats: u64,
    ) -> Result<Effects, PoolError> {
        let mut pool = self.active_pool()?;
        pool.check_deposit_bounds(amount_sats)?;
        if !self.tree.has_capacity() {
            return Err(PoolError::TreeFull);
        }
        if self.announcements.contains(&deposit.ephemeral_pub) {
            return Err(PoolError::AnnouncementCollision);
        }

        pool.record_deposit(amount_sats)?;
        let mut tree = self.tree.clone();
        let leaf_index = tree.insert(&deposit.commitment)?;

        // External mint is the last fallible step.
        self.vault.mint(amount_sats)?;

        pool.tree_root = tree.root();
        pool.last_update = self.clock.unix_timestamp();
        self.tree = tree;
        let announcement = Self::make_announcement(
            &self.clock,
            &AnnouncementData {
                ephemeral_pub: deposit.ephemeral_pub,
                encrypted_amount: deposit.encrypted_amount,
            },
            deposit.commitment,
            leaf_index,
        );
        self.announcements
            .insert(announcement)
            .expect("collision checked above");
        self.pool = Some(pool);

        let mut effects = Effects::op("deposit");
        effects.leaf_indices = vec![leaf_index];
        effects.root_after = Some(self.tree.root());
        Ok(effects)
    }

    fn add_demo_note(
        &mut self,
        authority: [u8; 32],
        secret_seed: [u8; 32],
    ) -> Result<Effects, PoolError> {
        self.require_authority(&authority)?;
        let keys = derive_keys(&secret_seed);

        // Deterministic per (seed, size): repeated calls advance the tree
        // instead of colliding on the announcement key.
        let mut hasher = Sha256::new();
        hasher.update(b"shroud/demo-ephemeral/v1");
        hasher.update(secret_seed);
        hasher.update(self.tree.size().to_le_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        let ephemeral_priv = fq_reduce_be_bytes(&digest);

        let deposit = create_stealth_deposit_with_ephemeral(
            &keys.meta_address(),
            DEMO_NOTE_AMOUNT,
            &ephemeral_priv,
        )?;
        let mut effects = self.apply_deposit(&deposit, DEMO_NOTE_AMOUNT)?;
        effects.operation = "add_demo_note";
        Ok(effects)
    }

    fn add_demo_stealth(
        &mut self,
        authority: [u8; 32],
        meta_address: [u8; META_ADDRESS_BYTES],
        amount_sats: u64,
    ) -> Result<Effects, PoolError> {
        self.require_authority(&authority)?;
        let meta = MetaAddress::from_bytes(&meta_address)?;
        let deposit = create_stealth_deposit(&meta, amount_sats)?;
        let mut effects = self.apply_deposit(&deposit, amount_sats)?;
        effects.operation = "add_demo_stealth";
        Ok(effects)
    }

    fn claim(
        &mut self,
        proof: &[u8],
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        amount_sats: u64,
        recipient: [u8; 32],
    ) -> Result<Effects, PoolError> {
        let mut pool = self.active_pool()?;
        if amount_sats == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if amount_sats > pool.total_shielded() {
            return Err(PoolError::InsufficientFunds);
        }

        let kind = ProofKind::Claim {
            root,
            nullifier_hash,
            amount_sats,
            recipient,
        };
        validate_proof(
            &self.verifier,
            &self.fingerprints,
            &self.tree,
            &*self.nullifiers,
            &kind,
            proof,
        )?;

        pool.record_release(amount_sats)?;

        self.vault.release(&recipient, amount_sats)?;

        self.nullifiers
            .insert(&nullifier_hash)
            .expect("freshness checked during validation");
        pool.last_update = self.clock.unix_timestamp();
        self.pool = Some(pool);

        let mut effects = Effects::op("claim");
        effects.nullifier_hash = Some(nullifier_hash);
        effects.amount_released = Some(amount_sats);
        effects.root_after = Some(self.tree.root());
        Ok(effects)
    }

    #[allow(clippy::too_many_arguments)]
    fn split(
        &mut self,
        proof: &[u8],
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        output_commitment_1: [u8; 32],
        output_commitment_2: [u8; 32],
        announcement_1: AnnouncementData,
        announcement_2: AnnouncementData,
    ) -> Result<Effects, PoolError> {
        let mut pool = self.active_pool()?;
        self.check_announcement_key(&announcement_1)?;
        self.check_announcement_key(&announcement_2)?;
        if announcement_1.ephemeral_pub == announcement_2.ephemeral_pub {
            return Err(PoolError::AnnouncementCollision);
        }
        if self.tree.remaining_capacity() < 2 {
            return Err(PoolError::TreeFull);
        }

        let kind = ProofKind::Split {
            root,
            nullifier_hash,
            output_commitment_1,
            output_commitment_2,
        };
        validate_proof(
            &self.verifier,
            &self.fingerprints,
            &self.tree,
            &*self.nullifiers,
            &kind,
            proof,
        )?;

        // Output order is part of the contract: deterministic leaf indices.
        let mut tree = self.tree.clone();
        let index_1 = tree.insert(&output_commitment_1)?;
        let index_2 = tree.insert(&output_commitment_2)?;

        self.nullifiers
            .insert(&nullifier_hash)
            .expect("freshness checked during validation");
        self.tree = tree;
        let ann_1 =
            Self::make_announcement(&self.clock, &announcement_1, output_commitment_1, index_1);
        let ann_2 =
            Self::make_announcement(&self.clock, &announcement_2, output_commitment_2, index_2);
        self.announcements
            .insert(ann_1)
            .expect("collision checked above");
        self.announcements
            .insert(ann_2)
            .expect("collision checked above");

        pool.tree_root = self.tree.root();
        pool.last_update = self.clock.unix_timestamp();
        self.pool = Some(pool);

        let mut effects = Effects::op("split");
        effects.leaf_indices = vec![index_1, index_2];
        effects.nullifier_hash = Some(nullifier_hash);
        effects.root_after = Some(self.tree.root());
        Ok(effects)
    }

    #[allow(clippy::too_many_arguments)]
    fn spend_partial_public(
        &mut self,
        proof: &[u8],
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        public_amount: u64,
        change_commitment: [u8; 32],
        recipient: [u8; 32],
        change_announcement: AnnouncementData,
    ) -> Result<Effects, PoolError> {
        let mut pool = self.active_pool()?;
        if public_amount == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if public_amount > pool.total_shielded() {
            return Err(PoolError::InsufficientFunds);
        }
        self.check_announcement_key(&change_announcement)?;
        if !self.tree.has_capacity() {
            return Err(PoolError::TreeFull);
        }

        let kind = ProofKind::SpendPartialPublic {
            root,
            nullifier_hash,
            public_amount,
            change_commitment,
            recipient,
        };
        validate_proof(
            &self.verifier,
            &self.fingerprints,
            &self.tree,
            &*self.nullifiers,
            &kind,
            proof,
        )?;

        pool.record_release(public_amount)?;
        let mut tree = self.tree.clone();
        let change_index = tree.insert(&change_commitment)?;

        self.vault.release(&recipient, public_amount)?;

        self.nullifiers
            .insert(&nullifier_hash)
            .expect("freshness checked during validation");
        self.tree = tree;
        let announcement = Self::make_announcement(
            &self.clock,
            &change_announcement,
            change_commitment,
            change_index,
        );
        self.announcements
            .insert(announcement)
            .expect("collision checked above");
        pool.tree_root = self.tree.root();
        pool.last_update = self.clock.unix_timestamp();
        self.pool = Some(pool);

        let mut effects = Effects::op("spend_partial_public");
        effects.leaf_indices = vec![change_index];
        effects.nullifier_hash = Some(nullifier_hash);
        effects.root_after = Some(self.tree.root());
        effects.amount_released = Some(public_amount);
        Ok(effects)
    }

    fn request_redemption(
        &mut self,
        proof: &[u8],
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        amount_sats: u64,
        btc_address: String,
    ) -> Result<Effects, PoolError> {
        let mut pool = self.active_pool()?;
        if amount_sats == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if btc_address.is_empty()
            || btc_address.len() > MAX_BTC_ADDRESS_LEN
            || !btc_address.bytes().all(|b| b.is_ascii_graphic())
        {
            return Err(PoolError::BadEncoding);
        }

        let kind = ProofKind::Redemption {
            root,
            nullifier_hash,
            amount_sats,
        };
        validate_proof(
            &self.verifier,
            &self.fingerprints,
            &self.tree,
            &*self.nullifiers,
            &kind,
            proof,
        )?;

        pool.record_burn(amount_sats)?;

        self.vault.burn(amount_sats)?;

        self.nullifiers
            .insert(&nullifier_hash)
            .expect("freshness checked during validation");
        let now = self.clock.unix_timestamp();
        pool.last_update = now;
        self.pool = Some(pool);
        self.redemptions.push(RedemptionRequest::new(
            amount_sats,
            btc_address,
            nullifier_hash,
            now,
        ));

        let mut effects = Effects::op("request_redemption");
        effects.nullifier_hash = Some(nullifier_hash);
        effects.amount_released = Some(amount_sats);
        Ok(effects)
    }

    fn pool_deposit(
        &mut self,
        proof: &[u8],
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        pool_commitment: [u8; 32],
        amount_sats: u64,
    ) -> Result<Effects, PoolError> {
        self.active_pool()?;
        if amount_sats == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if !self.pool_tree.has_capacity() {
            return Err(PoolError::TreeFull);
        }

        // The spent note lives in the main tree; the new position goes
        // into the pool tree.
        let kind = ProofKind::PoolDeposit {
            root,
            nullifier_hash,
            pool_commitment,
            amount_sats,
        };
        validate_proof(
            &self.verifier,
            &self.fingerprints,
            &self.tree,
            &*self.nullifiers,
            &kind,
            proof,
        )?;

        let mut pool_tree = self.pool_tree.clone();
        let leaf_index = pool_tree.insert(&pool_commitment)?;

        self.nullifiers
            .insert(&nullifier_hash)
            .expect("freshness checked during validation");
        self.pool_tree = pool_tree;

        let mut effects = Effects::op("pool_deposit");
        effects.leaf_indices = vec![leaf_index];
        effects.nullifier_hash = Some(nullifier_hash);
        effects.root_after = Some(self.pool_tree.root());
        Ok(effects)
    }

    #[allow(clippy::too_many_arguments)]
    fn pool_withdraw(
        &mut self,
        proof: &[u8],
        pool_root: [u8; 32],
        pool_nullifier_hash: [u8; 32],
        amount_sats: u64,
        output_commitment: [u8; 32],
        output_announcement: AnnouncementData,
    ) -> Result<Effects, PoolError> {
        let mut pool = self.active_pool()?;
        if amount_sats == 0 {
            return Err(PoolError::ZeroAmount);
        }
        self.check_announcement_key(&output_announcement)?;
        if !self.tree.has_capacity() {
            return Err(PoolError::TreeFull);
        }

        let kind = ProofKind::PoolWithdraw {
            pool_root,
            pool_nullifier_hash,
            amount_sats,
            output_commitment,
        };
        validate_proof(
            &self.verifier,
            &self.fingerprints,
            &self.pool_tree,
            &*self.pool_nullifiers,
            &kind,
            proof,
        )?;

        let mut tree = self.tree.clone();
        let leaf_index = tree.insert(&output_commitment)?;

        self.pool_nullifiers
            .insert(&pool_nullifier_hash)
            .expect("freshness checked during validation");
        self.tree = tree;
        let announcement = Self::make_announcement(
            &self.clock,
            &output_announcement,
            output_commitment,
            leaf_index,
        );
        self.announcements
            .insert(announcement)
            .expect("collision checked above");

        pool.tree_root = self.tree.root();
        pool.last_update = self.clock.unix_timestamp();
        self.pool = Some(pool);

        let mut effects = Effects::op("pool_withdraw");
        effects.leaf_indices = vec![leaf_index];
        effects.nullifier_hash = Some(pool_nullifier_hash);
        effects.root_after = Some(self.tree.root());
        Ok(effects)
    }

    fn pool_claim_yield(
        &mut self,
        proof: &[u8],
        pool_root: [u8; 32],
        pool_nullifier_hash: [u8; 32],
        new_pool_commitment: [u8; 32],
        yield_amount: u64,
        recipient: [u8; 32],
    ) -> Result<Effects, PoolError> {
        self.active_pool()?;
        if yield_amount == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if !self.pool_tree.has_capacity() {
            return Err(PoolError::TreeFull);
        }

        let kind = ProofKind::PoolClaimYield {
            pool_root,
            pool_nullifier_hash,
            new_pool_commitment,
            yield_amount,
            recipient,
        };
        validate_proof(
            &self.verifier,
            &self.fingerprints,
            &self.pool_tree,
            &*self.pool_nullifiers,
            &kind,
            proof,
        )?;

        let mut pool_tree = self.pool_tree.clone();
        let leaf_index = pool_tree.insert(&new_pool_commitment)?;

        // Yield is paid out of the vault's reserve.
        self.vault.release(&recipient, yield_amount)?;

        self.pool_nullifiers
            .insert(&pool_nullifier_hash)
            .expect("freshness checked during validation");
        self.pool_tree = pool_tree;

        let mut effects = Effects::op("pool_claim_yield");
        effects.leaf_indices = vec![leaf_index];
        effects.nullifier_hash = Some(pool_nullifier_hash);
        effects.root_after = Some(self.pool_tree.root());
        effects.amount_released = Some(yield_amount);
        Ok(effects)
    }
}

/// One structured line per committed operation. Only prefixes and public
/// values; never key material.
fn log_effects(effects: &Effects) {
    let nullifier_prefix = effects
        .nullifier_hash
        .map(|h| hex::encode(&h[..8]))
        .unwrap_or_default();
    let root_after = effects.root_after.map(hex::encode).unwrap_or_default();
    info!(
        operation = effects.operation,
        leaf_indices = ?effects.leaf_indices,
        nullifier_hash_prefix = %nullifier_prefix,
        root_after = %root_after,
        amount_released = effects.amount_released,
        "operation committed"
    );
}
