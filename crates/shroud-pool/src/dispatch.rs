//! Proof dispatcher: binds typed per-circuit public inputs into the
//! verifier and runs the pre-verification gates.
//!
//! The public-input order per circuit is a binding contract with the
//! circuits; reordering breaks every deployed proof. Amounts embed as
//! right-aligned 32-byte big-endian words. Recipient addresses split into
//! two 128-bit limbs, low limb first, so each half is a small field
//! element.

use shroud_crypto::fields::fr_from_be_bytes;

use crate::error::PoolError;
use crate::state::{CommitmentTree, NullifierSet};
use crate::verify::{CircuitKind, ProofVerifier};
use std::collections::BTreeMap;

/// Registered VK fingerprints, one per circuit, installed at initialize.
#[derive(Clone, Debug, Default)]
pub struct VkFingerprints {
    registered: BTreeMap<CircuitKind, [u8; 32]>,
}

impl VkFingerprints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, circuit: CircuitKind, fingerprint: [u8; 32]) {
        self.registered.insert(circuit, fingerprint);
    }

    pub fn get(&self, circuit: CircuitKind) -> Option<&[u8; 32]> {
        self.registered.get(&circuit)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

/// A proof together with its typed public inputs.
#[derive(Clone, Debug)]
pub enum ProofKind {
    Claim {
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        amount_sats: u64,
        recipient: [u8; 32],
    },
    Split {
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        output_commitment_1: [u8; 32],
        output_commitment_2: [u8; 32],
    },
    SpendPartialPublic {
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        public_amount: u64,
        change_commitment: [u8; 32],
        recipient: [u8; 32],
    },
    Redemption {
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        amount_sats: u64,
    },
    PoolDeposit {
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        pool_commitment: [u8; 32],
        amount_sats: u64,
    },
    PoolWithdraw {
        pool_root: [u8; 32],
        pool_nullifier_hash: [u8; 32],
        amount_sats: u64,
        output_commitment: [u8; 32],
    },
    PoolClaimYield {
        pool_root: [u8; 32],
        pool_nullifier_hash: [u8; 32],
        new_pool_commitment: [u8; 32],
        yield_amount: u64,
        recipient: [u8; 32],
    },
}

/// Embed a u64 amount as a right-aligned 32-byte big-endian field element.
pub fn encode_amount(amount: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..32].copy_from_slice(&amount.to_be_bytes());
    out
}

/// Split a 32-byte address into two 128-bit limbs `(low, high)`, each
/// right-aligned in a 32-byte word. High limb is the first 16 bytes.
pub fn recipient_limbs(recipient: &[u8; 32]) -> ([u8; 32], [u8; 32]) {
    let mut low = [0u8; 32];
    low[16..32].copy_from_slice(&recipient[16..32]);
    let mut high = [0u8; 32];
    high[16..32].copy_from_slice(&recipient[0..16]);
    (low, high)
}

impl ProofKind {
    pub fn circuit(&self) -> CircuitKind {
        match self {
            Self::Claim { .. } => CircuitKind::Claim,
            Self::Split { .. } => CircuitKind::Split,
            Self::SpendPartialPublic { .. } => CircuitKind::SpendPartialPublic,
            Self::Redemption { .. } => CircuitKind::Redemption,
            Self::PoolDeposit { .. } => CircuitKind::PoolDeposit,
            Self::PoolWithdraw { .. } => CircuitKind::PoolWithdraw,
            Self::PoolClaimYield { .. } => CircuitKind::PoolClaimYield,
        }
    }

    pub fn root(&self) -> &[u8; 32] {
        match self {
            Self::Claim { root, .. }
            | Self::Split { root, .. }
            | Self::SpendPartialPublic { root, .. }
            | Self::Redemption { root, .. }
            | Self::PoolDeposit { root, .. } => root,
            Self::PoolWithdraw { pool_root, .. } | Self::PoolClaimYield { pool_root, .. } => {
                pool_root
            }
        }
    }

    pub fn nullifier_hash(&self) -> &[u8; 32] {
        match self {
            Self::Claim { nullifier_hash, .. }
            | Self::Split { nullifier_hash, .. }
            | Self::SpendPartialPublic { nullifier_hash, .. }
            | Self::Redemption { nullifier_hash, .. }
            | Self::PoolDeposit { nullifier_hash, .. } => nullifier_hash,
            Self::PoolWithdraw {
                pool_nullifier_hash, ..
            }
            | Self::PoolClaimYield {
                pool_nullifier_hash, ..
            } => pool_nullifier_hash,
        }
    }

    /// The field-element commitments this proof introduces (tree appends).
    pub fn output_commitments(&self) -> Vec<[u8; 32]> {
        match self {
            Self::Claim { .. } | Self::Redemption { .. } => Vec::new(),
            Self::Split {
                output_commitment_1,
                output_commitment_2,
                ..
            } => vec![*output_commitment_1, *output_commitment_2],
            Self::SpendPartialPublic {
                change_commitment, ..
            } => vec![*change_commitment],
            Self::PoolDeposit {
                pool_commitment, ..
            } => vec![*pool_commitment],
            Self::PoolWithdraw {
                output_commitment, ..
            } => vec![*output_commitment],
            Self::PoolClaimYield {
                new_pool_commitment,
                ..
            } => vec![*new_pool_commitment],
        }
    }

    /// The public-input vector in circuit declaration order.
    pub fn public_inputs(&self) -> Vec<[u8; 32]> {
        match self {
            Self::Claim {
                root,
                nullifier_hash,
                amount_sats,
                recipient,
            } => {
                let (low, high) = recipient_limbs(recipient);
                vec![*root, *nullifier_hash, encode_amount(*amount_sats), low, high]
            }
            Self::Split {
                root,
                nullifier_hash,
                output_commitment_1,
                output_commitment_2,
            } => vec![
                *root,
                *nullifier_hash,
                *output_commitment_1,
                *output_commitment_2,
            ],
            Self::SpendPartialPublic {
                root,
                nullifier_hash,
                public_amount,
                change_commitment,
                recipient,
            } => {
                let (low, high) = recipient_limbs(recipient);
                vec![
                    *root,
                    *nullifier_hash,
                    encode_amount(*public_amount),
                    *change_commitment,
                    low,
                    high,
                ]
            }
            Self::Redemption {
                root,
                nullifier_hash,
                amount_sats,
            } => vec![*root, *nullifier_hash, encode_amount(*amount_sats)],
            Self::PoolDeposit {
                root,
                nullifier_hash,
                pool_commitment,
                amount_sats,
            } => vec![
                *root,
                *nullifier_hash,
                *pool_commitment,
                encode_amount(*amount_sats),
            ],
            Self::PoolWithdraw {
                pool_root,
                pool_nullifier_hash,
                amount_sats,
                output_commitment,
            } => vec![
                *pool_root,
                *pool_nullifier_hash,
                encode_amount(*amount_sats),
                *output_commitment,
            ],
            Self::PoolClaimYield {
                pool_root,
                pool_nullifier_hash,
                new_pool_commitment,
                yield_amount,
                recipient,
            } => {
                let (low, high) = recipient_limbs(recipient);
                vec![
                    *pool_root,
                    *pool_nullifier_hash,
                    *new_pool_commitment,
                    encode_amount(*yield_amount),
                    low,
                    high,
                ]
            }
        }
    }
}

/// Run every pre-verification gate, then the verifier itself.
///
/// Order matters for error reporting: registration, encoding, root
/// freshness, double-spend, then the cryptographic verification. On
/// success nothing has been mutated; the caller applies effects.
pub fn validate_proof(
    verifier: &dyn ProofVerifier,
    fingerprints: &VkFingerprints,
    tree: &CommitmentTree,
    nullifiers: &dyn NullifierSet,
    kind: &ProofKind,
    proof: &[u8],
) -> Result<(), PoolError> {
    let circuit = kind.circuit();
    let fingerprint = fingerprints
        .get(circuit)
        .ok_or(PoolError::NotInitialized)?;

    // Every 32-byte public input that claims to be a field element must be
    // canonical before it reaches the transcript.
    if fr_from_be_bytes(kind.nullifier_hash()).is_err() {
        return Err(PoolError::BadEncoding);
    }
    for commitment in kind.output_commitments() {
        if fr_from_be_bytes(&commitment).is_err() {
            return Err(PoolError::BadEncoding);
        }
    }

    if !tree.is_known_root(kind.root()) {
        return Err(PoolError::RootStale);
    }
    if nullifiers.contains(kind.nullifier_hash()) {
        return Err(PoolError::AlreadySpent);
    }

    verifier.verify(circuit, proof, &kind.public_inputs(), fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_encoding_is_right_aligned_be() {
        let encoded = encode_amount(0x0102_0304_0506_0708);
        assert_eq!(&encoded[..24], &[0u8; 24]);
        assert_eq!(&encoded[24..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn recipient_limbs_split_and_align() {
        let mut addr = [0u8; 32];
        for (i, byte) in addr.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let (low, high) = recipient_limbs(&addr);
        assert_eq!(&low[16..], &addr[16..]);
        assert_eq!(&high[16..], &addr[..16]);
        assert_eq!(&low[..16], &[0u8; 16]);
        assert_eq!(&high[..16], &[0u8; 16]);
    }

    #[test]
    fn claim_public_input_order() {
        let kind = ProofKind::Claim {
            root: [1u8; 32],
            nullifier_hash: [2u8; 32],
            amount_sats: 10_000,
            recipient: [3u8; 32],
        };
        let pis = kind.public_inputs();
        assert_eq!(pis.len(), 5);
        assert_eq!(pis[0], [1u8; 32]);
        assert_eq!(pis[1], [2u8; 32]);
        assert_eq!(pis[2], encode_amount(10_000));
        let (low, high) = recipient_limbs(&[3u8; 32]);
        assert_eq!(pis[3], low);
        assert_eq!(pis[4], high);
    }

    #[test]
    fn split_public_input_order() {
        let kind = ProofKind::Split {
            root: [1u8; 32],
            nullifier_hash: [2u8; 32],
            output_commitment_1: [3u8; 32],
            output_commitment_2: [4u8; 32],
        };
        assert_eq!(
            kind.public_inputs(),
            vec![[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]]
        );
    }

    #[test]
    fn spend_partial_public_input_order() {
        let kind = ProofKind::SpendPartialPublic {
            root: [1u8; 32],
            nullifier_hash: [2u8; 32],
            public_amount: 3_000,
            change_commitment: [4u8; 32],
            recipient: [5u8; 32],
        };
        let pis = kind.public_inputs();
        assert_eq!(pis.len(), 6);
        assert_eq!(pis[2], encode_amount(3_000));
        assert_eq!(pis[3], [4u8; 32]);
    }

    #[test]
    fn pool_circuits_have_expected_arity() {
        let deposit = ProofKind::PoolDeposit {
            root: [0u8; 32],
            nullifier_hash: [0u8; 32],
            pool_commitment: [0u8; 32],
            amount_sats: 1,
        };
        let withdraw = ProofKind::PoolWithdraw {
            pool_root: [0u8; 32],
            pool_nullifier_hash: [0u8; 32],
            amount_sats: 1,
            output_commitment: [0u8; 32],
        };
        let claim_yield = ProofKind::PoolClaimYield {
            pool_root: [0u8; 32],
            pool_nullifier_hash: [0u8; 32],
            new_pool_commitment: [0u8; 32],
            yield_amount: 1,
            recipient: [0u8; 32],
        };
        assert_eq!(deposit.public_inputs().len(), 4);
        assert_eq!(withdraw.public_inputs().len(), 4);
        assert_eq!(claim_yield.public_inputs().len(), 6);
    }
}
