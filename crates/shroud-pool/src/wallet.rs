//! Wallet-side flows: key custody, scanning, claim links and operation
//! assembly.
//!
//! The engine never sees private key material; everything here runs on the
//! recipient's device. A `Wallet` wraps the derived key triple and turns
//! scanned notes into either a spendable claim operation or a transferable
//! claim link. Claim links are bearer instruments: the encoded string is a
//! complete spending capability for one note.

use shroud_crypto::fields::fr_to_be_bytes;
use shroud_crypto::grumpkin::GrumpkinPoint;

use crate::engine::Operation;
use crate::error::PoolError;
use crate::note::{nullifier_hash_for, ClaimLink};
use crate::state::StealthAnnouncement;
use crate::stealth::{
    derive_keys, reconstruct_claim_inputs, scan, stealth_tweak, MerklePath, MetaAddress,
    ScannedNote, StealthKeys,
};

/// A recipient wallet: the key triple plus the flows built on it.
pub struct Wallet {
    keys: StealthKeys,
}

impl Wallet {
    pub fn from_seed(master_seed: &[u8; 32]) -> Self {
        Self {
            keys: derive_keys(master_seed),
        }
    }

    pub fn meta_address(&self) -> MetaAddress {
        self.keys.meta_address()
    }

    pub fn keys(&self) -> &StealthKeys {
        &self.keys
    }

    /// Scan a batch of announcements for notes addressed to this wallet.
    pub fn scan<'a>(
        &self,
        announcements: impl IntoIterator<Item = &'a StealthAnnouncement>,
    ) -> Vec<ScannedNote> {
        scan(&self.keys.viewing_priv, &self.keys.spending_pub, announcements)
    }

    /// Package a scanned note as a bearer claim link.
    ///
    /// The derived stealth key is cross-checked against the note's public
    /// key before it leaves the wallet; a mismatch means the note was not
    /// actually ours and must not produce a link.
    pub fn claim_link(&self, note: &ScannedNote) -> Result<ClaimLink, PoolError> {
        let tweak = stealth_tweak(&note.shared_secret_x);
        let stealth_priv = self.keys.spending_priv + tweak;
        let stealth_pub = GrumpkinPoint::mul_generator(&stealth_priv);
        if fr_to_be_bytes(&stealth_pub.x) != note.stealth_pub_x {
            return Err(PoolError::DecodeError);
        }
        Ok(ClaimLink::new(
            &stealth_priv,
            note.amount_sats,
            note.leaf_index,
        ))
    }

    /// Assemble a claim operation for one of this wallet's notes.
    pub fn claim_operation(
        &self,
        note: &ScannedNote,
        path: MerklePath,
        recipient: [u8; 32],
        proof: Vec<u8>,
    ) -> Result<Operation, PoolError> {
        let root = path.root;
        let witness = reconstruct_claim_inputs(&self.keys.spending_priv, note, path)?;
        Ok(Operation::Claim {
            proof,
            root,
            nullifier_hash: witness.nullifier_hash,
            amount_sats: witness.amount_sats,
            recipient,
        })
    }
}

/// Redeem a bearer claim link into a claim operation.
///
/// Anyone holding the link can call this: the stealth private key inside it
/// is sufficient to derive the nullifier pair. The link should be dropped
/// (and thereby zeroized) as soon as the operation is built.
pub fn claim_operation_from_link(
    link: &ClaimLink,
    root: [u8; 32],
    recipient: [u8; 32],
    proof: Vec<u8>,
) -> Result<Operation, PoolError> {
    let nullifier_hash = nullifier_hash_for(&link.stealth_priv(), link.leaf_index)?;
    Ok(Operation::Claim {
        proof,
        root,
        nullifier_hash,
        amount_sats: link.amount_sats,
        recipient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tree::TREE_DEPTH;
    use crate::stealth::create_stealth_deposit;

    fn wallet() -> Wallet {
        let mut seed = [0u8; 32];
        seed[31] = 0x77;
        Wallet::from_seed(&seed)
    }

    fn scanned_note(w: &Wallet, amount: u64, leaf_index: u64) -> ScannedNote {
        let deposit = create_stealth_deposit(&w.meta_address(), amount).unwrap();
        let ann = StealthAnnouncement {
            ephemeral_pub: deposit.ephemeral_pub,
            encrypted_amount: deposit.encrypted_amount,
            commitment: deposit.commitment,
            leaf_index,
            created_at: 0,
        };
        w.scan(&[ann]).pop().expect("own note recovered")
    }

    #[test]
    fn claim_link_roundtrips_through_the_bearer_string() {
        let w = wallet();
        let note = scanned_note(&w, 25_000, 4);

        let link = w.claim_link(&note).unwrap();
        let text = link.encode();
        let redeemed = ClaimLink::decode(&text).unwrap();

        let op = claim_operation_from_link(&redeemed, [1u8; 32], [2u8; 32], vec![]).unwrap();
        match op {
            Operation::Claim {
                amount_sats,
                nullifier_hash,
                ..
            } => {
                assert_eq!(amount_sats, 25_000);
                // The link-derived nullifier matches the wallet-derived one.
                let path = MerklePath {
                    siblings: [[0u8; 32]; TREE_DEPTH],
                    leaf_index: 4,
                    root: [0u8; 32],
                };
                let witness =
                    reconstruct_claim_inputs(&w.keys().spending_priv, &note, path).unwrap();
                assert_eq!(nullifier_hash, witness.nullifier_hash);
            }
            other => panic!("wrong operation: {other:?}"),
        }
    }

    #[test]
    fn claim_link_for_foreign_note_is_refused() {
        let w = wallet();
        let mut other_seed = [0u8; 32];
        other_seed[31] = 0x78;
        let other = Wallet::from_seed(&other_seed);

        let note = scanned_note(&w, 25_000, 0);
        assert!(other.claim_link(&note).is_err());
    }

    #[test]
    fn claim_operation_uses_the_path_root() {
        let w = wallet();
        let note = scanned_note(&w, 9_999, 0);
        let path = MerklePath {
            siblings: [[0u8; 32]; TREE_DEPTH],
            leaf_index: 0,
            root: [0x5au8; 32],
        };
        let op = w
            .claim_operation(&note, path, [3u8; 32], vec![1, 2, 3])
            .unwrap();
        match op {
            Operation::Claim { root, proof, .. } => {
                assert_eq!(root, [0x5au8; 32]);
                assert_eq!(proof, vec![1, 2, 3]);
            }
            other => panic!("wrong operation: {other:?}"),
        }
    }
}
