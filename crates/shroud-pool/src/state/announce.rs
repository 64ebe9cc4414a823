//! Stealth announcement records and their content-addressed index.
//!
//! One record per deposited note, keyed by the note's ephemeral public key
//! so a recipient can scan without any hint of who they are. The 33-byte
//! compressed key is folded to 32 bytes (the trailing byte XORed into the
//! first) to fit the storage subsystem's seed width; the fold is stable per
//! deployment and collision-free in practice because ephemeral keys are
//! single-use randomness.

use std::collections::BTreeMap;

use crate::error::PoolError;

/// A published stealth announcement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StealthAnnouncement {
    /// Compressed Grumpkin ephemeral public key.
    pub ephemeral_pub: [u8; 33],
    /// Amount, XOR-encrypted under the ECDH-derived keystream.
    pub encrypted_amount: [u8; 8],
    /// The commitment this announcement points at.
    pub commitment: [u8; 32],
    /// Leaf index of the commitment in the tree.
    pub leaf_index: u64,
    /// Creation timestamp.
    pub created_at: i64,
}

/// Derive the 32-byte lookup key from a compressed ephemeral public key:
/// the first 32 bytes, with byte 32 XORed into byte 0.
pub fn announcement_key(ephemeral_pub: &[u8; 33]) -> [u8; 32] {
    let mut key = [0u8; 32];
    key.copy_from_slice(&ephemeral_pub[0..32]);
    key[0] ^= ephemeral_pub[32];
    key
}

/// Create-only index of announcements.
#[derive(Clone, Debug, Default)]
pub struct AnnouncementIndex {
    records: BTreeMap<[u8; 32], StealthAnnouncement>,
}

impl AnnouncementIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an announcement already exists for this ephemeral key.
    pub fn contains(&self, ephemeral_pub: &[u8; 33]) -> bool {
        self.records.contains_key(&announcement_key(ephemeral_pub))
    }

    /// Record a new announcement. A duplicate ephemeral key means a buggy
    /// sender reused randomness; that is an error, not an overwrite.
    pub fn insert(&mut self, announcement: StealthAnnouncement) -> Result<(), PoolError> {
        let key = announcement_key(&announcement.ephemeral_pub);
        if self.records.contains_key(&key) {
            return Err(PoolError::AnnouncementCollision);
        }
        self.records.insert(key, announcement);
        Ok(())
    }

    pub fn get(&self, ephemeral_pub: &[u8; 33]) -> Option<&StealthAnnouncement> {
        self.records.get(&announcement_key(ephemeral_pub))
    }

    /// All announcements, in key order. Scanners iterate this.
    pub fn iter(&self) -> impl Iterator<Item = &StealthAnnouncement> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(prefix: u8, x0: u8) -> StealthAnnouncement {
        let mut ephemeral_pub = [0u8; 33];
        ephemeral_pub[0] = prefix;
        ephemeral_pub[1] = x0;
        ephemeral_pub[32] = 0x5a;
        StealthAnnouncement {
            ephemeral_pub,
            encrypted_amount: [0u8; 8],
            commitment: [9u8; 32],
            leaf_index: 0,
            created_at: 0,
        }
    }

    #[test]
    fn key_is_first_32_bytes_with_the_last_byte_folded_in() {
        // key = ephemeral_pub[0..32], with ephemeral_pub[32] XORed into
        // key[0].
        let ann = announcement(0x03, 0x10);
        let key = announcement_key(&ann.ephemeral_pub);
        assert_eq!(key[0], 0x03 ^ 0x5a);
        assert_eq!(key[1], 0x10);
        // The trailing x byte only contributes through the fold.
        assert_eq!(key[31], 0x00);
    }

    #[test]
    fn duplicate_ephemeral_key_collides() {
        let mut index = AnnouncementIndex::new();
        index.insert(announcement(0x02, 0x10)).unwrap();
        assert_eq!(
            index.insert(announcement(0x02, 0x10)),
            Err(PoolError::AnnouncementCollision)
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn different_parity_is_a_different_record() {
        let mut index = AnnouncementIndex::new();
        index.insert(announcement(0x02, 0x10)).unwrap();
        index.insert(announcement(0x03, 0x10)).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn lookup_by_ephemeral_key() {
        let mut index = AnnouncementIndex::new();
        let ann = announcement(0x02, 0x44);
        index.insert(ann.clone()).unwrap();
        assert_eq!(index.get(&ann.ephemeral_pub), Some(&ann));
        assert!(index.get(&announcement(0x02, 0x45).ephemeral_pub).is_none());
    }
}
