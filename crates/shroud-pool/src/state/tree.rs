//! Append-only incremental Merkle tree of shielded commitments.
//!
//! Standard frontier construction: the tree never stores leaves, only the
//! rightmost filled node per level plus precomputed hashes of empty
//! subtrees. Appends are O(depth) and the root after each append equals the
//! root of the equivalent fully-materialized tree.
//!
//! Proofs bind to a root. Only the current root validates by default; the
//! external indexer may pin a bounded number of historical roots it still
//! serves paths for, and those validate too. Anything else is stale.

use hex_literal::hex;

use crate::error::PoolError;
use shroud_crypto::poseidon::hash2_bytes;

/// Production tree depth. Capacity 2^20 leaves.
pub const TREE_DEPTH: usize = 20;

/// Maximum number of pinned historical roots.
pub const ROOT_HISTORY_SIZE: usize = 100;

/// Hashes of empty subtrees per level.
/// `ZERO[0] = 0`, `ZERO[i] = hash2(ZERO[i-1], ZERO[i-1])`.
pub const ZERO_HASHES: [[u8; 32]; TREE_DEPTH + 1] = [
    [0u8; 32],
    hex!("2098f5fb9e239eab3ceac3f27b81e481dc3124d55ffed523a839ee8446b64864"),
    hex!("1069673dcdb12263df301a6ff584a7ec261a44cb9dc68df067a4774460b1f1e1"),
    hex!("18f43331537ee2af2e3d758d50f72106467c6eea50371dd528d57eb2b856d238"),
    hex!("07f9d837cb17b0d36320ffe93ba52345f1b728571a568265caac97559dbc952a"),
    hex!("2b94cf5e8746b3f5c9631f4c5df32907a699c58c94b2ad4d7b5cec1639183f55"),
    hex!("2dee93c5a666459646ea7d22cca9e1bcfed71e6951b953611d11dda32ea09d78"),
    hex!("078295e5a22b84e982cf601eb639597b8b0515a88cb5ac7fa8a4aabe3c87349d"),
    hex!("2fa5e5f18f6027a6501bec864564472a616b2e274a41211a444cbe3a99f3cc61"),
    hex!("0e884376d0d8fd21ecb780389e941f66e45e7acce3e228ab3e2156a614fcd747"),
    hex!("1b7201da72494f1e28717ad1a52eb469f95892f957713533de6175e5da190af2"),
    hex!("1f8d8822725e36385200c0b201249819a6e6e1e4650808b5bebc6bface7d7636"),
    hex!("2c5d82f66c914bafb9701589ba8cfcfb6162b0a12acf88a8d0879a0471b5f85a"),
    hex!("14c54148a0940bb820957f5adf3fa1134ef5c4aaa113f4646458f270e0bfbfd0"),
    hex!("190d33b12f986f961e10c0ee44d8b9af11be25588cad89d416118e4bf4ebe80c"),
    hex!("22f98aa9ce704152ac17354914ad73ed1167ae6596af510aa5b3649325e06c92"),
    hex!("2a7c7c9b6ce5880b9f6f228d72bf6a575a526f29c66ecceef8b753d38bba7323"),
    hex!("2e8186e558698ec1c67af9c14d463ffc470043c9c2988b954d75dd643f36b992"),
    hex!("0f57c5571e9a4eab49e2c8cf050dae948aef6ead647392273546249d1c1ff10f"),
    hex!("1830ee67b5fb554ad5f63d4388800e1cfe78e310697d46e43c9ce36134f72cca"),
    hex!("2134e76ac5d21aab186c2be1dd8f84ee880a1e46eaf712f9d371b6df22191f3e"),
];

/// The commitment tree. Owned state, O(depth) plus the pinned-root ring.
#[derive(Clone)]
pub struct CommitmentTree {
    size: u64,
    current_root: [u8; 32],
    frontier: [[u8; 32]; TREE_DEPTH],
    pinned_roots: [[u8; 32]; ROOT_HISTORY_SIZE],
    pin_index: u32,
}

impl CommitmentTree {
    pub const MAX_LEAVES: u64 = 1u64 << TREE_DEPTH;

    /// An empty tree. Its root is the hash of all-zero leaves.
    pub fn new() -> Self {
        Self {
            size: 0,
            current_root: ZERO_HASHES[TREE_DEPTH],
            frontier: [[0u8; 32]; TREE_DEPTH],
            pinned_roots: [[0u8; 32]; ROOT_HISTORY_SIZE],
            pin_index: 0,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn root(&self) -> [u8; 32] {
        self.current_root
    }

    pub fn has_capacity(&self) -> bool {
        self.size < Self::MAX_LEAVES
    }

    pub fn remaining_capacity(&self) -> u64 {
        Self::MAX_LEAVES - self.size
    }

    /// Whether a proof built against this root is acceptable: the current
    /// root, or one the indexer has pinned.
    pub fn is_known_root(&self, root: &[u8; 32]) -> bool {
        if root == &self.current_root {
            return true;
        }
        if root == &[0u8; 32] {
            return false;
        }
        self.pinned_roots.iter().any(|r| r == root)
    }

    /// Pin the current root so proofs against it survive later appends.
    /// The ring holds the last `ROOT_HISTORY_SIZE` pins; older pins expire.
    pub fn pin_current_root(&mut self) {
        let slot = (self.pin_index as usize) % ROOT_HISTORY_SIZE;
        self.pinned_roots[slot] = self.current_root;
        self.pin_index = self.pin_index.wrapping_add(1);
    }

    /// Append a commitment, returning its leaf index.
    pub fn insert(&mut self, commitment: &[u8; 32]) -> Result<u64, PoolError> {
        let leaf_index = self.size;
        if leaf_index >= Self::MAX_LEAVES {
            return Err(PoolError::TreeFull);
        }

        let mut node = *commitment;
        let mut index = leaf_index;
        for level in 0..TREE_DEPTH {
            if index & 1 == 0 {
                // Left child: remember it and pair with the empty subtree.
                self.frontier[level] = node;
                node = hash2_bytes(&node, &ZERO_HASHES[level]).map_err(|_| PoolError::BadEncoding)?;
            } else {
                node = hash2_bytes(&self.frontier[level], &node)
                    .map_err(|_| PoolError::BadEncoding)?;
            }
            index >>= 1;
        }

        self.current_root = node;
        self.size = leaf_index + 1;
        Ok(leaf_index)
    }

    /// Inclusion path for the most recently appended leaf.
    ///
    /// Only the rightmost path is reconstructible from the frontier; older
    /// paths come from the external indexer's append log. Returns
    /// `(siblings, left_flags, root)` where `left_flags[i]` is true when
    /// the path node at level `i` is a left child.
    pub fn witness_latest(&self) -> Option<([[u8; 32]; TREE_DEPTH], [bool; TREE_DEPTH], [u8; 32])> {
        if self.size == 0 {
            return None;
        }
        let index = self.size - 1;
        let mut siblings = [[0u8; 32]; TREE_DEPTH];
        let mut left_flags = [false; TREE_DEPTH];
        for level in 0..TREE_DEPTH {
            let is_left = (index >> level) & 1 == 0;
            left_flags[level] = is_left;
            siblings[level] = if is_left {
                ZERO_HASHES[level]
            } else {
                self.frontier[level]
            };
        }
        Some((siblings, left_flags, self.current_root))
    }

    #[cfg(test)]
    fn force_size(&mut self, size: u64) {
        self.size = size;
    }
}

impl Default for CommitmentTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a leaf up a sibling path to its root.
pub fn compute_root_from_path(
    leaf: &[u8; 32],
    leaf_index: u64,
    siblings: &[[u8; 32]],
) -> Result<[u8; 32], PoolError> {
    let mut node = *leaf;
    let mut index = leaf_index;
    for sibling in siblings {
        node = if index & 1 == 0 {
            hash2_bytes(&node, sibling).map_err(|_| PoolError::BadEncoding)?
        } else {
            hash2_bytes(sibling, &node).map_err(|_| PoolError::BadEncoding)?
        };
        index >>= 1;
    }
    Ok(node)
}
