//! Engine state: pool bookkeeping, commitment tree, nullifier registry,
//! announcement index and redemption queue.

pub mod announce;
pub mod pool;
pub mod redemption;
pub mod registry;
pub mod tree;

pub use announce::{announcement_key, AnnouncementIndex, StealthAnnouncement};
pub use pool::PoolState;
pub use redemption::{RedemptionRequest, RedemptionStatus};
pub use registry::{MemoryNullifierSet, NullifierSet};
pub use tree::{CommitmentTree, ROOT_HISTORY_SIZE, TREE_DEPTH, ZERO_HASHES};
