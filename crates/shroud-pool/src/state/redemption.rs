//! Redemption queue records.
//!
//! A redemption burns shielded supply and queues a BTC payout; the payout
//! itself is executed by the external redemption service, which flips the
//! status when the Bitcoin transaction confirms.

/// Lifecycle of a redemption request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedemptionStatus {
    Pending,
    Completed,
}

/// One queued BTC payout.
#[derive(Clone, Debug)]
pub struct RedemptionRequest {
    pub amount_sats: u64,
    /// Destination Bitcoin address (bech32 text, at most 62 bytes).
    pub btc_address: String,
    /// Nullifier hash of the note that funded the redemption.
    pub nullifier_hash: [u8; 32],
    pub requested_at: i64,
    pub status: RedemptionStatus,
}

/// Longest accepted bech32 address.
pub const MAX_BTC_ADDRESS_LEN: usize = 62;

impl RedemptionRequest {
    pub fn new(amount_sats: u64, btc_address: String, nullifier_hash: [u8; 32], now: i64) -> Self {
        Self {
            amount_sats,
            btc_address,
            nullifier_hash,
            requested_at: now,
            status: RedemptionStatus::Pending,
        }
    }
}
