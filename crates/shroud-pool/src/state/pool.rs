//! Global pool bookkeeping.

use crate::error::PoolError;

/// Pool configuration and counters. One instance per deployment, mutated
/// only by the reducer.
#[derive(Clone, Debug)]
pub struct PoolState {
    /// Authority allowed to pause the pool and run demo operations.
    pub authority: [u8; 32],
    /// Handle of the shielded token mint (opaque to the engine).
    pub token_mint: [u8; 32],
    /// Handle of the vault that backs the shielded supply.
    pub vault: [u8; 32],
    /// Mirror of the commitment tree root after the last append.
    pub tree_root: [u8; 32],

    deposit_count: u64,
    total_minted: u64,
    total_burned: u64,
    pending_redemptions: u64,
    total_shielded: u64,

    pub min_deposit: u64,
    pub max_deposit: u64,
    paused: bool,
    pub last_update: i64,
}

impl PoolState {
    pub fn new(
        authority: [u8; 32],
        token_mint: [u8; 32],
        vault: [u8; 32],
        min_deposit: u64,
        max_deposit: u64,
    ) -> Self {
        Self {
            authority,
            token_mint,
            vault,
            tree_root: [0u8; 32],
            deposit_count: 0,
            total_minted: 0,
            total_burned: 0,
            pending_redemptions: 0,
            total_shielded: 0,
            min_deposit,
            max_deposit,
            paused: false,
            last_update: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    pub fn total_minted(&self) -> u64 {
        self.total_minted
    }

    pub fn total_burned(&self) -> u64 {
        self.total_burned
    }

    pub fn pending_redemptions(&self) -> u64 {
        self.pending_redemptions
    }

    pub fn total_shielded(&self) -> u64 {
        self.total_shielded
    }

    pub fn check_deposit_bounds(&self, amount: u64) -> Result<(), PoolError> {
        if amount == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if amount < self.min_deposit || amount > self.max_deposit {
            return Err(PoolError::AmountOutOfRange);
        }
        Ok(())
    }

    pub fn record_deposit(&mut self, amount: u64) -> Result<(), PoolError> {
        // Compute every counter first so a failing one leaves no partial update.
        let count = self.deposit_count.checked_add(1).ok_or(PoolError::Overflow)?;
        let minted = self
            .total_minted
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        let shielded = self
            .total_shielded
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        self.deposit_count = count;
        self.total_minted = minted;
        self.total_shielded = shielded;
        Ok(())
    }

    pub fn record_release(&mut self, amount: u64) -> Result<(), PoolError> {
        if amount > self.total_shielded {
            return Err(PoolError::InsufficientFunds);
        }
        self.total_shielded -= amount;
        Ok(())
    }

    pub fn record_burn(&mut self, amount: u64) -> Result<(), PoolError> {
        if amount > self.total_shielded {
            return Err(PoolError::InsufficientFunds);
        }
        let burned = self
            .total_burned
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        let pending = self
            .pending_redemptions
            .checked_add(1)
            .ok_or(PoolError::Overflow)?;
        self.total_shielded -= amount;
        self.total_burned = burned;
        self.pending_redemptions = pending;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> PoolState {
        PoolState::new([1u8; 32], [2u8; 32], [3u8; 32], 1_000, 100_000_000)
    }

    #[test]
    fn deposit_bounds() {
        let p = pool();
        assert_eq!(p.check_deposit_bounds(0), Err(PoolError::ZeroAmount));
        assert_eq!(p.check_deposit_bounds(999), Err(PoolError::AmountOutOfRange));
        assert!(p.check_deposit_bounds(1_000).is_ok());
        assert!(p.check_deposit_bounds(100_000_000).is_ok());
        assert_eq!(
            p.check_deposit_bounds(100_000_001),
            Err(PoolError::AmountOutOfRange)
        );
    }

    #[test]
    fn max_amount_deposit_then_another_does_not_overflow_silently() {
        let mut p = pool();
        p.record_deposit(u64::MAX).unwrap();
        assert_eq!(p.record_deposit(1), Err(PoolError::Overflow));
        // The failed call must not have bumped the counter.
        assert_eq!(p.deposit_count(), 1);
    }

    #[test]
    fn release_respects_shielded_balance() {
        let mut p = pool();
        p.record_deposit(10_000).unwrap();
        assert_eq!(p.record_release(10_001), Err(PoolError::InsufficientFunds));
        p.record_release(10_000).unwrap();
        assert_eq!(p.total_shielded(), 0);
    }

    #[test]
    fn burn_tracks_redemptions() {
        let mut p = pool();
        p.record_deposit(50_000).unwrap();
        p.record_burn(20_000).unwrap();
        assert_eq!(p.total_burned(), 20_000);
        assert_eq!(p.pending_redemptions(), 1);
        assert_eq!(p.total_shielded(), 30_000);
    }
}
