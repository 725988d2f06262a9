//! Gas accounting for a single call frame.

pub mod calc;
pub mod constants;

pub use calc::*;
pub use constants::*;

/// Represents the state of gas during execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gas {
    /// The initial gas limit, constant throughout execution.
    limit: u64,
    /// The amount of gas remaining.
    remaining: u64,
    /// Refunded gas, applied only at the end of the transaction.
    refunded: i64,
    /// Memoised memory expansion state.
    memory: MemoryGas,
}

impl Gas {
    /// Creates a new `Gas` struct with the given gas limit.
    #[inline]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// Creates a new `Gas` struct with the given gas limit, fully spent.
    #[inline]
    pub const fn new_spent(limit: u64) -> Self {
        Self {
            limit,
            remaining: 0,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// Returns the gas limit.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the amount of gas remaining.
    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the total amount of gas spent.
    #[inline]
    pub const fn spent(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Returns the total amount of gas refunded.
    #[inline]
    pub const fn refunded(&self) -> i64 {
        self.refunded
    }

    /// Returns the memory expansion state.
    #[inline]
    pub const fn memory(&self) -> &MemoryGas {
        &self.memory
    }

    /// Returns the memory expansion state mutably.
    #[inline]
    pub fn memory_mut(&mut self) -> &mut MemoryGas {
        &mut self.memory
    }

    /// Records a gas cost. Returns `false` when the cost exceeds the
    /// remaining gas; nothing is deducted in that case.
    #[inline]
    #[must_use = "an unchecked record_cost silently loses the out-of-gas condition"]
    pub fn record_cost(&mut self, cost: u64) -> bool {
        match self.remaining.checked_sub(cost) {
            Some(left) => {
                self.remaining = left;
                true
            }
            None => false,
        }
    }

    /// Returns gas from a finished sub-frame.
    #[inline]
    pub fn erase_cost(&mut self, returned: u64) {
        self.remaining += returned;
    }

    /// Spends all remaining gas. Used by exceptional halts.
    #[inline]
    pub fn spend_all(&mut self) {
        self.remaining = 0;
    }

    /// Records a refund. May be negative (EIP-3529 SSTORE schedules) but the
    /// total is clamped to zero or above when finalized.
    #[inline]
    pub fn record_refund(&mut self, refund: i64) {
        self.refunded += refund;
    }

    /// Caps the refund at `spent / quotient` (EIP-3529: 5 post-London, 2
    /// before).
    #[inline]
    pub fn set_final_refund(&mut self, max_refund_quotient: u64) {
        self.refunded = (self.refunded.max(0) as u64).min(self.spent() / max_refund_quotient) as i64;
    }
}

/// Memoised memory length and expansion cost, so each opcode only pays the
/// positive delta.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryGas {
    /// Charged memory length in 32-byte words.
    pub words_num: usize,
    /// Total expansion cost already charged.
    pub expansion_cost: u64,
}

impl MemoryGas {
    #[inline]
    pub const fn new() -> Self {
        Self {
            words_num: 0,
            expansion_cost: 0,
        }
    }

    /// Records a new memory length in words and returns the additional cost,
    /// or `None` when no expansion is needed.
    #[inline]
    pub fn record_new_len(&mut self, new_num: usize) -> Option<u64> {
        if new_num <= self.words_num {
            return None;
        }
        self.words_num = new_num;
        let mut cost = calc::memory_gas(new_num);
        core::mem::swap(&mut self.expansion_cost, &mut cost);
        // new_num > words_num, so the new cost is the larger one
        Some(self.expansion_cost - cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_cost_checks_bounds() {
        let mut gas = Gas::new(100);
        assert!(gas.record_cost(60));
        assert_eq!(gas.remaining(), 40);
        assert!(!gas.record_cost(41));
        assert_eq!(gas.remaining(), 40);
        assert_eq!(gas.spent(), 60);
    }

    #[test]
    fn memory_expansion_charges_delta() {
        let mut mem = MemoryGas::new();
        // 1 word: 3*1 + 1/512 = 3
        assert_eq!(mem.record_new_len(1), Some(3));
        // same length: no charge
        assert_eq!(mem.record_new_len(1), None);
        // 32 words: 3*32 + 32*32/512 = 96 + 2 = 98, delta 95
        assert_eq!(mem.record_new_len(32), Some(95));
    }

    #[test]
    fn final_refund_is_capped() {
        let mut gas = Gas::new(1000);
        assert!(gas.record_cost(500));
        gas.record_refund(1_000_000);
        gas.set_final_refund(5);
        assert_eq!(gas.refunded(), 100);
    }
}
