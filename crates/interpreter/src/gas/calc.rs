use super::constants::*;
use ember_primitives::{
    hardfork::{BERLIN, ISTANBUL, LONDON, SPURIOUS_DRAGON, TANGERINE},
    ChainRules, U256,
};

/// Memory expansion cost for a total length of `num_words` 32-byte words:
/// `3·w + w²/512`.
#[inline]
pub const fn memory_gas(num_words: usize) -> u64 {
    let num_words = num_words as u64;
    MEMORY
        .saturating_mul(num_words)
        .saturating_add(num_words.saturating_mul(num_words) / 512)
}

/// Number of 32-byte words needed to hold `len` bytes.
#[inline]
pub const fn num_words(len: u64) -> u64 {
    len.div_ceil(32)
}

#[inline]
fn log2floor(value: U256) -> u64 {
    debug_assert!(value != U256::ZERO);
    let mut l: u64 = 256;
    for i in 0..4 {
        let i = 3 - i;
        if value.as_limbs()[i] == 0u64 {
            l -= 64;
        } else {
            l -= value.as_limbs()[i].leading_zeros() as u64;
            if l == 0 {
                return l;
            } else {
                return l - 1;
            }
        }
    }
    l
}

/// EXP cost: 10 plus a per-exponent-byte charge (EIP-160 raised it to 50).
#[inline]
pub fn exp_cost(rules: ChainRules, power: U256) -> Option<u64> {
    if power == U256::ZERO {
        return Some(EXP);
    }
    let gas_byte = U256::from(if rules.is_enabled(SPURIOUS_DRAGON) {
        50u64
    } else {
        10
    });
    let gas = U256::from(EXP)
        .checked_add(gas_byte.checked_mul(U256::from(log2floor(power) / 8 + 1))?)?;
    u64::try_from(gas).ok()
}

/// Cost of copy-style opcodes: `3 + 3·ceil(len/32)`.
#[inline]
pub fn verylowcopy_cost(len: u64) -> Option<u64> {
    VERYLOW.checked_add(COPY.checked_mul(num_words(len))?)
}

/// KECCAK256 cost: `30 + 6·ceil(len/32)`.
#[inline]
pub fn keccak256_cost(len: u64) -> Option<u64> {
    KECCAK256.checked_add(KECCAK256WORD.checked_mul(num_words(len))?)
}

/// LOGn cost: `375 + 375·topics + 8·len`.
#[inline]
pub fn log_cost(n: u8, len: u64) -> Option<u64> {
    LOG.checked_add(LOGDATA.checked_mul(len)?)?
        .checked_add(LOGTOPIC * n as u64)
}

/// CREATE2 keccak surcharge over CREATE: `6·ceil(len/32)`.
#[inline]
pub fn create2_surcharge(len: usize) -> Option<u64> {
    KECCAK256WORD.checked_mul(num_words(len as u64))
}

/// EIP-3860 initcode metering: `2·ceil(len/32)`.
#[inline]
pub const fn initcode_cost(len: usize) -> u64 {
    INITCODE_WORD_COST * num_words(len as u64)
}

/// Base fee of the SLOAD opcode for the given fork. Zero for Berlin and
/// later, where the cost is fully dynamic (warm/cold).
#[inline]
pub fn sload_base(rules: ChainRules) -> u64 {
    if rules.is_enabled(BERLIN) {
        0
    } else if rules.is_enabled(ISTANBUL) {
        ISTANBUL_SLOAD_GAS
    } else if rules.is_enabled(TANGERINE) {
        200
    } else {
        50
    }
}

/// Dynamic part of SLOAD on Berlin and later.
#[inline]
pub fn sload_cost(rules: ChainRules, is_cold: bool) -> u64 {
    if rules.is_enabled(BERLIN) {
        if is_cold {
            COLD_SLOAD_COST
        } else {
            WARM_STORAGE_READ_COST
        }
    } else {
        sload_base(rules)
    }
}

/// Base fee of BALANCE for the given fork (dynamic from Berlin on).
#[inline]
pub fn balance_base(rules: ChainRules) -> u64 {
    if rules.is_enabled(BERLIN) {
        0
    } else if rules.is_enabled(ISTANBUL) {
        700
    } else if rules.is_enabled(TANGERINE) {
        400
    } else {
        20
    }
}

/// Base fee of EXTCODESIZE / EXTCODECOPY / EXTCODEHASH-style account probes.
#[inline]
pub fn extcode_base(rules: ChainRules) -> u64 {
    if rules.is_enabled(BERLIN) {
        0
    } else if rules.is_enabled(TANGERINE) {
        700
    } else {
        20
    }
}

/// Base fee of EXTCODEHASH (EIP-1052 Constantinople pricing, repriced by
/// EIP-1884, dynamic from Berlin on).
#[inline]
pub fn extcodehash_base(rules: ChainRules) -> u64 {
    if rules.is_enabled(BERLIN) {
        0
    } else if rules.is_enabled(ISTANBUL) {
        700
    } else {
        400
    }
}

/// EIP-2929 account access charge, zero before Berlin (the base fee covers
/// it there).
#[inline]
pub fn account_access_cost(rules: ChainRules, is_cold: bool) -> u64 {
    if rules.is_enabled(BERLIN) {
        if is_cold {
            COLD_ACCOUNT_ACCESS_COST
        } else {
            WARM_STORAGE_READ_COST
        }
    } else {
        0
    }
}

/// SSTORE gas, including the EIP-2200 stipend sentry and EIP-2929 cold
/// surcharge. `None` means out of gas.
#[inline]
pub fn sstore_cost(
    rules: ChainRules,
    original: U256,
    current: U256,
    new: U256,
    gas_remaining: u64,
    is_cold: bool,
) -> Option<u64> {
    if rules.is_enabled(ISTANBUL) {
        // EIP-2200: reentrancy sentry
        if gas_remaining <= CALL_STIPEND {
            return None;
        }
        let (gas_sload, gas_sstore_reset) = if rules.is_enabled(BERLIN) {
            (WARM_STORAGE_READ_COST, WARM_SSTORE_RESET)
        } else {
            (ISTANBUL_SLOAD_GAS, SSTORE_RESET)
        };
        let mut cost = if new == current {
            gas_sload
        } else if original == current && original == U256::ZERO {
            SSTORE_SET
        } else if original == current {
            gas_sstore_reset
        } else {
            gas_sload
        };
        if rules.is_enabled(BERLIN) && is_cold {
            cost += COLD_SLOAD_COST;
        }
        Some(cost)
    } else if current == U256::ZERO && new != U256::ZERO {
        Some(SSTORE_SET)
    } else {
        Some(SSTORE_RESET)
    }
}

/// SSTORE refund schedule per fork (EIP-1283/2200/3529).
#[allow(clippy::collapsible_else_if)]
pub fn sstore_refund(rules: ChainRules, original: U256, current: U256, new: U256) -> i64 {
    if rules.is_enabled(ISTANBUL) {
        // EIP-3529: Reduction in refunds
        let sstore_clears_schedule = if rules.is_enabled(LONDON) {
            (SSTORE_RESET - COLD_SLOAD_COST + ACCESS_LIST_STORAGE_KEY) as i64
        } else {
            REFUND_SSTORE_CLEARS
        };
        if current == new {
            0
        } else {
            if original == current && new == U256::ZERO {
                sstore_clears_schedule
            } else {
                let mut refund = 0;

                if original != U256::ZERO {
                    if current == U256::ZERO {
                        refund -= sstore_clears_schedule;
                    } else if new == U256::ZERO {
                        refund += sstore_clears_schedule;
                    }
                }

                if original == new {
                    let (gas_sstore_reset, gas_sload) = if rules.is_enabled(BERLIN) {
                        (WARM_SSTORE_RESET, WARM_STORAGE_READ_COST)
                    } else {
                        (SSTORE_RESET, ISTANBUL_SLOAD_GAS)
                    };
                    if original == U256::ZERO {
                        refund += (SSTORE_SET - gas_sload) as i64;
                    } else {
                        refund += (gas_sstore_reset - gas_sload) as i64;
                    }
                }

                refund
            }
        }
    } else {
        if current != U256::ZERO && new == U256::ZERO {
            REFUND_SSTORE_CLEARS
        } else {
            0
        }
    }
}

/// Base fee of the CALL family for the given fork (dynamic from Berlin on).
#[inline]
pub fn call_base(rules: ChainRules) -> u64 {
    if rules.is_enabled(BERLIN) {
        0
    } else if rules.is_enabled(TANGERINE) {
        700
    } else {
        40
    }
}

/// Access, value-transfer and new-account components of the CALL family.
#[inline]
pub fn call_cost(
    rules: ChainRules,
    transfers_value: bool,
    is_cold: bool,
    is_new: bool,
    is_call_or_callcode: bool,
    is_call_or_staticcall: bool,
) -> u64 {
    let mut cost = account_access_cost(rules, is_cold);
    if transfers_value && is_call_or_callcode {
        cost += CALLVALUE;
    }
    // new-account charge applies to value-bearing CALLs only once EIP-161 is
    // in, to every CALL before it
    if is_call_or_staticcall && is_new {
        if rules.is_enabled(SPURIOUS_DRAGON) {
            if transfers_value && is_call_or_callcode {
                cost += NEWACCOUNT;
            }
        } else {
            cost += NEWACCOUNT;
        }
    }
    cost
}

/// Base fee of SELFDESTRUCT (free before Tangerine).
#[inline]
pub fn selfdestruct_base(rules: ChainRules) -> u64 {
    if rules.is_enabled(TANGERINE) {
        SELFDESTRUCT
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::SpecId;

    #[test]
    fn memory_quadratic_term() {
        assert_eq!(memory_gas(0), 0);
        assert_eq!(memory_gas(1), 3);
        assert_eq!(memory_gas(512), 3 * 512 + 512);
    }

    #[test]
    fn exp_cost_per_byte() {
        let rules = ChainRules::new(SpecId::ISTANBUL);
        assert_eq!(exp_cost(rules, U256::ZERO), Some(EXP));
        assert_eq!(exp_cost(rules, U256::from(255)), Some(EXP + 50));
        assert_eq!(exp_cost(rules, U256::from(256)), Some(EXP + 100));
        let frontier = ChainRules::new(SpecId::FRONTIER);
        assert_eq!(exp_cost(frontier, U256::from(255)), Some(EXP + 10));
    }

    #[test]
    fn sstore_set_and_clear_pre_istanbul() {
        let rules = ChainRules::new(SpecId::BYZANTIUM);
        let zero = U256::ZERO;
        let one = U256::from(1);
        assert_eq!(sstore_cost(rules, zero, zero, one, 100_000, false), Some(SSTORE_SET));
        assert_eq!(sstore_cost(rules, one, one, zero, 100_000, false), Some(SSTORE_RESET));
        assert_eq!(sstore_refund(rules, one, one, zero), REFUND_SSTORE_CLEARS);
    }

    #[test]
    fn sstore_sentry_blocks_low_gas() {
        let rules = ChainRules::new(SpecId::ISTANBUL);
        assert_eq!(
            sstore_cost(rules, U256::ZERO, U256::ZERO, U256::from(1), CALL_STIPEND, false),
            None
        );
    }

    #[test]
    fn call_new_account_charge_needs_value_after_eip161() {
        let rules = ChainRules::new(SpecId::ISTANBUL);
        assert_eq!(call_cost(rules, false, false, true, true, true), 0);
        assert_eq!(call_cost(rules, true, false, true, true, true), CALLVALUE + NEWACCOUNT);
        let frontier = ChainRules::new(SpecId::FRONTIER);
        assert_eq!(call_cost(frontier, false, false, true, true, true), NEWACCOUNT);
    }
}
