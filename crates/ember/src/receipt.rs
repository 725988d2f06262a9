use ember_primitives::{hardfork::BYZANTIUM, ChainRules, Log, B256, U256};
use ember_receipts::TxReceipt;

/// Builds the receipt for a finished transaction: a status receipt after
/// Byzantium, a state-root receipt before.
pub fn make_receipt(
    rules: ChainRules,
    success: bool,
    state_root: B256,
    cumulative_gas_used: U256,
    logs: Vec<Log>,
) -> TxReceipt {
    if rules.is_enabled(BYZANTIUM) {
        TxReceipt::PostByzantium {
            status: success,
            cumulative_gas_used,
            logs,
        }
    } else {
        TxReceipt::PreByzantium {
            state_root,
            cumulative_gas_used,
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::SpecId;

    #[test]
    fn variant_follows_fork() {
        let post = make_receipt(
            ChainRules::new(SpecId::LONDON),
            true,
            B256::ZERO,
            U256::from(21_000),
            vec![],
        );
        assert!(matches!(post, TxReceipt::PostByzantium { status: true, .. }));

        let pre = make_receipt(
            ChainRules::new(SpecId::HOMESTEAD),
            true,
            B256::repeat_byte(1),
            U256::from(21_000),
            vec![],
        );
        assert!(matches!(pre, TxReceipt::PreByzantium { .. }));
    }
}
