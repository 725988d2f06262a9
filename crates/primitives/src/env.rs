use crate::{ChainRules, SpecId};
use alloy_primitives::{Address, B256, U256};

/// Execution environment: configuration, block and transaction context.
#[derive(Clone, Debug, Default)]
pub struct Env {
    pub cfg: CfgEnv,
    pub block: BlockEnv,
    pub tx: TxEnv,
}

/// EVM configuration.
#[derive(Clone, Debug)]
pub struct CfgEnv {
    pub chain_id: u64,
    pub rules: ChainRules,
    /// Disables the EIP-170 deployed-code size check.
    pub allow_unlimited_contract_size: bool,
}

impl Default for CfgEnv {
    fn default() -> Self {
        Self {
            chain_id: 1,
            rules: ChainRules::new(SpecId::LATEST),
            allow_unlimited_contract_size: false,
        }
    }
}

/// Block context the interpreter can observe.
#[derive(Clone, Debug, Default)]
pub struct BlockEnv {
    pub number: U256,
    pub coinbase: Address,
    pub timestamp: U256,
    /// Pre-merge DIFFICULTY, ignored once `prevrandao` is set.
    pub difficulty: U256,
    /// EIP-4399 PREVRANDAO, served by opcode 0x44 after the merge.
    pub prevrandao: Option<B256>,
    pub basefee: U256,
    pub gas_limit: U256,
}

/// Transaction context the interpreter can observe.
#[derive(Clone, Debug, Default)]
pub struct TxEnv {
    /// Transaction sender, served by ORIGIN.
    pub origin: Address,
    pub gas_price: U256,
    pub gas_limit: u64,
}

impl Env {
    /// Active chain rules.
    #[inline]
    pub fn rules(&self) -> ChainRules {
        self.cfg.rules
    }
}
