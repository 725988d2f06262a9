use crate::{Gas, InstructionResult};
use ember_primitives::{Address, Bytes, B256, U256};

/// Inputs of a CALL-family sub-call.
#[derive(Clone, Debug)]
pub struct CallInputs {
    /// Account whose code is executed.
    pub contract: Address,
    /// Value transfer performed on frame entry.
    pub transfer: Transfer,
    /// Call data.
    pub input: Bytes,
    /// Gas limit of the sub-frame.
    pub gas_limit: u64,
    /// Execution context of the frame.
    pub context: CallContext,
    /// Whether the frame must reject state mutation.
    pub is_static: bool,
}

/// Context of a call frame: which storage it writes, who it reports as
/// caller and what value it observes.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    /// Storage/log owner of the executing frame.
    pub address: Address,
    /// Reported caller.
    pub caller: Address,
    /// Account the code was loaded from.
    pub code_address: Address,
    /// Value the frame observes via CALLVALUE.
    pub apparent_value: U256,
    /// Call scheme.
    pub scheme: CallScheme,
}

/// CALL-family variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallScheme {
    #[default]
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// Value moved from `source` to `target` on frame entry.
#[derive(Clone, Debug, Default)]
pub struct Transfer {
    pub source: Address,
    pub target: Address,
    pub value: U256,
}

/// Inputs of a CREATE or CREATE2.
#[derive(Clone, Debug)]
pub struct CreateInputs {
    pub caller: Address,
    pub scheme: CreateScheme,
    pub value: U256,
    pub init_code: Bytes,
    pub gas_limit: u64,
}

/// Contract-creation address derivation scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateScheme {
    /// `keccak(rlp([caller, nonce]))`
    Create,
    /// `keccak(0xff ++ caller ++ salt ++ keccak(init_code))` (EIP-1014)
    Create2 { salt: B256 },
}

/// Result of a finished CALL-family sub-frame.
#[derive(Clone, Debug)]
pub struct CallOutcome {
    pub result: InstructionResult,
    pub gas: Gas,
    pub output: Bytes,
}

impl CallOutcome {
    pub fn new(result: InstructionResult, gas: Gas, output: Bytes) -> Self {
        Self {
            result,
            gas,
            output,
        }
    }
}

/// Result of a finished CREATE sub-frame.
#[derive(Clone, Debug)]
pub struct CreateOutcome {
    pub result: InstructionResult,
    pub address: Option<Address>,
    pub gas: Gas,
    pub output: Bytes,
}

impl CreateOutcome {
    pub fn new(
        result: InstructionResult,
        address: Option<Address>,
        gas: Gas,
        output: Bytes,
    ) -> Self {
        Self {
            result,
            address,
            gas,
            output,
        }
    }
}

/// Result of an SSTORE as seen by the journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SStoreResult {
    /// Value of the slot at the start of the transaction.
    pub original: U256,
    /// Value of the slot before this write.
    pub present: U256,
    /// Value written.
    pub new: U256,
    /// Whether the slot was cold (EIP-2929).
    pub is_cold: bool,
}

/// Result of a SELFDESTRUCT as seen by the journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelfDestructResult {
    pub had_value: bool,
    pub target_exists: bool,
    pub is_cold: bool,
    pub previously_destroyed: bool,
}
