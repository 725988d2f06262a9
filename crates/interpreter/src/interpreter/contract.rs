use super::analysis::{analyze, JumpMap};
use ember_primitives::{Address, Bytes, U256};

/// Code being executed plus the data the frame was invoked with.
#[derive(Clone, Debug, Default)]
pub struct Contract {
    /// Invocation data.
    pub input: Bytes,
    /// Bytecode being executed.
    pub code: Bytes,
    /// Valid jump destinations of `code`.
    pub jumpdests: JumpMap,
    /// Address the code runs as (storage/logs owner).
    pub address: Address,
    /// Caller of the frame.
    pub caller: Address,
    /// Value apparent to the frame (CALLVALUE).
    pub value: U256,
}

impl Contract {
    /// Creates a new contract, analyzing the code for jump destinations.
    pub fn new(input: Bytes, code: Bytes, address: Address, caller: Address, value: U256) -> Self {
        let jumpdests = analyze(&code);
        Self {
            input,
            code,
            jumpdests,
            address,
            caller,
            value,
        }
    }

    /// Whether `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid_jump(&self, pc: usize) -> bool {
        self.jumpdests.is_valid(pc)
    }
}
