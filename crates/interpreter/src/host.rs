use crate::{
    CallInputs, CallOutcome, CreateInputs, CreateOutcome, Gas, InstructionResult, SStoreResult,
    SelfDestructResult, StepEvent,
};
use ember_primitives::{Bytes, Env, HashMap, Log, B256, U256};
use ember_primitives::{Address, KECCAK_EMPTY};

/// Interface between the interpreter and everything outside the frame:
/// journaled state, the environment and nested calls.
pub trait Host {
    /// Execution environment.
    fn env(&self) -> &Env;

    /// Hash of one of the 256 most recent blocks.
    fn block_hash(&mut self, number: U256) -> B256;

    /// Loads (and warms) an account. Returns `(is_cold, exists)`.
    fn load_account(&mut self, address: Address) -> (bool, bool);

    /// Balance of an account. Returns `(balance, is_cold)`.
    fn balance(&mut self, address: Address) -> (U256, bool);

    /// Code of an account. Returns `(code, is_cold)`.
    fn code(&mut self, address: Address) -> (Bytes, bool);

    /// Code hash of an account. Returns `(hash, is_cold)`; zero for
    /// non-existing or empty accounts.
    fn code_hash(&mut self, address: Address) -> (B256, bool);

    /// Loads (and warms) a storage slot. Returns `(value, is_cold)`.
    fn sload(&mut self, address: Address, index: U256) -> (U256, bool);

    /// Value the slot had at the start of the transaction. The slot has
    /// been loaded already.
    fn original_storage(&mut self, address: Address, index: U256) -> U256;

    /// Writes a storage slot. Pricing has happened already.
    fn sstore(&mut self, address: Address, index: U256, value: U256) -> SStoreResult;

    /// EIP-1153 transient storage read.
    fn tload(&mut self, address: Address, index: U256) -> U256;

    /// EIP-1153 transient storage write.
    fn tstore(&mut self, address: Address, index: U256, value: U256);

    /// Emits a log owned by `log.address`.
    fn log(&mut self, log: Log);

    /// Marks `address` destroyed, sweeping its balance to `target`.
    fn selfdestruct(&mut self, address: Address, target: Address) -> SelfDestructResult;

    /// Runs a CALL-family sub-frame.
    fn call(&mut self, inputs: CallInputs) -> CallOutcome;

    /// Runs a CREATE sub-frame.
    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome;

    /// Step-event hook, fired between the gas charge and the instruction
    /// logic. Returning anything other than `Continue` halts the frame
    /// before the next fetch.
    fn step(&mut self, _event: &StepEvent<'_>) -> InstructionResult {
        InstructionResult::Continue
    }
}

/// A [`Host`] over plain maps, for unit tests and benchmarks.
#[derive(Clone, Debug, Default)]
pub struct DummyHost {
    pub env: Env,
    pub storage: HashMap<(Address, U256), U256>,
    pub transient_storage: HashMap<(Address, U256), U256>,
    pub logs: Vec<Log>,
}

impl DummyHost {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    /// Clears the stored state while keeping allocations.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.logs.clear();
    }
}

impl Host for DummyHost {
    fn env(&self) -> &Env {
        &self.env
    }

    fn block_hash(&mut self, _number: U256) -> B256 {
        B256::ZERO
    }

    fn load_account(&mut self, _address: Address) -> (bool, bool) {
        (false, true)
    }

    fn balance(&mut self, _address: Address) -> (U256, bool) {
        (U256::ZERO, false)
    }

    fn code(&mut self, _address: Address) -> (Bytes, bool) {
        (Bytes::new(), false)
    }

    fn code_hash(&mut self, _address: Address) -> (B256, bool) {
        (KECCAK_EMPTY, false)
    }

    fn sload(&mut self, address: Address, index: U256) -> (U256, bool) {
        match self.storage.get(&(address, index)) {
            Some(value) => (*value, false),
            None => (U256::ZERO, true),
        }
    }

    fn original_storage(&mut self, _address: Address, _index: U256) -> U256 {
        U256::ZERO
    }

    fn sstore(&mut self, address: Address, index: U256, value: U256) -> SStoreResult {
        let present = self.storage.insert((address, index), value);
        SStoreResult {
            original: U256::ZERO,
            present: present.unwrap_or_default(),
            new: value,
            is_cold: present.is_none(),
        }
    }

    fn tload(&mut self, address: Address, index: U256) -> U256 {
        self.transient_storage
            .get(&(address, index))
            .copied()
            .unwrap_or_default()
    }

    fn tstore(&mut self, address: Address, index: U256, value: U256) {
        self.transient_storage.insert((address, index), value);
    }

    fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    fn selfdestruct(&mut self, _address: Address, _target: Address) -> SelfDestructResult {
        SelfDestructResult::default()
    }

    fn call(&mut self, inputs: CallInputs) -> CallOutcome {
        CallOutcome::new(
            InstructionResult::Stop,
            Gas::new(inputs.gas_limit),
            Bytes::new(),
        )
    }

    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome {
        CreateOutcome::new(
            InstructionResult::Stop,
            None,
            Gas::new(inputs.gas_limit),
            Bytes::new(),
        )
    }
}
