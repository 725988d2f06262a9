//! # ember
//!
//! The Ember EVM: journaled state over a pluggable database, CALL/CREATE
//! framing, per-instance opcode and precompile overlays, and the raw-code
//! execution entry used by tooling and tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod db;
mod evm;
mod evm_impl;
mod journaled_state;
mod receipt;
mod state;

pub use db::{Database, DatabaseCommit, InMemoryDB};
pub use evm::{CustomPrecompile, Evm, EvmBuilder, RunCodeInput, RunCodeResult};
pub use evm_impl::{EvmData, EvmImpl};
pub use journaled_state::{JournalCheckpoint, JournaledState};
pub use receipt::make_receipt;
pub use state::{Account, AccountInfo, State, StorageSlot};

// the building blocks are part of the public surface
pub use ember_interpreter as interpreter;
pub use ember_interpreter::{
    CallContext, CallInputs, CallOutcome, CallScheme, CreateInputs, CreateOutcome, CreateScheme,
    CustomOpcode, Gas, Inspector, InstructionResult, Interpreter, NoOpInspector,
    OpcodeDescriptor, OpcodeTable, StepEvent, Transfer,
};
pub use ember_precompile as precompile;
pub use ember_primitives as primitives;
pub use ember_primitives::{Address, Bloom, Bytes, ChainRules, Env, Log, SpecId, B256, U256};
pub use ember_receipts as receipts;
