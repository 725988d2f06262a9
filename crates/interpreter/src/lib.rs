//! # ember-interpreter
//!
//! The EVM bytecode interpreter: a gas-metered fetch/decode/execute loop
//! dispatching through a per-hardfork opcode table that individual EVM
//! instances may override or prune without touching the shared defaults.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
mod macros;

pub mod gas;
mod host;
mod inner_models;
mod inspector;
mod instruction_result;
pub mod instructions;
pub mod interpreter;
pub mod opcode;

pub use gas::Gas;
pub use host::{DummyHost, Host};
pub use inner_models::{
    CallContext, CallInputs, CallOutcome, CallScheme, CreateInputs, CreateOutcome, CreateScheme,
    SStoreResult, SelfDestructResult, Transfer,
};
pub use inspector::{Inspector, NoOpInspector, StepEvent};
pub use instruction_result::InstructionResult;
pub use interpreter::{
    analysis::{analyze, JumpMap},
    Contract, Interpreter, InterpreterResult, Memory, Stack,
};
pub use opcode::{CustomOpcode, OpcodeDescriptor, OpcodeTable};

pub use ember_primitives::{CALL_STACK_LIMIT, STACK_LIMIT};
