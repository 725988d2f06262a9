pub mod analysis;
mod contract;
mod memory;
mod stack;

pub use contract::Contract;
pub use memory::{next_multiple_of_32, Memory};
pub use stack::Stack;

use crate::{
    gas, opcode::OpcodeTable, Gas, Host, InstructionResult, StepEvent,
};
use ember_primitives::{Bytes, ChainRules, U256};

/// The per-call execution context and the fetch/decode/execute loop over it.
pub struct Interpreter {
    /// Contract information and invoking data.
    pub contract: Contract,
    /// Program counter.
    pub pc: usize,
    /// Gas state.
    pub gas: Gas,
    /// Operand stack.
    pub stack: Stack,
    /// Frame memory.
    pub memory: Memory,
    /// Output of the last finished sub-call.
    pub return_data_buffer: Bytes,
    /// RETURN/REVERT payload of this frame.
    pub output: Bytes,
    /// Set by instruction logic to terminate the loop.
    pub instruction_result: InstructionResult,
    /// Whether state mutation is forbidden.
    pub is_static: bool,
    /// Call depth of this frame.
    pub depth: usize,
    /// Active chain rules.
    pub rules: ChainRules,
    /// Gas forwarded to the pending sub-call, staged by the CALL/CREATE gas
    /// functions for their logic counterpart.
    pub(crate) next_call_gas: u64,
}

impl Interpreter {
    /// Creates a new frame.
    pub fn new(
        contract: Contract,
        gas_limit: u64,
        depth: usize,
        is_static: bool,
        rules: ChainRules,
    ) -> Self {
        Self {
            contract,
            pc: 0,
            gas: Gas::new(gas_limit),
            stack: Stack::new(),
            memory: Memory::new(),
            return_data_buffer: Bytes::new(),
            output: Bytes::new(),
            instruction_result: InstructionResult::Continue,
            is_static,
            depth,
            rules,
            next_call_gas: 0,
        }
    }

    /// Gas state of the frame.
    #[inline]
    pub fn gas(&self) -> &Gas {
        &self.gas
    }

    /// Charges the expansion delta for memory covering `offset..offset+len`
    /// and records the new charged length. `None` means the offset is
    /// un-addressable or the cost overflows, both of which surface as out of
    /// gas. Used by gas functions; the matching logic grows the vector with
    /// `resize_memory!`.
    pub fn memory_expansion_cost(&mut self, offset: U256, len: usize) -> Option<u64> {
        if len == 0 {
            return Some(0);
        }
        let offset = usize::try_from(u64::try_from(offset).ok()?).ok()?;
        let end = offset.checked_add(len)?;
        let words = gas::num_words(end as u64) as usize;
        Some(self.gas.memory_mut().record_new_len(words).unwrap_or(0))
    }

    /// Runs the frame to completion.
    pub fn run(&mut self, table: &OpcodeTable, host: &mut dyn Host) -> InstructionResult {
        loop {
            let result = self.step(table, host);
            if result == InstructionResult::Continue {
                continue;
            }
            // every exceptional halt consumes the frame's remaining gas;
            // only Revert and the success codes hand it back
            if result.is_error() {
                self.gas.spend_all();
            }
            return result;
        }
    }

    /// Executes a single instruction.
    ///
    /// Order per step: fetch, descriptor lookup, stack bounds, static-frame
    /// enforcement, gas charge, step event, logic.
    pub fn step(&mut self, table: &OpcodeTable, host: &mut dyn Host) -> InstructionResult {
        let pc = self.pc;

        // running off the end of the code is an implicit STOP
        let Some(&op) = self.contract.code.get(pc) else {
            return InstructionResult::Stop;
        };

        let Some(descriptor) = table.get(op) else {
            return InstructionResult::OpcodeNotFound;
        };

        let len = self.stack.len();
        if len < descriptor.min_stack as usize {
            return InstructionResult::StackUnderflow;
        }
        if len > descriptor.max_stack as usize {
            return InstructionResult::StackOverflow;
        }

        if self.is_static && descriptor.modifies_state {
            return InstructionResult::StateChangeDuringStaticCall;
        }

        let gas_fn = descriptor.gas.clone();
        let Some(charge) = (*gas_fn)(self, host, descriptor.base_fee) else {
            // a gas function may pick a more precise reason than plain OOG
            let staged = core::mem::take(&mut self.instruction_result);
            return if staged == InstructionResult::Continue {
                InstructionResult::OutOfGas
            } else {
                staged
            };
        };
        if !self.gas.record_cost(charge) {
            return InstructionResult::OutOfGas;
        }

        let request = host.step(&StepEvent {
            pc,
            opcode: op,
            name: descriptor.name.as_ref(),
            gas_left: self.gas.remaining(),
            depth: self.depth,
            stack: &self.stack,
        });

        self.pc = pc + 1;
        let logic_fn = descriptor.logic.clone();
        (*logic_fn)(self, host);

        let result = core::mem::take(&mut self.instruction_result);
        if result != InstructionResult::Continue {
            return result;
        }
        // an observer asked for a halt; honored before the next fetch
        if request != InstructionResult::Continue {
            return request;
        }
        InstructionResult::Continue
    }
}

/// Final outcome of a frame: result code, output bytes and gas state.
#[derive(Clone, Debug)]
pub struct InterpreterResult {
    pub result: InstructionResult,
    pub output: Bytes,
    pub gas: Gas,
}

impl InterpreterResult {
    pub fn new(result: InstructionResult, output: Bytes, gas: Gas) -> Self {
        Self {
            result,
            output,
            gas,
        }
    }

    /// Whether the frame finished successfully.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the frame reverted.
    #[inline]
    pub const fn is_revert(&self) -> bool {
        self.result.is_revert()
    }
}
