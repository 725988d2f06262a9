use super::utility::as_usize;
use crate::{Host, InstructionResult, Interpreter};
use ember_primitives::{Bytes, U256};

pub fn stop(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    interpreter.instruction_result = InstructionResult::Stop;
}

pub fn jump(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, target);
    jump_inner(interpreter, target);
}

pub fn jumpi(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, target, cond);
    if !cond.is_zero() {
        jump_inner(interpreter, target);
    }
}

#[inline]
fn jump_inner(interpreter: &mut Interpreter, target: U256) {
    let Some(target) = as_usize(target) else {
        interpreter.instruction_result = InstructionResult::InvalidJump;
        return;
    };
    if !interpreter.contract.is_valid_jump(target) {
        interpreter.instruction_result = InstructionResult::InvalidJump;
        return;
    }
    interpreter.pc = target;
}

pub fn jumpdest(_interpreter: &mut Interpreter, _host: &mut dyn Host) {}

pub fn pc(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    // - 1 because the loop advanced past the fetched byte already
    push!(interpreter, U256::from(interpreter.pc - 1));
}

/// Shared RETURN/REVERT charge: just the memory expansion of the returned
/// region.
fn return_gas(interpreter: &mut Interpreter, base: u64) -> Option<u64> {
    let offset = interpreter.stack.peek(0).ok()?;
    let len = as_usize(interpreter.stack.peek(1).ok()?)?;
    base.checked_add(interpreter.memory_expansion_cost(offset, len)?)
}

pub fn ret_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    return_gas(interpreter, base)
}

pub fn revert_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    return_gas(interpreter, base)
}

#[inline]
fn return_inner(interpreter: &mut Interpreter, result: InstructionResult) {
    pop!(interpreter, offset, len);
    let len = as_usize_or_fail!(interpreter, len);
    let mut output = Bytes::new();
    if len != 0 {
        // offset is ignored when len is zero
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        output = interpreter.memory.get(offset, len);
    }
    interpreter.output = output;
    interpreter.instruction_result = result;
}

pub fn ret(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    return_inner(interpreter, InstructionResult::Return);
}

/// EIP-140: REVERT instruction
pub fn revert(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    return_inner(interpreter, InstructionResult::Revert);
}

/// Designated invalid opcode (EIP-141).
pub fn invalid(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    interpreter.instruction_result = InstructionResult::InvalidFEOpcode;
}

#[cfg(test)]
mod tests {
    use crate::{Contract, DummyHost, Interpreter, OpcodeTable};
    use ember_primitives::{Bytes, ChainRules, SpecId, U256};

    fn run(code: &[u8]) -> (Interpreter, crate::InstructionResult) {
        let rules = ChainRules::new(SpecId::LATEST);
        let contract = Contract::new(
            Bytes::new(),
            Bytes::copy_from_slice(code),
            Default::default(),
            Default::default(),
            U256::ZERO,
        );
        let mut interpreter = Interpreter::new(contract, 100_000, 0, false, rules);
        let table = OpcodeTable::new(rules);
        let mut host = DummyHost::default();
        let result = interpreter.run(&table, &mut host);
        (interpreter, result)
    }

    #[test]
    fn jump_to_dest() {
        // PUSH1 4, JUMP, INVALID, JUMPDEST, STOP
        let (_, result) = run(&[0x60, 0x04, 0x56, 0xfe, 0x5b, 0x00]);
        assert_eq!(result, crate::InstructionResult::Stop);
    }

    #[test]
    fn jump_into_immediate_fails() {
        // PUSH1 1, JUMP — target is the immediate byte itself
        let (interpreter, result) = run(&[0x60, 0x01, 0x56]);
        assert_eq!(result, crate::InstructionResult::InvalidJump);
        assert_eq!(interpreter.gas.remaining(), 0);
    }

    #[test]
    fn jumpi_falls_through_on_zero() {
        // PUSH1 0, PUSH1 0, JUMPI, STOP
        let (_, result) = run(&[0x60, 0x00, 0x60, 0x00, 0x57, 0x00]);
        assert_eq!(result, crate::InstructionResult::Stop);
    }

    #[test]
    fn return_copies_memory() {
        // PUSH1 5, PUSH1 31, MSTORE8? — simpler: MSTORE value then RETURN
        // PUSH1 0x2a, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
        let (interpreter, result) =
            run(&[0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3]);
        assert_eq!(result, crate::InstructionResult::Return);
        assert_eq!(interpreter.output.len(), 32);
        assert_eq!(interpreter.output[31], 0x2a);
    }

    #[test]
    fn revert_preserves_gas() {
        // PUSH1 0, PUSH1 0, REVERT
        let (interpreter, result) = run(&[0x60, 0x00, 0x60, 0x00, 0xfd]);
        assert_eq!(result, crate::InstructionResult::Revert);
        assert!(interpreter.gas.remaining() > 0);
    }
}
