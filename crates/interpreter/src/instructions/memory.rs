use super::utility::as_usize;
use crate::{gas, Host, Interpreter};
use ember_primitives::U256;

pub fn mload_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    let offset = interpreter.stack.peek(0).ok()?;
    base.checked_add(interpreter.memory_expansion_cost(offset, 32)?)
}

pub fn mload(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, offset);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 32);
    push!(
        interpreter,
        U256::from_be_slice(interpreter.memory.slice(offset, 32))
    );
}

pub fn mstore_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    let offset = interpreter.stack.peek(0).ok()?;
    base.checked_add(interpreter.memory_expansion_cost(offset, 32)?)
}

pub fn mstore(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, offset, value);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 32);
    interpreter.memory.set_u256(offset, value);
}

pub fn mstore8_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    let offset = interpreter.stack.peek(0).ok()?;
    base.checked_add(interpreter.memory_expansion_cost(offset, 1)?)
}

pub fn mstore8(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, offset, value);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 1);
    interpreter.memory.set_byte(offset, value.byte(0));
}

pub fn msize(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, U256::from(interpreter.memory.len()));
}

/// EIP-5656: MCOPY charge, `3 + 3·words + expansion(max(dst, src) + len)`.
pub fn mcopy_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    let dst = interpreter.stack.peek(0).ok()?;
    let src = interpreter.stack.peek(1).ok()?;
    let len = as_usize(interpreter.stack.peek(2).ok()?)?;
    let mut cost = base.checked_add(gas::COPY.checked_mul(gas::num_words(len as u64))?)?;
    let larger = core::cmp::max(dst, src);
    cost = cost.checked_add(interpreter.memory_expansion_cost(larger, len)?)?;
    Some(cost)
}

/// EIP-5656: MCOPY
pub fn mcopy(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, dst, src, len);
    let len = as_usize_or_fail!(interpreter, len);
    if len == 0 {
        return;
    }
    let dst = as_usize_or_fail!(interpreter, dst);
    let src = as_usize_or_fail!(interpreter, src);
    resize_memory!(interpreter, core::cmp::max(dst, src), len);
    interpreter.memory.copy(dst, src, len);
}

#[cfg(test)]
mod tests {
    use crate::{Contract, DummyHost, Interpreter, OpcodeTable};
    use ember_primitives::{Bytes, ChainRules, SpecId, U256};

    fn run(code: &[u8]) -> Interpreter {
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
        interpreter.run(&table, &mut host);
        interpreter
    }

    #[test]
    fn mstore_mload_round_trip() {
        // PUSH1 0x2a, PUSH1 0x20, MSTORE, PUSH1 0x20, MLOAD
        let interpreter = run(&[0x60, 0x2a, 0x60, 0x20, 0x52, 0x60, 0x20, 0x51]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(0x2a)));
        // charged boundary is a multiple of 32
        assert_eq!(interpreter.memory.len(), 64);
    }

    #[test]
    fn mstore8_writes_low_byte() {
        // PUSH2 0x1234, PUSH1 0, MSTORE8
        let interpreter = run(&[0x61, 0x12, 0x34, 0x60, 0x00, 0x53]);
        assert_eq!(interpreter.memory.data()[0], 0x34);
    }

    #[test]
    fn msize_tracks_charged_words() {
        // PUSH1 0, MLOAD, POP, MSIZE
        let interpreter = run(&[0x60, 0x00, 0x51, 0x50, 0x59]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(32)));
    }

    #[test]
    fn mcopy_moves_overlapping_region() {
        // PUSH1 0x2a, PUSH1 0, MSTORE  (memory[31] = 0x2a)
        // PUSH1 32, PUSH1 0, PUSH1 8, MCOPY (copy 32 bytes from 0 to 8)
        // PUSH1 8, MLOAD
        let interpreter = run(&[
            0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0x60, 0x08, 0x5e, 0x60, 0x08,
            0x51,
        ]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(0x2a)));
    }
}
