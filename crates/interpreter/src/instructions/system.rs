use super::utility::{address_into_u256, as_usize};
use crate::{gas, Host, InstructionResult, Interpreter};
use ember_primitives::{keccak256 as keccak, KECCAK_EMPTY, U256};

pub fn keccak256_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    let offset = interpreter.stack.peek(0).ok()?;
    let len = as_usize(interpreter.stack.peek(1).ok()?)?;
    base.checked_add(gas::KECCAK256WORD.checked_mul(gas::num_words(len as u64))?)?
        .checked_add(interpreter.memory_expansion_cost(offset, len)?)
}

pub fn keccak256(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, offset, len);
    let len = as_usize_or_fail!(interpreter, len);
    let hash = if len == 0 {
        KECCAK_EMPTY
    } else {
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        keccak(interpreter.memory.slice(offset, len))
    };
    push_b256!(interpreter, hash);
}

pub fn address(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, address_into_u256(interpreter.contract.address));
}

pub fn caller(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, address_into_u256(interpreter.contract.caller));
}

pub fn callvalue(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, interpreter.contract.value);
}

pub fn calldataload(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, offset);
    let input = &interpreter.contract.input;
    let offset = as_usize_saturated!(offset);
    let mut word = [0u8; 32];
    if offset < input.len() {
        let have = core::cmp::min(32, input.len() - offset);
        word[..have].copy_from_slice(&input[offset..offset + have]);
    }
    push!(interpreter, U256::from_be_bytes(word));
}

pub fn calldatasize(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, U256::from(interpreter.contract.input.len()));
}

fn copy_gas(interpreter: &mut Interpreter, base: u64) -> Option<u64> {
    let dst = interpreter.stack.peek(0).ok()?;
    let len = as_usize(interpreter.stack.peek(2).ok()?)?;
    base.checked_add(gas::COPY.checked_mul(gas::num_words(len as u64))?)?
        .checked_add(interpreter.memory_expansion_cost(dst, len)?)
}

pub fn calldatacopy_gas(
    interpreter: &mut Interpreter,
    _host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    copy_gas(interpreter, base)
}

pub fn calldatacopy(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, memory_offset, data_offset, len);
    let len = as_usize_or_fail!(interpreter, len);
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let data_offset = as_usize_saturated!(data_offset);
    resize_memory!(interpreter, memory_offset, len);
    // input is copied from the contract, not the frame, so reborrow locally
    let input = interpreter.contract.input.clone();
    interpreter
        .memory
        .set_data(memory_offset, data_offset, len, &input);
}

pub fn codesize(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, U256::from(interpreter.contract.code.len()));
}

pub fn codecopy_gas(
    interpreter: &mut Interpreter,
    _host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    copy_gas(interpreter, base)
}

pub fn codecopy(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, memory_offset, code_offset, len);
    let len = as_usize_or_fail!(interpreter, len);
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let code_offset = as_usize_saturated!(code_offset);
    resize_memory!(interpreter, memory_offset, len);
    let code = interpreter.contract.code.clone();
    interpreter
        .memory
        .set_data(memory_offset, code_offset, len, &code);
}

/// EIP-211: RETURNDATASIZE
pub fn returndatasize(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(
        interpreter,
        U256::from(interpreter.return_data_buffer.len())
    );
}

pub fn returndatacopy_gas(
    interpreter: &mut Interpreter,
    _host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    copy_gas(interpreter, base)
}

/// EIP-211: RETURNDATACOPY. Reading past the end of the buffer is an error,
/// unlike the other copy opcodes.
pub fn returndatacopy(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, memory_offset, data_offset, len);
    let len = as_usize_or_fail!(interpreter, len);
    let data_offset = as_usize_saturated!(data_offset);
    let data_end = data_offset.saturating_add(len);
    if data_end > interpreter.return_data_buffer.len() {
        interpreter.instruction_result = InstructionResult::OutOfOffset;
        return;
    }
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    resize_memory!(interpreter, memory_offset, len);
    let data = interpreter.return_data_buffer.clone();
    interpreter
        .memory
        .set(memory_offset, &data[data_offset..data_end]);
}

pub fn gas(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, U256::from(interpreter.gas.remaining()));
}

#[cfg(test)]
mod tests {
    use crate::{Contract, DummyHost, Interpreter, OpcodeTable};
    use ember_primitives::{hex, Bytes, ChainRules, SpecId, U256};

    fn run_with_input(code: &[u8], input: &[u8]) -> Interpreter {
        let rules = ChainRules::new(SpecId::LATEST);
        let contract = Contract::new(
            Bytes::copy_from_slice(input),
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
    fn keccak_of_empty_range() {
        // PUSH1 0, PUSH1 0, KECCAK256
        let interpreter = run_with_input(&[0x60, 0x00, 0x60, 0x00, 0x20], &[]);
        assert_eq!(
            interpreter.stack.peek(0).unwrap(),
            U256::from_be_bytes(ember_primitives::KECCAK_EMPTY.0)
        );
    }

    #[test]
    fn calldataload_past_end_is_zero_padded() {
        // PUSH1 4, CALLDATALOAD
        let interpreter = run_with_input(&[0x60, 0x04, 0x35], &hex!("11223344aabb"));
        let word = interpreter.stack.peek(0).unwrap().to_be_bytes::<32>();
        assert_eq!(&word[..2], &hex!("aabb"));
        assert!(word[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn returndatacopy_out_of_bounds_fails() {
        // no prior call: buffer empty; PUSH1 1, PUSH1 0, PUSH1 0, RETURNDATACOPY
        let interpreter = run_with_input(&[0x60, 0x01, 0x60, 0x00, 0x60, 0x00, 0x3e], &[]);
        assert_eq!(interpreter.gas.remaining(), 0);
    }
}
