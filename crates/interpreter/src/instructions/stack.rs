use crate::{Host, Interpreter};
use ember_primitives::U256;

pub fn pop(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop!(interpreter, _value);
}

/// EIP-3855: PUSH0
pub fn push0(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    push!(interpreter, U256::ZERO);
}

/// PUSH1..PUSH32. Reads `N` immediate bytes, zero-extended when the code
/// ends early, and skips them.
pub fn push<const N: usize>(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    let start = interpreter.pc;
    let code = &interpreter.contract.code;
    let end = core::cmp::min(start + N, code.len());
    let mut word = [0u8; 32];
    // immediates running off the end of the code read as zero
    word[32 - N..32 - N + (end - start)].copy_from_slice(&code[start..end]);
    push!(interpreter, U256::from_be_bytes(word));
    interpreter.pc += N;
}

pub fn dup<const N: usize>(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    if let Err(result) = interpreter.stack.dup(N) {
        interpreter.instruction_result = result;
    }
}

pub fn swap<const N: usize>(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    if let Err(result) = interpreter.stack.swap(N) {
        interpreter.instruction_result = result;
    }
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
    fn truncated_push_reads_zero() {
        // PUSH2 with a single immediate byte left in the code
        let interpreter = run(&[0x61, 0xff]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(0xff00u64)));
    }

    #[test]
    fn push_skips_immediates() {
        // PUSH1 2, PUSH1 3, MUL
        let interpreter = run(&[0x60, 0x02, 0x60, 0x03, 0x02]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(6)));
    }
}
