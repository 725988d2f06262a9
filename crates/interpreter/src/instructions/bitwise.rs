use super::i256::i256_cmp;
use crate::{Host, Interpreter};
use core::cmp::Ordering;
use ember_primitives::U256;

pub fn lt(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = U256::from(op1 < *op2);
}

pub fn gt(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = U256::from(op1 > *op2);
}

pub fn slt(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = U256::from(i256_cmp(&op1, op2) == Ordering::Less);
}

pub fn sgt(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = U256::from(i256_cmp(&op1, op2) == Ordering::Greater);
}

pub fn eq(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = U256::from(op1 == *op2);
}

pub fn iszero(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1);
    *op1 = U256::from(op1.is_zero());
}

pub fn bitand(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = op1 & *op2;
}

pub fn bitor(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = op1 | *op2;
}

pub fn bitxor(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = op1 ^ *op2;
}

pub fn not(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1);
    *op1 = !*op1;
}

pub fn byte(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    let o1 = as_usize_saturated!(op1);
    *op2 = if o1 < 32 {
        // `31 - o1` because `byte` indexes from the little end, BYTE from
        // the big end
        U256::from(op2.byte(31 - o1))
    } else {
        U256::ZERO
    };
}

/// EIP-145: Bitwise shifting instructions in EVM
pub fn shl(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    let shift = as_usize_saturated!(op1);
    *op2 = if shift < 256 { *op2 << shift } else { U256::ZERO }
}

/// EIP-145: Bitwise shifting instructions in EVM
pub fn shr(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    let shift = as_usize_saturated!(op1);
    *op2 = if shift < 256 { *op2 >> shift } else { U256::ZERO }
}

/// EIP-145: Bitwise shifting instructions in EVM
pub fn sar(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    let shift = as_usize_saturated!(op1);
    *op2 = if shift < 256 {
        op2.arithmetic_shr(shift)
    } else if op2.bit(255) {
        U256::MAX
    } else {
        U256::ZERO
    };
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
    fn byte_picks_big_endian_index() {
        // PUSH2 0xff00, PUSH1 30, BYTE
        let interpreter = run(&[0x61, 0xff, 0x00, 0x60, 30, 0x1a]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(0xff)));
    }

    #[test]
    fn sar_saturates_negative() {
        // PUSH32 -1, PUSH2 0x0101, SAR -> still -1
        let mut code = vec![0x7f];
        code.extend([0xff; 32]);
        code.extend([0x61, 0x01, 0x01, 0x1d]);
        let interpreter = run(&code);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::MAX));
    }

    #[test]
    fn slt_on_negative() {
        // PUSH1 1, PUSH32 -1, SLT  => -1 < 1
        let mut code = vec![0x60, 0x01, 0x7f];
        code.extend([0xff; 32]);
        code.push(0x12);
        let interpreter = run(&code);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(1)));
    }
}
