use super::i256::{i256_div, i256_mod};
use crate::{gas, Host, Interpreter};
use ember_primitives::U256;

pub fn add(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = op1.wrapping_add(*op2);
}

pub fn mul(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = op1.wrapping_mul(*op2);
}

pub fn sub(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = op1.wrapping_sub(*op2);
}

pub fn div(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    if !op2.is_zero() {
        *op2 = op1.wrapping_div(*op2);
    }
}

pub fn sdiv(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = i256_div(op1, *op2);
}

pub fn rem(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    if !op2.is_zero() {
        *op2 = op1.wrapping_rem(*op2);
    }
}

pub fn smod(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = i256_mod(op1, *op2);
}

pub fn addmod(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2, op3);
    *op3 = op1.add_mod(op2, *op3);
}

pub fn mulmod(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2, op3);
    *op3 = op1.mul_mod(op2, *op3);
}

/// EXP charge: base plus a per-byte cost of the exponent (EIP-160).
pub fn exp_gas(interpreter: &mut Interpreter, _host: &mut dyn Host, _base: u64) -> Option<u64> {
    let power = interpreter.stack.peek(1).ok()?;
    gas::exp_cost(interpreter.rules, power)
}

pub fn exp(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, op1, op2);
    *op2 = op1.pow(*op2);
}

/// Sign-extends `x` from the byte at index `ext` (counted from the least
/// significant end), per the yellow paper definition of SIGNEXTEND.
pub fn signextend(interpreter: &mut Interpreter, _host: &mut dyn Host) {
    pop_top!(interpreter, ext, x);
    // For 31 we also don't need to do anything.
    if ext < U256::from(31) {
        let ext = ext.as_limbs()[0];
        let bit_index = (8 * ext + 7) as usize;
        let bit = x.bit(bit_index);
        let mask = (U256::from(1) << bit_index) - U256::from(1);
        *x = if bit { *x | !mask } else { *x & mask };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Contract, DummyHost, Interpreter, OpcodeTable};
    use ember_primitives::{Bytes, ChainRules, SpecId};

    fn run(code: &[u8]) -> crate::Interpreter {
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
    fn add_wraps() {
        // PUSH1 1, PUSH32 max, ADD
        let mut code = vec![0x60, 0x01, 0x7f];
        code.extend([0xff; 32]);
        code.push(0x01);
        let interpreter = run(&code);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::ZERO));
    }

    #[test]
    fn sdiv_by_zero_is_zero() {
        // PUSH1 0, PUSH1 4, SDIV
        let interpreter = run(&[0x60, 0x00, 0x60, 0x04, 0x05]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::ZERO));
    }

    #[test]
    fn signextend_from_byte_zero() {
        // PUSH1 0xff, PUSH1 0, SIGNEXTEND -> -1
        let interpreter = run(&[0x60, 0xff, 0x60, 0x00, 0x0b]);
        assert_eq!(interpreter.stack.peek(0), Ok(U256::MAX));
    }
}
