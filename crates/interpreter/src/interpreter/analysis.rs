use crate::opcode;
use bitvec::prelude::{bitvec, BitVec, Lsb0};
use std::sync::Arc;

/// Precomputed set of valid JUMP destinations: positions of `0x5B` bytes
/// that are not part of a PUSH immediate.
#[derive(Clone, Debug, Default)]
pub struct JumpMap(Arc<BitVec<u8, Lsb0>>);

impl JumpMap {
    /// Whether `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid(&self, pc: usize) -> bool {
        pc < self.0.len() && self.0[pc]
    }

    /// Raw bitmap bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_raw_slice()
    }
}

/// Walks the bytecode once, skipping PUSH immediates, and records every
/// JUMPDEST position.
pub fn analyze(code: &[u8]) -> JumpMap {
    let mut jumps: BitVec<u8, Lsb0> = bitvec![u8, Lsb0; 0; code.len()];

    let mut i = 0;
    while i < code.len() {
        let op = code[i];
        if op == opcode::JUMPDEST {
            jumps.set(i, true);
            i += 1;
        } else {
            let push_offset = op.wrapping_sub(opcode::PUSH1);
            if push_offset < 32 {
                i += push_offset as usize + 2;
            } else {
                i += 1;
            }
        }
    }

    JumpMap(Arc::new(jumps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jumpdest_inside_push_immediate_is_invalid() {
        // PUSH2 0x5b5b JUMPDEST
        let code = [0x61, 0x5b, 0x5b, 0x5b];
        let map = analyze(&code);
        assert!(!map.is_valid(1));
        assert!(!map.is_valid(2));
        assert!(map.is_valid(3));
    }

    #[test]
    fn truncated_push_does_not_panic() {
        // PUSH32 with only 2 immediate bytes
        let code = [0x7f, 0x5b, 0x5b];
        let map = analyze(&code);
        assert!(!map.is_valid(1));
        assert!(!map.is_valid(2));
    }

    #[test]
    fn out_of_range_is_invalid() {
        let map = analyze(&[0x5b]);
        assert!(map.is_valid(0));
        assert!(!map.is_valid(1));
    }
}
