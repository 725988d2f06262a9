use crate::{
    calc_linear_cost_u32, u64_to_address, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use ember_primitives::Bytes;

/// Identity precompile at address 0x04.
pub const FUN: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(4), identity_run);

/// Base cost of the operation.
pub const IDENTITY_BASE: u64 = 15;
/// Cost per word.
pub const IDENTITY_PER_WORD: u64 = 3;

/// Copies the input verbatim; `15 + 3·words`.
pub fn identity_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let gas_used = calc_linear_cost_u32(input.len(), IDENTITY_BASE, IDENTITY_PER_WORD);
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    Ok(PrecompileOutput::new(
        gas_used,
        Bytes::copy_from_slice(input),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_input() {
        let out = identity_run(b"hello", 100).unwrap();
        assert_eq!(out.gas_used, 18);
        assert_eq!(out.bytes.as_ref(), b"hello");
    }
}
