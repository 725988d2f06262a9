//! EIP-198 big-integer modular exponentiation, repriced by EIP-2565.

use crate::{
    u64_to_address, utilities::right_pad_vec, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use core::cmp::{max, min};
use ember_primitives::{Bytes, U256};
use num_bigint::BigUint;

/// Byzantium modexp at address 0x05.
pub const BYZANTIUM: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(5), byzantium_run);

/// EIP-2565 repriced modexp at address 0x05.
pub const BERLIN: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(5), berlin_run);

pub fn byzantium_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_inner(input, gas_limit, 0, byzantium_gas_calc)
}

pub fn berlin_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_inner(input, gas_limit, 200, berlin_gas_calc)
}

/// Number of bytes of `exp_highp` that contribute to the iteration count.
fn calculate_iteration_count(exp_length: u64, exp_highp: &U256) -> u64 {
    let mut iteration_count: u64 = 0;

    if exp_length <= 32 && exp_highp.is_zero() {
        iteration_count = 0;
    } else if exp_length <= 32 {
        iteration_count = exp_highp.bit_len() as u64 - 1;
    } else if exp_length > 32 {
        iteration_count = (8 * (exp_length - 32)) + max(exp_highp.bit_len() as u64, 1) - 1;
    }

    max(iteration_count, 1)
}

fn run_inner(
    input: &[u8],
    gas_limit: u64,
    min_gas: u64,
    calc_gas: fn(u64, u64, u64, &U256) -> u64,
) -> PrecompileResult {
    // the header is three 32-byte lengths: base, exponent, modulus
    let input = right_pad_vec(input, 96);
    let base_len = U256::from_be_slice(&input[0..32]);
    let exp_len = U256::from_be_slice(&input[32..64]);
    let mod_len = U256::from_be_slice(&input[64..96]);

    let base_len = u64::try_from(base_len)
        .ok()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(PrecompileError::ModexpBaseOverflow)?;
    let exp_len = u64::try_from(exp_len)
        .ok()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(PrecompileError::ModexpExpOverflow)?;
    let mod_len = u64::try_from(mod_len)
        .ok()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(PrecompileError::ModexpModOverflow)?;

    // zero-width base and modulus short-circuit to an empty answer after the
    // minimum charge
    if base_len == 0 && mod_len == 0 {
        if min_gas > gas_limit {
            return Err(PrecompileError::OutOfGas);
        }
        return Ok(PrecompileOutput::new(min_gas, Bytes::new()));
    }

    let data = input.get(96..).unwrap_or_default();

    // the first 32 bytes of the exponent price the operation; peek at them
    // before materializing anything length-dependent
    let exp_highp = {
        let head_len = min(exp_len, 32);
        let head = data.get(base_len..).unwrap_or_default();
        let have = min(head_len, head.len());
        let mut word = [0u8; 32];
        word[32 - head_len..32 - head_len + have].copy_from_slice(&head[..have]);
        U256::from_be_bytes(word)
    };

    let gas_used = max(
        min_gas,
        calc_gas(base_len as u64, exp_len as u64, mod_len as u64, &exp_highp),
    );
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let padded_input =
        right_pad_vec(data, base_len.saturating_add(exp_len).saturating_add(mod_len));
    let (base, rest) = padded_input.split_at(base_len);
    let (exponent, modulus) = rest.split_at(exp_len);

    let output = modexp(base, exponent, modulus);
    // the answer is left-padded to the modulus length
    let mut padded = vec![0u8; mod_len];
    let start = mod_len - min(output.len(), mod_len);
    padded[start..].copy_from_slice(&output[output.len() - (mod_len - start)..]);
    Ok(PrecompileOutput::new(gas_used, padded.into()))
}

fn modexp(base: &[u8], exponent: &[u8], modulus: &[u8]) -> Vec<u8> {
    let modulus = BigUint::from_bytes_be(modulus);
    if modulus.bits() == 0 {
        return Vec::new();
    }
    let base = BigUint::from_bytes_be(base);
    let exponent = BigUint::from_bytes_be(exponent);
    base.modpow(&exponent, &modulus).to_bytes_be()
}

fn byzantium_gas_calc(base_len: u64, exp_len: u64, mod_len: u64, exp_highp: &U256) -> u64 {
    // EIP-198 multiplication complexity
    fn mult_complexity(x: u64) -> u128 {
        let x = x as u128;
        if x <= 64 {
            x * x
        } else if x <= 1024 {
            x * x / 4 + 96 * x - 3072
        } else {
            x * x / 16 + 480 * x - 199_680
        }
    }

    let mul = mult_complexity(max(base_len, mod_len));
    let iterations = calculate_iteration_count(exp_len, exp_highp) as u128;
    let gas = mul.saturating_mul(iterations) / 20;
    u64::try_from(gas).unwrap_or(u64::MAX)
}

fn berlin_gas_calc(base_len: u64, exp_len: u64, mod_len: u64, exp_highp: &U256) -> u64 {
    // EIP-2565 multiplication complexity
    let words = max(base_len, mod_len).div_ceil(8) as u128;
    let mul = words * words;
    let iterations = calculate_iteration_count(exp_len, exp_highp) as u128;
    let gas = mul.saturating_mul(iterations) / 3;
    u64::try_from(gas).unwrap_or(u64::MAX)
}
