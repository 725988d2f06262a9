//! BLS12-381 precompiles (EIP-2537): addresses, gas schedule and input
//! validation.
//!
//! No curve backend is wired in; every operation validates its input (so the
//! length and padding errors of the public taxonomy are produced exactly as
//! a full implementation would) and then reports the backend as
//! unavailable. Swapping in a pairing library only requires replacing the
//! tail of each `run_*` function.

use crate::{
    u64_to_address, PrecompileError, PrecompileResult, PrecompileWithAddress,
};

/// Serialized, padded G1 point length.
pub const PADDED_G1_LENGTH: usize = 128;
/// Serialized, padded G2 point length.
pub const PADDED_G2_LENGTH: usize = 256;
/// Padded field element length.
pub const PADDED_FP_LENGTH: usize = 64;
/// Scalar length.
pub const SCALAR_LENGTH: usize = 32;
/// One pairing input element: a G1 and a G2 point.
pub const PAIRING_INPUT_LENGTH: usize = PADDED_G1_LENGTH + PADDED_G2_LENGTH;

pub const G1_ADD_BASE_GAS_FEE: u64 = 375;
pub const G1_MSM_BASE_GAS_FEE: u64 = 12_000;
pub const G2_ADD_BASE_GAS_FEE: u64 = 600;
pub const G2_MSM_BASE_GAS_FEE: u64 = 22_500;
pub const PAIRING_BASE_GAS_FEE: u64 = 37_700;
pub const PAIRING_PER_PAIR_GAS_FEE: u64 = 32_600;
pub const MAP_FP_TO_G1_BASE_GAS_FEE: u64 = 5_500;
pub const MAP_FP2_TO_G2_BASE_GAS_FEE: u64 = 23_800;

pub const G1_ADD: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(0x0b), g1_add);
pub const G1_MSM: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(0x0c), g1_msm);
pub const G2_ADD: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(0x0d), g2_add);
pub const G2_MSM: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(0x0e), g2_msm);
pub const PAIRING: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(0x0f), pairing);
pub const MAP_FP_TO_G1: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(0x10), map_fp_to_g1);
pub const MAP_FP2_TO_G2: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(0x11), map_fp2_to_g2);

/// The full EIP-2537 set.
pub fn precompiles() -> impl IntoIterator<Item = PrecompileWithAddress> {
    [
        G1_ADD,
        G1_MSM,
        G2_ADD,
        G2_MSM,
        PAIRING,
        MAP_FP_TO_G1,
        MAP_FP2_TO_G2,
    ]
}

/// Padded field elements must lead with 16 zero bytes.
fn check_padding(element: &[u8]) -> Result<(), PrecompileError> {
    if element.len() != PADDED_FP_LENGTH {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    if !element[..16].iter().all(|b| *b == 0) {
        return Err(PrecompileError::BlsPaddingInvalid);
    }
    Ok(())
}

fn check_g1(point: &[u8]) -> Result<(), PrecompileError> {
    if point.len() != PADDED_G1_LENGTH {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    check_padding(&point[..PADDED_FP_LENGTH])?;
    check_padding(&point[PADDED_FP_LENGTH..])
}

fn check_g2(point: &[u8]) -> Result<(), PrecompileError> {
    if point.len() != PADDED_G2_LENGTH {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    for element in point.chunks(PADDED_FP_LENGTH) {
        check_padding(element)?;
    }
    Ok(())
}

fn backend_unavailable(gas_used: u64, gas_limit: u64) -> PrecompileResult {
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    Err(PrecompileError::BlsBackendUnavailable)
}

pub fn g1_add(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if input.len() != 2 * PADDED_G1_LENGTH {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    check_g1(&input[..PADDED_G1_LENGTH])?;
    check_g1(&input[PADDED_G1_LENGTH..])?;
    backend_unavailable(G1_ADD_BASE_GAS_FEE, gas_limit)
}

pub fn g1_msm(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let pair_len = PADDED_G1_LENGTH + SCALAR_LENGTH;
    if input.is_empty() || input.len() % pair_len != 0 {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    for pair in input.chunks(pair_len) {
        check_g1(&pair[..PADDED_G1_LENGTH])?;
    }
    backend_unavailable(G1_MSM_BASE_GAS_FEE, gas_limit)
}

pub fn g2_add(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if input.len() != 2 * PADDED_G2_LENGTH {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    check_g2(&input[..PADDED_G2_LENGTH])?;
    check_g2(&input[PADDED_G2_LENGTH..])?;
    backend_unavailable(G2_ADD_BASE_GAS_FEE, gas_limit)
}

pub fn g2_msm(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let pair_len = PADDED_G2_LENGTH + SCALAR_LENGTH;
    if input.is_empty() || input.len() % pair_len != 0 {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    for pair in input.chunks(pair_len) {
        check_g2(&pair[..PADDED_G2_LENGTH])?;
    }
    backend_unavailable(G2_MSM_BASE_GAS_FEE, gas_limit)
}

pub fn pairing(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if input.is_empty() || input.len() % PAIRING_INPUT_LENGTH != 0 {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    let pairs = (input.len() / PAIRING_INPUT_LENGTH) as u64;
    for pair in input.chunks(PAIRING_INPUT_LENGTH) {
        check_g1(&pair[..PADDED_G1_LENGTH])?;
        check_g2(&pair[PADDED_G1_LENGTH..])?;
    }
    backend_unavailable(
        PAIRING_BASE_GAS_FEE + pairs * PAIRING_PER_PAIR_GAS_FEE,
        gas_limit,
    )
}

pub fn map_fp_to_g1(input: &[u8], gas_limit: u64) -> PrecompileResult {
    check_padding(input)?;
    backend_unavailable(MAP_FP_TO_G1_BASE_GAS_FEE, gas_limit)
}

pub fn map_fp2_to_g2(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if input.len() != 2 * PADDED_FP_LENGTH {
        return Err(PrecompileError::BlsInputWrongLength);
    }
    check_padding(&input[..PADDED_FP_LENGTH])?;
    check_padding(&input[PADDED_FP_LENGTH..])?;
    backend_unavailable(MAP_FP2_TO_G2_BASE_GAS_FEE, gas_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_length_is_reported() {
        assert_eq!(
            g1_add(&[0u8; 100], 1_000_000),
            Err(PrecompileError::BlsInputWrongLength)
        );
    }

    #[test]
    fn bad_padding_is_reported() {
        let mut input = [0u8; 2 * PADDED_G1_LENGTH];
        input[0] = 1;
        assert_eq!(
            g1_add(&input, 1_000_000),
            Err(PrecompileError::BlsPaddingInvalid)
        );
    }

    #[test]
    fn valid_input_reports_missing_backend() {
        let input = [0u8; 2 * PADDED_G1_LENGTH];
        assert_eq!(
            g1_add(&input, 1_000_000),
            Err(PrecompileError::BlsBackendUnavailable)
        );
    }
}
