//! alt_bn128 curve precompiles (EIP-196, EIP-197), repriced by EIP-1108.

use crate::{
    u64_to_address, utilities::right_pad_vec, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use bn::{AffineG1, AffineG2, Fq, Fq2, Group, Gt, G1, G2};
use ember_primitives::Bytes;

pub mod add {
    use super::*;

    pub const ADDRESS: u64 = 6;

    /// Byzantium G1 addition at address 0x06.
    pub const BYZANTIUM: PrecompileWithAddress =
        PrecompileWithAddress(u64_to_address(ADDRESS), |input, gas_limit| {
            run_add(input, 500, gas_limit)
        });

    /// EIP-1108 repriced G1 addition.
    pub const ISTANBUL: PrecompileWithAddress =
        PrecompileWithAddress(u64_to_address(ADDRESS), |input, gas_limit| {
            run_add(input, 150, gas_limit)
        });
}

pub mod mul {
    use super::*;

    pub const ADDRESS: u64 = 7;

    /// Byzantium G1 scalar multiplication at address 0x07.
    pub const BYZANTIUM: PrecompileWithAddress =
        PrecompileWithAddress(u64_to_address(ADDRESS), |input, gas_limit| {
            run_mul(input, 40_000, gas_limit)
        });

    /// EIP-1108 repriced G1 scalar multiplication.
    pub const ISTANBUL: PrecompileWithAddress =
        PrecompileWithAddress(u64_to_address(ADDRESS), |input, gas_limit| {
            run_mul(input, 6_000, gas_limit)
        });
}

pub mod pair {
    use super::*;

    pub const ADDRESS: u64 = 8;

    /// Byzantium pairing check at address 0x08.
    pub const BYZANTIUM: PrecompileWithAddress =
        PrecompileWithAddress(u64_to_address(ADDRESS), |input, gas_limit| {
            run_pair(input, 80_000, 100_000, gas_limit)
        });

    /// EIP-1108 repriced pairing check.
    pub const ISTANBUL: PrecompileWithAddress =
        PrecompileWithAddress(u64_to_address(ADDRESS), |input, gas_limit| {
            run_pair(input, 34_000, 45_000, gas_limit)
        });
}

/// Length of a serialized G1 point.
const G1_LEN: usize = 64;
/// Length of one pairing-check element (G1 + G2 point).
const PAIR_ELEMENT_LEN: usize = 192;

/// Reads an Fq field element from 32 big-endian bytes.
fn read_fq(input: &[u8]) -> Result<Fq, PrecompileError> {
    Fq::from_slice(&input[..32]).map_err(|_| PrecompileError::Bn128FieldPointNotAMember)
}

/// Reads an affine G1 point from 64 bytes; (0, 0) is the point at infinity.
fn read_point(input: &[u8]) -> Result<G1, PrecompileError> {
    let px = read_fq(&input[0..32])?;
    let py = read_fq(&input[32..64])?;
    new_g1_point(px, py)
}

fn new_g1_point(px: Fq, py: Fq) -> Result<G1, PrecompileError> {
    if px == Fq::zero() && py == Fq::zero() {
        Ok(G1::zero())
    } else {
        AffineG1::new(px, py)
            .map(Into::into)
            .map_err(|_| PrecompileError::Bn128AffineGFailedToCreate)
    }
}

fn g1_to_bytes(point: G1) -> [u8; 64] {
    let mut out = [0u8; 64];
    if let Some(affine) = AffineG1::from_jacobian(point) {
        affine
            .x()
            .to_big_endian(&mut out[..32])
            .expect("32-byte buffer");
        affine
            .y()
            .to_big_endian(&mut out[32..])
            .expect("32-byte buffer");
    }
    out
}

fn run_add(input: &[u8], gas_cost: u64, gas_limit: u64) -> PrecompileResult {
    if gas_cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let input = right_pad_vec(input, 2 * G1_LEN);

    let p1 = read_point(&input[..G1_LEN])?;
    let p2 = read_point(&input[G1_LEN..])?;

    Ok(PrecompileOutput::new(
        gas_cost,
        Bytes::copy_from_slice(&g1_to_bytes(p1 + p2)),
    ))
}

fn run_mul(input: &[u8], gas_cost: u64, gas_limit: u64) -> PrecompileResult {
    if gas_cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let input = right_pad_vec(input, G1_LEN + 32);

    let point = read_point(&input[..G1_LEN])?;
    let fr = bn::Fr::from_slice(&input[G1_LEN..G1_LEN + 32])
        .map_err(|_| PrecompileError::Bn128FieldPointNotAMember)?;

    Ok(PrecompileOutput::new(
        gas_cost,
        Bytes::copy_from_slice(&g1_to_bytes(point * fr)),
    ))
}

fn run_pair(
    input: &[u8],
    pair_per_point_cost: u64,
    pair_base_cost: u64,
    gas_limit: u64,
) -> PrecompileResult {
    let gas_used =
        (input.len() / PAIR_ELEMENT_LEN) as u64 * pair_per_point_cost + pair_base_cost;
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    if input.len() % PAIR_ELEMENT_LEN != 0 {
        return Err(PrecompileError::Bn128PairLength);
    }

    let success = if input.is_empty() {
        true
    } else {
        let elements = input.len() / PAIR_ELEMENT_LEN;
        let mut mul = Gt::one();
        for idx in 0..elements {
            let slice = &input[idx * PAIR_ELEMENT_LEN..(idx + 1) * PAIR_ELEMENT_LEN];
            let a_x = read_fq(&slice[0..32])?;
            let a_y = read_fq(&slice[32..64])?;
            // G2 coordinates arrive with the imaginary part first
            let b_a_y = read_fq(&slice[64..96])?;
            let b_a_x = read_fq(&slice[96..128])?;
            let b_b_y = read_fq(&slice[128..160])?;
            let b_b_x = read_fq(&slice[160..192])?;

            let b_a = Fq2::new(b_a_x, b_a_y);
            let b_b = Fq2::new(b_b_x, b_b_y);
            let b = if b_a.is_zero() && b_b.is_zero() {
                G2::zero()
            } else {
                G2::from(
                    AffineG2::new(b_a, b_b)
                        .map_err(|_| PrecompileError::Bn128AffineGFailedToCreate)?,
                )
            };
            let a = new_g1_point(a_x, a_y)?;
            mul = mul * bn::pairing(a, b);
        }
        mul == Gt::one()
    };

    let mut out = [0u8; 32];
    out[31] = success as u8;
    Ok(PrecompileOutput::new(gas_used, Bytes::copy_from_slice(&out)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::hex;

    #[test]
    fn add_identity() {
        // adding the point at infinity to itself
        let out = (add::ISTANBUL.1)(&[0u8; 128], 150).unwrap();
        assert_eq!(out.bytes.as_ref(), [0u8; 64]);
        assert_eq!(out.gas_used, 150);
    }

    #[test]
    fn add_known_vector() {
        // generator + generator, from the EIP-196 test vectors
        let input = hex!(
            "0000000000000000000000000000000000000000000000000000000000000001"
            "0000000000000000000000000000000000000000000000000000000000000002"
            "0000000000000000000000000000000000000000000000000000000000000001"
            "0000000000000000000000000000000000000000000000000000000000000002"
        );
        let expected = hex!(
            "030644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd3"
            "15ed738c0e0a7c92e7845f96b2ae9c0a68a6a449e3538fc7ff3ebf7a5a18a2c4"
        );
        let out = (add::ISTANBUL.1)(&input, 150).unwrap();
        assert_eq!(out.bytes.as_ref(), expected);
    }

    #[test]
    fn point_not_on_curve_is_rejected() {
        let mut input = [0u8; 128];
        input[31] = 1; // x = 1, y = 0 is not on the curve
        assert_eq!(
            (add::ISTANBUL.1)(&input, 150),
            Err(PrecompileError::Bn128AffineGFailedToCreate)
        );
    }

    #[test]
    fn empty_pairing_is_true() {
        let out = (pair::ISTANBUL.1)(&[], 50_000).unwrap();
        assert_eq!(out.bytes[31], 1);
        assert_eq!(out.gas_used, 45_000);
    }

    #[test]
    fn ragged_pairing_input_is_error() {
        assert_eq!(
            (pair::ISTANBUL.1)(&[0u8; 191], 200_000),
            Err(PrecompileError::Bn128PairLength)
        );
    }
}
