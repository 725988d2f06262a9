use crate::{
    calc_linear_cost_u32, u64_to_address, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use ripemd::Digest as _;
use sha2::Digest as _;

/// SHA-256 precompile at address 0x02.
pub const SHA256: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(2), sha256_run);

/// RIPEMD-160 precompile at address 0x03.
pub const RIPEMD160: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(3), ripemd160_run);

/// `60 + 12·words` per the yellow paper.
pub fn sha256_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let cost = calc_linear_cost_u32(input.len(), 60, 12);
    if cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let output = sha2::Sha256::digest(input);
    Ok(PrecompileOutput::new(cost, output.to_vec().into()))
}

/// `600 + 120·words`; the 20-byte digest is left-padded to 32 bytes.
pub fn ripemd160_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let gas_used = calc_linear_cost_u32(input.len(), 600, 120);
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let mut hasher = ripemd::Ripemd160::new();
    hasher.update(input);
    let mut output = [0u8; 32];
    output[12..].copy_from_slice(&hasher.finalize());
    Ok(PrecompileOutput::new(gas_used, output.to_vec().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::hex;

    #[test]
    fn sha256_of_empty() {
        let out = sha256_run(&[], 100).unwrap();
        assert_eq!(out.gas_used, 60);
        assert_eq!(
            out.bytes.as_ref(),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn ripemd160_is_left_padded() {
        let out = ripemd160_run(&[], 1000).unwrap();
        assert_eq!(out.gas_used, 600);
        assert_eq!(&out.bytes[..12], &[0u8; 12]);
        assert_eq!(
            &out.bytes[12..],
            hex!("9c1185a5c5e9fc54612808977ee8f548b2258d31")
        );
    }

    #[test]
    fn oog_when_limit_too_low() {
        assert_eq!(sha256_run(&[], 59), Err(PrecompileError::OutOfGas));
    }
}
