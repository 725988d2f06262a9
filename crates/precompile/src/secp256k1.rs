//! `ecrecover` precompile at address 0x01, backed by the pure-Rust `k256`
//! implementation.
//!
//! Input: `[32-byte message hash][32-byte v][64-byte signature]`.
//! Output: the recovered address, left-padded to 32 bytes, or empty on any
//! recovery failure (failures are not errors for this precompile).

use crate::{
    u64_to_address, utilities::right_pad, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use ember_primitives::{keccak256, Bytes};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

/// `ecrecover` precompile, containing address and function to run.
pub const ECRECOVER: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(1), ec_recover_run);

const ECRECOVER_BASE: u64 = 3_000;

pub fn ec_recover_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if ECRECOVER_BASE > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let input = right_pad::<128>(input);

    // `v` must be a 32-byte big-endian integer equal to 27 or 28.
    if !(input[32..63].iter().all(|&b| b == 0) && matches!(input[63], 27 | 28)) {
        return Ok(PrecompileOutput::new(ECRECOVER_BASE, Bytes::new()));
    }

    let msg: [u8; 32] = input[0..32].try_into().expect("slice of 32");
    let recid = input[63] - 27;
    let sig: [u8; 64] = input[64..128].try_into().expect("slice of 64");

    let out = match ecrecover(&sig, recid, &msg) {
        Some(address) => Bytes::copy_from_slice(&address),
        None => Bytes::new(),
    };
    Ok(PrecompileOutput::new(ECRECOVER_BASE, out))
}

/// Recovers the signing address, left-padded into a 32-byte word.
fn ecrecover(sig: &[u8; 64], recid: u8, msg: &[u8; 32]) -> Option<[u8; 32]> {
    let recid = RecoveryId::from_byte(recid)?;
    let mut signature = Signature::from_slice(sig).ok()?;
    // high-s signatures must be normalized for k256, with the recovery bit
    // flipped accordingly
    let recid = if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        RecoveryId::from_byte(recid.to_byte() ^ 1)?
    } else {
        recid
    };

    let key = VerifyingKey::recover_from_prehash(msg, &signature, recid).ok()?;
    let public = key.to_encoded_point(false);
    let hash = keccak256(&public.as_bytes()[1..]);

    let mut out = [0u8; 32];
    out[12..].copy_from_slice(&hash[12..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::hex;

    #[test]
    fn recovers_known_address() {
        // vector from the go-ethereum ecrecover precompile tests
        let input = hex!(
            "38d18acb67d25c8bb9942764b62f18e17054f66a817bd4295423adf9ed98873e"
            "000000000000000000000000000000000000000000000000000000000000001b"
            "38d18acb67d25c8bb9942764b62f18e17054f66a817bd4295423adf9ed98873e"
            "789d1dd423d25f0772d2748d60f7e4b81bb14d086eba8e8e8efb6dcff8a4ae02"
        );
        let expected = hex!("000000000000000000000000ceaccac640adf55b2028469bd36ba501f28b699d");
        let out = ec_recover_run(&input, 5000).unwrap();
        assert_eq!(out.bytes.as_ref(), expected);
    }

    #[test]
    fn invalid_v_returns_empty() {
        let mut input = [0u8; 128];
        input[63] = 29;
        let out = ec_recover_run(&input, 5000).unwrap();
        assert!(out.bytes.is_empty());
        assert_eq!(out.gas_used, 3000);
    }

    #[test]
    fn oog_below_base() {
        assert_eq!(
            ec_recover_run(&[], 2999),
            Err(PrecompileError::OutOfGas)
        );
    }
}
