//! Precompile result, output and error types.

use core::fmt;
use ember_primitives::Bytes;

/// A precompile: input bytes and a gas limit in, gas used and output bytes
/// out.
pub type PrecompileFn = fn(&[u8], u64) -> PrecompileResult;

/// Result of a precompile call.
pub type PrecompileResult = Result<PrecompileOutput, PrecompileError>;

/// Successful precompile execution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrecompileOutput {
    /// Gas consumed, never above the provided limit.
    pub gas_used: u64,
    /// Output bytes.
    pub bytes: Bytes,
}

impl PrecompileOutput {
    /// Returns a new output with the given gas used and bytes.
    pub fn new(gas_used: u64, bytes: Bytes) -> Self {
        Self { gas_used, bytes }
    }
}

/// Failure modes of a precompile call. All of them consume the gas the
/// caller forwarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrecompileError {
    /// The computed cost exceeds the forwarded gas.
    OutOfGas,
    // blake2
    Blake2WrongLength,
    Blake2WrongFinalIndicatorFlag,
    // modexp
    ModexpExpOverflow,
    ModexpBaseOverflow,
    ModexpModOverflow,
    // bn128
    Bn128FieldPointNotAMember,
    Bn128AffineGFailedToCreate,
    Bn128PairLength,
    // BLS12-381
    BlsInputWrongLength,
    BlsPaddingInvalid,
    BlsBackendUnavailable,
    /// Catch-all for backend-specific failures.
    Other(String),
}

impl PrecompileError {
    /// Stable error string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::OutOfGas => "out of gas",
            Self::Blake2WrongLength => "wrong input length for blake2 F",
            Self::Blake2WrongFinalIndicatorFlag => "invalid final flag for blake2 F",
            Self::ModexpExpOverflow => "modexp exponent length overflow",
            Self::ModexpBaseOverflow => "modexp base length overflow",
            Self::ModexpModOverflow => "modexp modulus length overflow",
            Self::Bn128FieldPointNotAMember => "bn128 point not a field member",
            Self::Bn128AffineGFailedToCreate => "bn128 point not on curve",
            Self::Bn128PairLength => "bn128 pairing input length invalid",
            Self::BlsInputWrongLength => "BLS12-381 input has wrong length",
            Self::BlsPaddingInvalid => "BLS12-381 field element padding invalid",
            Self::BlsBackendUnavailable => "BLS12-381 backend not available",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for PrecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for PrecompileError {}
