use alloy_primitives::{b256, B256};

/// Interpreter stack limit.
pub const STACK_LIMIT: usize = 1024;

/// Maximum call depth.
pub const CALL_STACK_LIMIT: usize = 1024;

/// EIP-170: Contract code size limit.
///
/// By default the limit is `0x6000` (~25kb).
pub const MAX_CODE_SIZE: usize = 0x6000;

/// EIP-3860: Limit and meter initcode.
///
/// Limit of maximum initcode size is `2 * MAX_CODE_SIZE`.
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;

/// Number of blocks the BLOCKHASH opcode can look back.
pub const BLOCK_HASH_HISTORY: u64 = 256;

/// Keccak-256 hash of the empty byte sequence.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
