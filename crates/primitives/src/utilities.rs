use alloy_primitives::{keccak256, Address, B256};

/// Address of a contract created with CREATE: `keccak(rlp([caller, nonce]))[12..]`.
pub fn create_address(caller: Address, nonce: u64) -> Address {
    use alloy_rlp::Encodable;
    let mut payload = Vec::with_capacity(29);
    caller.encode(&mut payload);
    nonce.encode(&mut payload);
    let mut out = Vec::with_capacity(payload.len() + 1);
    alloy_rlp::Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(&payload);
    Address::from_word(keccak256(&out))
}

/// Address of a contract created with CREATE2:
/// `keccak(0xff ++ caller ++ salt ++ keccak(init_code))[12..]`.
pub fn create2_address(caller: Address, init_code_hash: B256, salt: B256) -> Address {
    let mut buf = [0u8; 85];
    buf[0] = 0xff;
    buf[1..21].copy_from_slice(caller.as_slice());
    buf[21..53].copy_from_slice(salt.as_slice());
    buf[53..85].copy_from_slice(init_code_hash.as_slice());
    Address::from_word(keccak256(buf))
}
