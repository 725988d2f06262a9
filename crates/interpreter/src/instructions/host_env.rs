use super::utility::address_into_u256;
use crate::{Host, Interpreter};
use ember_primitives::{BLOCK_HASH_HISTORY, B256, U256};

/// EIP-1344: ChainID opcode
pub fn chainid(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, U256::from(host.env().cfg.chain_id));
}

pub fn coinbase(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, address_into_u256(host.env().block.coinbase));
}

pub fn timestamp(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, host.env().block.timestamp);
}

pub fn number(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, host.env().block.number);
}

/// DIFFICULTY before the merge, PREVRANDAO (EIP-4399) after.
pub fn difficulty(interpreter: &mut Interpreter, host: &mut dyn Host) {
    let block = &host.env().block;
    let value = match block.prevrandao {
        Some(randao) => randao.into(),
        None => block.difficulty,
    };
    push!(interpreter, value);
}

pub fn gaslimit(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, host.env().block.gas_limit);
}

pub fn gasprice(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, host.env().tx.gas_price);
}

/// EIP-3198: BASEFEE opcode
pub fn basefee(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, host.env().block.basefee);
}

pub fn origin(interpreter: &mut Interpreter, host: &mut dyn Host) {
    push!(interpreter, address_into_u256(host.env().tx.origin));
}

/// Hash of one of the 256 most recent blocks; zero outside that window.
pub fn blockhash(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, number);
    let block_number = host.env().block.number;
    let hash = match block_number.checked_sub(number) {
        Some(diff) if !diff.is_zero() && diff <= U256::from(BLOCK_HASH_HISTORY) => {
            host.block_hash(number)
        }
        _ => B256::ZERO,
    };
    push_b256!(interpreter, hash);
}
