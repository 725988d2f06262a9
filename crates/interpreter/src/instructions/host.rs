use super::utility::{address_into_u256, as_usize, into_address};
use crate::{
    gas::{self, constants as g},
    return_ok, return_revert,
    CallContext, CallInputs, CallScheme, CreateInputs, CreateScheme, Host, InstructionResult,
    Interpreter, Transfer,
};
use core::cmp::min;
use ember_primitives::{
    hardfork::{LONDON, SHANGHAI, SPURIOUS_DRAGON, TANGERINE},
    Bytes, Log, B256, U256,
};

pub fn balance_gas(interpreter: &mut Interpreter, host: &mut dyn Host, base: u64) -> Option<u64> {
    let address = into_address(interpreter.stack.peek(0).ok()?);
    let (is_cold, _) = host.load_account(address);
    Some(base + gas::account_access_cost(interpreter.rules, is_cold))
}

pub fn balance(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, address);
    let (balance, _) = host.balance(into_address(address));
    push!(interpreter, balance);
}

/// EIP-1884: SELFBALANCE
pub fn selfbalance(interpreter: &mut Interpreter, host: &mut dyn Host) {
    let (balance, _) = host.balance(interpreter.contract.address);
    push!(interpreter, balance);
}

pub fn extcodesize_gas(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    let address = into_address(interpreter.stack.peek(0).ok()?);
    let (is_cold, _) = host.load_account(address);
    Some(base + gas::account_access_cost(interpreter.rules, is_cold))
}

pub fn extcodesize(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, address);
    let (code, _) = host.code(into_address(address));
    push!(interpreter, U256::from(code.len()));
}

/// EIP-1052: EXTCODEHASH
pub fn extcodehash_gas(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    let address = into_address(interpreter.stack.peek(0).ok()?);
    let (is_cold, _) = host.load_account(address);
    Some(base + gas::account_access_cost(interpreter.rules, is_cold))
}

pub fn extcodehash(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, address);
    let (hash, _) = host.code_hash(into_address(address));
    push_b256!(interpreter, hash);
}

pub fn extcodecopy_gas(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    let address = into_address(interpreter.stack.peek(0).ok()?);
    let memory_offset = interpreter.stack.peek(1).ok()?;
    let len = as_usize(interpreter.stack.peek(3).ok()?)?;
    let (is_cold, _) = host.load_account(address);
    base.checked_add(gas::account_access_cost(interpreter.rules, is_cold))?
        .checked_add(gas::COPY.checked_mul(gas::num_words(len as u64))?)?
        .checked_add(interpreter.memory_expansion_cost(memory_offset, len)?)
}

pub fn extcodecopy(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, address, memory_offset, code_offset, len);
    let len = as_usize_or_fail!(interpreter, len);
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let code_offset = as_usize_saturated!(code_offset);
    resize_memory!(interpreter, memory_offset, len);
    let (code, _) = host.code(into_address(address));
    interpreter
        .memory
        .set_data(memory_offset, code_offset, len, &code);
}

pub fn sload_gas(interpreter: &mut Interpreter, host: &mut dyn Host, base: u64) -> Option<u64> {
    let index = interpreter.stack.peek(0).ok()?;
    let address = interpreter.contract.address;
    let (_, is_cold) = host.sload(address, index);
    if interpreter.rules.has_access_lists() {
        Some(gas::sload_cost(interpreter.rules, is_cold))
    } else {
        Some(base)
    }
}

pub fn sload(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, index);
    let (value, _) = host.sload(interpreter.contract.address, index);
    push!(interpreter, value);
}

pub fn sstore_gas(interpreter: &mut Interpreter, host: &mut dyn Host, _base: u64) -> Option<u64> {
    let index = interpreter.stack.peek(0).ok()?;
    let new = interpreter.stack.peek(1).ok()?;
    let address = interpreter.contract.address;
    let (present, is_cold) = host.sload(address, index);
    let original = host.original_storage(address, index);
    let rules = interpreter.rules;
    let cost = gas::sstore_cost(
        rules,
        original,
        present,
        new,
        interpreter.gas.remaining(),
        is_cold,
    )?;
    interpreter
        .gas
        .record_refund(gas::sstore_refund(rules, original, present, new));
    Some(cost)
}

pub fn sstore(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, index, value);
    host.sstore(interpreter.contract.address, index, value);
}

/// EIP-1153: transient storage read.
pub fn tload(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, index);
    let value = host.tload(interpreter.contract.address, index);
    push!(interpreter, value);
}

/// EIP-1153: transient storage write.
pub fn tstore(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, index, value);
    host.tstore(interpreter.contract.address, index, value);
}

pub fn log_gas<const N: u8>(
    interpreter: &mut Interpreter,
    _host: &mut dyn Host,
    _base: u64,
) -> Option<u64> {
    let offset = interpreter.stack.peek(0).ok()?;
    let len = as_usize(interpreter.stack.peek(1).ok()?)?;
    gas::log_cost(N, len as u64)?
        .checked_add(interpreter.memory_expansion_cost(offset, len)?)
}

pub fn log<const N: u8>(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, offset, len);
    let len = as_usize_or_fail!(interpreter, len);
    let data = if len == 0 {
        Bytes::new()
    } else {
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        Bytes::copy_from_slice(interpreter.memory.slice(offset, len))
    };

    let mut topics = Vec::with_capacity(N as usize);
    for _ in 0..N {
        pop!(interpreter, topic);
        topics.push(B256::from(topic));
    }

    host.log(Log::new(interpreter.contract.address, topics, data));
}

pub fn selfdestruct_gas(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    let target = into_address(interpreter.stack.peek(0).ok()?);
    let rules = interpreter.rules;
    let (is_cold, exists) = host.load_account(target);

    let mut cost = base;
    // account top-up charge for sweeping balance into a dead account
    let should_charge_topup = if rules.is_enabled(SPURIOUS_DRAGON) {
        let (balance, _) = host.balance(interpreter.contract.address);
        !exists && !balance.is_zero()
    } else {
        rules.is_enabled(TANGERINE) && !exists
    };
    if should_charge_topup {
        cost += g::NEWACCOUNT;
    }
    cost += gas::account_access_cost(rules, is_cold);
    Some(cost)
}

pub fn selfdestruct(interpreter: &mut Interpreter, host: &mut dyn Host) {
    pop!(interpreter, target);
    let result = host.selfdestruct(interpreter.contract.address, into_address(target));
    // EIP-3529 removed the refund
    if !interpreter.rules.is_enabled(LONDON) && !result.previously_destroyed {
        interpreter.gas.record_refund(g::SELFDESTRUCT_REFUND);
    }
    interpreter.instruction_result = InstructionResult::SelfDestruct;
}

/// Gas left after EIP-150 keeps one 64th at home.
#[inline]
fn all_but_one_64th(gas: u64) -> u64 {
    gas - gas / 64
}

pub fn create_gas<const IS_CREATE2: bool>(
    interpreter: &mut Interpreter,
    _host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    let offset = interpreter.stack.peek(1).ok()?;
    let len = as_usize(interpreter.stack.peek(2).ok()?)?;
    let rules = interpreter.rules;

    let mut cost = base;
    // EIP-3860: limit and meter initcode
    if rules.is_enabled(SHANGHAI) {
        if len > ember_primitives::MAX_INITCODE_SIZE {
            interpreter.instruction_result = InstructionResult::CreateInitCodeSizeLimit;
            return None;
        }
        cost = cost.checked_add(gas::initcode_cost(len))?;
    }
    if IS_CREATE2 {
        cost = cost.checked_add(gas::create2_surcharge(len)?)?;
    }
    cost = cost.checked_add(interpreter.memory_expansion_cost(offset, len)?)?;

    // EIP-150: forward all but one 64th of what remains after the charge
    let after_charge = interpreter.gas.remaining().checked_sub(cost)?;
    let gas_limit = if rules.has_eip150_gas_forwarding() {
        all_but_one_64th(after_charge)
    } else {
        after_charge
    };
    interpreter.next_call_gas = gas_limit;
    cost.checked_add(gas_limit)
}

pub fn create<const IS_CREATE2: bool>(interpreter: &mut Interpreter, host: &mut dyn Host) {
    interpreter.return_data_buffer = Bytes::new();

    pop!(interpreter, value, code_offset, len);
    let len = as_usize_or_fail!(interpreter, len);

    let mut init_code = Bytes::new();
    if len != 0 {
        let code_offset = as_usize_or_fail!(interpreter, code_offset);
        resize_memory!(interpreter, code_offset, len);
        init_code = Bytes::copy_from_slice(interpreter.memory.slice(code_offset, len));
    }

    let scheme = if IS_CREATE2 {
        pop!(interpreter, salt);
        CreateScheme::Create2 {
            salt: B256::from(salt),
        }
    } else {
        CreateScheme::Create
    };

    let outcome = host.create(CreateInputs {
        caller: interpreter.contract.address,
        scheme,
        value,
        init_code,
        gas_limit: interpreter.next_call_gas,
    });

    match outcome.result {
        return_ok!() => {
            interpreter.gas.erase_cost(outcome.gas.remaining());
            interpreter.gas.record_refund(outcome.gas.refunded());
            push!(
                interpreter,
                address_into_u256(outcome.address.unwrap_or_default())
            );
        }
        return_revert!() => {
            interpreter.gas.erase_cost(outcome.gas.remaining());
            interpreter.gas.record_refund(outcome.gas.refunded());
            interpreter.return_data_buffer = outcome.output;
            push!(interpreter, U256::ZERO);
        }
        InstructionResult::FatalExternalError => {
            interpreter.instruction_result = InstructionResult::FatalExternalError;
        }
        _ => {
            push!(interpreter, U256::ZERO);
        }
    }
}

fn call_gas_inner(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    base: u64,
    scheme: CallScheme,
) -> Option<u64> {
    let local_gas_limit = interpreter.stack.peek(0).ok()?;
    let to = into_address(interpreter.stack.peek(1).ok()?);
    let value = match scheme {
        CallScheme::Call | CallScheme::CallCode => interpreter.stack.peek(2).ok()?,
        CallScheme::DelegateCall | CallScheme::StaticCall => U256::ZERO,
    };
    let arg_base = match scheme {
        CallScheme::Call | CallScheme::CallCode => 3,
        CallScheme::DelegateCall | CallScheme::StaticCall => 2,
    };
    let in_offset = interpreter.stack.peek(arg_base).ok()?;
    let in_len = as_usize(interpreter.stack.peek(arg_base + 1).ok()?)?;
    let out_offset = interpreter.stack.peek(arg_base + 2).ok()?;
    let out_len = as_usize(interpreter.stack.peek(arg_base + 3).ok()?)?;

    let rules = interpreter.rules;
    let mut cost = base;
    cost = cost.checked_add(interpreter.memory_expansion_cost(in_offset, in_len)?)?;
    cost = cost.checked_add(interpreter.memory_expansion_cost(out_offset, out_len)?)?;

    let (is_cold, exists) = host.load_account(to);
    cost = cost.checked_add(gas::call_cost(
        rules,
        !value.is_zero(),
        is_cold,
        !exists,
        matches!(scheme, CallScheme::Call | CallScheme::CallCode),
        matches!(scheme, CallScheme::Call | CallScheme::StaticCall),
    ))?;

    // EIP-150: cap the forwarded gas at all-but-one-64th of what is left
    let after_charge = interpreter.gas.remaining().checked_sub(cost)?;
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);
    let mut gas_limit = if rules.has_eip150_gas_forwarding() {
        min(all_but_one_64th(after_charge), local_gas_limit)
    } else {
        local_gas_limit
    };
    let charge = cost.checked_add(gas_limit)?;

    // value-bearing calls hand the callee a free stipend
    if !value.is_zero() {
        gas_limit = gas_limit.saturating_add(g::CALL_STIPEND);
    }
    interpreter.next_call_gas = gas_limit;
    Some(charge)
}

pub fn call_gas(interpreter: &mut Interpreter, host: &mut dyn Host, base: u64) -> Option<u64> {
    call_gas_inner(interpreter, host, base, CallScheme::Call)
}

pub fn callcode_gas(interpreter: &mut Interpreter, host: &mut dyn Host, base: u64) -> Option<u64> {
    call_gas_inner(interpreter, host, base, CallScheme::CallCode)
}

pub fn delegatecall_gas(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    call_gas_inner(interpreter, host, base, CallScheme::DelegateCall)
}

pub fn staticcall_gas(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    base: u64,
) -> Option<u64> {
    call_gas_inner(interpreter, host, base, CallScheme::StaticCall)
}

pub fn call(interpreter: &mut Interpreter, host: &mut dyn Host) {
    call_inner(interpreter, host, CallScheme::Call);
}

pub fn call_code(interpreter: &mut Interpreter, host: &mut dyn Host) {
    call_inner(interpreter, host, CallScheme::CallCode);
}

/// EIP-7: DELEGATECALL
pub fn delegate_call(interpreter: &mut Interpreter, host: &mut dyn Host) {
    call_inner(interpreter, host, CallScheme::DelegateCall);
}

/// EIP-214: STATICCALL
pub fn static_call(interpreter: &mut Interpreter, host: &mut dyn Host) {
    call_inner(interpreter, host, CallScheme::StaticCall);
}

fn call_inner(interpreter: &mut Interpreter, host: &mut dyn Host, scheme: CallScheme) {
    interpreter.return_data_buffer = Bytes::new();

    pop!(interpreter, _local_gas_limit, to);
    let to = into_address(to);

    let value = match scheme {
        CallScheme::Call | CallScheme::CallCode => {
            pop!(interpreter, value);
            value
        }
        CallScheme::DelegateCall | CallScheme::StaticCall => U256::ZERO,
    };

    // a value-bearing CALL is the one state mutation the table flags cannot
    // catch statically
    if scheme == CallScheme::Call && interpreter.is_static && !value.is_zero() {
        interpreter.instruction_result = InstructionResult::CallNotAllowedInsideStatic;
        return;
    }

    pop!(interpreter, in_offset, in_len, out_offset, out_len);

    let in_len = as_usize_or_fail!(interpreter, in_len);
    let input = if in_len != 0 {
        let in_offset = as_usize_or_fail!(interpreter, in_offset);
        resize_memory!(interpreter, in_offset, in_len);
        Bytes::copy_from_slice(interpreter.memory.slice(in_offset, in_len))
    } else {
        Bytes::new()
    };

    let out_len = as_usize_or_fail!(interpreter, out_len);
    let out_offset = if out_len != 0 {
        let out_offset = as_usize_or_fail!(interpreter, out_offset);
        resize_memory!(interpreter, out_offset, out_len);
        out_offset
    } else {
        0
    };

    let context = match scheme {
        CallScheme::Call | CallScheme::StaticCall => CallContext {
            address: to,
            caller: interpreter.contract.address,
            code_address: to,
            apparent_value: value,
            scheme,
        },
        CallScheme::CallCode => CallContext {
            address: interpreter.contract.address,
            caller: interpreter.contract.address,
            code_address: to,
            apparent_value: value,
            scheme,
        },
        CallScheme::DelegateCall => CallContext {
            address: interpreter.contract.address,
            caller: interpreter.contract.caller,
            code_address: to,
            apparent_value: interpreter.contract.value,
            scheme,
        },
    };

    let transfer = match scheme {
        CallScheme::Call => Transfer {
            source: interpreter.contract.address,
            target: to,
            value,
        },
        CallScheme::CallCode => Transfer {
            source: interpreter.contract.address,
            target: interpreter.contract.address,
            value,
        },
        // no transfer for delegate and static frames
        CallScheme::DelegateCall | CallScheme::StaticCall => Transfer {
            source: interpreter.contract.address,
            target: interpreter.contract.address,
            value: U256::ZERO,
        },
    };

    let outcome = host.call(CallInputs {
        contract: to,
        transfer,
        input,
        gas_limit: interpreter.next_call_gas,
        context,
        is_static: interpreter.is_static || scheme == CallScheme::StaticCall,
    });
    interpreter.return_data_buffer = outcome.output;
    let target_len = min(out_len, interpreter.return_data_buffer.len());

    match outcome.result {
        return_ok!() => {
            interpreter.gas.erase_cost(outcome.gas.remaining());
            interpreter.gas.record_refund(outcome.gas.refunded());
            let data = interpreter.return_data_buffer.clone();
            interpreter.memory.set(out_offset, &data[..target_len]);
            push!(interpreter, U256::from(1));
        }
        return_revert!() => {
            interpreter.gas.erase_cost(outcome.gas.remaining());
            let data = interpreter.return_data_buffer.clone();
            interpreter.memory.set(out_offset, &data[..target_len]);
            push!(interpreter, U256::ZERO);
        }
        InstructionResult::FatalExternalError => {
            interpreter.instruction_result = InstructionResult::FatalExternalError;
        }
        _ => {
            push!(interpreter, U256::ZERO);
        }
    }
}
