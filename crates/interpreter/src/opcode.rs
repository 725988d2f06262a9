//! Opcode descriptors and the dispatch table.
//!
//! The default table for a hardfork is built by a pure constructor and
//! shared behind an `Arc`; it is never mutated. Every EVM carries its own
//! overlay of custom entries consulted before the defaults, so deleting or
//! overriding an opcode in one instance can never leak into another.

use crate::{
    gas::{self, constants as g},
    instructions::{arithmetic, bitwise, control, host, host_env, memory, stack, system},
    Host, Interpreter,
};
use ember_primitives::{
    hardfork::{
        BYZANTIUM, CANCUN, CONSTANTINOPLE, HOMESTEAD, ISTANBUL, LONDON, MERGE, SHANGHAI,
    },
    ChainRules, HashMap, STACK_LIMIT,
};
use std::borrow::Cow;
use std::sync::Arc;

// Opcode bytes referenced outside the table.
pub const JUMPDEST: u8 = 0x5b;
pub const PUSH1: u8 = 0x60;
pub const PUSH32: u8 = 0x7f;

/// Plain gas function: returns the total charge for the step (base fee
/// included), or `None` for out-of-gas.
pub type GasFn = fn(&mut Interpreter, &mut dyn Host, u64) -> Option<u64>;

/// Plain logic function: mutates the frame and may stage a halt in
/// `instruction_result`.
pub type LogicFn = fn(&mut Interpreter, &mut dyn Host);

/// Shareable gas function, the form stored in descriptors. Custom opcodes
/// may capture state; defaults are wrapped plain functions.
pub type DynGasFn = Arc<dyn Fn(&mut Interpreter, &mut dyn Host, u64) -> Option<u64> + Send + Sync>;

/// Shareable logic function, the form stored in descriptors.
pub type DynLogicFn = Arc<dyn Fn(&mut Interpreter, &mut dyn Host) + Send + Sync>;

/// Everything the dispatch loop needs to know about one opcode.
#[derive(Clone)]
pub struct OpcodeDescriptor {
    /// Mnemonic, surfaced in step events.
    pub name: Cow<'static, str>,
    /// Static part of the gas charge, handed to the gas function.
    pub base_fee: u64,
    /// Minimum stack depth required before execution.
    pub min_stack: u16,
    /// Maximum stack depth allowed before execution.
    pub max_stack: u16,
    /// Whether the opcode writes state and is therefore rejected in static
    /// frames.
    pub modifies_state: bool,
    /// Computes the total charge for the step.
    pub gas: DynGasFn,
    /// Executes the opcode.
    pub logic: DynLogicFn,
}

impl core::fmt::Debug for OpcodeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpcodeDescriptor")
            .field("name", &self.name)
            .field("base_fee", &self.base_fee)
            .field("min_stack", &self.min_stack)
            .field("max_stack", &self.max_stack)
            .field("modifies_state", &self.modifies_state)
            .finish_non_exhaustive()
    }
}

/// Maximum stack height an opcode with the given arity may observe.
#[inline]
const fn max_stack_for(inputs: u16, outputs: u16) -> u16 {
    STACK_LIMIT as u16 - outputs.saturating_sub(inputs)
}

impl OpcodeDescriptor {
    /// Descriptor for a built-in opcode.
    fn plain(
        name: &'static str,
        base_fee: u64,
        inputs: u16,
        outputs: u16,
        gas: GasFn,
        logic: LogicFn,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            base_fee,
            min_stack: inputs,
            max_stack: max_stack_for(inputs, outputs),
            modifies_state: false,
            gas: Arc::new(gas),
            logic: Arc::new(logic),
        }
    }

    /// Starts a custom descriptor. Gas defaults to the base fee, logic to a
    /// no-op, stack bounds to "anything".
    pub fn custom(name: impl Into<Cow<'static, str>>, base_fee: u64) -> Self {
        Self {
            name: name.into(),
            base_fee,
            min_stack: 0,
            max_stack: STACK_LIMIT as u16,
            modifies_state: false,
            gas: Arc::new(|_: &mut Interpreter, _: &mut dyn Host, base: u64| Some(base)),
            logic: Arc::new(|_: &mut Interpreter, _: &mut dyn Host| {}),
        }
    }

    /// Declares the stack arity (operands consumed, values produced).
    pub fn with_stack(mut self, inputs: u16, outputs: u16) -> Self {
        self.min_stack = inputs;
        self.max_stack = max_stack_for(inputs, outputs);
        self
    }

    /// Installs a gas function. It receives the base fee and returns the
    /// total charge.
    pub fn with_gas(
        mut self,
        gas: impl Fn(&mut Interpreter, &mut dyn Host, u64) -> Option<u64> + Send + Sync + 'static,
    ) -> Self {
        self.gas = Arc::new(gas);
        self
    }

    /// Installs the logic function.
    pub fn with_logic(
        mut self,
        logic: impl Fn(&mut Interpreter, &mut dyn Host) + Send + Sync + 'static,
    ) -> Self {
        self.logic = Arc::new(logic);
        self
    }

    /// Marks the opcode as state-mutating, rejecting it in static frames.
    pub fn writes_state(mut self) -> Self {
        self.modifies_state = true;
        self
    }
}

/// One overlay entry: an opcode with a descriptor overrides the slot, an
/// opcode alone deletes it.
#[derive(Clone, Debug)]
pub struct CustomOpcode {
    pub opcode: u8,
    pub descriptor: Option<OpcodeDescriptor>,
}

impl CustomOpcode {
    /// Entry that removes the opcode from the table; dispatching it yields
    /// `invalid opcode`.
    pub fn delete(opcode: u8) -> Self {
        Self {
            opcode,
            descriptor: None,
        }
    }

    /// Entry that installs or replaces the opcode.
    pub fn install(opcode: u8, descriptor: OpcodeDescriptor) -> Self {
        Self {
            opcode,
            descriptor: Some(descriptor),
        }
    }
}

type DefaultTable = [Option<OpcodeDescriptor>; 256];

/// Dispatch table: immutable per-hardfork defaults plus a per-EVM overlay.
///
/// Lookup order is `overlay.get(op).unwrap_or(defaults[op])`; an overlay
/// slot holding `None` shadows the default and dispatches as an invalid
/// opcode.
#[derive(Clone, Debug)]
pub struct OpcodeTable {
    defaults: Arc<DefaultTable>,
    overlay: HashMap<u8, Option<OpcodeDescriptor>>,
}

impl OpcodeTable {
    /// Default table for the given rules, no overlay.
    pub fn new(rules: ChainRules) -> Self {
        Self {
            defaults: Arc::new(make_default_table(rules)),
            overlay: HashMap::new(),
        }
    }

    /// Default table with the given overlay applied in order: later entries
    /// for the same opcode win.
    pub fn with_overlay(rules: ChainRules, custom: &[CustomOpcode]) -> Self {
        let mut table = Self::new(rules);
        for entry in custom {
            table
                .overlay
                .insert(entry.opcode, entry.descriptor.clone());
        }
        table
    }

    /// Resolves an opcode. `None` means undefined or deleted.
    #[inline]
    pub fn get(&self, opcode: u8) -> Option<&OpcodeDescriptor> {
        match self.overlay.get(&opcode) {
            Some(slot) => slot.as_ref(),
            None => self.defaults[opcode as usize].as_ref(),
        }
    }

    /// Resolved mnemonic of an opcode, if defined.
    pub fn name(&self, opcode: u8) -> Option<&str> {
        self.get(opcode).map(|descriptor| descriptor.name.as_ref())
    }
}

fn constant_gas(_interp: &mut Interpreter, _host: &mut dyn Host, base: u64) -> Option<u64> {
    Some(base)
}

/// Builds the default descriptor table for a hardfork. Pure; the result is
/// wrapped in an `Arc` and never mutated afterwards.
#[rustfmt::skip]
fn make_default_table(rules: ChainRules) -> DefaultTable {
    let mut t: DefaultTable = core::array::from_fn(|_| None);

    macro_rules! op {
        ($code:expr, $name:literal, $fee:expr, $in_:expr, $out:expr, $logic:expr) => {
            t[$code as usize] = Some(OpcodeDescriptor::plain($name, $fee, $in_, $out, constant_gas, $logic));
        };
        ($code:expr, $name:literal, $fee:expr, $in_:expr, $out:expr, $gas:expr, $logic:expr) => {
            t[$code as usize] = Some(OpcodeDescriptor::plain($name, $fee, $in_, $out, $gas, $logic));
        };
    }
    macro_rules! op_w {
        ($code:expr, $name:literal, $fee:expr, $in_:expr, $out:expr, $gas:expr, $logic:expr) => {
            t[$code as usize] = Some(
                OpcodeDescriptor::plain($name, $fee, $in_, $out, $gas, $logic).writes_state(),
            );
        };
    }

    op!(0x00, "STOP", g::ZERO, 0, 0, control::stop);
    op!(0x01, "ADD", g::VERYLOW, 2, 1, arithmetic::add);
    op!(0x02, "MUL", g::LOW, 2, 1, arithmetic::mul);
    op!(0x03, "SUB", g::VERYLOW, 2, 1, arithmetic::sub);
    op!(0x04, "DIV", g::LOW, 2, 1, arithmetic::div);
    op!(0x05, "SDIV", g::LOW, 2, 1, arithmetic::sdiv);
    op!(0x06, "MOD", g::LOW, 2, 1, arithmetic::rem);
    op!(0x07, "SMOD", g::LOW, 2, 1, arithmetic::smod);
    op!(0x08, "ADDMOD", g::MID, 3, 1, arithmetic::addmod);
    op!(0x09, "MULMOD", g::MID, 3, 1, arithmetic::mulmod);
    op!(0x0a, "EXP", g::EXP, 2, 1, arithmetic::exp_gas, arithmetic::exp);
    op!(0x0b, "SIGNEXTEND", g::LOW, 2, 1, arithmetic::signextend);

    op!(0x10, "LT", g::VERYLOW, 2, 1, bitwise::lt);
    op!(0x11, "GT", g::VERYLOW, 2, 1, bitwise::gt);
    op!(0x12, "SLT", g::VERYLOW, 2, 1, bitwise::slt);
    op!(0x13, "SGT", g::VERYLOW, 2, 1, bitwise::sgt);
    op!(0x14, "EQ", g::VERYLOW, 2, 1, bitwise::eq);
    op!(0x15, "ISZERO", g::VERYLOW, 1, 1, bitwise::iszero);
    op!(0x16, "AND", g::VERYLOW, 2, 1, bitwise::bitand);
    op!(0x17, "OR", g::VERYLOW, 2, 1, bitwise::bitor);
    op!(0x18, "XOR", g::VERYLOW, 2, 1, bitwise::bitxor);
    op!(0x19, "NOT", g::VERYLOW, 1, 1, bitwise::not);
    op!(0x1a, "BYTE", g::VERYLOW, 2, 1, bitwise::byte);
    if rules.is_enabled(CONSTANTINOPLE) {
        // EIP-145: Bitwise shifting instructions
        op!(0x1b, "SHL", g::VERYLOW, 2, 1, bitwise::shl);
        op!(0x1c, "SHR", g::VERYLOW, 2, 1, bitwise::shr);
        op!(0x1d, "SAR", g::VERYLOW, 2, 1, bitwise::sar);
    }

    op!(0x20, "KECCAK256", g::KECCAK256, 2, 1, system::keccak256_gas, system::keccak256);

    op!(0x30, "ADDRESS", g::BASE, 0, 1, system::address);
    op!(0x31, "BALANCE", gas::balance_base(rules), 1, 1, host::balance_gas, host::balance);
    op!(0x32, "ORIGIN", g::BASE, 0, 1, host_env::origin);
    op!(0x33, "CALLER", g::BASE, 0, 1, system::caller);
    op!(0x34, "CALLVALUE", g::BASE, 0, 1, system::callvalue);
    op!(0x35, "CALLDATALOAD", g::VERYLOW, 1, 1, system::calldataload);
    op!(0x36, "CALLDATASIZE", g::BASE, 0, 1, system::calldatasize);
    op!(0x37, "CALLDATACOPY", g::VERYLOW, 3, 0, system::calldatacopy_gas, system::calldatacopy);
    op!(0x38, "CODESIZE", g::BASE, 0, 1, system::codesize);
    op!(0x39, "CODECOPY", g::VERYLOW, 3, 0, system::codecopy_gas, system::codecopy);
    op!(0x3a, "GASPRICE", g::BASE, 0, 1, host_env::gasprice);
    op!(0x3b, "EXTCODESIZE", gas::extcode_base(rules), 1, 1, host::extcodesize_gas, host::extcodesize);
    op!(0x3c, "EXTCODECOPY", gas::extcode_base(rules), 4, 0, host::extcodecopy_gas, host::extcodecopy);
    if rules.is_enabled(BYZANTIUM) {
        // EIP-211: RETURNDATASIZE and RETURNDATACOPY
        op!(0x3d, "RETURNDATASIZE", g::BASE, 0, 1, system::returndatasize);
        op!(0x3e, "RETURNDATACOPY", g::VERYLOW, 3, 0, system::returndatacopy_gas, system::returndatacopy);
    }
    if rules.is_enabled(CONSTANTINOPLE) {
        // EIP-1052: EXTCODEHASH
        op!(0x3f, "EXTCODEHASH", gas::extcodehash_base(rules), 1, 1, host::extcodehash_gas, host::extcodehash);
    }

    op!(0x40, "BLOCKHASH", g::BLOCKHASH, 1, 1, host_env::blockhash);
    op!(0x41, "COINBASE", g::BASE, 0, 1, host_env::coinbase);
    op!(0x42, "TIMESTAMP", g::BASE, 0, 1, host_env::timestamp);
    op!(0x43, "NUMBER", g::BASE, 0, 1, host_env::number);
    if rules.is_enabled(MERGE) {
        // EIP-4399: DIFFICULTY repurposed as PREVRANDAO
        op!(0x44, "PREVRANDAO", g::BASE, 0, 1, host_env::difficulty);
    } else {
        op!(0x44, "DIFFICULTY", g::BASE, 0, 1, host_env::difficulty);
    }
    op!(0x45, "GASLIMIT", g::BASE, 0, 1, host_env::gaslimit);
    if rules.is_enabled(ISTANBUL) {
        // EIP-1344: ChainID opcode
        op!(0x46, "CHAINID", g::BASE, 0, 1, host_env::chainid);
        // EIP-1884: SELFBALANCE
        op!(0x47, "SELFBALANCE", g::LOW, 0, 1, host::selfbalance);
    }
    if rules.is_enabled(LONDON) {
        // EIP-3198: BASEFEE opcode
        op!(0x48, "BASEFEE", g::BASE, 0, 1, host_env::basefee);
    }

    op!(0x50, "POP", g::BASE, 1, 0, stack::pop);
    op!(0x51, "MLOAD", g::VERYLOW, 1, 1, memory::mload_gas, memory::mload);
    op!(0x52, "MSTORE", g::VERYLOW, 2, 0, memory::mstore_gas, memory::mstore);
    op!(0x53, "MSTORE8", g::VERYLOW, 2, 0, memory::mstore8_gas, memory::mstore8);
    op!(0x54, "SLOAD", gas::sload_base(rules), 1, 1, host::sload_gas, host::sload);
    op_w!(0x55, "SSTORE", g::ZERO, 2, 0, host::sstore_gas, host::sstore);
    op!(0x56, "JUMP", g::MID, 1, 0, control::jump);
    op!(0x57, "JUMPI", g::HIGH, 2, 0, control::jumpi);
    op!(0x58, "PC", g::BASE, 0, 1, control::pc);
    op!(0x59, "MSIZE", g::BASE, 0, 1, memory::msize);
    op!(0x5a, "GAS", g::BASE, 0, 1, system::gas);
    op!(0x5b, "JUMPDEST", g::JUMPDEST, 0, 0, control::jumpdest);
    if rules.is_enabled(CANCUN) {
        // EIP-1153: Transient storage opcodes
        op!(0x5c, "TLOAD", g::TRANSIENT_STORAGE_COST, 1, 1, host::tload);
        op_w!(0x5d, "TSTORE", g::TRANSIENT_STORAGE_COST, 2, 0, constant_gas, host::tstore);
        // EIP-5656: MCOPY
        op!(0x5e, "MCOPY", g::VERYLOW, 3, 0, memory::mcopy_gas, memory::mcopy);
    }
    if rules.is_enabled(SHANGHAI) {
        // EIP-3855: PUSH0
        op!(0x5f, "PUSH0", g::BASE, 0, 1, stack::push0);
    }

    op!(0x60, "PUSH1", g::VERYLOW, 0, 1, stack::push::<1>);
    op!(0x61, "PUSH2", g::VERYLOW, 0, 1, stack::push::<2>);
    op!(0x62, "PUSH3", g::VERYLOW, 0, 1, stack::push::<3>);
    op!(0x63, "PUSH4", g::VERYLOW, 0, 1, stack::push::<4>);
    op!(0x64, "PUSH5", g::VERYLOW, 0, 1, stack::push::<5>);
    op!(0x65, "PUSH6", g::VERYLOW, 0, 1, stack::push::<6>);
    op!(0x66, "PUSH7", g::VERYLOW, 0, 1, stack::push::<7>);
    op!(0x67, "PUSH8", g::VERYLOW, 0, 1, stack::push::<8>);
    op!(0x68, "PUSH9", g::VERYLOW, 0, 1, stack::push::<9>);
    op!(0x69, "PUSH10", g::VERYLOW, 0, 1, stack::push::<10>);
    op!(0x6a, "PUSH11", g::VERYLOW, 0, 1, stack::push::<11>);
    op!(0x6b, "PUSH12", g::VERYLOW, 0, 1, stack::push::<12>);
    op!(0x6c, "PUSH13", g::VERYLOW, 0, 1, stack::push::<13>);
    op!(0x6d, "PUSH14", g::VERYLOW, 0, 1, stack::push::<14>);
    op!(0x6e, "PUSH15", g::VERYLOW, 0, 1, stack::push::<15>);
    op!(0x6f, "PUSH16", g::VERYLOW, 0, 1, stack::push::<16>);
    op!(0x70, "PUSH17", g::VERYLOW, 0, 1, stack::push::<17>);
    op!(0x71, "PUSH18", g::VERYLOW, 0, 1, stack::push::<18>);
    op!(0x72, "PUSH19", g::VERYLOW, 0, 1, stack::push::<19>);
    op!(0x73, "PUSH20", g::VERYLOW, 0, 1, stack::push::<20>);
    op!(0x74, "PUSH21", g::VERYLOW, 0, 1, stack::push::<21>);
    op!(0x75, "PUSH22", g::VERYLOW, 0, 1, stack::push::<22>);
    op!(0x76, "PUSH23", g::VERYLOW, 0, 1, stack::push::<23>);
    op!(0x77, "PUSH24", g::VERYLOW, 0, 1, stack::push::<24>);
    op!(0x78, "PUSH25", g::VERYLOW, 0, 1, stack::push::<25>);
    op!(0x79, "PUSH26", g::VERYLOW, 0, 1, stack::push::<26>);
    op!(0x7a, "PUSH27", g::VERYLOW, 0, 1, stack::push::<27>);
    op!(0x7b, "PUSH28", g::VERYLOW, 0, 1, stack::push::<28>);
    op!(0x7c, "PUSH29", g::VERYLOW, 0, 1, stack::push::<29>);
    op!(0x7d, "PUSH30", g::VERYLOW, 0, 1, stack::push::<30>);
    op!(0x7e, "PUSH31", g::VERYLOW, 0, 1, stack::push::<31>);
    op!(0x7f, "PUSH32", g::VERYLOW, 0, 1, stack::push::<32>);

    op!(0x80, "DUP1", g::VERYLOW, 1, 2, stack::dup::<1>);
    op!(0x81, "DUP2", g::VERYLOW, 2, 3, stack::dup::<2>);
    op!(0x82, "DUP3", g::VERYLOW, 3, 4, stack::dup::<3>);
    op!(0x83, "DUP4", g::VERYLOW, 4, 5, stack::dup::<4>);
    op!(0x84, "DUP5", g::VERYLOW, 5, 6, stack::dup::<5>);
    op!(0x85, "DUP6", g::VERYLOW, 6, 7, stack::dup::<6>);
    op!(0x86, "DUP7", g::VERYLOW, 7, 8, stack::dup::<7>);
    op!(0x87, "DUP8", g::VERYLOW, 8, 9, stack::dup::<8>);
    op!(0x88, "DUP9", g::VERYLOW, 9, 10, stack::dup::<9>);
    op!(0x89, "DUP10", g::VERYLOW, 10, 11, stack::dup::<10>);
    op!(0x8a, "DUP11", g::VERYLOW, 11, 12, stack::dup::<11>);
    op!(0x8b, "DUP12", g::VERYLOW, 12, 13, stack::dup::<12>);
    op!(0x8c, "DUP13", g::VERYLOW, 13, 14, stack::dup::<13>);
    op!(0x8d, "DUP14", g::VERYLOW, 14, 15, stack::dup::<14>);
    op!(0x8e, "DUP15", g::VERYLOW, 15, 16, stack::dup::<15>);
    op!(0x8f, "DUP16", g::VERYLOW, 16, 17, stack::dup::<16>);

    op!(0x90, "SWAP1", g::VERYLOW, 2, 2, stack::swap::<1>);
    op!(0x91, "SWAP2", g::VERYLOW, 3, 3, stack::swap::<2>);
    op!(0x92, "SWAP3", g::VERYLOW, 4, 4, stack::swap::<3>);
    op!(0x93, "SWAP4", g::VERYLOW, 5, 5, stack::swap::<4>);
    op!(0x94, "SWAP5", g::VERYLOW, 6, 6, stack::swap::<5>);
    op!(0x95, "SWAP6", g::VERYLOW, 7, 7, stack::swap::<6>);
    op!(0x96, "SWAP7", g::VERYLOW, 8, 8, stack::swap::<7>);
    op!(0x97, "SWAP8", g::VERYLOW, 9, 9, stack::swap::<8>);
    op!(0x98, "SWAP9", g::VERYLOW, 10, 10, stack::swap::<9>);
    op!(0x99, "SWAP10", g::VERYLOW, 11, 11, stack::swap::<10>);
    op!(0x9a, "SWAP11", g::VERYLOW, 12, 12, stack::swap::<11>);
    op!(0x9b, "SWAP12", g::VERYLOW, 13, 13, stack::swap::<12>);
    op!(0x9c, "SWAP13", g::VERYLOW, 14, 14, stack::swap::<13>);
    op!(0x9d, "SWAP14", g::VERYLOW, 15, 15, stack::swap::<14>);
    op!(0x9e, "SWAP15", g::VERYLOW, 16, 16, stack::swap::<15>);
    op!(0x9f, "SWAP16", g::VERYLOW, 17, 17, stack::swap::<16>);

    op_w!(0xa0, "LOG0", g::LOG, 2, 0, host::log_gas::<0>, host::log::<0>);
    op_w!(0xa1, "LOG1", g::LOG, 3, 0, host::log_gas::<1>, host::log::<1>);
    op_w!(0xa2, "LOG2", g::LOG, 4, 0, host::log_gas::<2>, host::log::<2>);
    op_w!(0xa3, "LOG3", g::LOG, 5, 0, host::log_gas::<3>, host::log::<3>);
    op_w!(0xa4, "LOG4", g::LOG, 6, 0, host::log_gas::<4>, host::log::<4>);

    op_w!(0xf0, "CREATE", g::CREATE, 3, 1, host::create_gas::<false>, host::create::<false>);
    op!(0xf1, "CALL", gas::call_base(rules), 7, 1, host::call_gas, host::call);
    op!(0xf2, "CALLCODE", gas::call_base(rules), 7, 1, host::callcode_gas, host::call_code);
    op!(0xf3, "RETURN", g::ZERO, 2, 0, control::ret_gas, control::ret);
    if rules.is_enabled(HOMESTEAD) {
        // EIP-7: DELEGATECALL
        op!(0xf4, "DELEGATECALL", gas::call_base(rules), 6, 1, host::delegatecall_gas, host::delegate_call);
    }
    if rules.is_enabled(CONSTANTINOPLE) {
        // EIP-1014: CREATE2
        op_w!(0xf5, "CREATE2", g::CREATE, 4, 1, host::create_gas::<true>, host::create::<true>);
    }
    if rules.is_enabled(BYZANTIUM) {
        // EIP-214: STATICCALL
        op!(0xfa, "STATICCALL", gas::call_base(rules), 6, 1, host::staticcall_gas, host::static_call);
        // EIP-140: REVERT
        op!(0xfd, "REVERT", g::ZERO, 2, 0, control::revert_gas, control::revert);
    }
    op!(0xfe, "INVALID", g::ZERO, 0, 0, control::invalid);
    op_w!(0xff, "SELFDESTRUCT", gas::selfdestruct_base(rules), 1, 0, host::selfdestruct_gas, host::selfdestruct);

    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::SpecId;

    fn rules(spec: SpecId) -> ChainRules {
        ChainRules::new(spec)
    }

    #[test]
    fn fork_gating() {
        let frontier = OpcodeTable::new(rules(SpecId::FRONTIER));
        assert!(frontier.get(0x1b).is_none()); // SHL
        assert!(frontier.get(0xf4).is_none()); // DELEGATECALL
        assert!(frontier.get(0xfd).is_none()); // REVERT

        let latest = OpcodeTable::new(rules(SpecId::LATEST));
        assert!(latest.get(0x1b).is_some());
        assert!(latest.get(0x5f).is_some()); // PUSH0
        assert!(latest.get(0x5e).is_some()); // MCOPY
        assert_eq!(latest.name(0x44), Some("PREVRANDAO"));

        let london = OpcodeTable::new(rules(SpecId::LONDON));
        assert_eq!(london.name(0x44), Some("DIFFICULTY"));
    }

    #[test]
    fn overlay_deletes_and_overrides_without_touching_defaults() {
        let custom = [
            CustomOpcode::delete(0x01),
            CustomOpcode::install(
                0x21,
                OpcodeDescriptor::custom("TEST", 333).with_stack(0, 1),
            ),
        ];
        let modified = OpcodeTable::with_overlay(rules(SpecId::LATEST), &custom);
        assert!(modified.get(0x01).is_none());
        assert_eq!(modified.name(0x21), Some("TEST"));

        // a fresh default table is unaffected
        let pristine = OpcodeTable::new(rules(SpecId::LATEST));
        assert_eq!(pristine.name(0x01), Some("ADD"));
        assert!(pristine.get(0x21).is_none());
    }

    #[test]
    fn later_overlay_entries_win() {
        let custom = [
            CustomOpcode::install(0x20, OpcodeDescriptor::custom("FIRST", 1)),
            CustomOpcode::delete(0x20),
        ];
        let table = OpcodeTable::with_overlay(rules(SpecId::LATEST), &custom);
        assert!(table.get(0x20).is_none());
    }

    #[test]
    fn stack_bounds_are_derived_from_arity() {
        let table = OpcodeTable::new(rules(SpecId::LATEST));
        let add = table.get(0x01).unwrap();
        assert_eq!(add.min_stack, 2);
        assert_eq!(add.max_stack, STACK_LIMIT as u16);
        let push1 = table.get(0x60).unwrap();
        assert_eq!(push1.min_stack, 0);
        assert_eq!(push1.max_stack, STACK_LIMIT as u16 - 1);
    }
}
