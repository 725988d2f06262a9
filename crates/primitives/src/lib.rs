//! # ember-primitives
//!
//! Primitive types shared by every Ember crate: 256-bit words, addresses,
//! hardfork identifiers, execution logs and receipt blooms.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod bloom;
mod constants;
pub mod env;
pub mod hardfork;
mod log;
mod utilities;

pub use alloy_primitives::{
    self, address, b256, bytes, fixed_bytes, hex, keccak256, uint, Address, Bytes, B256, U256,
};
pub use bloom::{Bloom, BLOOM_BITS, BLOOM_SIZE};
pub use constants::*;
pub use env::{BlockEnv, CfgEnv, Env, TxEnv};
pub use hardfork::{ChainRules, SpecId};
pub use log::Log;
pub use utilities::{create2_address, create_address};

/// Map/set types used across the workspace.
pub use std::collections::{HashMap, HashSet};
