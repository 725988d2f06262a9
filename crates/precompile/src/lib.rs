//! # ember-precompile
//!
//! Implementations of the EVM precompiled contracts, grouped into cached
//! per-hardfork activation sets.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod blake2;
pub mod bls12_381;
pub mod bn128;
pub mod hash;
pub mod identity;
mod interface;
pub mod modexp;
pub mod secp256k1;
pub mod utilities;

pub use interface::{PrecompileError, PrecompileFn, PrecompileOutput, PrecompileResult};

use ember_primitives::{Address, HashMap, HashSet, SpecId};
use once_cell::sync::OnceCell;

/// Linear cost model shared by several precompiles:
/// `base + word·ceil(len/32)`.
pub fn calc_linear_cost_u32(len: usize, base: u64, word: u64) -> u64 {
    (len as u64).div_ceil(32) * word + base
}

/// A precompile bound to its fixed address.
#[derive(Clone, Copy, Debug)]
pub struct PrecompileWithAddress(pub Address, pub PrecompileFn);

impl PrecompileWithAddress {
    /// Address the precompile lives at.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.0
    }

    /// The native function.
    #[inline]
    pub fn precompile(&self) -> &PrecompileFn {
        &self.1
    }
}

impl From<(Address, PrecompileFn)> for PrecompileWithAddress {
    fn from(value: (Address, PrecompileFn)) -> Self {
        Self(value.0, value.1)
    }
}

/// The set of precompiles active for some hardfork.
#[derive(Clone, Debug, Default)]
pub struct Precompiles {
    inner: HashMap<Address, PrecompileFn>,
    addresses: HashSet<Address>,
}

impl Precompiles {
    /// Returns the precompile set for the given spec.
    pub fn new(spec: PrecompileSpecId) -> &'static Self {
        match spec {
            PrecompileSpecId::HOMESTEAD => Self::homestead(),
            PrecompileSpecId::BYZANTIUM => Self::byzantium(),
            PrecompileSpecId::ISTANBUL => Self::istanbul(),
            PrecompileSpecId::BERLIN => Self::berlin(),
            PrecompileSpecId::LATEST => Self::latest(),
        }
    }

    /// Precompiles for the Homestead spec.
    pub fn homestead() -> &'static Self {
        static INSTANCE: OnceCell<Precompiles> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Precompiles::default();
            precompiles.extend([
                secp256k1::ECRECOVER,
                hash::SHA256,
                hash::RIPEMD160,
                identity::FUN,
            ]);
            precompiles
        })
    }

    /// Precompiles for the Byzantium spec.
    pub fn byzantium() -> &'static Self {
        static INSTANCE: OnceCell<Precompiles> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::homestead().clone();
            precompiles.extend([
                // EIP-196 / EIP-197: alt_bn128 addition, multiplication, pairing
                bn128::add::BYZANTIUM,
                bn128::mul::BYZANTIUM,
                bn128::pair::BYZANTIUM,
                // EIP-198: big integer modular exponentiation
                modexp::BYZANTIUM,
            ]);
            precompiles
        })
    }

    /// Precompiles for the Istanbul spec.
    pub fn istanbul() -> &'static Self {
        static INSTANCE: OnceCell<Precompiles> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::byzantium().clone();
            precompiles.extend([
                // EIP-1108: reduced alt_bn128 gas costs
                bn128::add::ISTANBUL,
                bn128::mul::ISTANBUL,
                bn128::pair::ISTANBUL,
                // EIP-152: BLAKE2 compression function F
                blake2::FUN,
            ]);
            precompiles
        })
    }

    /// Precompiles for the Berlin spec.
    pub fn berlin() -> &'static Self {
        static INSTANCE: OnceCell<Precompiles> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::istanbul().clone();
            precompiles.extend([
                // EIP-2565: repriced modexp
                modexp::BERLIN,
            ]);
            precompiles
        })
    }

    /// Precompiles for the latest spec.
    pub fn latest() -> &'static Self {
        static INSTANCE: OnceCell<Precompiles> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::berlin().clone();
            // BLS12-381 (EIP-2537): explicit not-supported stubs until a
            // curve backend is wired in; inputs are still validated so the
            // error taxonomy is exercised.
            precompiles.extend(bls12_381::precompiles());
            precompiles
        })
    }

    /// Iterator over the active addresses.
    #[inline]
    pub fn addresses(&self) -> impl ExactSizeIterator<Item = &Address> {
        self.inner.keys()
    }

    /// Whether the given address hosts a precompile.
    #[inline]
    pub fn contains(&self, address: &Address) -> bool {
        self.inner.contains_key(address)
    }

    /// The precompile at `address`, if any.
    #[inline]
    pub fn get(&self, address: &Address) -> Option<&PrecompileFn> {
        self.inner.get(address)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of precompiles in the set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// The active addresses as a set.
    pub fn addresses_set(&self) -> &HashSet<Address> {
        &self.addresses
    }

    /// Extends the set; entries with an existing address overwrite it.
    #[inline]
    pub fn extend(&mut self, other: impl IntoIterator<Item = PrecompileWithAddress>) {
        let items: Vec<PrecompileWithAddress> = other.into_iter().collect();
        self.addresses.extend(items.iter().map(|p| *p.address()));
        self.inner.extend(items.into_iter().map(|p| (p.0, p.1)));
    }

    /// Removes the precompile at `address`, leaving an ordinary empty-code
    /// account behind.
    pub fn remove(&mut self, address: &Address) {
        self.inner.remove(address);
        self.addresses.remove(address);
    }
}

/// The precompile-relevant subset of hardforks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[allow(non_camel_case_types)]
pub enum PrecompileSpecId {
    HOMESTEAD,
    BYZANTIUM,
    ISTANBUL,
    BERLIN,
    LATEST,
}

impl PrecompileSpecId {
    /// Maps a full [`SpecId`] to the precompile spec it activates.
    pub const fn from_spec_id(spec_id: SpecId) -> Self {
        use SpecId::*;
        match spec_id {
            FRONTIER | FRONTIER_THAWING | HOMESTEAD | DAO_FORK | TANGERINE | SPURIOUS_DRAGON => {
                Self::HOMESTEAD
            }
            BYZANTIUM | CONSTANTINOPLE | PETERSBURG => Self::BYZANTIUM,
            ISTANBUL | MUIR_GLACIER => Self::ISTANBUL,
            BERLIN | LONDON | ARROW_GLACIER | GRAY_GLACIER | MERGE | SHANGHAI | CANCUN => {
                Self::BERLIN
            }
            LATEST => Self::LATEST,
        }
    }
}

impl From<SpecId> for PrecompileSpecId {
    fn from(spec_id: SpecId) -> Self {
        Self::from_spec_id(spec_id)
    }
}

/// Builds a precompile address from its conventional low integer.
#[inline]
pub const fn u64_to_address(x: u64) -> Address {
    let x = x.to_be_bytes();
    Address::new([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_sizes_grow_with_forks() {
        assert_eq!(Precompiles::homestead().len(), 4);
        assert_eq!(Precompiles::byzantium().len(), 8);
        assert_eq!(Precompiles::istanbul().len(), 9);
        assert_eq!(Precompiles::berlin().len(), 9);
    }

    #[test]
    fn addresses_are_low_integers() {
        let set = Precompiles::istanbul();
        for i in 1..=9u64 {
            assert!(set.contains(&u64_to_address(i)), "missing precompile {i}");
        }
        assert!(!set.contains(&u64_to_address(10)));
    }
}
