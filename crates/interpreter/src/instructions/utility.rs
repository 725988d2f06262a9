use ember_primitives::{Address, B256, U256};

/// Low 20 bytes of a word, as an address.
#[inline]
pub fn into_address(word: U256) -> Address {
    Address::from_word(B256::from(word))
}

/// Zero-extends an address into a word.
#[inline]
pub fn address_into_u256(address: Address) -> U256 {
    address.into_word().into()
}

/// Narrows a word to `usize`, or `None` when it does not fit.
#[inline]
pub fn as_usize(value: U256) -> Option<usize> {
    usize::try_from(u64::try_from(value).ok()?).ok()
}
