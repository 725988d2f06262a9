use crate::Log;
use alloy_primitives::{hex, keccak256};
use core::fmt;

/// Number of bits in a receipt bloom filter.
pub const BLOOM_BITS: usize = 2048;

/// Size of a receipt bloom filter in bytes.
pub const BLOOM_SIZE: usize = BLOOM_BITS / 8;

/// 2048-bit bloom filter over the addresses and topics of a receipt's logs.
///
/// For every item, three bit indexes are derived from the keccak-256 of the
/// item: the low 11 bits of byte pairs (0,1), (2,3) and (4,5).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bloom(#[cfg_attr(feature = "serde", serde(with = "serde_bytes_array"))] pub [u8; BLOOM_SIZE]);

impl Default for Bloom {
    fn default() -> Self {
        Self([0u8; BLOOM_SIZE])
    }
}

impl fmt::Debug for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bloom(0x{})", hex::encode(self.0))
    }
}

impl Bloom {
    /// An empty bloom filter.
    pub const ZERO: Self = Self([0u8; BLOOM_SIZE]);

    /// Returns the three bit indexes the given item maps to.
    fn bit_indexes(input: &[u8]) -> [usize; 3] {
        let hash = keccak256(input);
        let mut out = [0usize; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let pair = u16::from_be_bytes([hash[2 * i], hash[2 * i + 1]]);
            *slot = (pair & 0x07ff) as usize;
        }
        out
    }

    /// Sets the bits of the given item.
    pub fn accrue(&mut self, input: &[u8]) {
        for bit in Self::bit_indexes(input) {
            // bit 0 is the most significant bit of the last byte
            self.0[BLOOM_SIZE - 1 - bit / 8] |= 1 << (bit % 8);
        }
    }

    /// Sets the bits of a log's address and every topic.
    pub fn accrue_log(&mut self, log: &Log) {
        self.accrue(log.address.as_slice());
        for topic in &log.topics {
            self.accrue(topic.as_slice());
        }
    }

    /// Whether every bit of the given item is set.
    pub fn contains_input(&self, input: &[u8]) -> bool {
        Self::bit_indexes(input)
            .into_iter()
            .all(|bit| self.0[BLOOM_SIZE - 1 - bit / 8] & (1 << (bit % 8)) != 0)
    }

    /// Whether this filter covers every bit of `other`.
    pub fn contains_bloom(&self, other: &Bloom) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| a & b == *b)
    }

    /// Merges another bloom into this one.
    pub fn accrue_bloom(&mut self, other: &Bloom) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
    }

    /// Whether no bit is set.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Bloom of a slice of logs.
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Self {
        let mut bloom = Self::ZERO;
        for log in logs {
            bloom.accrue_log(log);
        }
        bloom
    }
}

#[cfg(feature = "serde")]
mod serde_bytes_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 256], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 256], D::Error> {
        let bytes: &[u8] = Deserialize::deserialize(deserializer)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("bloom must be 256 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, Bytes};

    #[test]
    fn bloom_covers_address_and_topics() {
        let log = Log::new(
            address!("2222222222222222222222222222222222222222"),
            vec![b256!(
                "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            )],
            Bytes::new(),
        );
        let bloom = Bloom::from_logs([&log]);
        assert!(bloom.contains_input(log.address.as_slice()));
        assert!(bloom.contains_input(log.topics[0].as_slice()));
        assert!(!bloom.contains_input(b"missing"));
    }

    #[test]
    fn accrue_is_monotone() {
        let mut a = Bloom::ZERO;
        a.accrue(b"hello");
        let mut b = a;
        b.accrue(b"world");
        assert!(b.contains_bloom(&a));
        assert!(!a.contains_bloom(&b));
    }
}
