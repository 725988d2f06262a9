use core::cmp::min;
use core::ops::BitAnd;
use ember_primitives::{Bytes, U256};

/// Byte-addressable call-frame memory backed by a `Vec`.
///
/// The vector length is kept at the charged 32-byte boundary; reads past it
/// are zero-extended without growing it.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

/// Rounds `x` up to the next multiple of 32, or `None` on overflow.
#[inline]
pub fn next_multiple_of_32(x: usize) -> Option<usize> {
    let r = x.bitand(31).wrapping_neg().bitand(31);
    x.checked_add(r)
}

impl Memory {
    /// Creates new empty memory.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(4 * 1024),
        }
    }

    /// Current charged length in bytes, always a multiple of 32.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether memory has not been touched yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the full backing store.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Grows memory to `new_size` bytes, zero-filled. The expansion cost is
    /// assumed to have been charged already and `new_size` to be a multiple
    /// of 32.
    #[inline]
    pub fn resize(&mut self, new_size: usize) {
        if new_size > self.data.len() {
            self.data.resize(new_size, 0);
        }
    }

    /// Copies a memory region, zero-extending reads past the charged length.
    pub fn get(&self, offset: usize, size: usize) -> Bytes {
        let start = min(self.data.len(), offset);
        let end = min(self.data.len(), offset.saturating_add(size));
        let mut ret = self.data[start..end].to_vec();
        ret.resize(size, 0);
        ret.into()
    }

    /// Borrows an in-range memory region. The caller has resized already.
    #[inline]
    pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
        &self.data[offset..offset + size]
    }

    /// Writes `value` at `offset`. The region is in range.
    #[inline]
    pub fn set(&mut self, offset: usize, value: &[u8]) {
        if !value.is_empty() {
            self.data[offset..offset + value.len()].copy_from_slice(value);
        }
    }

    /// Writes one byte at `offset`.
    #[inline]
    pub fn set_byte(&mut self, offset: usize, byte: u8) {
        self.data[offset] = byte;
    }

    /// Writes a 32-byte big-endian word at `offset`.
    #[inline]
    pub fn set_u256(&mut self, offset: usize, value: U256) {
        self.data[offset..offset + 32].copy_from_slice(&value.to_be_bytes::<32>());
    }

    /// Copies `len` bytes from `data[data_offset..]` into memory at
    /// `memory_offset`, zero-filling whatever the source cannot cover.
    pub fn set_data(&mut self, memory_offset: usize, data_offset: usize, len: usize, data: &[u8]) {
        if data_offset >= data.len() {
            self.data[memory_offset..memory_offset + len].fill(0);
            return;
        }
        let data_end = min(data_offset + len, data.len());
        let copied = data_end - data_offset;
        self.data[memory_offset..memory_offset + copied]
            .copy_from_slice(&data[data_offset..data_end]);
        self.data[memory_offset + copied..memory_offset + len].fill(0);
    }

    /// Copies inside memory, handling overlapping regions.
    #[inline]
    pub fn copy(&mut self, dst: usize, src: usize, len: usize) {
        self.data.copy_within(src..src + len, dst);
    }
}
