use ember_primitives::Bytes;
use std::borrow::Cow;

/// Right-pads the input to `LEN` bytes with zeroes, borrowing when it is
/// already long enough.
#[inline]
pub fn right_pad<const LEN: usize>(data: &[u8]) -> Cow<'_, [u8; LEN]> {
    if let Some(data) = data.get(..LEN) {
        Cow::Borrowed(data.try_into().expect("length checked"))
    } else {
        let mut padded = [0u8; LEN];
        padded[..data.len()].copy_from_slice(data);
        Cow::Owned(padded)
    }
}

/// Right-pads the input to `len` bytes with zeroes.
#[inline]
pub fn right_pad_vec(data: &[u8], len: usize) -> Cow<'_, [u8]> {
    if let Some(data) = data.get(..len) {
        Cow::Borrowed(data)
    } else {
        let mut padded = vec![0; len];
        padded[..data.len()].copy_from_slice(data);
        Cow::Owned(padded)
    }
}

/// Left-pads the input to 32 bytes, truncating from the front when longer.
#[inline]
pub fn left_pad_32(data: &[u8]) -> Bytes {
    let mut padded = [0u8; 32];
    if data.len() >= 32 {
        padded.copy_from_slice(&data[data.len() - 32..]);
    } else {
        padded[32 - data.len()..].copy_from_slice(data);
    }
    Bytes::copy_from_slice(&padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_pad_borrows_when_long_enough() {
        let data = [1u8; 40];
        let padded = right_pad::<32>(&data);
        assert!(matches!(padded, Cow::Borrowed(_)));
        let short = [1u8; 3];
        let padded = right_pad::<32>(&short);
        assert_eq!(&padded[..3], &[1, 1, 1]);
        assert_eq!(padded[3], 0);
    }
}
