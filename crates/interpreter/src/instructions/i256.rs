use core::cmp::Ordering;
use ember_primitives::U256;

pub const MIN_NEGATIVE_VALUE: U256 = U256::from_limbs([0, 0, 0, 0x8000000000000000]);

const FLIPH_BITMASK_U64: u64 = 0x7fffffffffffffff;

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Sign {
    Minus = -1,
    Zero = 0,
    Plus = 1,
}

#[inline]
pub fn i256_sign(val: &U256) -> Sign {
    if val.bit(255) {
        Sign::Minus
    } else if val.is_zero() {
        Sign::Zero
    } else {
        Sign::Plus
    }
}

/// Returns the sign, negating `val` in place to its absolute value when
/// negative.
#[inline]
pub fn i256_sign_compl(val: &mut U256) -> Sign {
    let sign = i256_sign(val);
    if sign == Sign::Minus {
        two_compl_mut(val);
    }
    sign
}

#[inline]
fn u256_remove_sign(val: &mut U256) {
    // SAFETY: U256 is a valid for writes of its limbs
    unsafe {
        let limbs = val.as_limbs_mut();
        limbs[3] &= FLIPH_BITMASK_U64;
    }
}

#[inline]
pub fn two_compl_mut(op: &mut U256) {
    *op = two_compl(*op);
}

#[inline]
pub fn two_compl(op: U256) -> U256 {
    op.wrapping_neg()
}

/// Two's complement comparison.
#[inline]
pub fn i256_cmp(first: &U256, second: &U256) -> Ordering {
    let first_sign = i256_sign(first);
    let second_sign = i256_sign(second);
    match first_sign.cmp(&second_sign) {
        Ordering::Equal => first.cmp(second),
        o => o,
    }
}

/// Signed division, truncating toward zero. `MIN / -1` wraps to `MIN`.
#[inline]
pub fn i256_div(mut first: U256, mut second: U256) -> U256 {
    let second_sign = i256_sign_compl(&mut second);
    if second_sign == Sign::Zero {
        return U256::ZERO;
    }

    let first_sign = i256_sign_compl(&mut first);
    if first_sign == Sign::Minus && first == MIN_NEGATIVE_VALUE && second == U256::from(1) {
        return two_compl(MIN_NEGATIVE_VALUE);
    }

    let mut d = first / second;

    u256_remove_sign(&mut d);

    if d.is_zero() {
        return U256::ZERO;
    }

    match (first_sign, second_sign) {
        (Sign::Zero, Sign::Plus)
        | (Sign::Plus, Sign::Zero)
        | (Sign::Zero, Sign::Zero)
        | (Sign::Plus, Sign::Plus)
        | (Sign::Minus, Sign::Minus) => d,
        (Sign::Zero, Sign::Minus)
        | (Sign::Plus, Sign::Minus)
        | (Sign::Minus, Sign::Zero)
        | (Sign::Minus, Sign::Plus) => two_compl(d),
    }
}

/// Signed modulo; the result keeps the sign of the dividend.
#[inline]
pub fn i256_mod(mut first: U256, mut second: U256) -> U256 {
    let first_sign = i256_sign_compl(&mut first);
    if first_sign == Sign::Zero {
        return U256::ZERO;
    }

    let second_sign = i256_sign_compl(&mut second);
    if second_sign == Sign::Zero {
        return U256::ZERO;
    }

    let mut r = first % second;

    u256_remove_sign(&mut r);

    if r.is_zero() {
        return U256::ZERO;
    }
    if first_sign == Sign::Minus {
        two_compl(r)
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_by_zero_and_min_by_minus_one() {
        let one = U256::from(1);
        let minus_one = two_compl(one);
        assert_eq!(i256_div(one, U256::ZERO), U256::ZERO);
        assert_eq!(i256_div(MIN_NEGATIVE_VALUE, minus_one), MIN_NEGATIVE_VALUE);
        assert_eq!(i256_div(U256::from(8), minus_one), two_compl(U256::from(8)));
    }

    #[test]
    fn mod_keeps_dividend_sign() {
        let minus_ten = two_compl(U256::from(10));
        assert_eq!(i256_mod(minus_ten, U256::from(3)), two_compl(U256::from(1)));
        assert_eq!(i256_mod(U256::from(10), two_compl(U256::from(3))), U256::from(1));
    }

    #[test]
    fn signed_compare() {
        let minus_one = two_compl(U256::from(1));
        assert_eq!(i256_cmp(&minus_one, &U256::from(1)), Ordering::Less);
        assert_eq!(i256_cmp(&U256::from(1), &minus_one), Ordering::Greater);
        assert_eq!(i256_cmp(&minus_one, &minus_one), Ordering::Equal);
    }
}
