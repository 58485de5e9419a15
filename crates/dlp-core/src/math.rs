//! Fixed-point helpers
//!
//! Products of 18-decimal amounts and 18-decimal percentages overflow `u128`,
//! so intermediate products are carried in 256 bits.

use crate::types::Amount;
use primitive_types::U256;

/// `a * b / denominator`, rounding down.
///
/// Returns 0 when `denominator` is 0 and saturates at `u128::MAX`.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> Amount {
    if denominator == 0 {
        return 0;
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        u128::MAX
    } else {
        quotient.as_u128()
    }
}

/// Integer square root: the largest `x` with `x * x <= n`, found by binary search.
pub fn isqrt(n: u128) -> u128 {
    let mut lo: u128 = 0;
    let mut hi: u128 = n.min(u64::MAX as u128);

    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if mid * mid <= n {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constants::{ONE_HUNDRED_PERCENT, ONE_TOKEN};
    use proptest::prelude::*;

    #[test]
    fn test_mul_div_wide_intermediate() {
        let reward = 1_000_000 * ONE_TOKEN;
        let pct = 80 * ONE_HUNDRED_PERCENT / 100;

        assert_eq!(mul_div(reward, pct, ONE_HUNDRED_PERCENT), 800_000 * ONE_TOKEN);
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(mul_div(5, 5, 0), 0);
    }

    #[test]
    fn test_mul_div_saturates() {
        assert_eq!(mul_div(u128::MAX, 4, 2), u128::MAX);
    }

    #[test]
    fn test_isqrt_small_values() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(99), 9);
        assert_eq!(isqrt(ONE_TOKEN), 1_000_000_000);
    }

    #[test]
    fn test_isqrt_max() {
        assert_eq!(isqrt(u128::MAX), u64::MAX as u128);
    }

    proptest! {
        #[test]
        fn prop_isqrt_is_floor_root(n in any::<u128>()) {
            let r = isqrt(n);
            prop_assert!(r * r <= n);
            let next = r + 1;
            prop_assert!(next.checked_mul(next).map_or(true, |sq| sq > n));
        }

        #[test]
        fn prop_mul_div_matches_narrow(a in 0u128..1u128 << 60, b in 0u128..1u128 << 60, d in 1u128..1u128 << 60) {
            prop_assert_eq!(mul_div(a, b, d), a * b / d);
        }
    }
}
