//! # Stake Score
//!
//! Time-decayed stake weighting. A stake's score is its amount scaled by a
//! multiplier that grows with the number of whole days it has been staked:
//!
//! | Days staked | Multiplier |
//! |-------------|------------|
//! | 0 | 0.0476x |
//! | 20 | 1.0x (breakeven) |
//! | 50 | ~1.95x |
//! | 82 | ~2.97x |
//! | 83+ | 3.0x (cap) |
//!
//! Stakes alive during the first two epochs get a flat 20-day head start so
//! early stakers are not penalized for the cold start.

use dlp_core::{Amount, BlockNumber};

/// Multiplier denominator (10000 = 1.0x)
pub const MULTIPLIER_DENOMINATOR: u64 = 10_000;

/// Multiplier for any day count at or above the table length
pub const MAX_MULTIPLIER: u64 = 30_000;

/// Day count from which the multiplier is capped
pub const MAX_MULTIPLIER_DAY: u64 = 83;

/// Head start for stakes scored in the first two epochs
pub const FIRST_TWO_EPOCHS_BONUS_DAYS: u64 = 20;

/// Multipliers indexed by whole days staked
const MULTIPLIERS: [u64; MAX_MULTIPLIER_DAY as usize] = [
    476, 952, 1428, 1904, 2380, 2857, 3333, 3809, 4285, 4761, 5238, 5714, 6190, 6666, 7142, 7619,
    8095, 8571, 9047, 9523, 10000, 10317, 10634, 10952, 11269, 11587, 11904, 12222, 12539, 12857,
    13174, 13492, 13809, 14126, 14444, 14761, 15079, 15396, 15714, 16031, 16349, 16666, 16984,
    17301, 17619, 17936, 18253, 18571, 18888, 19206, 19523, 19841, 20158, 20476, 20793, 21111,
    21428, 21746, 22063, 22380, 22698, 23015, 23333, 23650, 23968, 24285, 24603, 24920, 25238,
    25555, 25873, 26190, 26507, 26825, 27142, 27460, 27777, 28095, 28412, 28730, 29047, 29365,
    29682,
];

/// Multiplier for a whole-day count, clamped at [`MAX_MULTIPLIER`]
pub fn multiplier(days_staked: u64) -> u64 {
    if days_staked >= MAX_MULTIPLIER_DAY {
        MAX_MULTIPLIER
    } else {
        MULTIPLIERS[days_staked as usize]
    }
}

/// Whole days between two blocks
pub fn days_staked(start_block: BlockNumber, end_block: BlockNumber, blocks_per_day: u64) -> u64 {
    if blocks_per_day == 0 {
        return 0;
    }
    end_block.saturating_sub(start_block) / blocks_per_day
}

/// Time-decayed score of `amount` staked for `days_staked` whole days
pub fn score(amount: Amount, days_staked: u64, first_two_epochs: bool) -> Amount {
    let days = if first_two_epochs {
        days_staked.saturating_add(FIRST_TWO_EPOCHS_BONUS_DAYS)
    } else {
        days_staked
    };
    dlp_core::mul_div(
        amount,
        multiplier(days) as Amount,
        MULTIPLIER_DENOMINATOR as Amount,
    )
}

/// Score of a stake over a block interval
pub fn interval_score(
    amount: Amount,
    start_block: BlockNumber,
    end_block: BlockNumber,
    blocks_per_day: u64,
    first_two_epochs: bool,
) -> Amount {
    score(
        amount,
        days_staked(start_block, end_block, blocks_per_day),
        first_two_epochs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlp_core::constants::ONE_TOKEN;
    use proptest::prelude::*;

    #[test]
    fn test_table_is_ascending() {
        for window in MULTIPLIERS.windows(2) {
            assert!(window[0] < window[1]);
        }
        assert!(MULTIPLIERS[MULTIPLIERS.len() - 1] < MAX_MULTIPLIER);
    }

    #[test]
    fn test_breakeven_at_twenty_days() {
        assert_eq!(multiplier(20), MULTIPLIER_DENOMINATOR);
        assert_eq!(score(100 * ONE_TOKEN, 20, false), 100 * ONE_TOKEN);
    }

    #[test]
    fn test_cap() {
        assert_eq!(multiplier(83), MAX_MULTIPLIER);
        assert_eq!(multiplier(10_000), MAX_MULTIPLIER);
        assert_eq!(score(7 * ONE_TOKEN, 365, false), 21 * ONE_TOKEN);
    }

    #[test]
    fn test_first_two_epochs_bonus() {
        assert_eq!(score(ONE_TOKEN, 0, true), score(ONE_TOKEN, 20, false));
        assert_eq!(score(ONE_TOKEN, 0, true), ONE_TOKEN);
    }

    #[test]
    fn test_days_staked() {
        assert_eq!(days_staked(100, 100 + 3 * 50 + 49, 50), 3);
        assert_eq!(days_staked(100, 50, 50), 0);
        assert_eq!(days_staked(0, 1_000, 0), 0);
    }

    #[test]
    fn test_interval_score() {
        let blocks_per_day = 10;
        assert_eq!(interval_score(ONE_TOKEN, 5, 5 + 200, blocks_per_day, false), ONE_TOKEN);
    }

    proptest! {
        #[test]
        fn prop_twenty_days_is_identity(amount in 0u128..u128::MAX / 30_000) {
            prop_assert_eq!(score(amount, 20, false), amount);
        }

        #[test]
        fn prop_capped_at_three_x(amount in 0u128..u128::MAX / 30_000, days in 83u64..100_000) {
            prop_assert_eq!(score(amount, days, false), amount * 3);
        }

        #[test]
        fn prop_monotonic_in_days(amount in 0u128..1u128 << 100, days in 0u64..200) {
            prop_assert!(score(amount, days, false) <= score(amount, days + 1, false));
        }
    }
}
