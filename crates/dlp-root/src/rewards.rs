//! # Reward Engine
//!
//! Turns submitted stake scores and performance ratings into per-DLP reward
//! splits, then settles staker claims against those splits.
//!
//! ## Epoch Split
//!
//! For each top DLP `i` of a finalized epoch:
//!
//! ```text
//! rating_i        = stakePct * score_i / Σscore + perfPct * perf_i / Σperf
//! stakersReward_i = reward * rating_i / Σrating * stakersPct_i
//! dlpPool         = reward - ΣstakersReward
//! weight_i        = sqrt(rating_i) * (100% - stakersPct_i)
//! dlpReward_i     = dlpPool * weight_i / Σweight
//! ```
//!
//! A rating component whose total is zero contributes nothing. All divisions
//! floor, so the allocated sum never exceeds the epoch reward.
//!
//! ## Staker Claims
//!
//! A stake's share of `stakersReward_i` is its interval score within the
//! epoch over the DLP's total stakes score, capped so the paid sum never
//! exceeds the stakers' pool.

use crate::config::RootConfig;
use crate::epochs::{Epoch, EpochScheduler};
use crate::metrics::MetricsAggregator;
use crate::registry::DlpRegistry;
use crate::score::interval_score;
use crate::staking::Stake;
use dlp_core::constants::ONE_HUNDRED_PERCENT;
use dlp_core::{isqrt, mul_div, Address, Amount, BlockNumber, DlpId, EpochId, Result, RootError, StakeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Submitted stake score for one (epoch, DLP)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakesScoreEntry {
    pub epoch_id: EpochId,
    pub dlp_id: DlpId,
    pub total_stakes_score: Amount,
}

/// Submitted performance rating for one DLP
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRatingEntry {
    pub dlp_id: DlpId,
    pub performance_rating: Amount,
}

/// Inputs to the split for one top DLP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingInput {
    pub dlp_id: DlpId,
    pub stakes_score: Amount,
    pub performance_rating: Amount,
    pub stakers_percentage: Amount,
}

/// Split output for one top DLP
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DlpRewardSplit {
    pub dlp_id: DlpId,
    pub rating: Amount,
    pub reward_amount: Amount,
    pub stakers_reward_amount: Amount,
}

/// Split an epoch's reward across its top DLPs
pub fn split_epoch_reward(
    reward_amount: Amount,
    inputs: &[RatingInput],
    stake_rating_percentage: Amount,
    performance_rating_percentage: Amount,
) -> Vec<DlpRewardSplit> {
    let total_score: Amount = inputs.iter().map(|i| i.stakes_score).fold(0, Amount::saturating_add);
    let total_performance: Amount = inputs
        .iter()
        .map(|i| i.performance_rating)
        .fold(0, Amount::saturating_add);

    let mut splits: Vec<DlpRewardSplit> = inputs
        .iter()
        .map(|i| DlpRewardSplit {
            dlp_id: i.dlp_id,
            rating: mul_div(stake_rating_percentage, i.stakes_score, total_score)
                + mul_div(performance_rating_percentage, i.performance_rating, total_performance),
            ..DlpRewardSplit::default()
        })
        .collect();

    let total_rating: Amount = splits.iter().map(|s| s.rating).sum();
    if total_rating == 0 {
        return splits;
    }

    let mut stakers_total: Amount = 0;
    for (split, input) in splits.iter_mut().zip(inputs) {
        let dlp_share = mul_div(reward_amount, split.rating, total_rating);
        split.stakers_reward_amount = mul_div(dlp_share, input.stakers_percentage, ONE_HUNDRED_PERCENT);
        stakers_total += split.stakers_reward_amount;
    }

    let dlp_pool = reward_amount.saturating_sub(stakers_total);
    let weights: Vec<Amount> = splits
        .iter()
        .zip(inputs)
        .map(|(split, input)| {
            let operator_share = ONE_HUNDRED_PERCENT.saturating_sub(input.stakers_percentage);
            mul_div(isqrt(split.rating), operator_share, ONE_HUNDRED_PERCENT)
        })
        .collect();
    let total_weight: Amount = weights.iter().sum();

    for (split, weight) in splits.iter_mut().zip(&weights) {
        split.reward_amount = mul_div(dlp_pool, *weight, total_weight);
    }
    splits
}

/// Rewards a stake can collect right now
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakeClaim {
    pub stake_id: StakeId,
    pub amount: Amount,
    /// Non-zero per-epoch shares
    pub epochs: Vec<(EpochId, Amount)>,
    /// Claim cursor after settling
    pub last_claimed_epoch_id: EpochId,
}

/// Operator payout for one DLP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DlpPayout {
    pub dlp_id: DlpId,
    pub treasury: Address,
    pub amount: Amount,
}

#[derive(Debug, Default)]
pub struct RewardEngine {
    metrics: MetricsAggregator,
}

impl RewardEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &MetricsAggregator {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut MetricsAggregator {
        &mut self.metrics
    }

    /// Naive epoch score: stake total recorded for the epoch (live total if
    /// none) minus accumulated adjustments
    pub fn estimated_stakes_score(
        &self,
        epoch_id: EpochId,
        dlp_id: DlpId,
        scheduler: &EpochScheduler,
        registry: &DlpRegistry,
    ) -> Amount {
        let stake_total = match scheduler.dlp_epoch(dlp_id, epoch_id) {
            Some(record) => record.stake_amount,
            None => registry.get(dlp_id).map_or(0, |dlp| dlp.stake_amount),
        };
        self.metrics.estimated_stakes_score(epoch_id, dlp_id, stake_total)
    }

    /// Check a stake score batch
    pub fn validate_stakes_scores(
        &self,
        entries: &[StakesScoreEntry],
        override_existing: bool,
        scheduler: &EpochScheduler,
        registry: &DlpRegistry,
        current_block: BlockNumber,
    ) -> Result<()> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            registry.get(entry.dlp_id)?;
            let epoch = scheduler.get(entry.epoch_id)?;
            if !epoch.has_ended(current_block) {
                return Err(RootError::EpochNotEnded(entry.epoch_id));
            }
            if epoch.is_finalized {
                return Err(RootError::EpochAlreadyFinalized(entry.epoch_id));
            }
            if !seen.insert((entry.epoch_id, entry.dlp_id)) {
                return Err(RootError::DuplicateEntry(entry.dlp_id));
            }
            let saved = scheduler
                .dlp_epoch(entry.dlp_id, entry.epoch_id)
                .map_or(false, |r| r.stakes_score_saved);
            if saved && !override_existing {
                return Err(RootError::EpochDlpScoreAlreadySaved {
                    epoch_id: entry.epoch_id,
                    dlp_id: entry.dlp_id,
                });
            }
        }
        Ok(())
    }

    /// Store a validated stake score batch
    pub fn apply_stakes_scores(&self, entries: &[StakesScoreEntry], scheduler: &mut EpochScheduler) {
        for entry in entries {
            let record = scheduler.dlp_epoch_mut(entry.dlp_id, entry.epoch_id);
            record.total_stakes_score = entry.total_stakes_score;
            record.stakes_score_saved = true;
        }
    }

    /// Check a performance rating batch
    pub fn validate_performance_ratings(
        &self,
        epoch_id: EpochId,
        should_finalize: bool,
        entries: &[PerformanceRatingEntry],
        scheduler: &EpochScheduler,
        registry: &DlpRegistry,
        current_block: BlockNumber,
    ) -> Result<()> {
        let epoch = scheduler.get(epoch_id)?;
        if epoch.is_finalized {
            return Err(RootError::EpochAlreadyFinalized(epoch_id));
        }
        if should_finalize && !epoch.has_ended(current_block) {
            return Err(RootError::EpochNotEnded(epoch_id));
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            let dlp = registry.get(entry.dlp_id)?;
            if !seen.insert(entry.dlp_id) {
                return Err(RootError::DuplicateEntry(entry.dlp_id));
            }
            if should_finalize && !dlp.is_verified {
                return Err(RootError::DlpMustBeVerified(entry.dlp_id));
            }
        }
        Ok(())
    }

    /// Store a validated rating batch, keeping the epoch total in sync
    pub fn apply_performance_ratings(
        &self,
        epoch_id: EpochId,
        entries: &[PerformanceRatingEntry],
        scheduler: &mut EpochScheduler,
    ) -> Result<()> {
        let mut total = scheduler.get(epoch_id)?.total_performance_rating;
        for entry in entries {
            let record = scheduler.dlp_epoch_mut(entry.dlp_id, epoch_id);
            total = total
                .saturating_sub(record.performance_rating)
                .saturating_add(entry.performance_rating);
            record.performance_rating = entry.performance_rating;
        }
        scheduler.get_mut(epoch_id)?.total_performance_rating = total;
        Ok(())
    }

    /// Compute and record the epoch split, then mark the epoch finalized
    pub fn finalize(
        &self,
        epoch_id: EpochId,
        scheduler: &mut EpochScheduler,
        registry: &DlpRegistry,
        config: &RootConfig,
    ) -> Result<Vec<DlpRewardSplit>> {
        let epoch = scheduler.get(epoch_id)?.clone();
        if epoch.is_finalized {
            return Err(RootError::EpochAlreadyFinalized(epoch_id));
        }

        let view: &EpochScheduler = scheduler;
        let inputs: Vec<RatingInput> = epoch
            .dlp_ids
            .iter()
            .map(|&dlp_id| {
                let record = view.dlp_epoch(dlp_id, epoch_id).cloned().unwrap_or_default();
                let stakes_score = if record.stakes_score_saved {
                    record.total_stakes_score
                } else {
                    self.estimated_stakes_score(epoch_id, dlp_id, view, registry)
                };
                RatingInput {
                    dlp_id,
                    stakes_score,
                    performance_rating: record.performance_rating,
                    stakers_percentage: record.stakers_percentage,
                }
            })
            .collect();

        let splits = split_epoch_reward(
            epoch.reward_amount,
            &inputs,
            config.stake_rating_percentage,
            config.performance_rating_percentage,
        );

        for (split, input) in splits.iter().zip(&inputs) {
            let record = scheduler.dlp_epoch_mut(split.dlp_id, epoch_id);
            record.total_stakes_score = input.stakes_score;
            record.rating = split.rating;
            record.reward_amount = split.reward_amount;
            record.stakers_reward_amount = split.stakers_reward_amount;
        }
        scheduler.get_mut(epoch_id)?.is_finalized = true;

        tracing::info!(
            epoch_id,
            dlps = splits.len(),
            reward_amount = epoch.reward_amount,
            "Epoch finalized"
        );
        Ok(splits)
    }

    /// Rewards `stake` can claim at `current_block`. `pending` holds
    /// stakers-pool amounts already promised to other stakes in the same
    /// batch.
    pub fn stake_claim(
        &self,
        stake: &Stake,
        scheduler: &EpochScheduler,
        config: &RootConfig,
        current_block: BlockNumber,
        pending: &HashMap<(DlpId, EpochId), Amount>,
    ) -> StakeClaim {
        let mut claim = StakeClaim {
            stake_id: stake.id,
            last_claimed_epoch_id: stake.last_claimed_epoch_id,
            ..StakeClaim::default()
        };

        let mut epoch_id = stake.last_claimed_epoch_id + 1;
        while let Ok(epoch) = scheduler.get(epoch_id) {
            let claimable_from = epoch.end_block.saturating_add(config.reward_claim_delay);
            if !epoch.is_finalized || current_block <= claimable_from {
                break;
            }
            let share = self.epoch_share(stake, epoch, scheduler, config, pending);
            if share > 0 {
                claim.amount += share;
                claim.epochs.push((epoch_id, share));
            }
            claim.last_claimed_epoch_id = epoch_id;
            epoch_id += 1;
        }
        claim
    }

    fn epoch_share(
        &self,
        stake: &Stake,
        epoch: &Epoch,
        scheduler: &EpochScheduler,
        config: &RootConfig,
        pending: &HashMap<(DlpId, EpochId), Amount>,
    ) -> Amount {
        let record = match scheduler.dlp_epoch(stake.dlp_id, epoch.id) {
            Some(record) if record.is_top_dlp => record,
            _ => return 0,
        };
        if record.total_stakes_score == 0 || !stake.overlaps(epoch.start_block, epoch.end_block) {
            return 0;
        }

        let from = stake.start_block.max(epoch.start_block);
        let to = stake
            .end_block
            .unwrap_or(BlockNumber::MAX)
            .min(epoch.end_block + 1);
        let stake_score = interval_score(stake.amount, from, to, config.blocks_per_day, epoch.id <= 2);

        let share = mul_div(
            record.stakers_reward_amount,
            stake_score.min(record.total_stakes_score),
            record.total_stakes_score,
        );
        let promised = pending.get(&(stake.dlp_id, epoch.id)).copied().unwrap_or(0);
        let remaining = record
            .stakers_reward_amount
            .saturating_sub(record.stakers_reward_claimed)
            .saturating_sub(promised);
        share.min(remaining)
    }

    /// Unpaid operator rewards of a finalized epoch, at most `max_dlps`
    pub fn pending_dlp_payouts(
        &self,
        epoch_id: EpochId,
        max_dlps: usize,
        scheduler: &EpochScheduler,
        registry: &DlpRegistry,
    ) -> Result<Vec<DlpPayout>> {
        let epoch = scheduler.get(epoch_id)?;
        if !epoch.is_finalized {
            return Err(RootError::EpochNotFinalized(epoch_id));
        }

        let mut payouts = Vec::new();
        for &dlp_id in &epoch.dlp_ids {
            if payouts.len() >= max_dlps {
                break;
            }
            let Some(record) = scheduler.dlp_epoch(dlp_id, epoch_id) else {
                continue;
            };
            if record.reward_claimed || record.reward_amount == 0 {
                continue;
            }
            payouts.push(DlpPayout {
                dlp_id,
                treasury: registry.get(dlp_id)?.treasury,
                amount: record.reward_amount,
            });
        }
        Ok(payouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlp_core::constants::{ONE_PERCENT, ONE_TOKEN};
    use proptest::prelude::*;

    fn input(dlp_id: DlpId, score: Amount, perf: Amount, pct: Amount) -> RatingInput {
        RatingInput {
            dlp_id,
            stakes_score: score,
            performance_rating: perf,
            stakers_percentage: pct,
        }
    }

    #[test]
    fn test_single_dlp_takes_everything() {
        let splits = split_epoch_reward(
            1_000 * ONE_TOKEN,
            &[input(1, 50 * ONE_TOKEN, ONE_TOKEN, 60 * ONE_PERCENT)],
            80 * ONE_PERCENT,
            20 * ONE_PERCENT,
        );

        assert_eq!(splits[0].rating, ONE_HUNDRED_PERCENT);
        assert_eq!(splits[0].stakers_reward_amount, 600 * ONE_TOKEN);
        assert_eq!(splits[0].reward_amount, 400 * ONE_TOKEN);
    }

    #[test]
    fn test_zero_performance_total_is_dropped() {
        let splits = split_epoch_reward(
            100 * ONE_TOKEN,
            &[
                input(1, 300, 0, 50 * ONE_PERCENT),
                input(2, 100, 0, 50 * ONE_PERCENT),
            ],
            80 * ONE_PERCENT,
            20 * ONE_PERCENT,
        );

        assert_eq!(splits[0].rating, 60 * ONE_PERCENT);
        assert_eq!(splits[1].rating, 20 * ONE_PERCENT);
        // Stakers get half of a 3:1 split
        assert_eq!(splits[0].stakers_reward_amount, 75 * ONE_TOKEN / 2);
        assert_eq!(splits[1].stakers_reward_amount, 25 * ONE_TOKEN / 2);
    }

    #[test]
    fn test_all_zero_ratings_allocate_nothing() {
        let splits = split_epoch_reward(
            100 * ONE_TOKEN,
            &[input(1, 0, 0, 50 * ONE_PERCENT), input(2, 0, 0, 50 * ONE_PERCENT)],
            80 * ONE_PERCENT,
            20 * ONE_PERCENT,
        );

        assert!(splits.iter().all(|s| s.reward_amount == 0 && s.stakers_reward_amount == 0));
    }

    #[test]
    fn test_operator_pool_uses_sqrt_weights() {
        // Ratings 4:1 with equal stakers percentage give operator weights 2:1
        let splits = split_epoch_reward(
            1_000_000,
            &[
                input(1, 4 * ONE_TOKEN, 0, 50 * ONE_PERCENT),
                input(2, ONE_TOKEN, 0, 50 * ONE_PERCENT),
            ],
            ONE_HUNDRED_PERCENT,
            0,
        );

        let ratio = splits[0].reward_amount as f64 / splits[1].reward_amount as f64;
        assert!((ratio - 2.0).abs() < 0.01, "ratio was {ratio}");
    }

    #[test]
    fn test_empty_epoch() {
        assert!(split_epoch_reward(ONE_TOKEN, &[], 80 * ONE_PERCENT, 20 * ONE_PERCENT).is_empty());
    }

    proptest! {
        #[test]
        fn prop_split_never_exceeds_reward(
            reward in 0u128..1_000_000_000 * ONE_TOKEN,
            dlps in proptest::collection::vec(
                (0u128..1_000 * ONE_TOKEN, 0u128..ONE_TOKEN, 50u128..=100),
                1..16,
            ),
        ) {
            let inputs: Vec<RatingInput> = dlps
                .iter()
                .enumerate()
                .map(|(i, (score, perf, pct))| input(i as DlpId + 1, *score, *perf, pct * ONE_PERCENT))
                .collect();

            let splits = split_epoch_reward(reward, &inputs, 80 * ONE_PERCENT, 20 * ONE_PERCENT);
            let allocated: Amount = splits
                .iter()
                .map(|s| s.reward_amount + s.stakers_reward_amount)
                .sum();

            prop_assert!(allocated <= reward);
            let any_rating = splits.iter().any(|s| s.rating > 0);
            if any_rating {
                // Flooring loses at most a few units per DLP
                prop_assert!(reward - allocated <= 4 * inputs.len() as u128 + 2);
            }
        }
    }
}
