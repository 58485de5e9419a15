//! # DLP Root
//!
//! The [`DlpRoot`] facade owns the registry, the stake ledger, the epoch
//! scheduler and the reward engine, and exposes every public operation.
//!
//! ## Call Shape
//!
//! Every mutating call runs in the same order:
//!
//! 1. Authorization (role or pause check)
//! 2. Epoch backfill up to the current block (idempotent)
//! 3. Validation of every input
//! 4. Treasury movement and state mutation
//!
//! Nothing is mutated when validation fails, and treasury payouts are
//! checked against the balance before any record changes.
//!
//! ## Roles
//!
//! | Operation | Required |
//! |-----------|----------|
//! | register / stake / close / withdraw / claim | any account, not paused |
//! | update / deregister DLP | DLP owner, not paused |
//! | verification, overrides, protocol parameters | Maintainer |
//! | stake scores, performance ratings, payouts | Manager |
//! | epoch size and reward, pause | DefaultAdmin |

use crate::access::{AccessControl, Role};
use crate::config::RootConfig;
use crate::epochs::{DlpEpoch, Epoch, EpochScheduler};
use crate::events::RootEvent;
use crate::registry::{Dlp, DlpInfo, DlpRegistry, StatusChange};
use crate::rewards::{PerformanceRatingEntry, RewardEngine, StakesScoreEntry};
use crate::score;
use crate::staking::{Stake, StakeLedger};
use crate::top_dlps::top_dlp_ids;
use crate::treasury::Treasury;
use dlp_core::constants::ONE_HUNDRED_PERCENT;
use dlp_core::{
    Address, Amount, BlockNumber, BlockSource, DlpId, DlpStatus, EpochId, Result, RootError, StakeId,
};
use std::collections::HashMap;
use std::sync::Arc;

/// External capabilities the engine consults
#[derive(Clone)]
pub struct Collaborators {
    pub access: Arc<dyn AccessControl>,
    /// Escrow for staked principal
    pub stakes_treasury: Arc<dyn Treasury>,
    /// Pays staker and DLP rewards
    pub rewards_treasury: Arc<dyn Treasury>,
    pub clock: Arc<dyn BlockSource>,
}

pub struct DlpRoot {
    config: RootConfig,
    paused: bool,
    registry: DlpRegistry,
    ledger: StakeLedger,
    epochs: EpochScheduler,
    rewards: RewardEngine,
    collaborators: Collaborators,
    events: Vec<RootEvent>,
}

impl std::fmt::Debug for DlpRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlpRoot")
            .field("paused", &self.paused)
            .field("dlps", &self.registry.count())
            .field("stakes", &self.ledger.count())
            .field("epochs", &self.epochs.count())
            .finish()
    }
}

impl DlpRoot {
    /// Create an engine holding only epoch 0
    pub fn new(config: RootConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let epochs = EpochScheduler::new(&config);
        tracing::info!(
            epoch_start_block = config.epoch_start_block,
            epoch_size = config.epoch_size,
            epoch_dlps_limit = config.epoch_dlps_limit,
            "DLP root initialized"
        );
        Ok(Self {
            config,
            paused: false,
            registry: DlpRegistry::new(),
            ledger: StakeLedger::new(),
            epochs,
            rewards: RewardEngine::new(),
            collaborators,
            events: Vec::new(),
        })
    }

    fn current_block(&self) -> BlockNumber {
        self.collaborators.clock.current_block()
    }

    fn emit(&mut self, event: RootEvent) {
        self.events.push(event);
    }

    fn emit_status(&mut self, change: Option<StatusChange>) {
        if let Some(change) = change {
            self.emit(RootEvent::DlpStatusUpdated {
                dlp_id: change.dlp_id,
                status: change.to,
            });
        }
    }

    fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(RootError::EnforcedPause);
        }
        Ok(())
    }

    fn check_role(&self, caller: &Address, role: Role) -> Result<()> {
        self.collaborators.access.check_role(caller, role)
    }

    fn check_batch(&self, len: usize) -> Result<()> {
        if len > self.config.max_batch_size {
            return Err(RootError::BatchTooLarge {
                len,
                max: self.config.max_batch_size,
            });
        }
        Ok(())
    }

    fn backfill_until(&mut self, target: BlockNumber) {
        let created = self
            .epochs
            .create_epochs_until(target, &self.config, &mut self.registry);
        if created.is_empty() {
            tracing::debug!(target, "Epochs already exist up to target");
        }
        for epoch in created {
            self.emit(RootEvent::EpochCreated {
                epoch_id: epoch.id,
                start_block: epoch.start_block,
                end_block: epoch.end_block,
                reward_amount: epoch.reward_amount,
            });
        }
    }

    fn backfill(&mut self) {
        let block = self.current_block();
        self.backfill_until(block);
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<RootEvent> {
        std::mem::take(&mut self.events)
    }

    // === Epochs ===

    /// Create every epoch that should exist by the current block
    pub fn create_epochs(&mut self) -> Result<()> {
        self.ensure_not_paused()?;
        self.backfill();
        Ok(())
    }

    /// Create epochs up to `block_number`, capped at the current block
    pub fn create_epochs_until_block_number(&mut self, block_number: BlockNumber) -> Result<()> {
        self.ensure_not_paused()?;
        let target = block_number.min(self.current_block());
        self.backfill_until(target);
        Ok(())
    }

    /// Overwrite an epoch's bounds and reward without recomputing dependents
    pub fn override_epoch(
        &mut self,
        caller: &Address,
        epoch_id: EpochId,
        start_block: BlockNumber,
        end_block: BlockNumber,
        reward_amount: Amount,
    ) -> Result<()> {
        self.check_role(caller, Role::Maintainer)?;
        self.backfill();
        self.epochs
            .override_epoch(epoch_id, start_block, end_block, reward_amount)?;
        tracing::warn!(epoch_id, start_block, end_block, reward_amount, "Epoch overridden");
        self.emit(RootEvent::EpochOverridden {
            epoch_id,
            start_block,
            end_block,
            reward_amount,
        });
        Ok(())
    }

    // === DLPs ===

    /// Register a DLP and open its owner's registration stake
    pub fn register_dlp(&mut self, caller: &Address, info: DlpInfo, stake_value: Amount) -> Result<DlpId> {
        self.ensure_not_paused()?;
        self.backfill();
        self.registry
            .validate_registration(&info, stake_value, &self.config)?;

        let owner = info.owner;
        let event = RootEvent::DlpRegistered {
            dlp_id: self.registry.count() + 1,
            dlp_address: info.dlp_address,
            owner,
            treasury: info.treasury,
            stakers_percentage: info.stakers_percentage,
            name: info.name.clone(),
        };
        let dlp_id = self.registry.insert(info, self.current_block());
        tracing::info!(dlp_id, %owner, stake_value, "DLP registered");
        self.emit(event);

        self.collaborators.stakes_treasury.deposit(caller, stake_value);
        self.open_stake(owner, dlp_id, stake_value)?;
        Ok(dlp_id)
    }

    /// Owner update; the address identity is immutable
    pub fn update_dlp(&mut self, caller: &Address, dlp_id: DlpId, info: DlpInfo) -> Result<()> {
        self.ensure_not_paused()?;
        self.backfill();
        self.registry
            .validate_update(dlp_id, caller, &info, &self.config)?;

        let event = RootEvent::DlpUpdated {
            dlp_id,
            owner: info.owner,
            treasury: info.treasury,
            stakers_percentage: info.stakers_percentage,
            name: info.name.clone(),
        };
        let current_epoch = self.epochs.current_epoch_id();
        self.registry.apply_update(dlp_id, info, current_epoch)?;
        tracing::info!(dlp_id, "DLP updated");
        self.emit(event);
        Ok(())
    }

    pub fn update_dlp_verification(&mut self, caller: &Address, dlp_id: DlpId, verified: bool) -> Result<()> {
        self.check_role(caller, Role::Maintainer)?;
        self.backfill();
        self.registry.get(dlp_id)?;

        let change = self
            .registry
            .set_verification(dlp_id, verified, &self.config)?;
        tracing::info!(dlp_id, verified, "DLP verification updated");
        self.emit(RootEvent::DlpVerificationUpdated { dlp_id, verified });
        self.emit_status(change);
        Ok(())
    }

    /// Move a DLP to the terminal Deregistered state. Its stakes stay
    /// withdrawable and claimable.
    pub fn deregister_dlp(&mut self, caller: &Address, dlp_id: DlpId) -> Result<()> {
        self.ensure_not_paused()?;
        self.backfill();
        let from = self.registry.get(dlp_id)?.status;
        self.registry.deregister(dlp_id, caller)?;
        tracing::info!(dlp_id, %from, "DLP deregistered");
        self.emit(RootEvent::DlpDeregistered { dlp_id });
        self.emit_status(Some(StatusChange {
            dlp_id,
            from,
            to: DlpStatus::Deregistered,
        }));
        Ok(())
    }

    // === Stakes ===

    pub fn create_stake(&mut self, caller: &Address, dlp_id: DlpId, amount: Amount) -> Result<StakeId> {
        self.ensure_not_paused()?;
        self.backfill();

        let dlp = self.registry.get(dlp_id)?;
        if !dlp.status.is_active() {
            return Err(RootError::InvalidDlpStatus {
                dlp_id,
                status: dlp.status,
            });
        }
        if amount < self.config.min_stake_amount {
            return Err(RootError::InvalidStakeAmount {
                amount,
                min: self.config.min_stake_amount,
            });
        }

        self.collaborators.stakes_treasury.deposit(caller, amount);
        self.open_stake(*caller, dlp_id, amount)
    }

    fn open_stake(&mut self, staker: Address, dlp_id: DlpId, amount: Amount) -> Result<StakeId> {
        let start_block = self.current_block() + 1;
        let epoch_id = self.epochs.current_epoch_id();
        let stake_id = self.ledger.create(
            staker,
            dlp_id,
            amount,
            start_block,
            epoch_id.saturating_sub(1),
        );

        let change = self
            .registry
            .add_stake_amount(dlp_id, amount, &self.config)?;
        self.emit_status(change);

        let dlp = self.registry.get(dlp_id)?;
        if dlp.is_verified && dlp.status.is_ranked() {
            let epoch_end = self.epochs.current().end_block;
            let remaining_days = score::days_staked(start_block, epoch_end, self.config.blocks_per_day);
            let earned = score::score(amount, remaining_days, epoch_id <= 2);
            self.rewards
                .metrics_mut()
                .record(epoch_id, dlp_id, stake_id, amount.saturating_sub(earned));
        }

        tracing::info!(stake_id, %staker, dlp_id, amount, start_block, "Stake created");
        self.emit(RootEvent::StakeCreated {
            stake_id,
            staker,
            dlp_id,
            amount,
        });
        Ok(stake_id)
    }

    pub fn close_stakes(&mut self, caller: &Address, stake_ids: &[StakeId]) -> Result<()> {
        self.ensure_not_paused()?;
        self.check_batch(stake_ids.len())?;
        self.backfill();
        self.ledger.validate_close(caller, stake_ids)?;

        let end_block = self.current_block() + 1;
        let epoch_id = self.epochs.current_epoch_id();
        for &stake_id in stake_ids {
            let stake = self.ledger.close(stake_id, end_block)?;
            let (dlp_id, amount) = (stake.dlp_id, stake.amount);
            self.rewards.metrics_mut().reverse(stake_id, epoch_id);
            let change = self
                .registry
                .sub_stake_amount(dlp_id, amount, &self.config)?;
            tracing::info!(stake_id, dlp_id, amount, end_block, "Stake closed");
            self.emit(RootEvent::StakeClosed { stake_id });
            self.emit_status(change);
        }
        Ok(())
    }

    /// Return closed stakes' principal once the withdrawal delay in effect
    /// now has elapsed
    pub fn withdraw_stakes(&mut self, caller: &Address, stake_ids: &[StakeId]) -> Result<Amount> {
        self.ensure_not_paused()?;
        self.check_batch(stake_ids.len())?;
        self.backfill();
        let total = self.ledger.validate_withdraw(
            caller,
            stake_ids,
            self.current_block(),
            self.config.stake_withdrawal_delay,
        )?;

        self.collaborators
            .stakes_treasury
            .transfer(caller, total)
            .map_err(|e| RootError::TransferFailed(e.to_string()))?;

        for &stake_id in stake_ids {
            let amount = self.ledger.mark_withdrawn(stake_id)?;
            tracing::info!(stake_id, amount, "Stake withdrawn");
            self.emit(RootEvent::StakeWithdrawn { stake_id, amount });
        }
        Ok(total)
    }

    /// Pay every claimable epoch reward of the given stakes
    pub fn claim_stakes_reward(&mut self, caller: &Address, stake_ids: &[StakeId]) -> Result<Amount> {
        self.ensure_not_paused()?;
        self.check_batch(stake_ids.len())?;
        self.backfill();

        let current_block = self.current_block();
        let mut seen = std::collections::HashSet::new();
        let mut pending: HashMap<(DlpId, EpochId), Amount> = HashMap::new();
        let mut claims = Vec::with_capacity(stake_ids.len());
        for &stake_id in stake_ids {
            if !seen.insert(stake_id) {
                return Err(RootError::DuplicateEntry(stake_id));
            }
            let stake = self.ledger.ensure_owner(stake_id, caller)?;
            let claim = self
                .rewards
                .stake_claim(stake, &self.epochs, &self.config, current_block, &pending);
            for &(epoch_id, amount) in &claim.epochs {
                *pending.entry((stake.dlp_id, epoch_id)).or_insert(0) += amount;
            }
            claims.push((stake.dlp_id, claim));
        }

        let total: Amount = claims.iter().map(|(_, c)| c.amount).sum();
        if total > 0 {
            self.collaborators
                .rewards_treasury
                .transfer(caller, total)
                .map_err(|e| RootError::TransferFailed(e.to_string()))?;
        }

        for (dlp_id, claim) in claims {
            for &(epoch_id, amount) in &claim.epochs {
                self.epochs.dlp_epoch_mut(dlp_id, epoch_id).stakers_reward_claimed += amount;
                self.emit(RootEvent::StakeRewardClaimed {
                    stake_id: claim.stake_id,
                    epoch_id,
                    amount,
                });
            }
            self.ledger.get_mut(claim.stake_id)?.last_claimed_epoch_id = claim.last_claimed_epoch_id;
            if claim.amount > 0 {
                tracing::info!(
                    stake_id = claim.stake_id,
                    amount = claim.amount,
                    last_claimed_epoch_id = claim.last_claimed_epoch_id,
                    "Stake rewards claimed"
                );
            }
        }
        Ok(total)
    }

    // === Scores and ratings ===

    /// Write-once stake scores for ended epochs
    pub fn save_epoch_dlps_total_stakes_score(
        &mut self,
        caller: &Address,
        entries: &[StakesScoreEntry],
    ) -> Result<()> {
        self.check_role(caller, Role::Manager)?;
        self.store_stakes_scores(entries, false)
    }

    /// Overwrite stake scores, bypassing the write-once guard
    pub fn override_epoch_dlps_total_stakes_score(
        &mut self,
        caller: &Address,
        entries: &[StakesScoreEntry],
    ) -> Result<()> {
        self.check_role(caller, Role::Maintainer)?;
        self.store_stakes_scores(entries, true)
    }

    fn store_stakes_scores(&mut self, entries: &[StakesScoreEntry], override_existing: bool) -> Result<()> {
        self.check_batch(entries.len())?;
        self.backfill();
        self.rewards.validate_stakes_scores(
            entries,
            override_existing,
            &self.epochs,
            &self.registry,
            self.current_block(),
        )?;

        self.rewards.apply_stakes_scores(entries, &mut self.epochs);
        for entry in entries {
            if override_existing {
                tracing::warn!(
                    epoch_id = entry.epoch_id,
                    dlp_id = entry.dlp_id,
                    total_stakes_score = entry.total_stakes_score,
                    "Stakes score overridden"
                );
            } else {
                tracing::info!(
                    epoch_id = entry.epoch_id,
                    dlp_id = entry.dlp_id,
                    total_stakes_score = entry.total_stakes_score,
                    "Stakes score saved"
                );
            }
            self.emit(RootEvent::EpochDlpScoreSaved {
                epoch_id: entry.epoch_id,
                dlp_id: entry.dlp_id,
                total_stakes_score: entry.total_stakes_score,
            });
        }
        Ok(())
    }

    /// Store performance ratings and optionally finalize the epoch split
    pub fn save_epoch_performance_ratings(
        &mut self,
        caller: &Address,
        epoch_id: EpochId,
        should_finalize: bool,
        ratings: &[PerformanceRatingEntry],
    ) -> Result<()> {
        self.check_role(caller, Role::Manager)?;
        self.check_batch(ratings.len())?;
        self.backfill();
        self.rewards.validate_performance_ratings(
            epoch_id,
            should_finalize,
            ratings,
            &self.epochs,
            &self.registry,
            self.current_block(),
        )?;

        self.rewards
            .apply_performance_ratings(epoch_id, ratings, &mut self.epochs)?;
        for entry in ratings {
            self.emit(RootEvent::EpochDlpPerformanceRatingSaved {
                epoch_id,
                dlp_id: entry.dlp_id,
                performance_rating: entry.performance_rating,
            });
        }
        tracing::info!(epoch_id, ratings = ratings.len(), "Performance ratings saved");

        if should_finalize {
            self.rewards
                .finalize(epoch_id, &mut self.epochs, &self.registry, &self.config)?;
            self.emit(RootEvent::EpochFinalized { epoch_id });
        }
        Ok(())
    }

    /// Pay unpaid operator rewards of a finalized epoch to DLP treasuries.
    /// Returns the total paid.
    pub fn distribute_epoch_rewards(
        &mut self,
        caller: &Address,
        epoch_id: EpochId,
        max_dlps: usize,
    ) -> Result<Amount> {
        self.check_role(caller, Role::Manager)?;
        self.backfill();
        let payouts = self
            .rewards
            .pending_dlp_payouts(epoch_id, max_dlps, &self.epochs, &self.registry)?;

        let total: Amount = payouts.iter().map(|p| p.amount).sum();
        let available = self.collaborators.rewards_treasury.balance();
        if available < total {
            return Err(RootError::TransferFailed(format!(
                "rewards treasury holds {available}, {total} required"
            )));
        }

        for payout in payouts {
            self.collaborators
                .rewards_treasury
                .transfer(&payout.treasury, payout.amount)
                .map_err(|e| RootError::TransferFailed(e.to_string()))?;
            self.epochs.dlp_epoch_mut(payout.dlp_id, epoch_id).reward_claimed = true;
            tracing::info!(epoch_id, dlp_id = payout.dlp_id, amount = payout.amount, "DLP reward distributed");
            self.emit(RootEvent::DlpRewardDistributed {
                epoch_id,
                dlp_id: payout.dlp_id,
                amount: payout.amount,
            });
        }
        Ok(total)
    }

    // === Administration ===

    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        self.check_role(caller, Role::DefaultAdmin)?;
        if self.paused {
            return Err(RootError::EnforcedPause);
        }
        self.paused = true;
        tracing::warn!(account = %caller, "Paused");
        self.emit(RootEvent::Paused { account: *caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<()> {
        self.check_role(caller, Role::DefaultAdmin)?;
        if !self.paused {
            return Err(RootError::InvalidParam("not paused".into()));
        }
        self.paused = false;
        tracing::info!(account = %caller, "Unpaused");
        self.emit(RootEvent::Unpaused { account: *caller });
        Ok(())
    }

    /// Apply `change` to a copy of the config, validate, then commit
    fn update_config(
        &mut self,
        caller: &Address,
        role: Role,
        parameter: &str,
        change: impl FnOnce(&mut RootConfig),
    ) -> Result<()> {
        self.check_role(caller, role)?;
        let mut config = self.config.clone();
        change(&mut config);
        config.validate()?;
        self.backfill();
        self.config = config;
        tracing::info!(parameter, "Configuration updated");
        self.emit(RootEvent::ConfigUpdated {
            parameter: parameter.to_string(),
        });
        Ok(())
    }

    /// Applies to epochs created afterwards
    pub fn update_epoch_size(&mut self, caller: &Address, epoch_size: u64) -> Result<()> {
        self.update_config(caller, Role::DefaultAdmin, "epoch_size", |c| c.epoch_size = epoch_size)
    }

    /// Applies to epochs created afterwards
    pub fn update_epoch_reward_amount(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        self.update_config(caller, Role::DefaultAdmin, "epoch_reward_amount", |c| {
            c.epoch_reward_amount = amount
        })
    }

    pub fn update_epoch_dlps_limit(&mut self, caller: &Address, limit: usize) -> Result<()> {
        self.update_config(caller, Role::Maintainer, "epoch_dlps_limit", |c| c.epoch_dlps_limit = limit)
    }

    pub fn update_min_stake_amount(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        self.update_config(caller, Role::Maintainer, "min_stake_amount", |c| c.min_stake_amount = amount)
    }

    pub fn update_min_dlp_stakers_percentage(&mut self, caller: &Address, percentage: Amount) -> Result<()> {
        self.update_config(caller, Role::Maintainer, "min_dlp_stakers_percentage", |c| {
            c.min_dlp_stakers_percentage = percentage
        })
    }

    pub fn update_min_dlp_registration_stake(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        self.update_config(caller, Role::Maintainer, "min_dlp_registration_stake", |c| {
            c.min_dlp_registration_stake = amount
        })
    }

    /// Change both thresholds and re-derive every live DLP's status
    pub fn update_dlp_eligibility_thresholds(
        &mut self,
        caller: &Address,
        sub_eligibility_threshold: Amount,
        eligibility_threshold: Amount,
    ) -> Result<()> {
        self.update_config(caller, Role::Maintainer, "dlp_eligibility_thresholds", |c| {
            c.dlp_sub_eligibility_threshold = sub_eligibility_threshold;
            c.dlp_eligibility_threshold = eligibility_threshold;
        })?;
        for change in self.registry.refresh_all(&self.config) {
            self.emit_status(Some(change));
        }
        Ok(())
    }

    pub fn update_stake_withdrawal_delay(&mut self, caller: &Address, delay: u64) -> Result<()> {
        self.update_config(caller, Role::Maintainer, "stake_withdrawal_delay", |c| {
            c.stake_withdrawal_delay = delay
        })
    }

    pub fn update_reward_claim_delay(&mut self, caller: &Address, delay: u64) -> Result<()> {
        self.update_config(caller, Role::Maintainer, "reward_claim_delay", |c| {
            c.reward_claim_delay = delay
        })
    }

    pub fn update_rating_percentages(
        &mut self,
        caller: &Address,
        stake_rating_percentage: Amount,
        performance_rating_percentage: Amount,
    ) -> Result<()> {
        if stake_rating_percentage > ONE_HUNDRED_PERCENT {
            return Err(RootError::InvalidRatingPercentages);
        }
        self.update_config(caller, Role::Maintainer, "rating_percentages", |c| {
            c.stake_rating_percentage = stake_rating_percentage;
            c.performance_rating_percentage = performance_rating_percentage;
        })
    }

    // === Views ===

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn dlps(&self, dlp_id: DlpId) -> Result<&Dlp> {
        self.registry.get(dlp_id)
    }

    pub fn dlps_by_address(&self, dlp_address: &Address) -> Result<&Dlp> {
        self.registry.by_address(dlp_address)
    }

    pub fn dlps_by_name(&self, name: &str) -> Option<&Dlp> {
        self.registry.by_name(name)
    }

    pub fn dlps_count(&self) -> u64 {
        self.registry.count()
    }

    pub fn eligible_dlps_list(&self) -> Vec<DlpId> {
        self.registry.eligible().to_vec()
    }

    pub fn stakes(&self, stake_id: StakeId) -> Result<&Stake> {
        self.ledger.get(stake_id)
    }

    pub fn stakes_count(&self) -> u64 {
        self.ledger.count()
    }

    pub fn staker_stake_ids(&self, staker: &Address) -> Vec<StakeId> {
        self.ledger.staker_stake_ids(staker)
    }

    pub fn staker_dlp_ids(&self, staker: &Address) -> Vec<DlpId> {
        self.ledger.staker_dlp_ids(staker)
    }

    pub fn staker_dlps_count(&self, staker: &Address) -> usize {
        self.ledger.staker_dlps_count(staker)
    }

    pub fn staker_total_stake_amount(&self, staker: &Address) -> Amount {
        self.ledger.staker_total_stake_amount(staker)
    }

    pub fn dlp_stake_ids(&self, dlp_id: DlpId) -> Vec<StakeId> {
        self.ledger.dlp_stake_ids(dlp_id)
    }

    pub fn epochs(&self, epoch_id: EpochId) -> Result<&Epoch> {
        self.epochs.get(epoch_id)
    }

    pub fn epochs_count(&self) -> u64 {
        self.epochs.count()
    }

    pub fn current_epoch_id(&self) -> EpochId {
        self.epochs.current_epoch_id()
    }

    pub fn dlp_epochs(&self, dlp_id: DlpId, epoch_id: EpochId) -> Option<&DlpEpoch> {
        self.epochs.dlp_epoch(dlp_id, epoch_id)
    }

    /// Live top-K ranking, not persisted
    pub fn top_dlp_ids(&self, k: usize) -> Vec<DlpId> {
        top_dlp_ids(&self.registry, k)
    }

    pub fn calculate_stake_claimable_amount(&self, stake_id: StakeId) -> Result<Amount> {
        let stake = self.ledger.get(stake_id)?;
        let claim = self.rewards.stake_claim(
            stake,
            &self.epochs,
            &self.config,
            self.current_block(),
            &HashMap::new(),
        );
        Ok(claim.amount)
    }

    pub fn estimated_epoch_dlp_stakes_score(&self, epoch_id: EpochId, dlp_id: DlpId) -> Result<Amount> {
        self.epochs.get(epoch_id)?;
        self.registry.get(dlp_id)?;
        Ok(self
            .rewards
            .estimated_stakes_score(epoch_id, dlp_id, &self.epochs, &self.registry))
    }
}
