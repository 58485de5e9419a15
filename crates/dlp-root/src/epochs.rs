//! # Epoch Scheduler
//!
//! Epochs are contiguous, non-overlapping block ranges created lazily: any
//! mutating call first backfills every epoch that should exist by the
//! current block. Epoch 0 covers `[0, epoch_start_block - 1]`.
//!
//! When a backfill runs, the top-K set is computed once and captured into
//! every new epoch together with a per-DLP [`DlpEpoch`] record. The members
//! of the epoch being closed get their end-of-epoch stake total recorded.

use crate::config::RootConfig;
use crate::registry::DlpRegistry;
use crate::top_dlps::top_dlp_ids;
use dlp_core::{Amount, BlockNumber, DlpId, EpochId, Result, RootError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    pub id: EpochId,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
    pub reward_amount: Amount,
    /// Top-K DLPs captured when the epoch was created
    pub dlp_ids: Vec<DlpId>,
    /// Sum of submitted performance ratings
    pub total_performance_rating: Amount,
    pub is_finalized: bool,
}

impl Epoch {
    /// Whether `block` is past the epoch's last block
    pub fn has_ended(&self, block: BlockNumber) -> bool {
        block > self.end_block
    }
}

/// Per-(DLP, epoch) accounting record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlpEpoch {
    /// DLP stake total, refreshed when the epoch closes
    pub stake_amount: Amount,
    pub is_top_dlp: bool,
    /// Stakers percentage frozen for this epoch's split
    pub stakers_percentage: Amount,
    pub total_stakes_score: Amount,
    /// Write-once guard for `total_stakes_score`
    pub stakes_score_saved: bool,
    pub performance_rating: Amount,
    /// Blended rating computed at finalization
    pub rating: Amount,
    /// DLP operator reward
    pub reward_amount: Amount,
    pub stakers_reward_amount: Amount,
    pub reward_claimed: bool,
    pub stakers_reward_claimed: Amount,
}

#[derive(Debug)]
pub struct EpochScheduler {
    /// Indexed by epoch id
    epochs: Vec<Epoch>,
    dlp_epochs: HashMap<(DlpId, EpochId), DlpEpoch>,
}

impl EpochScheduler {
    /// Scheduler holding only epoch 0
    pub fn new(config: &RootConfig) -> Self {
        let genesis = Epoch {
            id: 0,
            start_block: 0,
            end_block: config.epoch_start_block.saturating_sub(1),
            ..Epoch::default()
        };
        Self {
            epochs: vec![genesis],
            dlp_epochs: HashMap::new(),
        }
    }

    /// Id of the latest existing epoch
    pub fn current_epoch_id(&self) -> EpochId {
        self.epochs.len() as EpochId - 1
    }

    /// Number of epochs including epoch 0
    pub fn count(&self) -> u64 {
        self.epochs.len() as u64
    }

    pub fn current(&self) -> &Epoch {
        &self.epochs[self.epochs.len() - 1]
    }

    pub fn get(&self, epoch_id: EpochId) -> Result<&Epoch> {
        self.epochs
            .get(epoch_id as usize)
            .ok_or(RootError::EpochNotFound(epoch_id))
    }

    pub fn get_mut(&mut self, epoch_id: EpochId) -> Result<&mut Epoch> {
        self.epochs
            .get_mut(epoch_id as usize)
            .ok_or(RootError::EpochNotFound(epoch_id))
    }

    pub fn dlp_epoch(&self, dlp_id: DlpId, epoch_id: EpochId) -> Option<&DlpEpoch> {
        self.dlp_epochs.get(&(dlp_id, epoch_id))
    }

    /// Record for `(dlp_id, epoch_id)`, created empty if absent
    pub fn dlp_epoch_mut(&mut self, dlp_id: DlpId, epoch_id: EpochId) -> &mut DlpEpoch {
        self.dlp_epochs.entry((dlp_id, epoch_id)).or_default()
    }

    /// Create every epoch whose start is at or before `target_block`.
    /// Returns the created epochs in order.
    pub fn create_epochs_until(
        &mut self,
        target_block: BlockNumber,
        config: &RootConfig,
        registry: &mut DlpRegistry,
    ) -> Vec<Epoch> {
        if self.current().end_block >= target_block {
            return Vec::new();
        }

        let top = top_dlp_ids(registry, config.epoch_dlps_limit);
        let mut created = Vec::new();

        while self.current().end_block < target_block {
            let closing = self.current().clone();
            for &dlp_id in &closing.dlp_ids {
                if let Ok(dlp) = registry.get(dlp_id) {
                    self.dlp_epoch_mut(dlp_id, closing.id).stake_amount = dlp.stake_amount;
                }
            }

            let id = closing.id + 1;
            let start_block = closing.end_block + 1;
            let epoch = Epoch {
                id,
                start_block,
                end_block: start_block + config.epoch_size - 1,
                reward_amount: config.epoch_reward_amount,
                dlp_ids: top.clone(),
                ..Epoch::default()
            };

            for &dlp_id in &top {
                if let Ok(dlp) = registry.get_mut(dlp_id) {
                    dlp.epoch_ids.push(id);
                    let record = DlpEpoch {
                        stake_amount: dlp.stake_amount,
                        is_top_dlp: true,
                        stakers_percentage: dlp.stakers_percentage_epoch(id),
                        ..DlpEpoch::default()
                    };
                    self.dlp_epochs.insert((dlp_id, id), record);
                }
            }

            tracing::info!(
                epoch_id = id,
                start_block = epoch.start_block,
                end_block = epoch.end_block,
                top_dlps = top.len(),
                "Epoch created"
            );
            self.epochs.push(epoch.clone());
            created.push(epoch);
        }
        created
    }

    /// Overwrite an epoch's bounds and reward. Neighbouring epochs and
    /// per-DLP records are left untouched.
    pub fn override_epoch(
        &mut self,
        epoch_id: EpochId,
        start_block: BlockNumber,
        end_block: BlockNumber,
        reward_amount: Amount,
    ) -> Result<&Epoch> {
        if start_block > end_block {
            return Err(RootError::InvalidEpochRange { start_block, end_block });
        }

        let epoch = self.get_mut(epoch_id)?;
        epoch.start_block = start_block;
        epoch.end_block = end_block;
        epoch.reward_amount = reward_amount;
        tracing::info!(epoch_id, start_block, end_block, "Epoch overridden");
        Ok(epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DlpInfo;
    use dlp_core::constants::{ONE_PERCENT, ONE_TOKEN};
    use dlp_core::Address;

    fn config() -> RootConfig {
        RootConfig {
            epoch_start_block: 100,
            epoch_size: 50,
            epoch_dlps_limit: 2,
            ..RootConfig::default()
        }
    }

    fn register(registry: &mut DlpRegistry, name: &str, stake: Amount, config: &RootConfig) -> DlpId {
        let id = registry.insert(
            DlpInfo {
                dlp_address: Address::from_seed(name.as_bytes()),
                owner: Address::from_seed(b"owner"),
                treasury: Address::from_seed(b"treasury"),
                stakers_percentage: 60 * ONE_PERCENT,
                name: name.to_string(),
                ..DlpInfo::default()
            },
            1,
        );
        registry.set_verification(id, true, config).unwrap();
        registry.add_stake_amount(id, stake, config).unwrap();
        id
    }

    #[test]
    fn test_genesis_epoch() {
        let scheduler = EpochScheduler::new(&config());
        let genesis = scheduler.get(0).unwrap();
        assert_eq!((genesis.start_block, genesis.end_block), (0, 99));
        assert_eq!(scheduler.current_epoch_id(), 0);
    }

    #[test]
    fn test_backfill_is_contiguous() {
        let c = config();
        let mut registry = DlpRegistry::new();
        let mut scheduler = EpochScheduler::new(&c);

        let created = scheduler.create_epochs_until(260, &c, &mut registry);
        assert_eq!(created.len(), 4);
        assert_eq!(scheduler.current_epoch_id(), 4);

        for id in 1..scheduler.count() {
            let prev = scheduler.get(id - 1).unwrap();
            let epoch = scheduler.get(id).unwrap();
            assert_eq!(epoch.start_block, prev.end_block + 1);
            assert_eq!(epoch.end_block - epoch.start_block + 1, c.epoch_size);
        }
        assert!(scheduler.current().start_block <= 260);
        assert!(scheduler.current().end_block >= 260);
    }

    #[test]
    fn test_backfill_is_idempotent() {
        let c = config();
        let mut registry = DlpRegistry::new();
        let mut scheduler = EpochScheduler::new(&c);

        scheduler.create_epochs_until(120, &c, &mut registry);
        assert!(scheduler.create_epochs_until(120, &c, &mut registry).is_empty());
        assert!(scheduler.create_epochs_until(149, &c, &mut registry).is_empty());
        assert_eq!(scheduler.current_epoch_id(), 1);
    }

    #[test]
    fn test_snapshot_captures_top_dlps() {
        let c = config();
        let mut registry = DlpRegistry::new();
        let a = register(&mut registry, "a", 150 * ONE_TOKEN, &c);
        let b = register(&mut registry, "b", 300 * ONE_TOKEN, &c);
        let _c = register(&mut registry, "c", 200 * ONE_TOKEN, &c);
        let mut scheduler = EpochScheduler::new(&c);

        scheduler.create_epochs_until(100, &c, &mut registry);
        let epoch = scheduler.get(1).unwrap();
        assert_eq!(epoch.dlp_ids, vec![b, 3]);

        let record = scheduler.dlp_epoch(b, 1).unwrap();
        assert!(record.is_top_dlp);
        assert_eq!(record.stake_amount, 300 * ONE_TOKEN);
        assert_eq!(record.stakers_percentage, 60 * ONE_PERCENT);
        assert!(scheduler.dlp_epoch(a, 1).is_none());
        assert_eq!(registry.get(b).unwrap().epoch_ids, vec![1]);
    }

    #[test]
    fn test_closing_epoch_records_final_stake() {
        let c = config();
        let mut registry = DlpRegistry::new();
        let a = register(&mut registry, "a", 150 * ONE_TOKEN, &c);
        let mut scheduler = EpochScheduler::new(&c);

        scheduler.create_epochs_until(100, &c, &mut registry);
        registry.add_stake_amount(a, 50 * ONE_TOKEN, &c).unwrap();
        scheduler.create_epochs_until(150, &c, &mut registry);

        assert_eq!(scheduler.dlp_epoch(a, 1).unwrap().stake_amount, 200 * ONE_TOKEN);
    }

    #[test]
    fn test_override_overwrites_fields() {
        let c = config();
        let mut registry = DlpRegistry::new();
        let mut scheduler = EpochScheduler::new(&c);
        scheduler.create_epochs_until(160, &c, &mut registry);

        // Epoch 1 is [100, 149], epoch 2 is [150, 199]
        assert!(matches!(
            scheduler.override_epoch(2, 150, 140, ONE_TOKEN),
            Err(RootError::InvalidEpochRange { .. })
        ));
        assert!(matches!(scheduler.override_epoch(9, 1, 2, ONE_TOKEN), Err(RootError::EpochNotFound(9))));

        // Shortening epoch 1 leaves epoch 2 as it was
        let epoch = scheduler.override_epoch(1, 100, 140, 5 * ONE_TOKEN).unwrap();
        assert_eq!((epoch.start_block, epoch.end_block), (100, 140));
        assert_eq!(scheduler.get(2).unwrap().start_block, 150);

        scheduler.get_mut(1).unwrap().is_finalized = true;
        let epoch = scheduler.override_epoch(1, 100, 149, 9 * ONE_TOKEN).unwrap();
        assert_eq!(epoch.reward_amount, 9 * ONE_TOKEN);
        assert!(epoch.is_finalized);

        let epoch = scheduler.override_epoch(2, 150, 400, 7 * ONE_TOKEN).unwrap();
        assert_eq!(epoch.end_block, 400);
        assert_eq!(epoch.reward_amount, 7 * ONE_TOKEN);
        assert!(scheduler.create_epochs_until(390, &c, &mut registry).is_empty());
    }
}
