//! # Stake Ledger
//!
//! Individual stakes and the indexes over them.
//!
//! ## Stake Lifecycle
//!
//! | State | Counted in DLP total | Next step |
//! |-------|----------------------|-----------|
//! | Open | yes | close |
//! | Closed | no | withdraw after the withdrawal delay |
//! | Withdrawn | no | none (rewards stay claimable) |
//!
//! A stake contributes to its DLP over `[start_block, end_block)`.

use crate::index::IdSet;
use dlp_core::{Address, Amount, BlockNumber, DlpId, EpochId, Result, RootError, StakeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single stake position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub id: StakeId,
    pub staker: Address,
    pub dlp_id: DlpId,
    pub amount: Amount,
    /// First block the stake counts
    pub start_block: BlockNumber,
    /// First block the stake no longer counts; `None` while open
    pub end_block: Option<BlockNumber>,
    pub withdrawn: bool,
    /// Last epoch whose rewards were settled for this stake
    pub last_claimed_epoch_id: EpochId,
}

impl Stake {
    pub fn is_closed(&self) -> bool {
        self.end_block.is_some()
    }

    /// Whether the stake counts at any block of `[start, end]`
    pub fn overlaps(&self, start: BlockNumber, end: BlockNumber) -> bool {
        self.start_block <= end && self.end_block.map_or(true, |e| e > start)
    }
}

#[derive(Debug, Default)]
pub struct StakeLedger {
    /// Indexed by `id - 1`
    stakes: Vec<Stake>,
    staker_stakes: HashMap<Address, IdSet>,
    staker_dlps: HashMap<Address, IdSet>,
    dlp_stakes: HashMap<DlpId, IdSet>,
    /// Open stake total per (staker, DLP)
    staker_dlp_amount: HashMap<(Address, DlpId), Amount>,
    /// Open stake total per staker
    staker_total: HashMap<Address, Amount>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.stakes.len() as u64
    }

    pub fn get(&self, stake_id: StakeId) -> Result<&Stake> {
        stake_id
            .checked_sub(1)
            .and_then(|i| self.stakes.get(i as usize))
            .ok_or(RootError::StakeNotFound(stake_id))
    }

    pub fn get_mut(&mut self, stake_id: StakeId) -> Result<&mut Stake> {
        stake_id
            .checked_sub(1)
            .and_then(|i| self.stakes.get_mut(i as usize))
            .ok_or(RootError::StakeNotFound(stake_id))
    }

    /// Fail unless `caller` owns the stake
    pub fn ensure_owner(&self, stake_id: StakeId, caller: &Address) -> Result<&Stake> {
        let stake = self.get(stake_id)?;
        if stake.staker != *caller {
            return Err(RootError::NotStakeOwner(stake_id));
        }
        Ok(stake)
    }

    /// Record a new open stake
    pub fn create(
        &mut self,
        staker: Address,
        dlp_id: DlpId,
        amount: Amount,
        start_block: BlockNumber,
        last_claimed_epoch_id: EpochId,
    ) -> StakeId {
        let id = self.count() + 1;
        self.stakes.push(Stake {
            id,
            staker,
            dlp_id,
            amount,
            start_block,
            end_block: None,
            withdrawn: false,
            last_claimed_epoch_id,
        });

        self.staker_stakes.entry(staker).or_default().insert(id);
        self.staker_dlps.entry(staker).or_default().insert(dlp_id);
        self.dlp_stakes.entry(dlp_id).or_default().insert(id);
        let dlp_total = self.staker_dlp_amount.entry((staker, dlp_id)).or_insert(0);
        *dlp_total = dlp_total.saturating_add(amount);
        let total = self.staker_total.entry(staker).or_insert(0);
        *total = total.saturating_add(amount);
        id
    }

    /// Check a close batch: ownership, open state, no duplicates
    pub fn validate_close(&self, caller: &Address, stake_ids: &[StakeId]) -> Result<()> {
        let mut seen = HashSet::with_capacity(stake_ids.len());
        for &id in stake_ids {
            if !seen.insert(id) {
                return Err(RootError::DuplicateEntry(id));
            }
            let stake = self.ensure_owner(id, caller)?;
            if stake.withdrawn {
                return Err(RootError::StakeAlreadyWithdrawn(id));
            }
            if stake.is_closed() {
                return Err(RootError::StakeAlreadyClosed(id));
            }
        }
        Ok(())
    }

    /// Close a validated stake effective from `end_block`
    pub fn close(&mut self, stake_id: StakeId, end_block: BlockNumber) -> Result<&Stake> {
        let stake = self.get_mut(stake_id)?;
        if stake.is_closed() {
            return Err(RootError::StakeAlreadyClosed(stake_id));
        }
        stake.end_block = Some(end_block);
        let (staker, dlp_id, amount) = (stake.staker, stake.dlp_id, stake.amount);

        if let Some(total) = self.staker_total.get_mut(&staker) {
            *total = total.saturating_sub(amount);
        }
        let remaining = self
            .staker_dlp_amount
            .get_mut(&(staker, dlp_id))
            .map(|open| {
                *open = open.saturating_sub(amount);
                *open
            })
            .unwrap_or(0);
        if remaining == 0 {
            self.staker_dlp_amount.remove(&(staker, dlp_id));
            if let Some(dlps) = self.staker_dlps.get_mut(&staker) {
                dlps.remove(dlp_id);
            }
        }
        self.get(stake_id)
    }

    /// Check a withdrawal batch and return the total principal to release
    pub fn validate_withdraw(
        &self,
        caller: &Address,
        stake_ids: &[StakeId],
        current_block: BlockNumber,
        withdrawal_delay: u64,
    ) -> Result<Amount> {
        let mut seen = HashSet::with_capacity(stake_ids.len());
        let mut total: Amount = 0;
        for &id in stake_ids {
            if !seen.insert(id) {
                return Err(RootError::DuplicateEntry(id));
            }
            let stake = self.ensure_owner(id, caller)?;
            if stake.withdrawn {
                return Err(RootError::StakeAlreadyWithdrawn(id));
            }
            let end_block = stake.end_block.ok_or(RootError::StakeNotClosed(id))?;
            let available_at = end_block.saturating_add(withdrawal_delay);
            if current_block < available_at {
                return Err(RootError::WithdrawalTooEarly {
                    stake_id: id,
                    available_at,
                });
            }
            total = total.saturating_add(stake.amount);
        }
        Ok(total)
    }

    pub fn mark_withdrawn(&mut self, stake_id: StakeId) -> Result<Amount> {
        let stake = self.get_mut(stake_id)?;
        if stake.withdrawn {
            return Err(RootError::StakeAlreadyWithdrawn(stake_id));
        }
        stake.withdrawn = true;
        Ok(stake.amount)
    }

    pub fn staker_stake_ids(&self, staker: &Address) -> Vec<StakeId> {
        self.staker_stakes.get(staker).map(IdSet::to_vec).unwrap_or_default()
    }

    /// DLPs in which the staker holds at least one open stake
    pub fn staker_dlp_ids(&self, staker: &Address) -> Vec<DlpId> {
        self.staker_dlps.get(staker).map(IdSet::to_vec).unwrap_or_default()
    }

    pub fn staker_dlps_count(&self, staker: &Address) -> usize {
        self.staker_dlps.get(staker).map_or(0, IdSet::len)
    }

    /// Open stake total across every DLP
    pub fn staker_total_stake_amount(&self, staker: &Address) -> Amount {
        self.staker_total.get(staker).copied().unwrap_or(0)
    }

    /// Open stake total in one DLP
    pub fn staker_dlp_stake_amount(&self, staker: &Address, dlp_id: DlpId) -> Amount {
        self.staker_dlp_amount.get(&(*staker, dlp_id)).copied().unwrap_or(0)
    }

    pub fn dlp_stake_ids(&self, dlp_id: DlpId) -> Vec<StakeId> {
        self.dlp_stakes.get(&dlp_id).map(IdSet::to_vec).unwrap_or_default()
    }
}
