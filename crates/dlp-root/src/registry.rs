//! # DLP Registry
//!
//! Owns every registered DLP. Status is derived from the DLP's live stake
//! total and its verification flag:
//!
//! | Verified | Stake total | Status |
//! |----------|-------------|--------|
//! | no | any | Registered |
//! | yes | >= eligibility threshold | Eligible |
//! | yes | >= sub-eligibility threshold | SubEligible |
//! | yes | below both | Registered |
//!
//! `Deregistered` is terminal and never re-derived. The eligible index holds
//! exactly the DLPs whose status is `Eligible`.

use crate::config::RootConfig;
use crate::index::IdSet;
use dlp_core::constants::ONE_HUNDRED_PERCENT;
use dlp_core::{Address, Amount, BlockNumber, DlpId, DlpStatus, EpochId, Result, RootError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registration / update payload
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlpInfo {
    /// On-chain identity; fixed at registration
    pub dlp_address: Address,
    pub owner: Address,
    /// Receives the DLP operator's reward share
    pub treasury: Address,
    /// Share of earned rewards redirected to stakers (1e18 = 100%)
    pub stakers_percentage: Amount,
    pub name: String,
    pub icon_url: String,
    pub website: String,
    pub metadata: String,
}

/// A value whose updates take effect from the next epoch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredValue {
    /// `(effective_from, value)`, ascending by epoch
    history: Vec<(EpochId, Amount)>,
}

impl DeferredValue {
    pub fn new(value: Amount) -> Self {
        Self {
            history: vec![(0, value)],
        }
    }

    /// Value in effect during `epoch_id`
    pub fn value_at(&self, epoch_id: EpochId) -> Amount {
        self.history
            .iter()
            .rev()
            .find(|(from, _)| *from <= epoch_id)
            .map_or(0, |(_, value)| *value)
    }

    /// Most recently requested value, effective or not
    pub fn latest(&self) -> Amount {
        self.history.last().map_or(0, |(_, value)| *value)
    }

    /// Request `value`, effective from the epoch after `current_epoch`.
    /// A second request in the same epoch replaces the first.
    pub fn schedule(&mut self, value: Amount, current_epoch: EpochId) {
        let from = current_epoch + 1;
        match self.history.last_mut() {
            Some(last) if last.0 == from => last.1 = value,
            _ => self.history.push((from, value)),
        }
    }
}

/// A registered DLP
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dlp {
    pub id: DlpId,
    pub dlp_address: Address,
    pub owner: Address,
    pub treasury: Address,
    pub name: String,
    pub icon_url: String,
    pub website: String,
    pub metadata: String,
    pub stakers_percentage: DeferredValue,
    pub is_verified: bool,
    pub status: DlpStatus,
    /// Sum of all open stakes
    pub stake_amount: Amount,
    pub registration_block: BlockNumber,
    /// Epochs in which this DLP was part of the top-K set
    pub epoch_ids: Vec<EpochId>,
}

impl Dlp {
    /// Latest configured stakers percentage
    pub fn stakers_percentage(&self) -> Amount {
        self.stakers_percentage.latest()
    }

    /// Stakers percentage in effect for `epoch_id`
    pub fn stakers_percentage_epoch(&self, epoch_id: EpochId) -> Amount {
        self.stakers_percentage.value_at(epoch_id)
    }
}

/// Status as a pure function of stake total and verification
pub fn derive_status(
    current: DlpStatus,
    stake_amount: Amount,
    is_verified: bool,
    config: &RootConfig,
) -> DlpStatus {
    if current == DlpStatus::Deregistered {
        DlpStatus::Deregistered
    } else if !is_verified {
        DlpStatus::Registered
    } else if stake_amount >= config.dlp_eligibility_threshold {
        DlpStatus::Eligible
    } else if stake_amount >= config.dlp_sub_eligibility_threshold {
        DlpStatus::SubEligible
    } else {
        DlpStatus::Registered
    }
}

/// Status transition produced by a re-derivation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub dlp_id: DlpId,
    pub from: DlpStatus,
    pub to: DlpStatus,
}

#[derive(Debug, Default)]
pub struct DlpRegistry {
    /// Indexed by `id - 1`
    dlps: Vec<Dlp>,
    by_address: HashMap<Address, DlpId>,
    by_name: HashMap<String, DlpId>,
    eligible: IdSet,
}

impl DlpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.dlps.len() as u64
    }

    pub fn get(&self, dlp_id: DlpId) -> Result<&Dlp> {
        dlp_id
            .checked_sub(1)
            .and_then(|i| self.dlps.get(i as usize))
            .ok_or(RootError::DlpNotFound(dlp_id))
    }

    pub fn get_mut(&mut self, dlp_id: DlpId) -> Result<&mut Dlp> {
        dlp_id
            .checked_sub(1)
            .and_then(|i| self.dlps.get_mut(i as usize))
            .ok_or(RootError::DlpNotFound(dlp_id))
    }

    pub fn by_address(&self, dlp_address: &Address) -> Result<&Dlp> {
        let id = self
            .by_address
            .get(dlp_address)
            .ok_or(RootError::DlpAddressNotFound(*dlp_address))?;
        self.get(*id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Dlp> {
        self.by_name.get(name).and_then(|id| self.get(*id).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dlp> {
        self.dlps.iter()
    }

    /// The eligible index
    pub fn eligible(&self) -> &IdSet {
        &self.eligible
    }

    /// Fail unless `caller` owns the DLP
    pub fn ensure_owner(&self, dlp_id: DlpId, caller: &Address) -> Result<&Dlp> {
        let dlp = self.get(dlp_id)?;
        if dlp.owner != *caller {
            return Err(RootError::NotDlpOwner(dlp_id));
        }
        Ok(dlp)
    }

    fn validate_info(&self, info: &DlpInfo, existing: Option<DlpId>, config: &RootConfig) -> Result<()> {
        if info.owner.is_zero() || info.treasury.is_zero() || info.dlp_address.is_zero() {
            return Err(RootError::InvalidAddress);
        }
        if info.stakers_percentage < config.min_dlp_stakers_percentage
            || info.stakers_percentage > ONE_HUNDRED_PERCENT
        {
            return Err(RootError::InvalidStakersPercentage(info.stakers_percentage));
        }
        if info.name.trim().is_empty() {
            return Err(RootError::InvalidName);
        }
        match self.by_name.get(&info.name) {
            Some(id) if Some(*id) != existing => Err(RootError::DlpNameTaken(info.name.clone())),
            _ => Ok(()),
        }
    }

    /// Check a registration request without touching state
    pub fn validate_registration(
        &self,
        info: &DlpInfo,
        stake_value: Amount,
        config: &RootConfig,
    ) -> Result<()> {
        self.validate_info(info, None, config)?;
        // Deregistered records are tombstones; their address is never reused
        if self.by_address.contains_key(&info.dlp_address) {
            return Err(RootError::DlpAddressAlreadyRegistered(info.dlp_address));
        }
        let min = config
            .min_dlp_registration_stake
            .max(config.min_stake_amount);
        if stake_value < min {
            return Err(RootError::InvalidStakeAmount {
                amount: stake_value,
                min,
            });
        }
        Ok(())
    }

    /// Insert a validated registration with a zero stake total
    pub fn insert(&mut self, info: DlpInfo, block: BlockNumber) -> DlpId {
        let id = self.count() + 1;
        self.by_address.insert(info.dlp_address, id);
        self.by_name.insert(info.name.clone(), id);
        self.dlps.push(Dlp {
            id,
            dlp_address: info.dlp_address,
            owner: info.owner,
            treasury: info.treasury,
            name: info.name,
            icon_url: info.icon_url,
            website: info.website,
            metadata: info.metadata,
            stakers_percentage: DeferredValue::new(info.stakers_percentage),
            is_verified: false,
            status: DlpStatus::Registered,
            stake_amount: 0,
            registration_block: block,
            epoch_ids: Vec::new(),
        });
        id
    }

    /// Check an update request without touching state
    pub fn validate_update(
        &self,
        dlp_id: DlpId,
        caller: &Address,
        info: &DlpInfo,
        config: &RootConfig,
    ) -> Result<()> {
        let dlp = self.ensure_owner(dlp_id, caller)?;
        if dlp.status == DlpStatus::Deregistered {
            return Err(RootError::InvalidDlpStatus {
                dlp_id,
                status: dlp.status,
            });
        }
        if info.dlp_address != dlp.dlp_address {
            return Err(RootError::InvalidAddress);
        }
        self.validate_info(info, Some(dlp_id), config)
    }

    /// Apply a validated update. The stakers percentage takes effect from
    /// the epoch after `current_epoch`.
    pub fn apply_update(&mut self, dlp_id: DlpId, info: DlpInfo, current_epoch: EpochId) -> Result<()> {
        let old_name = self.get(dlp_id)?.name.clone();
        if old_name != info.name {
            self.by_name.remove(&old_name);
            self.by_name.insert(info.name.clone(), dlp_id);
        }

        let dlp = self.get_mut(dlp_id)?;
        dlp.owner = info.owner;
        dlp.treasury = info.treasury;
        dlp.name = info.name;
        dlp.icon_url = info.icon_url;
        dlp.website = info.website;
        dlp.metadata = info.metadata;
        if dlp.stakers_percentage.latest() != info.stakers_percentage {
            dlp.stakers_percentage
                .schedule(info.stakers_percentage, current_epoch);
        }
        Ok(())
    }

    /// Re-derive status and eligible-index membership
    pub fn refresh_status(&mut self, dlp_id: DlpId, config: &RootConfig) -> Result<Option<StatusChange>> {
        let dlp = self.get_mut(dlp_id)?;
        let from = dlp.status;
        let to = derive_status(from, dlp.stake_amount, dlp.is_verified, config);
        dlp.status = to;

        if to == DlpStatus::Eligible {
            self.eligible.insert(dlp_id);
        } else {
            self.eligible.remove(dlp_id);
        }

        if from == to {
            return Ok(None);
        }
        tracing::debug!(dlp_id, %from, %to, "DLP status changed");
        Ok(Some(StatusChange { dlp_id, from, to }))
    }

    /// Re-derive every live DLP (after a threshold change)
    pub fn refresh_all(&mut self, config: &RootConfig) -> Vec<StatusChange> {
        let ids: Vec<DlpId> = self
            .dlps
            .iter()
            .filter(|d| d.status != DlpStatus::Deregistered)
            .map(|d| d.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.refresh_status(id, config).ok().flatten())
            .collect()
    }

    pub fn set_verification(
        &mut self,
        dlp_id: DlpId,
        verified: bool,
        config: &RootConfig,
    ) -> Result<Option<StatusChange>> {
        self.get_mut(dlp_id)?.is_verified = verified;
        self.refresh_status(dlp_id, config)
    }

    pub fn add_stake_amount(&mut self, dlp_id: DlpId, amount: Amount, config: &RootConfig) -> Result<Option<StatusChange>> {
        let dlp = self.get_mut(dlp_id)?;
        dlp.stake_amount = dlp.stake_amount.saturating_add(amount);
        self.refresh_status(dlp_id, config)
    }

    pub fn sub_stake_amount(&mut self, dlp_id: DlpId, amount: Amount, config: &RootConfig) -> Result<Option<StatusChange>> {
        let dlp = self.get_mut(dlp_id)?;
        dlp.stake_amount = dlp.stake_amount.saturating_sub(amount);
        self.refresh_status(dlp_id, config)
    }

    /// Move to the terminal `Deregistered` state
    pub fn deregister(&mut self, dlp_id: DlpId, caller: &Address) -> Result<()> {
        let dlp = self.ensure_owner(dlp_id, caller)?;
        if dlp.status == DlpStatus::Deregistered {
            return Err(RootError::InvalidDlpStatus {
                dlp_id,
                status: dlp.status,
            });
        }
        self.get_mut(dlp_id)?.status = DlpStatus::Deregistered;
        self.eligible.remove(dlp_id);
        Ok(())
    }
}
