//! Per-(epoch, DLP) stake score adjustments.
//!
//! A stake created mid-epoch only earns the score of its remaining days, so
//! its full amount overstates its contribution by `amount - score`. Those
//! differences accumulate here and are subtracted from the naive
//! end-of-epoch stake total to estimate a DLP's epoch score when no score
//! was submitted. A stake closed in the epoch it was opened leaves the
//! end-of-epoch total, so its adjustment is reversed as well.

use dlp_core::{Amount, DlpId, EpochId, StakeId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MetricsAggregator {
    adjustments: HashMap<(EpochId, DlpId), Amount>,
    /// Adjustment recorded for each stake, keyed by stake id
    by_stake: HashMap<StakeId, (EpochId, DlpId, Amount)>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate the adjustment of a stake opened during `epoch_id`
    pub fn record(&mut self, epoch_id: EpochId, dlp_id: DlpId, stake_id: StakeId, adjustment: Amount) {
        if adjustment == 0 {
            return;
        }
        let total = self.adjustments.entry((epoch_id, dlp_id)).or_insert(0);
        *total = total.saturating_add(adjustment);
        self.by_stake.insert(stake_id, (epoch_id, dlp_id, adjustment));
        tracing::trace!(epoch_id, dlp_id, stake_id, adjustment, total = *total, "Stake score adjustment");
    }

    /// Undo a stake's adjustment if it was recorded for `epoch_id`.
    /// Returns the amount taken back.
    pub fn reverse(&mut self, stake_id: StakeId, epoch_id: EpochId) -> Amount {
        let Some((recorded_epoch, dlp_id, adjustment)) = self.by_stake.remove(&stake_id) else {
            return 0;
        };
        if recorded_epoch != epoch_id {
            return 0;
        }
        if let Some(total) = self.adjustments.get_mut(&(epoch_id, dlp_id)) {
            *total = total.saturating_sub(adjustment);
        }
        tracing::trace!(epoch_id, dlp_id, stake_id, adjustment, "Stake score adjustment reversed");
        adjustment
    }

    pub fn adjustment(&self, epoch_id: EpochId, dlp_id: DlpId) -> Amount {
        self.adjustments.get(&(epoch_id, dlp_id)).copied().unwrap_or(0)
    }

    /// Stake total minus accumulated adjustments, floored at zero
    pub fn estimated_stakes_score(&self, epoch_id: EpochId, dlp_id: DlpId, stake_total: Amount) -> Amount {
        stake_total.saturating_sub(self.adjustment(epoch_id, dlp_id))
    }
}
