//! Signals emitted by successful mutations

use dlp_core::{Address, Amount, BlockNumber, DlpId, DlpStatus, EpochId, StakeId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootEvent {
    DlpRegistered {
        dlp_id: DlpId,
        dlp_address: Address,
        owner: Address,
        treasury: Address,
        stakers_percentage: Amount,
        name: String,
    },
    DlpUpdated {
        dlp_id: DlpId,
        owner: Address,
        treasury: Address,
        stakers_percentage: Amount,
        name: String,
    },
    DlpVerificationUpdated {
        dlp_id: DlpId,
        verified: bool,
    },
    DlpStatusUpdated {
        dlp_id: DlpId,
        status: DlpStatus,
    },
    DlpDeregistered {
        dlp_id: DlpId,
    },
    StakeCreated {
        stake_id: StakeId,
        staker: Address,
        dlp_id: DlpId,
        amount: Amount,
    },
    StakeClosed {
        stake_id: StakeId,
    },
    StakeWithdrawn {
        stake_id: StakeId,
        amount: Amount,
    },
    EpochCreated {
        epoch_id: EpochId,
        start_block: BlockNumber,
        end_block: BlockNumber,
        reward_amount: Amount,
    },
    EpochOverridden {
        epoch_id: EpochId,
        start_block: BlockNumber,
        end_block: BlockNumber,
        reward_amount: Amount,
    },
    EpochDlpScoreSaved {
        epoch_id: EpochId,
        dlp_id: DlpId,
        total_stakes_score: Amount,
    },
    EpochDlpPerformanceRatingSaved {
        epoch_id: EpochId,
        dlp_id: DlpId,
        performance_rating: Amount,
    },
    EpochFinalized {
        epoch_id: EpochId,
    },
    StakeRewardClaimed {
        stake_id: StakeId,
        epoch_id: EpochId,
        amount: Amount,
    },
    DlpRewardDistributed {
        epoch_id: EpochId,
        dlp_id: DlpId,
        amount: Amount,
    },
    ConfigUpdated {
        parameter: String,
    },
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
}
