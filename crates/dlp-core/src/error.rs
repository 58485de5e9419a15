//! Error types for DLP root operations

use crate::types::{Address, Amount, BlockNumber, DlpId, DlpStatus, EpochId, StakeId};
use thiserror::Error;

/// Result type alias for DLP root operations
pub type Result<T> = std::result::Result<T, RootError>;

/// Rejection classes. Every error is a synchronous, non-retryable rejection
/// of the whole call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authorization,
    InvalidInput,
    InvalidState,
    Timing,
    NotFound,
}

/// Errors that can occur in DLP root operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RootError {
    // === Authorization ===
    /// Account lacks a protocol-wide role
    #[error("Account {account} is missing role {role}")]
    MissingRole { account: Address, role: &'static str },

    /// Caller does not own the DLP
    #[error("Caller is not the owner of DLP {0}")]
    NotDlpOwner(DlpId),

    /// Caller does not own the stake
    #[error("Caller is not the owner of stake {0}")]
    NotStakeOwner(StakeId),

    // === Invalid input ===
    /// Zero address or an attempt to change a DLP's address identity
    #[error("Invalid address")]
    InvalidAddress,

    /// Empty DLP name
    #[error("Invalid DLP name")]
    InvalidName,

    /// Stakers percentage outside [minimum, 100%]
    #[error("Invalid stakers percentage {0}")]
    InvalidStakersPercentage(Amount),

    /// Stake below the configured minimum
    #[error("Stake amount {amount} is below the minimum of {min}")]
    InvalidStakeAmount { amount: Amount, min: Amount },

    /// Stake and performance rating percentages must add up to 100%
    #[error("Rating percentages must sum to 100%")]
    InvalidRatingPercentages,

    /// Batch exceeds the configured admission limit
    #[error("Batch of {len} items exceeds the maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// Same id submitted twice in one batch
    #[error("Duplicate entry in batch: {0}")]
    DuplicateEntry(u64),

    /// Epoch block range is empty or inverted
    #[error("Invalid epoch range {start_block}..={end_block}")]
    InvalidEpochRange { start_block: BlockNumber, end_block: BlockNumber },

    /// A configuration parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    // === Invalid state ===
    /// Public mutations are paused
    #[error("Operations are paused")]
    EnforcedPause,

    /// DLP status does not allow the requested operation
    #[error("DLP {dlp_id} has invalid status {status}")]
    InvalidDlpStatus { dlp_id: DlpId, status: DlpStatus },

    /// The address already backs a live DLP
    #[error("DLP address {0} is already registered")]
    DlpAddressAlreadyRegistered(Address),

    /// The name is used by another DLP
    #[error("DLP name {0:?} is already taken")]
    DlpNameTaken(String),

    #[error("Stake {0} is already closed")]
    StakeAlreadyClosed(StakeId),

    #[error("Stake {0} is not closed")]
    StakeNotClosed(StakeId),

    #[error("Stake {0} is already withdrawn")]
    StakeAlreadyWithdrawn(StakeId),

    /// Epoch has not reached its end block yet
    #[error("Epoch {0} has not ended")]
    EpochNotEnded(EpochId),

    /// Write-once stake score already stored
    #[error("Stakes score for DLP {dlp_id} in epoch {epoch_id} is already saved")]
    EpochDlpScoreAlreadySaved { epoch_id: EpochId, dlp_id: DlpId },

    #[error("Epoch {0} is already finalized")]
    EpochAlreadyFinalized(EpochId),

    #[error("Epoch {0} is not finalized")]
    EpochNotFinalized(EpochId),

    /// Finalization requires verified DLPs
    #[error("DLP {0} must be verified")]
    DlpMustBeVerified(DlpId),

    /// Treasury refused a payout
    #[error("Treasury transfer failed: {0}")]
    TransferFailed(String),

    // === Timing ===
    /// Withdrawal delay has not elapsed since the stake was closed
    #[error("Stake {stake_id} can be withdrawn from block {available_at}")]
    WithdrawalTooEarly { stake_id: StakeId, available_at: BlockNumber },

    // === Not found ===
    #[error("DLP not found: {0}")]
    DlpNotFound(DlpId),

    #[error("DLP not found for address {0}")]
    DlpAddressNotFound(Address),

    #[error("Stake not found: {0}")]
    StakeNotFound(StakeId),

    #[error("Epoch not found: {0}")]
    EpochNotFound(EpochId),
}

impl RootError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRole { .. } | Self::NotDlpOwner(_) | Self::NotStakeOwner(_) => {
                ErrorKind::Authorization
            }
            Self::InvalidAddress
            | Self::InvalidName
            | Self::InvalidStakersPercentage(_)
            | Self::InvalidStakeAmount { .. }
            | Self::InvalidRatingPercentages
            | Self::BatchTooLarge { .. }
            | Self::DuplicateEntry(_)
            | Self::InvalidEpochRange { .. }
            | Self::InvalidParam(_)
            | Self::Config(_) => ErrorKind::InvalidInput,
            Self::WithdrawalTooEarly { .. } => ErrorKind::Timing,
            Self::DlpNotFound(_)
            | Self::DlpAddressNotFound(_)
            | Self::StakeNotFound(_)
            | Self::EpochNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::InvalidState,
        }
    }

    /// Numeric error code, grouped by kind
    pub fn code(&self) -> u32 {
        match self.kind() {
            ErrorKind::Authorization => 1001,
            ErrorKind::InvalidInput => 2001,
            ErrorKind::InvalidState => 3001,
            ErrorKind::Timing => 4001,
            ErrorKind::NotFound => 5001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RootError::NotDlpOwner(1).kind(), ErrorKind::Authorization);
        assert_eq!(RootError::InvalidName.kind(), ErrorKind::InvalidInput);
        assert_eq!(RootError::StakeAlreadyWithdrawn(3).kind(), ErrorKind::InvalidState);
        assert_eq!(
            RootError::WithdrawalTooEarly { stake_id: 1, available_at: 10 }.kind(),
            ErrorKind::Timing
        );
        assert_eq!(RootError::EpochNotFound(9).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RootError::EnforcedPause.code(), 3001);
        assert_eq!(RootError::StakeNotFound(1).code(), 5001);
    }

    #[test]
    fn test_error_display() {
        let err = RootError::EpochDlpScoreAlreadySaved { epoch_id: 2, dlp_id: 7 };
        let msg = format!("{}", err);
        assert!(msg.contains("epoch 2"));
        assert!(msg.contains("DLP 7"));
    }
}
