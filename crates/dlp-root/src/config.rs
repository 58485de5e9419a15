//! Registry configuration
//!
//! Protocol parameters live in [`RootConfig`]; [`Settings`] bundles them with
//! logging options and loads both from TOML plus `DLP_ROOT__*` environment
//! overrides (e.g. `DLP_ROOT__ROOT__EPOCH_SIZE=120`).

use dlp_core::constants::{ONE_HUNDRED_PERCENT, ONE_PERCENT, ONE_TOKEN};
use dlp_core::{amount_serde, Amount, BlockNumber, Result, RootError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default chain cadence: one block every 5 seconds
pub const DEFAULT_BLOCKS_PER_DAY: u64 = 17_280;

/// Protocol parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    /// First block of epoch 1; epoch 0 covers everything before it
    #[serde(default = "default_epoch_start_block")]
    pub epoch_start_block: BlockNumber,

    /// Blocks per epoch (applies to epochs created after a change)
    #[serde(default = "default_epoch_size")]
    pub epoch_size: u64,

    /// Blocks per calendar day, used for score day bucketing
    #[serde(default = "default_blocks_per_day")]
    pub blocks_per_day: u64,

    /// Reward pool assigned to each newly created epoch
    #[serde(default = "default_epoch_reward_amount", with = "amount_serde")]
    pub epoch_reward_amount: Amount,

    /// Size of the top-K set captured into each epoch
    #[serde(default = "default_epoch_dlps_limit")]
    pub epoch_dlps_limit: usize,

    /// Minimum amount for an individual stake
    #[serde(default = "default_min_stake_amount", with = "amount_serde")]
    pub min_stake_amount: Amount,

    /// Minimum stake posted at DLP registration
    #[serde(default = "default_min_dlp_registration_stake", with = "amount_serde")]
    pub min_dlp_registration_stake: Amount,

    /// Lowest stakers percentage a DLP may configure
    #[serde(default = "default_min_dlp_stakers_percentage", with = "amount_serde")]
    pub min_dlp_stakers_percentage: Amount,

    /// Stake total from which a verified DLP is Eligible
    #[serde(default = "default_dlp_eligibility_threshold", with = "amount_serde")]
    pub dlp_eligibility_threshold: Amount,

    /// Stake total from which a verified DLP is SubEligible
    #[serde(default = "default_dlp_sub_eligibility_threshold", with = "amount_serde")]
    pub dlp_sub_eligibility_threshold: Amount,

    /// Blocks between closing a stake and withdrawing it
    #[serde(default = "default_stake_withdrawal_delay")]
    pub stake_withdrawal_delay: u64,

    /// Blocks after an epoch's end before its rewards can be claimed
    #[serde(default = "default_reward_claim_delay")]
    pub reward_claim_delay: u64,

    /// Weight of the stake score in the blended rating
    #[serde(default = "default_stake_rating_percentage", with = "amount_serde")]
    pub stake_rating_percentage: Amount,

    /// Weight of the performance rating in the blended rating
    #[serde(default = "default_performance_rating_percentage", with = "amount_serde")]
    pub performance_rating_percentage: Amount,

    /// Admission limit for caller-supplied batches
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_epoch_start_block() -> BlockNumber {
    1
}

fn default_epoch_size() -> u64 {
    21 * DEFAULT_BLOCKS_PER_DAY
}

fn default_blocks_per_day() -> u64 {
    DEFAULT_BLOCKS_PER_DAY
}

fn default_epoch_reward_amount() -> Amount {
    1_000 * ONE_TOKEN
}

fn default_epoch_dlps_limit() -> usize {
    16
}

fn default_min_stake_amount() -> Amount {
    ONE_TOKEN / 10
}

fn default_min_dlp_registration_stake() -> Amount {
    ONE_TOKEN
}

fn default_min_dlp_stakers_percentage() -> Amount {
    50 * ONE_PERCENT
}

fn default_dlp_eligibility_threshold() -> Amount {
    100 * ONE_TOKEN
}

fn default_dlp_sub_eligibility_threshold() -> Amount {
    50 * ONE_TOKEN
}

fn default_stake_withdrawal_delay() -> u64 {
    10 * DEFAULT_BLOCKS_PER_DAY
}

fn default_reward_claim_delay() -> u64 {
    3 * DEFAULT_BLOCKS_PER_DAY
}

fn default_stake_rating_percentage() -> Amount {
    80 * ONE_PERCENT
}

fn default_performance_rating_percentage() -> Amount {
    20 * ONE_PERCENT
}

fn default_max_batch_size() -> usize {
    100
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            epoch_start_block: default_epoch_start_block(),
            epoch_size: default_epoch_size(),
            blocks_per_day: default_blocks_per_day(),
            epoch_reward_amount: default_epoch_reward_amount(),
            epoch_dlps_limit: default_epoch_dlps_limit(),
            min_stake_amount: default_min_stake_amount(),
            min_dlp_registration_stake: default_min_dlp_registration_stake(),
            min_dlp_stakers_percentage: default_min_dlp_stakers_percentage(),
            dlp_eligibility_threshold: default_dlp_eligibility_threshold(),
            dlp_sub_eligibility_threshold: default_dlp_sub_eligibility_threshold(),
            stake_withdrawal_delay: default_stake_withdrawal_delay(),
            reward_claim_delay: default_reward_claim_delay(),
            stake_rating_percentage: default_stake_rating_percentage(),
            performance_rating_percentage: default_performance_rating_percentage(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl RootConfig {
    /// Check parameter ranges and cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.epoch_start_block == 0 {
            return Err(RootError::InvalidParam("epoch_start_block must be at least 1".into()));
        }
        if self.epoch_size == 0 {
            return Err(RootError::InvalidParam("epoch_size must be positive".into()));
        }
        if self.blocks_per_day == 0 {
            return Err(RootError::InvalidParam("blocks_per_day must be positive".into()));
        }
        if self.epoch_dlps_limit == 0 {
            return Err(RootError::InvalidParam("epoch_dlps_limit must be positive".into()));
        }
        if self.max_batch_size == 0 {
            return Err(RootError::InvalidParam("max_batch_size must be positive".into()));
        }
        if self.dlp_sub_eligibility_threshold > self.dlp_eligibility_threshold {
            return Err(RootError::InvalidParam(
                "dlp_sub_eligibility_threshold exceeds dlp_eligibility_threshold".into(),
            ));
        }
        if self.min_dlp_stakers_percentage > ONE_HUNDRED_PERCENT {
            return Err(RootError::InvalidStakersPercentage(self.min_dlp_stakers_percentage));
        }
        if self
            .stake_rating_percentage
            .checked_add(self.performance_rating_percentage)
            != Some(ONE_HUNDRED_PERCENT)
        {
            return Err(RootError::InvalidRatingPercentages);
        }
        Ok(())
    }

    /// Parse and validate from a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| RootError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Color output for the text format
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            color: true,
        }
    }
}

/// Complete settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub root: RootConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load from an optional TOML file, then apply `DLP_ROOT__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("DLP_ROOT").separator("__"));

        let settings: Settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| RootError::Config(e.to_string()))?;
        settings.root.validate()?;
        Ok(settings)
    }

    /// Parse from a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(s).map_err(|e| RootError::Config(e.to_string()))?;
        settings.root.validate()?;
        Ok(settings)
    }
}
