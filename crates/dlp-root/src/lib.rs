//! # DLP Root - Staking Registry & Epoch Rewards
//!
//! Registry of Data Liquidity Pools (DLPs), the stakes placed on them, the
//! epochs that partition time, and the reward pipeline that pays DLP
//! operators and stakers at the end of each epoch.
//!
//! ## Key Features
//!
//! - **Derived status**: Eligible / SubEligible / Registered follow from stake total and verification
//! - **Top-K epochs**: every epoch captures the highest-staked eligible DLPs at creation
//! - **Time-decayed scores**: stakes weigh more the longer they stay (up to 3x)
//! - **Two-phase finalization**: stake scores, then performance ratings and the reward split
//!
//! ## Epoch Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐
//! │ epoch created│──▶│ epoch ends    │──▶│ scores/ratings │──▶│ claims and   │
//! │ (top-K snap) │   │ (block > end) │   │ + finalize     │   │ distribution │
//! └──────────────┘   └───────────────┘   └────────────────┘   └──────────────┘
//! ```
//!
//! ## Fixed Point
//!
//! | Quantity | Unit |
//! |----------|------|
//! | Token amounts | 1e18 = 1 token |
//! | Percentages | 1e18 = 100% |
//! | Score multipliers | 10000 = 1.0x |

pub mod access;
pub mod config;
pub mod epochs;
pub mod events;
pub mod index;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod rewards;
pub mod root;
pub mod score;
pub mod staking;
pub mod top_dlps;
pub mod treasury;

// Re-exports
pub use access::{AccessControl, Role, RoleRegistry};
pub use config::{LoggingConfig, RootConfig, Settings};
pub use epochs::{DlpEpoch, Epoch, EpochScheduler};
pub use events::RootEvent;
pub use index::IdSet;
pub use metrics::MetricsAggregator;
pub use registry::{derive_status, DeferredValue, Dlp, DlpInfo, DlpRegistry};
pub use rewards::{
    split_epoch_reward, DlpRewardSplit, PerformanceRatingEntry, RatingInput, RewardEngine,
    StakeClaim, StakesScoreEntry,
};
pub use root::{Collaborators, DlpRoot};
pub use staking::{Stake, StakeLedger};
pub use top_dlps::{top_dlp_ids, TopKSelector};
pub use treasury::{InMemoryTreasury, Treasury, TreasuryError};

pub use dlp_core;
