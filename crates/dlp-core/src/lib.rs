//! # DLP Root Core
//!
//! Shared vocabulary for the DLP root registry:
//! - `Address` and the sequential id aliases (`DlpId`, `StakeId`, `EpochId`)
//! - `DlpStatus`, the DLP lifecycle state
//! - `RootError` / `ErrorKind`, the rejection taxonomy
//! - `BlockSource`, the chain clock every delay is measured against
//! - `mul_div` / `isqrt`, fixed-point arithmetic over 18-decimal amounts

pub mod clock;
pub mod error;
pub mod math;
pub mod types;

pub use clock::*;
pub use error::*;
pub use math::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{BlockSource, ManualClock};
    pub use crate::error::{ErrorKind, Result, RootError};
    pub use crate::math::{isqrt, mul_div};
    pub use crate::types::constants::*;
    pub use crate::types::*;
}
