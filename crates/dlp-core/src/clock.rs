//! Block clock
//!
//! The registry never reads wall time. Every time-dependent rule (epoch
//! boundaries, withdrawal delays, claim delays, day bucketing) is expressed
//! in block numbers obtained from a [`BlockSource`].

use crate::types::BlockNumber;
use parking_lot::Mutex;
use std::sync::Arc;

/// Monotonically increasing block counter
pub trait BlockSource: Send + Sync {
    /// Height of the block currently being executed
    fn current_block(&self) -> BlockNumber;
}

/// Manually driven clock, shared between the engine and whoever advances it
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    block: Arc<Mutex<BlockNumber>>,
}

impl ManualClock {
    /// Create a clock positioned at `block`
    pub fn new(block: BlockNumber) -> Self {
        Self {
            block: Arc::new(Mutex::new(block)),
        }
    }

    /// Advance by `blocks` and return the new height
    pub fn advance(&self, blocks: u64) -> BlockNumber {
        let mut block = self.block.lock();
        *block = block.saturating_add(blocks);
        *block
    }

    /// Move to `target`; never goes backwards
    pub fn advance_to(&self, target: BlockNumber) -> BlockNumber {
        let mut block = self.block.lock();
        *block = (*block).max(target);
        *block
    }
}

impl BlockSource for ManualClock {
    fn current_block(&self) -> BlockNumber {
        *self.block.lock()
    }
}
