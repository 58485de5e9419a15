//! Shared fixture for integration tests
#![allow(dead_code)]

use dlp_root::dlp_core::constants::{ONE_PERCENT, ONE_TOKEN};
use dlp_root::dlp_core::{Address, Amount, BlockNumber, DlpId, ManualClock};
use dlp_root::{Collaborators, DlpInfo, DlpRoot, InMemoryTreasury, Role, RoleRegistry, RootConfig, Treasury};
use std::sync::Arc;

/// Epoch 1 is [10, 109]; epochs are 100 blocks = 10 days
pub fn test_config() -> RootConfig {
    RootConfig {
        epoch_start_block: 10,
        epoch_size: 100,
        blocks_per_day: 10,
        epoch_reward_amount: 1_000 * ONE_TOKEN,
        epoch_dlps_limit: 3,
        stake_withdrawal_delay: 20,
        reward_claim_delay: 5,
        ..RootConfig::default()
    }
}

pub struct Harness {
    pub root: DlpRoot,
    pub clock: ManualClock,
    pub admin: Address,
    pub manager: Address,
    pub roles: Arc<RoleRegistry>,
    pub stakes_treasury: Arc<InMemoryTreasury>,
    pub rewards_treasury: Arc<InMemoryTreasury>,
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

pub fn harness_with(config: RootConfig) -> Harness {
    let admin = Address::from_seed(b"admin");
    let manager = Address::from_seed(b"manager");
    let roles = Arc::new(RoleRegistry::with_admin(admin));
    roles.grant(Role::Manager, manager);

    let clock = ManualClock::new(10);
    let stakes_treasury = Arc::new(InMemoryTreasury::new("stakes"));
    let rewards_treasury = Arc::new(InMemoryTreasury::new("rewards"));
    rewards_treasury.deposit(&Address::from_seed(b"foundation"), 100_000 * ONE_TOKEN);

    let root = DlpRoot::new(
        config,
        Collaborators {
            access: roles.clone(),
            stakes_treasury: stakes_treasury.clone(),
            rewards_treasury: rewards_treasury.clone(),
            clock: Arc::new(clock.clone()),
        },
    )
    .expect("valid config");

    Harness {
        root,
        clock,
        admin,
        manager,
        roles,
        stakes_treasury,
        rewards_treasury,
    }
}

pub fn dlp_info(name: &str) -> DlpInfo {
    DlpInfo {
        dlp_address: Address::from_seed(format!("{name}-dlp").as_bytes()),
        owner: owner_of(name),
        treasury: Address::from_seed(format!("{name}-treasury").as_bytes()),
        stakers_percentage: 60 * ONE_PERCENT,
        name: name.to_string(),
        icon_url: format!("https://{name}.example/icon.png"),
        website: format!("https://{name}.example"),
        metadata: String::new(),
    }
}

pub fn owner_of(name: &str) -> Address {
    Address::from_seed(format!("{name}-owner").as_bytes())
}

pub fn staker(name: &str) -> Address {
    Address::from_seed(format!("staker-{name}").as_bytes())
}

impl Harness {
    pub fn register(&mut self, name: &str, stake: Amount) -> DlpId {
        let owner = owner_of(name);
        self.root
            .register_dlp(&owner, dlp_info(name), stake)
            .expect("registration")
    }

    pub fn register_verified(&mut self, name: &str, stake: Amount) -> DlpId {
        let dlp_id = self.register(name, stake);
        let admin = self.admin;
        self.root
            .update_dlp_verification(&admin, dlp_id, true)
            .expect("verification");
        dlp_id
    }

    /// Move the clock and materialize epochs
    pub fn advance_to(&mut self, block: BlockNumber) {
        self.clock.advance_to(block);
        self.root.create_epochs().expect("create epochs");
    }

    /// Eligible index agrees with every DLP's status
    pub fn assert_status_invariant(&self) {
        let eligible = self.root.eligible_dlps_list();
        for dlp_id in 1..=self.root.dlps_count() {
            let dlp = self.root.dlps(dlp_id).unwrap();
            assert_eq!(
                eligible.contains(&dlp_id),
                dlp.status == dlp_root::dlp_core::DlpStatus::Eligible,
                "DLP {dlp_id} with status {} disagrees with the eligible index",
                dlp.status
            );
        }
    }
}
