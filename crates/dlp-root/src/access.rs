//! Authorization oracle
//!
//! Protocol-wide roles are answered by an [`AccessControl`] implementation.
//! Entity ownership (DLP owner, stake owner) is checked by the registry
//! itself against stored owner fields.

use dlp_core::{Address, Result, RootError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Protocol-wide roles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Global configuration, epoch size and reward amount, pause
    DefaultAdmin,
    /// Verification, protocol parameters, epoch and score overrides
    Maintainer,
    /// Stake score and performance rating submission
    Manager,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DefaultAdmin => "DEFAULT_ADMIN",
            Self::Maintainer => "MAINTAINER",
            Self::Manager => "MANAGER",
        }
    }
}

/// Capability check consulted before every role-gated mutation
pub trait AccessControl: Send + Sync {
    fn has_role(&self, account: &Address, role: Role) -> bool;

    /// `Ok(())` if `account` holds `role`
    fn check_role(&self, account: &Address, role: Role) -> Result<()> {
        if self.has_role(account, role) {
            Ok(())
        } else {
            Err(RootError::MissingRole {
                account: *account,
                role: role.name(),
            })
        }
    }
}

/// In-memory role table. Admins implicitly hold every role.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    members: RwLock<HashMap<Role, HashSet<Address>>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a single admin
    pub fn with_admin(admin: Address) -> Self {
        let registry = Self::new();
        registry.grant(Role::DefaultAdmin, admin);
        registry
    }

    pub fn grant(&self, role: Role, account: Address) -> bool {
        let granted = self.members.write().entry(role).or_default().insert(account);
        if granted {
            tracing::info!(role = role.name(), %account, "Role granted");
        }
        granted
    }

    pub fn revoke(&self, role: Role, account: &Address) -> bool {
        let revoked = self
            .members
            .write()
            .get_mut(&role)
            .map(|set| set.remove(account))
            .unwrap_or(false);
        if revoked {
            tracing::info!(role = role.name(), %account, "Role revoked");
        }
        revoked
    }
}

impl AccessControl for RoleRegistry {
    fn has_role(&self, account: &Address, role: Role) -> bool {
        let members = self.members.read();
        let holds = |r: Role| members.get(&r).map_or(false, |set| set.contains(account));
        holds(role) || holds(Role::DefaultAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let registry = RoleRegistry::new();
        let manager = Address::from_seed(b"manager");

        assert!(!registry.has_role(&manager, Role::Manager));
        registry.grant(Role::Manager, manager);
        assert!(registry.has_role(&manager, Role::Manager));
        assert!(!registry.has_role(&manager, Role::Maintainer));

        assert!(registry.revoke(Role::Manager, &manager));
        assert!(!registry.has_role(&manager, Role::Manager));
    }

    #[test]
    fn test_admin_holds_every_role() {
        let admin = Address::from_seed(b"admin");
        let registry = RoleRegistry::with_admin(admin);

        assert!(registry.check_role(&admin, Role::Maintainer).is_ok());
        assert!(registry.check_role(&admin, Role::Manager).is_ok());
    }

    #[test]
    fn test_check_role_error() {
        let registry = RoleRegistry::new();
        let nobody = Address::from_seed(b"nobody");

        let err = registry.check_role(&nobody, Role::Maintainer).unwrap_err();
        assert!(matches!(err, RootError::MissingRole { role: "MAINTAINER", .. }));
    }
}
