//! Role registry: the capability table
//!
//! Every privileged operation elsewhere in the core consults this
//! table synchronously before mutating anything. Grants are mutated
//! only by an ADMIN-capable caller.

use crate::types::{Address, Role};
use crate::{Error, Result};
use std::collections::HashSet;

/// Capability store mapping (role, address) to a grant
#[derive(Debug, Default)]
pub struct RoleRegistry {
    grants: HashSet<(Role, Address)>,
}

impl RoleRegistry {
    /// Create a registry with `root_admin` holding ADMIN
    pub fn new(root_admin: Address) -> Self {
        let mut grants = HashSet::new();
        grants.insert((Role::Admin, root_admin));
        Self { grants }
    }

    /// Grant `role` to `addr`; caller must hold ADMIN. Idempotent.
    pub fn grant_role(&mut self, caller: &Address, role: Role, addr: Address) -> Result<()> {
        self.require_admin(caller)?;
        tracing::info!(caller = %caller, role = %role, addr = %addr, "role granted");
        self.grants.insert((role, addr));
        Ok(())
    }

    /// Revoke `role` from `addr`; caller must hold ADMIN.
    /// Revoking an absent grant is a no-op.
    pub fn revoke_role(&mut self, caller: &Address, role: Role, addr: &Address) -> Result<()> {
        self.require_admin(caller)?;
        tracing::info!(caller = %caller, role = %role, addr = %addr, "role revoked");
        self.grants.remove(&(role, addr.clone()));
        Ok(())
    }

    /// Pure lookup, no side effects
    pub fn has_role(&self, role: Role, addr: &Address) -> bool {
        self.grants.contains(&(role, addr.clone()))
    }

    /// Fail with an authorization error unless `addr` holds `role`
    pub fn require_role(&self, role: Role, addr: &Address) -> Result<()> {
        if !self.has_role(role, addr) {
            return Err(Error::Authorization(format!(
                "{} does not hold {}",
                addr,
                role.code()
            )));
        }
        Ok(())
    }

    fn require_admin(&self, caller: &Address) -> Result<()> {
        self.require_role(Role::Admin, caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (RoleRegistry, Address) {
        let admin = Address::new("admin");
        (RoleRegistry::new(admin.clone()), admin)
    }

    #[test]
    fn test_root_admin_holds_admin() {
        let (registry, admin) = registry();
        assert!(registry.has_role(Role::Admin, &admin));
    }

    #[test]
    fn test_grant_and_revoke() {
        let (mut registry, admin) = registry();
        let resto = Address::new("resto");

        registry
            .grant_role(&admin, Role::Restaurant, resto.clone())
            .unwrap();
        assert!(registry.has_role(Role::Restaurant, &resto));

        registry
            .revoke_role(&admin, Role::Restaurant, &resto)
            .unwrap();
        assert!(!registry.has_role(Role::Restaurant, &resto));
    }

    #[test]
    fn test_non_admin_cannot_grant() {
        let (mut registry, _) = registry();
        let mallory = Address::new("mallory");

        let result = registry.grant_role(&mallory, Role::Platform, mallory.clone());
        assert!(matches!(result, Err(Error::Authorization(_))));
        assert!(!registry.has_role(Role::Platform, &mallory));
    }

    #[test]
    fn test_revoke_absent_grant_is_noop() {
        let (mut registry, admin) = registry();
        let nobody = Address::new("nobody");
        registry
            .revoke_role(&admin, Role::Deliverer, &nobody)
            .unwrap();
    }

    #[test]
    fn test_roles_are_distinct_capabilities() {
        let (mut registry, admin) = registry();
        let addr = Address::new("multi");
        registry
            .grant_role(&admin, Role::Restaurant, addr.clone())
            .unwrap();
        assert!(registry.has_role(Role::Restaurant, &addr));
        assert!(!registry.has_role(Role::Deliverer, &addr));
        assert!(!registry.has_role(Role::Admin, &addr));
    }
}
