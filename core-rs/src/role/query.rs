//! Role queries shared by the repository and the bootstrap sequencer

use crate::capability::{CapabilityRef, PermissionSetResolver};
use crate::errors::Result;
use crate::store::{Role, RoleStore};

/// Every role except the reserved base roles, in store order
///
/// The reserved names match exactly: a role named "Admin" is returned.
pub fn non_base_roles(store: &dyn RoleStore) -> Result<Vec<Role>> {
    Ok(store.roles()?.into_iter().filter(|r| !r.is_base()).collect())
}

/// Identifiers of the permission sets attached to a role, association order
pub fn permission_set_identifiers(store: &dyn RoleStore, role: &Role) -> Result<Vec<String>> {
    Ok(store
        .permission_sets_for(role.id)?
        .into_iter()
        .map(|s| s.set)
        .collect())
}

/// Resolve a role's permission sets into capability handles
///
/// Fails on the first identifier the resolver does not know.
pub fn resolved_permission_sets(
    store: &dyn RoleStore,
    resolver: &PermissionSetResolver,
    role: &Role,
) -> Result<Vec<CapabilityRef>> {
    resolver.resolve_all(permission_set_identifiers(store, role)?)
}
