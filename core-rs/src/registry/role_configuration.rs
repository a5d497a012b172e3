//! Authorization registry
//!
//! [`PermissionRegistry`] is the one operation this crate needs from the
//! authorization layer. [`RoleConfiguration`] is the in-process registry the
//! crate ships: role name → capability handles, last write wins.

use std::collections::BTreeMap;

use crate::capability::{CapabilityRef, Grant};
use crate::errors::{PermsetError, Result};

/// Receiver of role → permission set assignments
pub trait PermissionRegistry {
    /// Register `handles` for `role_name`, replacing any earlier assignment
    fn assign_permissions(&mut self, role_name: &str, handles: Vec<CapabilityRef>) -> Result<()>;
}

/// In-process role → permission set map
#[derive(Debug, Clone, Default)]
pub struct RoleConfiguration {
    roles: BTreeMap<String, Vec<CapabilityRef>>,
}

impl RoleConfiguration {
    pub fn new() -> Self {
        RoleConfiguration::default()
    }

    /// Handles registered for a role name
    pub fn permission_sets_for(&self, role_name: &str) -> Option<&[CapabilityRef]> {
        self.roles.get(role_name).map(|v| v.as_slice())
    }

    /// Identifiers registered for a role name, in registration order
    pub fn identifiers_for(&self, role_name: &str) -> Option<Vec<String>> {
        self.permission_sets_for(role_name)
            .map(crate::capability::identifiers)
    }

    /// Registered role names, sorted
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.keys().map(|k| k.as_str()).collect()
    }

    pub fn contains(&self, role_name: &str) -> bool {
        self.roles.contains_key(role_name)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Every grant the role's handles contribute, first occurrence wins
    pub fn grants_for(&self, role_name: &str) -> Vec<Grant> {
        let mut grants: Vec<Grant> = Vec::new();
        for handle in self.permission_sets_for(role_name).unwrap_or_default() {
            for grant in handle.grants() {
                if !grants.contains(grant) {
                    grants.push(grant.clone());
                }
            }
        }
        grants
    }
}

impl PermissionRegistry for RoleConfiguration {
    fn assign_permissions(&mut self, role_name: &str, handles: Vec<CapabilityRef>) -> Result<()> {
        if role_name.trim().is_empty() {
            return Err(PermsetError::Registry(
                "cannot assign permissions to a blank role name".to_string(),
            ));
        }

        if let Some(bad) = handles.iter().find(|h| h.identifier().trim().is_empty()) {
            return Err(PermsetError::Registry(format!(
                "malformed permission set for role {}: {:?}",
                role_name, bad
            )));
        }

        self.roles.insert(role_name.to_string(), handles);
        Ok(())
    }
}
