//! Role repository
//!
//! Owns the write path for roles and their permission sets. Every successful
//! role save runs the post-save hook, which resolves the role's permission
//! sets and pushes them into the authorization registry.
//!
//! The hook runs after the rows are written. If resolution or the registry
//! call fails, the error is returned but the saved rows stay saved.

use tracing::{debug, info};

use super::query;
use super::validation::{validate_role_name, ValidationErrors};
use crate::capability::{CapabilityRef, PermissionSetResolver};
use crate::errors::{PermsetError, Result};
use crate::registry::{self, PermissionRegistry};
use crate::store::{
    PermissionSetId, PermissionSetRef, Role, RoleId, RolePermission, RoleStore,
};

/// Pending create or update of a role
#[derive(Debug, Clone, PartialEq)]
pub struct RoleForm {
    pub id: Option<RoleId>,
    pub name: String,
    /// `Some` replaces the role's permission sets with exactly this list
    pub permission_set_ids: Option<Vec<PermissionSetId>>,
}

impl RoleForm {
    /// Form for a new role
    pub fn create(name: impl Into<String>) -> Self {
        RoleForm {
            id: None,
            name: name.into(),
            permission_set_ids: None,
        }
    }

    /// Form for an existing role, pre-filled with its current name
    pub fn update(role: &Role) -> Self {
        RoleForm {
            id: Some(role.id),
            name: role.name.clone(),
            permission_set_ids: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn permission_sets(mut self, ids: Vec<PermissionSetId>) -> Self {
        self.permission_set_ids = Some(ids);
        self
    }
}

/// Result of a save that did not hit an error
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Role),
    Rejected(ValidationErrors),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            SaveOutcome::Saved(role) => Some(role),
            SaveOutcome::Rejected(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            SaveOutcome::Saved(_) => None,
            SaveOutcome::Rejected(errors) => Some(errors),
        }
    }
}

/// Role persistence plus registry synchronization
pub struct RoleRepository<S, R> {
    store: S,
    resolver: PermissionSetResolver,
    registry: R,
}

impl<S: RoleStore, R: PermissionRegistry> RoleRepository<S, R> {
    pub fn new(store: S, resolver: PermissionSetResolver, registry: R) -> Self {
        RoleRepository {
            store,
            resolver,
            registry,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> &PermissionSetResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut PermissionSetResolver {
        &mut self.resolver
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn into_parts(self) -> (S, PermissionSetResolver, R) {
        (self.store, self.resolver, self.registry)
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Validate, persist, then sync the role into the registry
    ///
    /// # Returns
    /// `Rejected` when validation fails; nothing is written and the registry
    /// is not touched.
    ///
    /// # Errors
    /// - store failures before the write (nothing persisted)
    /// - `PermissionSetRefNotFound` for an unknown id in the form (nothing persisted)
    /// - `PermissionSetNotFound` / `Registry` from the post-save hook; the role
    ///   and its associations are already persisted at that point
    pub fn save(&mut self, form: RoleForm) -> Result<SaveOutcome> {
        let errors = validate_role_name(&self.store, &form.name, form.id)?;
        if !errors.is_empty() {
            debug!(name = %form.name, errors = %errors, "role rejected");
            return Ok(SaveOutcome::Rejected(errors));
        }

        if let Some(ids) = &form.permission_set_ids {
            for id in ids {
                if self.store.find_permission_set(*id)?.is_none() {
                    return Err(PermsetError::PermissionSetRefNotFound(format!("id {}", id)));
                }
            }
        }

        let role = match form.id {
            None => self.store.insert_role(Role::new(form.name))?,
            Some(id) => {
                let mut role = self
                    .store
                    .find_role(id)?
                    .ok_or_else(|| PermsetError::RoleNotFound(format!("id {}", id)))?;
                role.name = form.name;
                self.store.update_role(role)?
            }
        };

        if let Some(ids) = form.permission_set_ids {
            self.replace_permission_sets(role.id, &ids)?;
        }

        info!(role = %role.name, id = role.id, "role saved");

        self.assign_permissions(&role)?;
        Ok(SaveOutcome::Saved(role))
    }

    /// Post-save hook: resolve and sync one role
    pub fn assign_permissions(&mut self, role: &Role) -> Result<()> {
        let handles = self.resolved_permission_sets(role)?;
        registry::sync(&mut self.registry, &role.name, handles)
    }

    /// Delete a role and its join rows
    ///
    /// The permission set references stay. The registry keeps whatever it
    /// last held for the role name.
    pub fn destroy(&mut self, id: RoleId) -> Result<bool> {
        let Some(role) = self.store.find_role(id)? else {
            return Ok(false);
        };

        let join_ids: Vec<_> = self
            .store
            .role_permissions_for(id)?
            .into_iter()
            .map(|rp| rp.id)
            .collect();
        self.store.delete_role_permissions(&join_ids)?;
        let removed = self.store.delete_role(id)?;

        info!(role = %role.name, associations = join_ids.len(), "role destroyed");
        Ok(removed)
    }

    pub fn roles(&self) -> Result<Vec<Role>> {
        self.store.roles()
    }

    pub fn find_role(&self, id: RoleId) -> Result<Option<Role>> {
        self.store.find_role(id)
    }

    pub fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.store.find_role_by_name(name)
    }

    /// Every role except "admin" and "user" (exact match)
    pub fn non_base_roles(&self) -> Result<Vec<Role>> {
        query::non_base_roles(&self.store)
    }

    /// Permission set references attached to a role, association order
    pub fn permission_sets_for(&self, role: &Role) -> Result<Vec<PermissionSetRef>> {
        self.store.permission_sets_for(role.id)
    }

    pub fn resolved_permission_sets(&self, role: &Role) -> Result<Vec<CapabilityRef>> {
        query::resolved_permission_sets(&self.store, &self.resolver, role)
    }

    // ------------------------------------------------------------------
    // Associations
    // ------------------------------------------------------------------

    /// Add one join row without saving the role (no sync)
    ///
    /// The same pair may be attached more than once.
    pub fn attach_permission_set(
        &mut self,
        role_id: RoleId,
        permission_set_id: PermissionSetId,
    ) -> Result<RolePermission> {
        if self.store.find_role(role_id)?.is_none() {
            return Err(PermsetError::RoleNotFound(format!("id {}", role_id)));
        }
        if self.store.find_permission_set(permission_set_id)?.is_none() {
            return Err(PermsetError::PermissionSetRefNotFound(format!(
                "id {}",
                permission_set_id
            )));
        }
        self.store
            .insert_role_permission(RolePermission::new(role_id, permission_set_id))
    }

    /// Remove every join row for the pair without saving the role (no sync)
    pub fn detach_permission_set(
        &mut self,
        role_id: RoleId,
        permission_set_id: PermissionSetId,
    ) -> Result<usize> {
        let ids: Vec<_> = self
            .store
            .role_permissions_for(role_id)?
            .into_iter()
            .filter(|rp| rp.permission_set_id == permission_set_id)
            .map(|rp| rp.id)
            .collect();
        self.store.delete_role_permissions(&ids)
    }

    fn replace_permission_sets(&mut self, role_id: RoleId, ids: &[PermissionSetId]) -> Result<()> {
        let existing: Vec<_> = self
            .store
            .role_permissions_for(role_id)?
            .into_iter()
            .map(|rp| rp.id)
            .collect();
        self.store.delete_role_permissions(&existing)?;

        for id in ids {
            self.store
                .insert_role_permission(RolePermission::new(role_id, *id))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Permission set references
    // ------------------------------------------------------------------

    /// Persist a permission set reference
    ///
    /// `set` is not resolved here; an unknown identifier only fails when a
    /// role carrying it is synced.
    pub fn create_permission_set(
        &mut self,
        name: &str,
        set: &str,
        description: Option<&str>,
    ) -> Result<PermissionSetRef> {
        if name.trim().is_empty() || set.trim().is_empty() {
            return Err(PermsetError::Validation(
                "permission set name and set cannot be blank".to_string(),
            ));
        }

        let mut record = PermissionSetRef::new(name, set);
        if let Some(description) = description {
            record = record.with_description(description);
        }
        let record = self.store.insert_permission_set(record)?;
        debug!(name = %record.name, set = %record.set, "permission set created");
        Ok(record)
    }

    pub fn permission_sets(&self) -> Result<Vec<PermissionSetRef>> {
        self.store.permission_sets()
    }

    /// Delete a permission set reference and the join rows pointing at it
    ///
    /// Roles that carried it are not resynced.
    pub fn destroy_permission_set(&mut self, id: PermissionSetId) -> Result<bool> {
        let join_ids: Vec<_> = self
            .store
            .role_permissions()?
            .into_iter()
            .filter(|rp| rp.permission_set_id == id)
            .map(|rp| rp.id)
            .collect();
        self.store.delete_role_permissions(&join_ids)?;
        self.store.delete_permission_set(id)
    }
}
