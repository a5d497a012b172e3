//! Persistence layer
//!
//! The [`RoleStore`] trait is the boundary to whatever keeps role data.
//! Two backends ship with the crate: [`MemoryStore`] and the JSON-file
//! backed [`FileStore`]. A [`Connector`] is the connectivity probe the
//! bootstrap sequencer uses before touching any table.

pub mod file;
pub mod memory;
pub mod models;
pub mod table;

pub use file::{FileConnector, FileStore};
pub use memory::MemoryStore;
pub use models::{
    PermissionSetId, PermissionSetRef, Record, Role, RoleId, RolePermission, RolePermissionId,
    BASE_ROLE_NAMES,
};
pub use table::Table;

use crate::errors::{PermsetError, Result};

pub const ROLES_TABLE: &str = "roles";
pub const PERMISSION_SETS_TABLE: &str = "permission_sets";
pub const ROLE_PERMISSIONS_TABLE: &str = "role_permissions";

/// Every table the store manages, in creation order
pub const ALL_TABLES: [&str; 3] = [ROLES_TABLE, PERMISSION_SETS_TABLE, ROLE_PERMISSIONS_TABLE];

/// CRUD over roles, permission set references and their join rows
///
/// Queries against a table that does not exist fail with
/// `PermsetError::StatementInvalid`.
pub trait RoleStore {
    /// Names of the tables that currently exist
    fn tables(&self) -> Result<Vec<String>>;

    /// All roles in insertion order
    fn roles(&self) -> Result<Vec<Role>>;

    fn permission_sets(&self) -> Result<Vec<PermissionSetRef>>;

    /// All join rows in insertion order
    fn role_permissions(&self) -> Result<Vec<RolePermission>>;

    fn insert_role(&mut self, role: Role) -> Result<Role>;

    fn update_role(&mut self, role: Role) -> Result<Role>;

    /// Remove the role row only; join rows are handled by the caller
    fn delete_role(&mut self, id: RoleId) -> Result<bool>;

    fn insert_permission_set(&mut self, set: PermissionSetRef) -> Result<PermissionSetRef>;

    fn delete_permission_set(&mut self, id: PermissionSetId) -> Result<bool>;

    fn insert_role_permission(&mut self, row: RolePermission) -> Result<RolePermission>;

    /// Remove join rows by id, returning how many were removed
    fn delete_role_permissions(&mut self, ids: &[RolePermissionId]) -> Result<usize>;

    fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.tables()?.iter().any(|t| t == name))
    }

    fn find_role(&self, id: RoleId) -> Result<Option<Role>> {
        Ok(self.roles()?.into_iter().find(|r| r.id == id))
    }

    /// Exact-name lookup
    fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self.roles()?.into_iter().find(|r| r.name == name))
    }

    fn find_permission_set(&self, id: PermissionSetId) -> Result<Option<PermissionSetRef>> {
        Ok(self.permission_sets()?.into_iter().find(|s| s.id == id))
    }

    fn find_permission_set_by_name(&self, name: &str) -> Result<Option<PermissionSetRef>> {
        Ok(self.permission_sets()?.into_iter().find(|s| s.name == name))
    }

    /// Join rows owned by one role, in insertion order
    fn role_permissions_for(&self, role_id: RoleId) -> Result<Vec<RolePermission>> {
        Ok(self
            .role_permissions()?
            .into_iter()
            .filter(|rp| rp.role_id == role_id)
            .collect())
    }

    /// Permission set references attached to a role, in association order
    ///
    /// Inner join: a join row whose permission set no longer exists is
    /// skipped.
    fn permission_sets_for(&self, role_id: RoleId) -> Result<Vec<PermissionSetRef>> {
        let sets = self.permission_sets()?;
        Ok(self
            .role_permissions_for(role_id)?
            .into_iter()
            .filter_map(|rp| sets.iter().find(|s| s.id == rp.permission_set_id).cloned())
            .collect())
    }
}

/// Connectivity probe
pub trait Connector {
    /// Open a store handle
    ///
    /// # Errors
    /// `NoDatabase` when nothing is configured or reachable
    fn connect(&self) -> Result<Box<dyn RoleStore>>;
}

/// Connector for processes with no database configured
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

impl Connector for Disconnected {
    fn connect(&self) -> Result<Box<dyn RoleStore>> {
        Err(PermsetError::NoDatabase("no database configured".to_string()))
    }
}

pub(crate) fn missing_table(name: &str) -> PermsetError {
    PermsetError::StatementInvalid(format!("no such table: {}", name))
}
