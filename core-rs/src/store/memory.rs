//! In-process store
//!
//! Each table is `None` until created, so tests can model a database whose
//! schema has not been migrated yet.

use chrono::Utc;

use super::models::{PermissionSetId, PermissionSetRef, Role, RoleId, RolePermission, RolePermissionId};
use super::table::Table;
use super::{missing_table, Connector, RoleStore};
use super::{ALL_TABLES, PERMISSION_SETS_TABLE, ROLES_TABLE, ROLE_PERMISSIONS_TABLE};
use crate::errors::{PermsetError, Result};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    roles: Option<Table<Role>>,
    permission_sets: Option<Table<PermissionSetRef>>,
    role_permissions: Option<Table<RolePermission>>,
}

impl MemoryStore {
    /// Reachable database with no tables
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Database with every table created
    pub fn migrated() -> Self {
        let mut store = MemoryStore::new();
        for table in ALL_TABLES {
            store.create_table(table);
        }
        store
    }

    /// Create a table if missing; unknown names are ignored
    pub fn create_table(&mut self, name: &str) {
        match name {
            ROLES_TABLE => {
                self.roles.get_or_insert_with(Table::default);
            }
            PERMISSION_SETS_TABLE => {
                self.permission_sets.get_or_insert_with(Table::default);
            }
            ROLE_PERMISSIONS_TABLE => {
                self.role_permissions.get_or_insert_with(Table::default);
            }
            _ => {}
        }
    }

    pub fn drop_table(&mut self, name: &str) {
        match name {
            ROLES_TABLE => self.roles = None,
            PERMISSION_SETS_TABLE => self.permission_sets = None,
            ROLE_PERMISSIONS_TABLE => self.role_permissions = None,
            _ => {}
        }
    }

    fn roles_table(&mut self) -> Result<&mut Table<Role>> {
        self.roles.as_mut().ok_or_else(|| missing_table(ROLES_TABLE))
    }

    fn permission_sets_table(&mut self) -> Result<&mut Table<PermissionSetRef>> {
        self.permission_sets
            .as_mut()
            .ok_or_else(|| missing_table(PERMISSION_SETS_TABLE))
    }

    fn role_permissions_table(&mut self) -> Result<&mut Table<RolePermission>> {
        self.role_permissions
            .as_mut()
            .ok_or_else(|| missing_table(ROLE_PERMISSIONS_TABLE))
    }
}

impl RoleStore for MemoryStore {
    fn tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        if self.roles.is_some() {
            tables.push(ROLES_TABLE.to_string());
        }
        if self.permission_sets.is_some() {
            tables.push(PERMISSION_SETS_TABLE.to_string());
        }
        if self.role_permissions.is_some() {
            tables.push(ROLE_PERMISSIONS_TABLE.to_string());
        }
        Ok(tables)
    }

    fn roles(&self) -> Result<Vec<Role>> {
        self.roles
            .as_ref()
            .map(|t| t.rows().to_vec())
            .ok_or_else(|| missing_table(ROLES_TABLE))
    }

    fn permission_sets(&self) -> Result<Vec<PermissionSetRef>> {
        self.permission_sets
            .as_ref()
            .map(|t| t.rows().to_vec())
            .ok_or_else(|| missing_table(PERMISSION_SETS_TABLE))
    }

    fn role_permissions(&self) -> Result<Vec<RolePermission>> {
        self.role_permissions
            .as_ref()
            .map(|t| t.rows().to_vec())
            .ok_or_else(|| missing_table(ROLE_PERMISSIONS_TABLE))
    }

    fn insert_role(&mut self, role: Role) -> Result<Role> {
        Ok(self.roles_table()?.insert(role))
    }

    fn update_role(&mut self, mut role: Role) -> Result<Role> {
        role.updated_at = Utc::now();
        let id = role.id;
        if self.roles_table()?.update(role.clone()) {
            Ok(role)
        } else {
            Err(PermsetError::RoleNotFound(format!("id {}", id)))
        }
    }

    fn delete_role(&mut self, id: RoleId) -> Result<bool> {
        Ok(self.roles_table()?.delete_where(|r| r.id == id) > 0)
    }

    fn insert_permission_set(&mut self, set: PermissionSetRef) -> Result<PermissionSetRef> {
        Ok(self.permission_sets_table()?.insert(set))
    }

    fn delete_permission_set(&mut self, id: PermissionSetId) -> Result<bool> {
        Ok(self.permission_sets_table()?.delete_where(|s| s.id == id) > 0)
    }

    fn insert_role_permission(&mut self, row: RolePermission) -> Result<RolePermission> {
        Ok(self.role_permissions_table()?.insert(row))
    }

    fn delete_role_permissions(&mut self, ids: &[RolePermissionId]) -> Result<usize> {
        Ok(self
            .role_permissions_table()?
            .delete_where(|rp| ids.contains(&rp.id)))
    }
}

/// Each connection sees a snapshot of the store as it was at connect time
impl Connector for MemoryStore {
    fn connect(&self) -> Result<Box<dyn RoleStore>> {
        Ok(Box::new(self.clone()))
    }
}
