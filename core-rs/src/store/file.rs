/**
 * file.rs
 * JSON-file backed role store
 *
 * Layout under the data directory:
 * - roles.json
 * - permission_sets.json
 * - role_permissions.json
 *
 * Each file holds one table: `{"nextId": N, "rows": [...]}`.
 * A table exists iff its file exists. Files are re-read on every query so
 * several processes sharing a data directory see each other's writes.
 */

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::models::{
    PermissionSetId, PermissionSetRef, Record, Role, RoleId, RolePermission, RolePermissionId,
};
use super::table::Table;
use super::{missing_table, Connector, RoleStore};
use super::{ALL_TABLES, PERMISSION_SETS_TABLE, ROLES_TABLE, ROLE_PERMISSIONS_TABLE};
use crate::errors::{PermsetError, Result};

/// Role store rooted at a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open an existing data directory
    ///
    /// # Errors
    /// `NoDatabase` if the directory does not exist
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            return Err(PermsetError::NoDatabase(format!(
                "data directory {} does not exist",
                data_dir.display()
            )));
        }
        Ok(FileStore { data_dir })
    }

    /// Create the data directory (if needed) and open it
    pub fn create<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        fs::create_dir_all(data_dir.as_ref()).map_err(|e| {
            PermsetError::IoError(format!("Failed to create data directory: {}", e))
        })?;
        Self::open(data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create every missing table file; returns the tables created
    pub fn migrate(&self) -> Result<Vec<String>> {
        let mut created = Vec::new();
        for table in ALL_TABLES {
            let path = self.table_path(table);
            if path.exists() {
                continue;
            }
            match table {
                ROLES_TABLE => self.write_table(table, &Table::<Role>::default())?,
                PERMISSION_SETS_TABLE => {
                    self.write_table(table, &Table::<PermissionSetRef>::default())?
                }
                _ => self.write_table(table, &Table::<RolePermission>::default())?,
            }
            debug!(table, "created table");
            created.push(table.to_string());
        }
        Ok(created)
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", table))
    }

    fn read_table<T: DeserializeOwned>(&self, table: &str) -> Result<Table<T>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(missing_table(table));
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            PermsetError::StatementInvalid(format!("cannot read table {}: {}", table, e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            PermsetError::StatementInvalid(format!("table {} is corrupt: {}", table, e))
        })
    }

    fn write_table<T: Serialize>(&self, table: &str, rows: &Table<T>) -> Result<()> {
        let json = serde_json::to_string_pretty(rows).map_err(|e| {
            PermsetError::SerializationError(format!("Failed to serialize table {}: {}", table, e))
        })?;

        // Write-then-rename keeps readers from seeing a half-written table
        let path = self.table_path(table);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            PermsetError::IoError(format!("Failed to write table {}: {}", table, e))
        })?;
        fs::rename(&tmp, &path).map_err(|e| {
            PermsetError::IoError(format!("Failed to replace table {}: {}", table, e))
        })?;

        Ok(())
    }

    fn modify<T, R, F>(&self, table: &str, f: F) -> Result<R>
    where
        T: Record + Clone + Serialize + DeserializeOwned,
        F: FnOnce(&mut Table<T>) -> R,
    {
        let mut rows = self.read_table::<T>(table)?;
        let result = f(&mut rows);
        self.write_table(table, &rows)?;
        Ok(result)
    }
}

impl RoleStore for FileStore {
    fn tables(&self) -> Result<Vec<String>> {
        Ok(ALL_TABLES
            .iter()
            .filter(|t| self.table_path(t).exists())
            .map(|t| t.to_string())
            .collect())
    }

    fn roles(&self) -> Result<Vec<Role>> {
        Ok(self.read_table::<Role>(ROLES_TABLE)?.rows().to_vec())
    }

    fn permission_sets(&self) -> Result<Vec<PermissionSetRef>> {
        Ok(self
            .read_table::<PermissionSetRef>(PERMISSION_SETS_TABLE)?
            .rows()
            .to_vec())
    }

    fn role_permissions(&self) -> Result<Vec<RolePermission>> {
        Ok(self
            .read_table::<RolePermission>(ROLE_PERMISSIONS_TABLE)?
            .rows()
            .to_vec())
    }

    fn insert_role(&mut self, role: Role) -> Result<Role> {
        self.modify(ROLES_TABLE, |t: &mut Table<Role>| t.insert(role))
    }

    fn update_role(&mut self, mut role: Role) -> Result<Role> {
        role.updated_at = Utc::now();
        let id = role.id;
        let row = role.clone();
        if self.modify(ROLES_TABLE, |t: &mut Table<Role>| t.update(row))? {
            Ok(role)
        } else {
            Err(PermsetError::RoleNotFound(format!("id {}", id)))
        }
    }

    fn delete_role(&mut self, id: RoleId) -> Result<bool> {
        let removed = self.modify(ROLES_TABLE, |t: &mut Table<Role>| {
            t.delete_where(|r| r.id == id)
        })?;
        Ok(removed > 0)
    }

    fn insert_permission_set(&mut self, set: PermissionSetRef) -> Result<PermissionSetRef> {
        self.modify(PERMISSION_SETS_TABLE, |t: &mut Table<PermissionSetRef>| {
            t.insert(set)
        })
    }

    fn delete_permission_set(&mut self, id: PermissionSetId) -> Result<bool> {
        let removed = self.modify(PERMISSION_SETS_TABLE, |t: &mut Table<PermissionSetRef>| {
            t.delete_where(|s| s.id == id)
        })?;
        Ok(removed > 0)
    }

    fn insert_role_permission(&mut self, row: RolePermission) -> Result<RolePermission> {
        self.modify(ROLE_PERMISSIONS_TABLE, |t: &mut Table<RolePermission>| {
            t.insert(row)
        })
    }

    fn delete_role_permissions(&mut self, ids: &[RolePermissionId]) -> Result<usize> {
        self.modify(ROLE_PERMISSIONS_TABLE, |t: &mut Table<RolePermission>| {
            t.delete_where(|rp| ids.contains(&rp.id))
        })
    }
}

/// Connector over an optional data directory
#[derive(Debug, Clone, Default)]
pub struct FileConnector {
    data_dir: Option<PathBuf>,
}

impl FileConnector {
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        FileConnector { data_dir }
    }
}

impl Connector for FileConnector {
    fn connect(&self) -> Result<Box<dyn RoleStore>> {
        let data_dir = self.data_dir.as_ref().ok_or_else(|| {
            PermsetError::NoDatabase("no data directory configured".to_string())
        })?;
        Ok(Box::new(FileStore::open(data_dir)?))
    }
}
