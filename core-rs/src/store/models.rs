//! Persisted records: roles, permission set references and the join rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RoleId = u64;
pub type PermissionSetId = u64;
pub type RolePermissionId = u64;

/// Role names reserved by the platform; never synced by this crate
pub const BASE_ROLE_NAMES: [&str; 2] = ["admin", "user"];

/// Row with a store-assigned primary key
pub trait Record {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

/// Role record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Unsaved role; the store assigns the id
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Role {
            id: 0,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Exact match against the reserved names ("Admin" is not a base role)
    pub fn is_base(&self) -> bool {
        BASE_ROLE_NAMES.contains(&self.name.as_str())
    }
}

impl Record for Role {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// Permission set reference: a persisted pointer to a capability handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSetRef {
    pub id: PermissionSetId,
    /// Display name
    pub name: String,
    /// Identifier resolved through the permission set resolver
    pub set: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PermissionSetRef {
    pub fn new(name: impl Into<String>, set: impl Into<String>) -> Self {
        PermissionSetRef {
            id: 0,
            name: name.into(),
            set: set.into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Record for PermissionSetRef {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// Join row between a role and a permission set reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    pub id: RolePermissionId,
    pub role_id: RoleId,
    pub permission_set_id: PermissionSetId,
}

impl RolePermission {
    pub fn new(role_id: RoleId, permission_set_id: PermissionSetId) -> Self {
        RolePermission {
            id: 0,
            role_id,
            permission_set_id,
        }
    }
}

impl Record for RolePermission {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}
