//! # permset core
//!
//! Named, composable permission sets for commerce roles.
//!
//! Roles are linked to reusable permission set references. Each reference
//! carries an identifier that resolves, through a registered lookup table, to
//! a capability handle. This crate keeps an authorization registry in step
//! with persisted roles: after every role save, and on every process start or
//! reload through the bootstrap sequencer.
//!
//! Permission *checking* is not done here. This crate declares permissions
//! and synchronizes them.
//!
//! ## Architecture
//!
//! ```text
//!  PermissionSetRef ──► RolePermission ◄── Role
//!        │ set                                │ save
//!        ▼                                    ▼
//!  PermissionSetResolver ──► handles ──► registry::sync ──► PermissionRegistry
//!        ▲                                    ▲
//!        │ extensions                         │ non-base roles
//!        └────────────── Bootstrap::run ──────┘
//! ```

pub mod bootstrap;
pub mod capability;
pub mod config;
pub mod errors;
pub mod logging;
pub mod registry;
pub mod role;
pub mod store;

pub use bootstrap::{Bootstrap, BootstrapOutcome, Environment, ExecutionMode, ExtensionLoader};
pub use capability::{CapabilityHandle, CapabilityRef, Grant, PermissionSetResolver, StaticPermissionSet};
pub use config::PermsetConfig;
pub use errors::{PermsetError, Result};
pub use registry::{PermissionRegistry, RoleConfiguration};
pub use role::{RoleForm, RoleRepository, SaveOutcome, ValidationErrors};
pub use store::{
    Connector, Disconnected, FileConnector, FileStore, MemoryStore, PermissionSetRef, Role,
    RolePermission, RoleStore, BASE_ROLE_NAMES,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
