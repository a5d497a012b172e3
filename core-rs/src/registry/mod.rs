//! Authorization registry module
//!
//! The registry is injected wherever it is written to; nothing in this crate
//! keeps a process-global one.

pub mod role_configuration;
pub mod sync;

pub use role_configuration::{PermissionRegistry, RoleConfiguration};
pub use sync::sync;
