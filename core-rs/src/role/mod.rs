//! Role module
//!
//! Roles carry a has-many-through relationship to permission set references,
//! a case-insensitive unique name, and a post-save hook that syncs the
//! authorization registry.

pub mod query;
pub mod repository;
pub mod validation;

pub use query::{non_base_roles, permission_set_identifiers, resolved_permission_sets};
pub use repository::{RoleForm, RoleRepository, SaveOutcome};
pub use validation::{validate_role_name, FieldError, ValidationErrors};
