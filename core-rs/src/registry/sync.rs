//! Authorization registry sync

use tracing::debug;

use super::role_configuration::PermissionRegistry;
use crate::capability::{identifiers, CapabilityRef};
use crate::errors::Result;

/// Push one role's resolved handles into the registry
///
/// Replaces whatever the registry held for `role_name`. Registry errors are
/// returned to the caller as-is.
pub fn sync(
    registry: &mut dyn PermissionRegistry,
    role_name: &str,
    handles: Vec<CapabilityRef>,
) -> Result<()> {
    debug!(
        role = role_name,
        permission_sets = ?identifiers(&handles),
        "assigning permissions"
    );
    registry.assign_permissions(role_name, handles)
}
