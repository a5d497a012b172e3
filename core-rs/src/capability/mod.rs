//! Capability module
//!
//! Permission set references resolve to capability handles through a
//! registered lookup table.

pub mod catalog;
pub mod handle;
pub mod resolver;

pub use handle::{identifiers, CapabilityHandle, CapabilityRef, Grant, StaticPermissionSet};
pub use resolver::{HandleFactory, PermissionSetResolver};
