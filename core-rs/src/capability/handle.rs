//! Capability handles - resolved units of permission-granting logic
//!
//! A permission set reference stored against a role only carries an
//! identifier string. Resolution turns that identifier into a
//! [`CapabilityHandle`], which is what the authorization registry holds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared handle as stored in the authorization registry
pub type CapabilityRef = Arc<dyn CapabilityHandle>;

/// One (action, subject) pair a permission set grants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub action: String,
    pub subject: String,
}

impl Grant {
    pub fn new(action: impl Into<String>, subject: impl Into<String>) -> Self {
        Grant {
            action: action.into(),
            subject: subject.into(),
        }
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.subject)
    }
}

/// A unit of permission-granting logic
///
/// Implementations are looked up by identifier; the identifier is the same
/// string persisted in a permission set reference's `set` column.
pub trait CapabilityHandle: fmt::Debug + Send + Sync {
    /// Identifier this handle was registered under
    fn identifier(&self) -> &str;

    /// Grants this handle contributes when activated for a role
    fn grants(&self) -> &[Grant];

    /// Human-readable summary, if one was declared
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Capability handle backed by a fixed grant list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPermissionSet {
    identifier: String,
    description: Option<String>,
    grants: Vec<Grant>,
}

impl StaticPermissionSet {
    pub fn new(identifier: impl Into<String>, grants: Vec<Grant>) -> Self {
        StaticPermissionSet {
            identifier: identifier.into(),
            description: None,
            grants,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl CapabilityHandle for StaticPermissionSet {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn grants(&self) -> &[Grant] {
        &self.grants
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Identifiers of a handle list, in order
pub fn identifiers(handles: &[CapabilityRef]) -> Vec<String> {
    handles.iter().map(|h| h.identifier().to_string()).collect()
}
