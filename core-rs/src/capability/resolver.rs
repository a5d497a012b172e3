//! Permission set resolution
//!
//! Maps the identifier strings persisted on permission set references to
//! capability handles. The table is filled by explicit registration (built-in
//! catalog, extension manifests, embedder code); anything not registered fails
//! resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::catalog;
use super::handle::{CapabilityHandle, CapabilityRef, StaticPermissionSet};
use crate::errors::{PermsetError, Result};

/// Factory producing a capability handle for one identifier
pub type HandleFactory = Arc<dyn Fn() -> CapabilityRef + Send + Sync>;

/// Identifier → factory lookup table
#[derive(Clone, Default)]
pub struct PermissionSetResolver {
    factories: BTreeMap<String, HandleFactory>,
}

impl std::fmt::Debug for PermissionSetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionSetResolver")
            .field("identifiers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PermissionSetResolver {
    /// Empty resolver, nothing resolves
    pub fn new() -> Self {
        PermissionSetResolver {
            factories: BTreeMap::new(),
        }
    }

    /// Resolver pre-populated with the built-in catalog
    pub fn with_builtin_catalog() -> Self {
        let mut resolver = Self::new();
        for set in catalog::builtin() {
            resolver.register_static(set.clone());
        }
        resolver
    }

    /// Register a factory under `identifier`
    ///
    /// Returns true if an earlier registration was replaced.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> CapabilityRef + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        let replaced = self
            .factories
            .insert(identifier.clone(), Arc::new(factory))
            .is_some();
        debug!(identifier = %identifier, replaced, "registered permission set");
        replaced
    }

    /// Register a fixed grant list under its own identifier
    pub fn register_static(&mut self, set: StaticPermissionSet) -> bool {
        let identifier = set.identifier().to_string();
        let handle: CapabilityRef = Arc::new(set);
        self.register(identifier, move || Arc::clone(&handle))
    }

    /// Drop a registration; returns true if it existed
    pub fn unregister(&mut self, identifier: &str) -> bool {
        self.factories.remove(identifier).is_some()
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Resolve one identifier
    ///
    /// # Errors
    /// `PermissionSetNotFound` if nothing is registered under `identifier`
    pub fn resolve(&self, identifier: &str) -> Result<CapabilityRef> {
        self.factories
            .get(identifier)
            .map(|factory| factory())
            .ok_or_else(|| PermsetError::PermissionSetNotFound(identifier.to_string()))
    }

    /// Resolve identifiers in order
    ///
    /// Output has the same length and order as the input. The first
    /// unresolvable identifier fails the whole call; no partial result.
    pub fn resolve_all<I, S>(&self, identifiers: I) -> Result<Vec<CapabilityRef>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identifiers
            .into_iter()
            .map(|id| self.resolve(id.as_ref()))
            .collect()
    }
}
