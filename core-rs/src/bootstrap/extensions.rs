//! Extension manifests
//!
//! Extension files live under an extensions directory and are picked up by
//! name: anything matching `*_extension*.yaml` (or `.yml`), at any depth.
//! They load in sorted path order. Each manifest can declare permission sets,
//! which are registered into the resolver.
//!
//! ```yaml
//! name: warehouse
//! permissionSets:
//!   - id: WarehouseManagement
//!     description: Stock and transfers
//!     grants:
//!       - action: manage
//!         subject: StockItem
//! ```

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::capability::{Grant, PermissionSetResolver, StaticPermissionSet};
use crate::errors::{PermsetError, Result};

/// File name convention for extension manifests
pub const EXTENSION_FILE_PATTERN: &str = r"^.+_extension[^/]*\.ya?ml$";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub permission_sets: Vec<PermissionSetDecl>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PermissionSetDecl {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl ExtensionManifest {
    /// Parse and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PermsetError::Extension(format!("cannot read {}: {}", path.display(), e))
        })?;

        let manifest: ExtensionManifest = serde_yaml::from_str(&content).map_err(|e| {
            PermsetError::Extension(format!("invalid manifest {}: {}", path.display(), e))
        })?;

        for decl in &manifest.permission_sets {
            if decl.id.trim().is_empty() {
                return Err(PermsetError::Extension(format!(
                    "{}: permission set id cannot be blank",
                    path.display()
                )));
            }
        }

        Ok(manifest)
    }

    /// Register every declared permission set; returns their ids
    pub fn apply(&self, resolver: &mut PermissionSetResolver) -> Vec<String> {
        self.permission_sets
            .iter()
            .map(|decl| {
                let mut set = StaticPermissionSet::new(decl.id.clone(), decl.grants.clone());
                if let Some(description) = &decl.description {
                    set = set.with_description(description.clone());
                }
                resolver.register_static(set);
                decl.id.clone()
            })
            .collect()
    }
}

/// What one load pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<PathBuf>,
    /// Already loaded by an earlier pass (only with `cache_classes`)
    pub skipped: Vec<PathBuf>,
    pub permission_sets: Vec<String>,
}

/// Finds and applies extension manifests
#[derive(Debug, Clone)]
pub struct ExtensionLoader {
    dir: Option<PathBuf>,
    cache_classes: bool,
    pattern: Regex,
    loaded: BTreeSet<PathBuf>,
}

impl ExtensionLoader {
    /// # Arguments
    /// * `dir` - Extensions directory; `None` loads nothing
    /// * `cache_classes` - Load each manifest once per loader instead of on every pass
    pub fn new(dir: Option<PathBuf>, cache_classes: bool) -> Result<Self> {
        Ok(ExtensionLoader {
            dir,
            cache_classes,
            pattern: Regex::new(EXTENSION_FILE_PATTERN)?,
            loaded: BTreeSet::new(),
        })
    }

    /// Loader with no extensions directory
    pub fn empty() -> Result<Self> {
        Self::new(None, false)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn cache_classes(&self) -> bool {
        self.cache_classes
    }

    /// Manifests loaded so far by this loader
    pub fn loaded(&self) -> impl Iterator<Item = &Path> {
        self.loaded.iter().map(|p| p.as_path())
    }

    /// Matching manifest paths, sorted
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let Some(dir) = self.dir.as_ref() else {
            return Ok(Vec::new());
        };
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "extensions directory missing");
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .file_name()
                .to_str()
                .map(|name| self.pattern.is_match(name))
                .unwrap_or(false);
            if matches {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    /// One load pass: every manifest applied exactly once, in sorted order
    pub fn load(&mut self, resolver: &mut PermissionSetResolver) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for path in self.discover()? {
            if self.cache_classes && self.loaded.contains(&path) {
                report.skipped.push(path);
                continue;
            }

            let manifest = ExtensionManifest::load(&path)?;
            let ids = manifest.apply(resolver);
            debug!(
                manifest = %path.display(),
                name = manifest.name.as_deref().unwrap_or("-"),
                permission_sets = ?ids,
                "extension loaded"
            );

            report.permission_sets.extend(ids);
            self.loaded.insert(path.clone());
            report.loaded.push(path);
        }

        if !report.loaded.is_empty() {
            info!(
                loaded = report.loaded.len(),
                skipped = report.skipped.len(),
                "extensions loaded"
            );
        }
        Ok(report)
    }
}
