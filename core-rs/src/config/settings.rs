/**
 * settings.rs
 * Parser for permset.yaml (YAML format)
 *
 * Format:
 * ```yaml
 * apiVersion: permset/v1
 * kind: Config
 * spec:
 *   environment: development
 *   database:
 *     path: ./db
 *   extensions:
 *     path: ./extensions
 *     cacheClasses: false
 * ```
 *
 * Relative paths resolve against the directory holding the file.
 * PERMSET_ENV and PERMSET_DATABASE override the file.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bootstrap::{Environment, ExecutionMode, ExtensionLoader};
use crate::errors::{PermsetError, Result};
use crate::store::FileConnector;

pub const API_VERSION: &str = "permset/v1";
pub const KIND: &str = "Config";
pub const CONFIG_FILE: &str = "permset.yaml";
pub const ENV_VAR_ENVIRONMENT: &str = "PERMSET_ENV";
pub const ENV_VAR_DATABASE: &str = "PERMSET_DATABASE";

/// permset.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PermsetConfig {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub spec: Spec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    #[serde(default)]
    pub environment: ExecutionMode,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub extensions: ExtensionsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Data directory; absent means no database is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Load each manifest once per process instead of on every reload
    #[serde(default)]
    pub cache_classes: bool,
}

impl Default for PermsetConfig {
    fn default() -> Self {
        PermsetConfig {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            spec: Spec::default(),
        }
    }
}

impl PermsetConfig {
    /// Load permset.yaml from the given path
    ///
    /// Relative database and extension paths are made absolute against the
    /// file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PermsetError::FileNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            PermsetError::IoError(format!("Failed to read {}: {}", CONFIG_FILE, e))
        })?;

        let mut config: PermsetConfig = serde_yaml::from_str(&content).map_err(|e| {
            PermsetError::ParseError(format!("Invalid {} YAML: {}", CONFIG_FILE, e))
        })?;

        config.validate()?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }

        Ok(config)
    }

    /// Load if present, defaults otherwise; environment overrides applied
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::load(path)?
        } else {
            PermsetConfig::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Validate permset.yaml structure
    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(PermsetError::Validation(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                API_VERSION, self.api_version
            )));
        }

        if self.kind != KIND {
            return Err(PermsetError::Validation(format!(
                "Invalid kind: expected '{}', got '{}'",
                KIND, self.kind
            )));
        }

        Ok(())
    }

    /// Apply PERMSET_ENV / PERMSET_DATABASE
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(ENV_VAR_ENVIRONMENT).ok(),
            std::env::var(ENV_VAR_DATABASE).ok(),
        )
    }

    fn apply_overrides(&mut self, environment: Option<String>, database: Option<String>) -> Result<()> {
        if let Some(env) = environment.filter(|v| !v.trim().is_empty()) {
            self.spec.environment = env.parse()?;
        }
        if let Some(db) = database.filter(|v| !v.trim().is_empty()) {
            self.spec.database.path = Some(PathBuf::from(db));
        }
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.spec.database.path, &mut self.spec.extensions.path]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Save permset.yaml to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(|e| {
            PermsetError::SerializationError(format!("Failed to serialize {}: {}", CONFIG_FILE, e))
        })?;

        fs::write(path.as_ref(), yaml).map_err(|e| {
            PermsetError::IoError(format!("Failed to write {}: {}", CONFIG_FILE, e))
        })?;

        Ok(())
    }

    pub fn environment<I, S>(&self, args: I) -> Environment
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Environment::new(self.spec.environment, args)
    }

    pub fn connector(&self) -> FileConnector {
        FileConnector::new(self.spec.database.path.clone())
    }

    pub fn extension_loader(&self) -> Result<ExtensionLoader> {
        ExtensionLoader::new(
            self.spec.extensions.path.clone(),
            self.spec.extensions.cache_classes,
        )
    }
}
