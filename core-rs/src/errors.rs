//! Error types for permset core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PermsetError {
    #[error("Permission set not found: {0}")]
    PermissionSetNotFound(String),

    #[error("No database available: {0}")]
    NoDatabase(String),

    #[error("Statement invalid: {0}")]
    StatementInvalid(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Permission set reference not found: {0}")]
    PermissionSetRefNotFound(String),

    #[error("Extension error: {0}")]
    Extension(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Regex error: {0}")]
    RegexError(String),
}

impl From<regex::Error> for PermsetError {
    fn from(err: regex::Error) -> Self {
        PermsetError::RegexError(err.to_string())
    }
}

impl From<walkdir::Error> for PermsetError {
    fn from(err: walkdir::Error) -> Self {
        PermsetError::IoError(err.to_string())
    }
}

impl PermsetError {
    /// True for the failures the bootstrap sequencer swallows with a warning
    pub fn is_recoverable_at_boot(&self) -> bool {
        matches!(
            self,
            PermsetError::NoDatabase(_) | PermsetError::StatementInvalid(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PermsetError>;
