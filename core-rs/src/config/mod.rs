//! Configuration module

pub mod settings;

pub use settings::{
    DatabaseConfig, ExtensionsConfig, PermsetConfig, Spec, CONFIG_FILE, ENV_VAR_DATABASE,
    ENV_VAR_ENVIRONMENT,
};
