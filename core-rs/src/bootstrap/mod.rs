//! Bootstrap module
//!
//! Loads extensions and resynchronizes the authorization registry from
//! persisted roles when the process starts or reloads.

pub mod environment;
pub mod extensions;
pub mod sequencer;

pub use environment::{Environment, ExecutionMode, ASSET_PRECOMPILE_TASK};
pub use extensions::{ExtensionLoader, ExtensionManifest, LoadReport, PermissionSetDecl};
pub use sequencer::{Bootstrap, BootstrapOutcome, REQUIRED_TABLES};
