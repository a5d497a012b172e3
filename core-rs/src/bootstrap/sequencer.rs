//! Bootstrap sequencer
//!
//! Run once per process (re)configuration. Stages:
//!
//! ```text
//! Init ──► Loaded ──► CheckPrecompile ──► CheckDb ──► Sync ──► Synced
//!            │              │                │
//!            ▼              ▼                ├─► NoDatabase      (warn)
//!     SkippedTestMode  SkippedAssetPrecompile├─► SchemaNotReady  (warn)
//!                                            └─► TablesMissing   (silent)
//! ```
//!
//! Connectivity and schema failures end the run quietly. Resolution and
//! registry errors during `Sync` abort the run and are returned.

use tracing::{debug, info, warn};

use super::environment::Environment;
use super::extensions::{ExtensionLoader, LoadReport};
use crate::capability::PermissionSetResolver;
use crate::errors::{PermsetError, Result};
use crate::registry::{self, PermissionRegistry};
use crate::role::query;
use crate::store::{Connector, RoleStore, PERMISSION_SETS_TABLE, ROLES_TABLE};

/// Tables that must exist before any role is synced
pub const REQUIRED_TABLES: [&str; 2] = [ROLES_TABLE, PERMISSION_SETS_TABLE];

/// Terminal state a run ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    SkippedTestMode,
    SkippedAssetPrecompile,
    NoDatabase,
    SchemaNotReady(String),
    TablesMissing,
    /// Names of the roles pushed into the registry, in sync order
    Synced { roles: Vec<String> },
}

impl BootstrapOutcome {
    pub fn synced_roles(&self) -> &[String] {
        match self {
            BootstrapOutcome::Synced { roles } => roles,
            _ => &[],
        }
    }
}

enum State {
    Init,
    Loaded,
    CheckPrecompile,
    CheckDb,
    Sync(Box<dyn RoleStore>),
    Done(BootstrapOutcome),
}

/// Startup / reload sequencer
#[derive(Debug, Clone)]
pub struct Bootstrap {
    loader: ExtensionLoader,
    last_load: Option<LoadReport>,
}

impl Bootstrap {
    pub fn new(loader: ExtensionLoader) -> Self {
        Bootstrap {
            loader,
            last_load: None,
        }
    }

    pub fn loader(&self) -> &ExtensionLoader {
        &self.loader
    }

    /// Extension load report from the most recent run
    pub fn last_load(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    /// Run the sequence once
    ///
    /// # Arguments
    /// * `env` - Execution mode and argv
    /// * `connector` - Database probe
    /// * `resolver` - Receives extension registrations; resolves role permission sets
    /// * `registry` - Authorization registry to sync into
    ///
    /// # Errors
    /// Extension load failures, and resolution or registry failures while syncing.
    pub fn run(
        &mut self,
        env: &Environment,
        connector: &dyn Connector,
        resolver: &mut PermissionSetResolver,
        registry: &mut dyn PermissionRegistry,
    ) -> Result<BootstrapOutcome> {
        let mut state = State::Init;

        loop {
            state = match state {
                State::Init => {
                    self.last_load = Some(self.loader.load(resolver)?);
                    State::Loaded
                }
                State::Loaded => {
                    if env.is_test() {
                        State::Done(BootstrapOutcome::SkippedTestMode)
                    } else {
                        State::CheckPrecompile
                    }
                }
                State::CheckPrecompile => {
                    if env.is_asset_precompile() {
                        State::Done(BootstrapOutcome::SkippedAssetPrecompile)
                    } else {
                        State::CheckDb
                    }
                }
                State::CheckDb => match Self::check_db(connector) {
                    Ok(Some(store)) => State::Sync(store),
                    Ok(None) => State::Done(BootstrapOutcome::TablesMissing),
                    Err(e) => State::Done(Self::recover(e)?),
                },
                State::Sync(store) => match Self::sync_all(store.as_ref(), resolver, registry) {
                    Ok(roles) => State::Done(BootstrapOutcome::Synced { roles }),
                    Err(e) => State::Done(Self::recover(e)?),
                },
                State::Done(outcome) => {
                    match &outcome {
                        BootstrapOutcome::Synced { roles } => {
                            info!(roles = roles.len(), "role permissions synchronized")
                        }
                        other => debug!(outcome = ?other, "role configuration skipped"),
                    }
                    return Ok(outcome);
                }
            };
        }
    }

    /// Connect and check both required tables exist
    fn check_db(connector: &dyn Connector) -> Result<Option<Box<dyn RoleStore>>> {
        let store = connector.connect()?;
        let tables = store.tables()?;
        let present = REQUIRED_TABLES
            .iter()
            .all(|required| tables.iter().any(|t| t == required));
        Ok(present.then_some(store))
    }

    fn sync_all(
        store: &dyn RoleStore,
        resolver: &PermissionSetResolver,
        registry: &mut dyn PermissionRegistry,
    ) -> Result<Vec<String>> {
        let mut synced = Vec::new();
        for role in query::non_base_roles(store)? {
            let handles = query::resolved_permission_sets(store, resolver, &role)?;
            registry::sync(registry, &role.name, handles)?;
            synced.push(role.name);
        }
        Ok(synced)
    }

    /// Turn a connectivity or schema failure into a terminal outcome
    fn recover(err: PermsetError) -> Result<BootstrapOutcome> {
        match err {
            PermsetError::NoDatabase(_) => {
                warn!("No database available, skipping role configuration");
                Ok(BootstrapOutcome::NoDatabase)
            }
            PermsetError::StatementInvalid(message) => {
                warn!("Skipping role configuration: {}", message);
                Ok(BootstrapOutcome::SchemaNotReady(message))
            }
            other => Err(other),
        }
    }
}
