//! Execution environment seen by the bootstrap sequencer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::PermsetError;

/// Command-line argument marking an asset-only build step
pub const ASSET_PRECOMPILE_TASK: &str = "assets:precompile";

/// Execution mode of the host process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Development,
    Production,
    Test,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionMode::Development => "development",
            ExecutionMode::Production => "production",
            ExecutionMode::Test => "test",
        };
        f.write_str(name)
    }
}

impl FromStr for ExecutionMode {
    type Err = PermsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(ExecutionMode::Development),
            "production" | "prod" => Ok(ExecutionMode::Production),
            "test" => Ok(ExecutionMode::Test),
            other => Err(PermsetError::Validation(format!(
                "unknown environment '{}' (expected development, production or test)",
                other
            ))),
        }
    }
}

/// Mode plus the argv the process was started with
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Environment {
    pub mode: ExecutionMode,
    pub args: Vec<String>,
}

impl Environment {
    pub fn new<I, S>(mode: ExecutionMode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Environment {
            mode,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Environment for the current process argv
    pub fn from_process(mode: ExecutionMode) -> Self {
        Self::new(mode, std::env::args())
    }

    pub fn is_test(&self) -> bool {
        self.mode == ExecutionMode::Test
    }

    /// True when the process was invoked only to precompile assets
    pub fn is_asset_precompile(&self) -> bool {
        self.args.iter().any(|a| a == ASSET_PRECOMPILE_TASK)
    }
}
