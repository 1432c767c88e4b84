//! The two managed environments and the selector used by `clean`.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two independent application stacks managed in parallel.
///
/// Each environment has its own web service, CLI runner, database, and port.
/// `all` is never an environment identity; it exists only as a selector
/// ([`EnvSelector::All`]) for the database-reset flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Tests,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Development, Environment::Tests];

    /// Logical name of the web server service in the compose descriptor.
    pub fn web_service(self) -> &'static str {
        match self {
            Environment::Development => "wordpress",
            Environment::Tests => "tests-wordpress",
        }
    }

    /// Logical name of the WP-CLI runner service.
    pub fn cli_service(self) -> &'static str {
        match self {
            Environment::Development => "cli",
            Environment::Tests => "tests-cli",
        }
    }

    /// Logical name of the database service.
    pub fn db_service(self) -> &'static str {
        match self {
            Environment::Development => "mysql",
            Environment::Tests => "tests-mysql",
        }
    }

    /// Directory under the work dir holding this environment's synced tree.
    pub fn tree_name(self) -> &'static str {
        match self {
            Environment::Development => "wordpress",
            Environment::Tests => "tests-wordpress",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Tests => "tests",
        })
    }
}

/// Target selector for configuration-mutating operations that accept `all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvSelector {
    All,
    Development,
    #[default]
    Tests,
}

impl EnvSelector {
    /// The concrete environments this selector expands to.
    pub fn environments(self) -> &'static [Environment] {
        match self {
            EnvSelector::All => &Environment::ALL,
            EnvSelector::Development => &[Environment::Development],
            EnvSelector::Tests => &[Environment::Tests],
        }
    }
}

impl FromStr for EnvSelector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(EnvSelector::All),
            "development" => Ok(EnvSelector::Development),
            "tests" => Ok(EnvSelector::Tests),
            other => Err(ConfigError::UnknownEnvironment(other.to_owned())),
        }
    }
}

impl fmt::Display for EnvSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnvSelector::All => "all",
            EnvSelector::Development => "development",
            EnvSelector::Tests => "tests",
        })
    }
}
