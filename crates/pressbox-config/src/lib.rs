//! Configuration layer for Pressbox environments.
//!
//! This crate turns a `pressbox.toml` manifest into an immutable [`Config`]
//! snapshot: display name, per-environment ports (with environment-variable
//! overrides), the application-config mapping, theme sources, and the paths
//! the rest of the system works against. It also renders the docker-compose
//! descriptor that the command gateway treats as opaque input.

pub mod config;
pub mod descriptor;
pub mod environment;
pub mod manifest;

pub use config::{Config, ConfigValue};
pub use descriptor::write_descriptor;
pub use environment::{EnvSelector, Environment};
pub use manifest::{parse_manifest_file, parse_manifest_str, Manifest};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("failed to render compose descriptor: {0}")]
    RenderYaml(#[from] serde_yaml::Error),
    #[error("invalid port override in {var}: '{value}'")]
    InvalidPortOverride { var: String, value: String },
    #[error("config value for '{0}' must be a string, boolean, or number")]
    UnsupportedConfigValue(String),
    #[error("theme source '{0}' has no usable name")]
    EmptyThemeSource(String),
    #[error("unknown environment '{0}', expected all, development, or tests")]
    UnknownEnvironment(String),
}
