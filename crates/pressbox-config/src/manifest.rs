use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// On-disk `pressbox.toml` manifest, prior to resolution.
///
/// All sections are optional; an empty file is a valid manifest describing a
/// plain two-environment stack on the default ports.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Display name, used as the site title and to derive the work directory.
    #[serde(default)]
    pub name: Option<String>,
    /// Pass orchestration-backend output through for troubleshooting.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub ports: PortsSection,
    /// Application-config mapping applied with `wp config set`.
    #[serde(default)]
    pub config: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub sources: SourcesSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PortsSection {
    #[serde(default = "default_development_port")]
    pub development: u16,
    #[serde(default = "default_tests_port")]
    pub tests: u16,
}

impl Default for PortsSection {
    fn default() -> Self {
        Self {
            development: default_development_port(),
            tests: default_tests_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourcesSection {
    /// Local WordPress tree synchronized into both environments' work trees.
    #[serde(default)]
    pub core: Option<String>,
    /// Ordered theme sources; the first entry is activated after install.
    #[serde(default)]
    pub themes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_development_port() -> u16 {
    8888
}

fn default_tests_port() -> u16 {
    8889
}

fn default_backend() -> String {
    "docker".to_owned()
}

pub fn parse_manifest_str(content: &str) -> Result<Manifest, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read and parse a manifest file. A missing file yields the default
/// manifest, matching the zero-configuration start path.
pub fn parse_manifest_file(path: &Path) -> Result<Manifest, ConfigError> {
    if !path.exists() {
        tracing::debug!("no manifest at {}, using defaults", path.display());
        return Ok(Manifest::default());
    }
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let m = parse_manifest_str("").unwrap();
        assert_eq!(m.name, None);
        assert!(!m.debug);
        assert_eq!(m.ports.development, 8888);
        assert_eq!(m.ports.tests, 8889);
        assert!(m.config.is_empty());
        assert_eq!(m.runtime.backend, "docker");
    }

    #[test]
    fn full_manifest_parses() {
        let m = parse_manifest_str(
            r#"
name = "My Site"
debug = true

[ports]
development = 9000
tests = 9001

[config]
WP_DEBUG = true
WP_SITEURL = "http://localhost:9000"

[sources]
core = "./wordpress"
themes = ["./themes/my-theme"]

[runtime]
backend = "mock"
"#,
        )
        .unwrap();
        assert_eq!(m.name.as_deref(), Some("My Site"));
        assert!(m.debug);
        assert_eq!(m.ports.development, 9000);
        assert_eq!(m.ports.tests, 9001);
        assert_eq!(m.config.len(), 2);
        assert_eq!(m.sources.core.as_deref(), Some("./wordpress"));
        assert_eq!(m.sources.themes, vec!["./themes/my-theme"]);
        assert_eq!(m.runtime.backend, "mock");
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(parse_manifest_str("unknown_key = 1").is_err());
    }

    #[test]
    fn missing_file_is_default_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let m = parse_manifest_file(&dir.path().join("pressbox.toml")).unwrap();
        assert_eq!(m, Manifest::default());
    }

    #[test]
    fn config_preserves_value_types() {
        let m = parse_manifest_str(
            r#"
[config]
WP_DEBUG = true
WP_MAX = 42
TITLE = "hello"
"#,
        )
        .unwrap();
        assert!(matches!(m.config["WP_DEBUG"], toml::Value::Boolean(true)));
        assert!(matches!(m.config["WP_MAX"], toml::Value::Integer(42)));
        assert!(matches!(m.config["TITLE"], toml::Value::String(_)));
    }
}
