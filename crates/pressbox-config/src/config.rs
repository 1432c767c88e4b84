use crate::environment::Environment;
use crate::manifest::Manifest;
use crate::ConfigError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variables overriding the manifest's port numbers.
pub const PORT_VAR: &str = "PRESSBOX_PORT";
pub const TESTS_PORT_VAR: &str = "PRESSBOX_TESTS_PORT";

const DEFAULT_NAME: &str = "WordPress";

/// A value from the application-config mapping.
///
/// Non-string manifest values carry their literal rendering and are passed
/// to `wp config set` with `--raw` so they are not coerced into strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Str(String),
    Raw(String),
}

impl ConfigValue {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigValue::Str(s) | ConfigValue::Raw(s) => s,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ConfigValue::Raw(_))
    }
}

/// Immutable configuration snapshot, resolved once before any lifecycle
/// operation runs. Read-only to every other component.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub name: String,
    pub development_port: u16,
    pub tests_port: u16,
    pub debug: bool,
    /// Application-config keys applied in order during the configure step.
    pub wp_config: BTreeMap<String, ConfigValue>,
    /// Ordered theme slugs; the first entry wins during theme resolution.
    pub theme_slugs: Vec<String>,
    /// Local WordPress tree to synchronize into the work trees, if any.
    pub core_source: Option<PathBuf>,
    /// Gateway backend name ("docker" or "mock").
    pub backend: String,
    /// Instance directory holding the descriptor and synced trees.
    pub work_dir: PathBuf,
    /// Path of the generated compose descriptor. Opaque to the core.
    pub descriptor_path: PathBuf,
}

impl Config {
    /// Resolve a manifest into a snapshot.
    ///
    /// `manifest_dir` anchors relative source paths; `work_root` is the base
    /// directory instances live under. `env_lookup` injects environment
    /// variable access so resolution stays testable without touching process
    /// state.
    pub fn resolve(
        manifest: &Manifest,
        manifest_dir: &Path,
        work_root: &Path,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let name = manifest
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME.to_owned());

        let development_port =
            resolve_port(manifest.ports.development, PORT_VAR, &env_lookup)?;
        let tests_port = resolve_port(manifest.ports.tests, TESTS_PORT_VAR, &env_lookup)?;

        let mut wp_config = BTreeMap::new();
        for (key, value) in &manifest.config {
            wp_config.insert(key.clone(), convert_value(key, value)?);
        }

        let mut theme_slugs = Vec::with_capacity(manifest.sources.themes.len());
        for source in &manifest.sources.themes {
            theme_slugs.push(theme_slug(source)?);
        }

        let core_source = manifest
            .sources
            .core
            .as_ref()
            .map(|src| manifest_dir.join(src));

        let work_dir = work_root.join(slugify(&name));
        let descriptor_path = work_dir.join("docker-compose.yml");

        Ok(Self {
            name,
            development_port,
            tests_port,
            debug: manifest.debug,
            wp_config,
            theme_slugs,
            core_source,
            backend: manifest.runtime.backend.clone(),
            work_dir,
            descriptor_path,
        })
    }

    pub fn port(&self, env: Environment) -> u16 {
        match env {
            Environment::Development => self.development_port,
            Environment::Tests => self.tests_port,
        }
    }

    pub fn site_url(&self, env: Environment) -> String {
        format!("http://localhost:{}", self.port(env))
    }

    /// Directory the given environment's WordPress tree is synced into.
    pub fn tree_dir(&self, env: Environment) -> PathBuf {
        self.work_dir.join(env.tree_name())
    }
}

fn resolve_port(
    manifest_port: u16,
    var: &str,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<u16, ConfigError> {
    match env_lookup(var) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidPortOverride {
                var: var.to_owned(),
                value,
            }),
        None => Ok(manifest_port),
    }
}

fn convert_value(key: &str, value: &toml::Value) -> Result<ConfigValue, ConfigError> {
    match value {
        toml::Value::String(s) => Ok(ConfigValue::Str(s.clone())),
        toml::Value::Boolean(b) => Ok(ConfigValue::Raw(b.to_string())),
        toml::Value::Integer(i) => Ok(ConfigValue::Raw(i.to_string())),
        toml::Value::Float(f) => Ok(ConfigValue::Raw(f.to_string())),
        _ => Err(ConfigError::UnsupportedConfigValue(key.to_owned())),
    }
}

/// Derive the theme slug from a source path: the final path component,
/// which is also the directory name WordPress knows the theme by.
fn theme_slug(source: &str) -> Result<String, ConfigError> {
    Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .ok_or_else(|| ConfigError::EmptyThemeSource(source.to_owned()))
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("wordpress");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest_str;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn resolve(content: &str) -> Config {
        let manifest = parse_manifest_str(content).unwrap();
        Config::resolve(&manifest, Path::new("/project"), Path::new("/work"), no_env).unwrap()
    }

    #[test]
    fn defaults_resolve() {
        let config = resolve("");
        assert_eq!(config.name, "WordPress");
        assert_eq!(config.development_port, 8888);
        assert_eq!(config.tests_port, 8889);
        assert_eq!(config.work_dir, PathBuf::from("/work/wordpress"));
        assert_eq!(
            config.descriptor_path,
            PathBuf::from("/work/wordpress/docker-compose.yml")
        );
        assert!(config.theme_slugs.is_empty());
        assert!(config.core_source.is_none());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let manifest = parse_manifest_str("[ports]\ndevelopment = 9000\ntests = 9001").unwrap();
        let config = Config::resolve(
            &manifest,
            Path::new("/project"),
            Path::new("/work"),
            |var| match var {
                PORT_VAR => Some("7000".to_owned()),
                _ => None,
            },
        )
        .unwrap();
        assert_eq!(config.development_port, 7000);
        assert_eq!(config.tests_port, 9001);
    }

    #[test]
    fn bad_env_override_is_an_error() {
        let manifest = Manifest::default();
        let err = Config::resolve(
            &manifest,
            Path::new("/project"),
            Path::new("/work"),
            |_| Some("not-a-port".to_owned()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPortOverride { .. }));
    }

    #[test]
    fn string_and_raw_config_values() {
        let config = resolve(
            r#"
[config]
WP_DEBUG = true
WP_MAX_MEMORY_LIMIT = 256
WP_SITEURL = "http://localhost:8888"
"#,
        );
        assert_eq!(
            config.wp_config["WP_DEBUG"],
            ConfigValue::Raw("true".to_owned())
        );
        assert_eq!(
            config.wp_config["WP_MAX_MEMORY_LIMIT"],
            ConfigValue::Raw("256".to_owned())
        );
        assert_eq!(
            config.wp_config["WP_SITEURL"],
            ConfigValue::Str("http://localhost:8888".to_owned())
        );
    }

    #[test]
    fn table_config_value_rejected() {
        let manifest = parse_manifest_str("[config]\nNESTED = { a = 1 }").unwrap();
        let err = Config::resolve(&manifest, Path::new("/p"), Path::new("/w"), no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedConfigValue(k) if k == "NESTED"));
    }

    #[test]
    fn theme_slugs_from_source_paths() {
        let config = resolve("[sources]\nthemes = [\"./themes/my-theme\", \"other\"]");
        assert_eq!(config.theme_slugs, vec!["my-theme", "other"]);
    }

    #[test]
    fn core_source_anchored_to_manifest_dir() {
        let config = resolve("[sources]\ncore = \"./wordpress\"");
        assert_eq!(
            config.core_source.as_deref(),
            Some(Path::new("/project/./wordpress"))
        );
    }

    #[test]
    fn work_dir_slug_from_name() {
        let config = resolve("name = \"My Test Site!\"");
        assert_eq!(config.work_dir, PathBuf::from("/work/my-test-site"));
    }

    #[test]
    fn site_urls_use_resolved_ports() {
        let config = resolve("[ports]\ndevelopment = 9000\ntests = 9001");
        assert_eq!(
            config.site_url(Environment::Development),
            "http://localhost:9000"
        );
        assert_eq!(config.site_url(Environment::Tests), "http://localhost:9001");
    }
}
