//! Compose descriptor generation.
//!
//! Renders the docker-compose YAML for the six fixed services. The rest of
//! the system only ever sees the written file's path; the schema here is an
//! implementation detail of the config layer.

use crate::config::Config;
use crate::environment::Environment;
use crate::ConfigError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

const WORDPRESS_IMAGE: &str = "wordpress";
const CLI_IMAGE: &str = "wordpress:cli";
const DB_IMAGE: &str = "mariadb";
const DB_PASSWORD: &str = "password";
const DOCROOT: &str = "/var/www/html";

#[derive(Debug, Serialize)]
struct ComposeFile {
    version: String,
    services: BTreeMap<String, Service>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    volumes: BTreeMap<String, NamedVolume>,
}

#[derive(Debug, Default, Serialize)]
struct Service {
    image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
struct NamedVolume {}

/// Render the compose descriptor for a resolved config.
pub fn render_descriptor(config: &Config) -> Result<String, ConfigError> {
    let mut services = BTreeMap::new();
    let mut volumes = BTreeMap::new();

    for env in Environment::ALL {
        // Either a bind mount of the synced tree or a named volume shared
        // between the web service and its CLI runner.
        let docroot_mount = if config.core_source.is_some() {
            format!("{}:{DOCROOT}", config.tree_dir(env).display())
        } else {
            let volume_name = format!("{}-data", env.tree_name());
            volumes.insert(volume_name.clone(), NamedVolume::default());
            format!("{volume_name}:{DOCROOT}")
        };

        services.insert(
            env.db_service().to_owned(),
            Service {
                image: DB_IMAGE.to_owned(),
                environment: BTreeMap::from([
                    ("MYSQL_ROOT_PASSWORD".to_owned(), DB_PASSWORD.to_owned()),
                    ("MYSQL_DATABASE".to_owned(), "wordpress".to_owned()),
                ]),
                ..Service::default()
            },
        );

        let wp_env = BTreeMap::from([
            ("WORDPRESS_DB_HOST".to_owned(), env.db_service().to_owned()),
            ("WORDPRESS_DB_USER".to_owned(), "root".to_owned()),
            ("WORDPRESS_DB_PASSWORD".to_owned(), DB_PASSWORD.to_owned()),
            ("WORDPRESS_DB_NAME".to_owned(), "wordpress".to_owned()),
        ]);

        services.insert(
            env.web_service().to_owned(),
            Service {
                image: WORDPRESS_IMAGE.to_owned(),
                ports: vec![format!("{}:80", config.port(env))],
                environment: wp_env.clone(),
                volumes: vec![docroot_mount.clone()],
                depends_on: vec![env.db_service().to_owned()],
            },
        );

        services.insert(
            env.cli_service().to_owned(),
            Service {
                image: CLI_IMAGE.to_owned(),
                environment: wp_env,
                volumes: vec![docroot_mount],
                depends_on: vec![env.web_service().to_owned()],
                ..Service::default()
            },
        );
    }

    let file = ComposeFile {
        version: "3.7".to_owned(),
        services,
        volumes,
    };
    Ok(serde_yaml::to_string(&file)?)
}

/// Write the descriptor under the config's work dir, creating it as needed.
pub fn write_descriptor(config: &Config) -> Result<(), ConfigError> {
    fs::create_dir_all(&config.work_dir)?;
    let rendered = render_descriptor(config)?;
    fs::write(&config.descriptor_path, rendered)?;
    tracing::debug!("wrote descriptor to {}", config.descriptor_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest_str;
    use std::path::Path;

    fn resolve(content: &str, work_root: &Path) -> Config {
        let manifest = parse_manifest_str(content).unwrap();
        Config::resolve(&manifest, Path::new("/project"), work_root, |_| None).unwrap()
    }

    #[test]
    fn descriptor_contains_all_six_services() {
        let config = resolve("", Path::new("/work"));
        let yaml = render_descriptor(&config).unwrap();
        for service in [
            "wordpress",
            "tests-wordpress",
            "cli",
            "tests-cli",
            "mysql",
            "tests-mysql",
        ] {
            assert!(yaml.contains(&format!("{service}:")), "missing {service}");
        }
    }

    #[test]
    fn ports_map_to_container_port_80() {
        let config = resolve("[ports]\ndevelopment = 9000\ntests = 9001", Path::new("/w"));
        let yaml = render_descriptor(&config).unwrap();
        assert!(yaml.contains("9000:80"));
        assert!(yaml.contains("9001:80"));
    }

    #[test]
    fn named_volumes_without_core_source() {
        let config = resolve("", Path::new("/w"));
        let yaml = render_descriptor(&config).unwrap();
        assert!(yaml.contains("wordpress-data"));
        assert!(yaml.contains("tests-wordpress-data"));
    }

    #[test]
    fn bind_mounts_with_core_source() {
        let config = resolve("[sources]\ncore = \"./wp\"", Path::new("/w"));
        let yaml = render_descriptor(&config).unwrap();
        assert!(yaml.contains(&format!("{}:/var/www/html", config.tree_dir(Environment::Development).display())));
        assert!(!yaml.contains("wordpress-data"));
    }

    #[test]
    fn write_descriptor_creates_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve("", dir.path());
        write_descriptor(&config).unwrap();
        assert!(config.descriptor_path.exists());
        let yaml = fs::read_to_string(&config.descriptor_path).unwrap();
        assert!(yaml.contains("services:"));
    }
}
