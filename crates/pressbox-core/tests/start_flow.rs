//! End-to-end start flow against the mock gateway, with real temp
//! directories for the synced source trees.

use pressbox_compose::mock::{failure, success};
use pressbox_compose::{MockCall, MockGateway};
use pressbox_config::{parse_manifest_str, Config, Environment};
use pressbox_core::Engine;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

fn resolve(content: &str, manifest_dir: &std::path::Path, work_root: &std::path::Path) -> Config {
    let manifest = parse_manifest_str(content).unwrap();
    Config::resolve(&manifest, manifest_dir, work_root, |_| None).unwrap()
}

fn fresh_install_mock() -> Arc<MockGateway> {
    Arc::new(MockGateway::with_handler(|_, cmd| {
        match cmd.get(2).map(String::as_str) {
            Some("is-installed") => failure(1, ""),
            Some("list") => success("name\ntwentytwentyone\n"),
            _ => success(""),
        }
    }))
}

#[test]
fn start_syncs_core_source_into_both_trees() {
    let project = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    let src = project.path().join("wordpress");
    fs::create_dir_all(src.join("wp-includes")).unwrap();
    fs::create_dir_all(src.join(".git")).unwrap();
    fs::write(src.join("index.php"), "<?php").unwrap();
    fs::write(src.join("wp-config.php"), "secret").unwrap();
    fs::write(src.join(".git/HEAD"), "ref").unwrap();

    let config = resolve("[sources]\ncore = \"wordpress\"", project.path(), work.path());
    let mock = fresh_install_mock();
    let engine = Engine::new(config.clone(), Box::new(Arc::clone(&mock)))
        .with_database_probe(1, Duration::from_millis(1));

    engine.start().unwrap();

    for env in Environment::ALL {
        let tree = config.tree_dir(env);
        assert!(tree.join("index.php").exists(), "{env}: core file synced");
        assert!(!tree.join("wp-config.php").exists(), "{env}: runtime config excluded");
        assert!(!tree.join(".git").exists(), "{env}: vcs metadata excluded");
    }
}

#[test]
fn start_sequence_is_ordered_up_then_probe_then_install() {
    let mock = fresh_install_mock();
    let work = tempfile::tempdir().unwrap();
    let config = resolve("", std::path::Path::new("/p"), work.path());
    let engine = Engine::new(config, Box::new(Arc::clone(&mock)))
        .with_database_probe(1, Duration::from_millis(1));

    engine.start().unwrap();

    let calls = mock.calls();
    assert_eq!(calls[0], MockCall::Up, "stack comes up first");

    let position = |predicate: &dyn Fn(&[String]) -> bool| {
        calls.iter().position(|call| match call {
            MockCall::RunOnce { command, .. } => predicate(command),
            _ => false,
        })
    };
    let check = position(&|cmd| cmd.get(2).map(String::as_str) == Some("check")).unwrap();
    let install = position(&|cmd| cmd.get(2).map(String::as_str) == Some("install")).unwrap();
    let chown = position(&|cmd| cmd.first().map(String::as_str) == Some("chown")).unwrap();

    assert!(chown < check, "ownership repair precedes the database probe");
    assert!(check < install, "no configuration before the database is ready");
}

#[test]
fn start_configures_development_before_tests() {
    let mock = fresh_install_mock();
    let work = tempfile::tempdir().unwrap();
    let config = resolve("", std::path::Path::new("/p"), work.path());
    let engine = Engine::new(config, Box::new(Arc::clone(&mock)))
        .with_database_probe(1, Duration::from_millis(1));

    engine.start().unwrap();

    let installs: Vec<String> = mock
        .run_once_calls()
        .into_iter()
        .filter(|(_, cmd)| cmd.get(2).map(String::as_str) == Some("install"))
        .map(|(service, _)| service)
        .collect();
    assert_eq!(installs, vec!["cli", "tests-cli"]);
}
