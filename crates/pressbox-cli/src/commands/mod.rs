pub mod clean;
pub mod completions;
pub mod doctor;
pub mod run;
pub mod start;
pub mod stop;

use indicatif::{ProgressBar, ProgressStyle};
use pressbox_compose::select_gateway;
use pressbox_config::{parse_manifest_file, write_descriptor, Config};
use pressbox_core::{CoreError, Engine};
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Resolve the manifest, write the compose descriptor, and wire up the
/// gateway the manifest selects. Every lifecycle command starts here.
pub fn load_engine(manifest_path: &Path, work_root: &Path) -> Result<Engine, CoreError> {
    let manifest = parse_manifest_file(manifest_path)?;
    let manifest_dir = manifest_path.parent().unwrap_or(Path::new("."));
    let config = Config::resolve(&manifest, manifest_dir, work_root, |var| {
        std::env::var(var).ok()
    })?;
    write_descriptor(&config)?;
    let gateway = select_gateway(&config)?;
    Ok(Engine::new(config, gateway))
}

// A serialization failure is a defect in our payload, never the user's
// fault, so it must not surface through the validation path.
pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, CoreError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_engine_with_mock_backend() {
        let project = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let manifest = project.path().join("pressbox.toml");
        std::fs::write(&manifest, "name = \"t\"\n[runtime]\nbackend = \"mock\"\n").unwrap();

        let engine = load_engine(&manifest, work.path()).unwrap();
        assert!(engine.config().descriptor_path.exists());
    }

    #[test]
    fn load_engine_missing_manifest_uses_defaults() {
        let project = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        // Default backend is docker; detection may fail on hosts without
        // docker, so only assert the config side of the error path.
        let result = load_engine(&project.path().join("pressbox.toml"), work.path());
        if let Ok(engine) = result {
            assert_eq!(engine.config().name, "WordPress");
        }
    }

    #[test]
    fn json_pretty_serializes() {
        let value = serde_json::json!({"key": "value"});
        let rendered = json_pretty(&value).unwrap();
        assert!(rendered.contains("\"key\""));
    }

    #[test]
    fn json_pretty_failure_is_internal_not_validation() {
        struct Unserializable;
        impl serde::Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot serialize"))
            }
        }

        let err = json_pretty(&Unserializable).unwrap_err();
        assert!(matches!(
            pressbox_core::classify(&err),
            pressbox_core::Outcome::Internal(_)
        ));
    }

    #[test]
    fn spinner_helpers_do_not_panic() {
        let pb = spinner("working...");
        spin_ok(&pb, "done");
        let pb = spinner("working...");
        spin_fail(&pb, "failed");
    }
}
