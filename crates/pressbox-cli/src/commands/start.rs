use super::{json_pretty, load_engine, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use pressbox_core::CoreError;
use std::path::Path;

pub fn run(manifest: &Path, work_root: &Path, json: bool) -> Result<u8, CoreError> {
    let engine = load_engine(manifest, work_root)?;

    let pb = if json {
        None
    } else {
        Some(spinner("starting WordPress environments..."))
    };

    let summary = match engine.start() {
        Ok(summary) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "environments ready");
            }
            summary
        }
        Err(error) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "start failed");
            }
            return Err(error);
        }
    };

    if json {
        let payload = serde_json::json!({
            "name": engine.config().name,
            "already_installed": summary.already_installed,
            "development_url": summary.development_url,
            "tests_url": summary.tests_url,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{summary}");
    }
    Ok(EXIT_SUCCESS)
}
