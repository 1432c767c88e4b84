use super::{json_pretty, load_engine, EXIT_SUCCESS};
use pressbox_config::EnvSelector;
use pressbox_core::CoreError;
use std::path::Path;

pub fn run(
    manifest: &Path,
    work_root: &Path,
    environment: &str,
    json: bool,
) -> Result<u8, CoreError> {
    let selector: EnvSelector = environment.parse().map_err(CoreError::Config)?;
    let engine = load_engine(manifest, work_root)?;
    engine.clean(selector)?;

    if json {
        let payload = serde_json::json!({
            "reset": selector.to_string(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("reset {selector} database(s)");
    }
    Ok(EXIT_SUCCESS)
}
