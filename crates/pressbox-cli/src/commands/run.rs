use super::load_engine;
use pressbox_core::CoreError;
use std::path::Path;

pub fn run(
    manifest: &Path,
    work_root: &Path,
    container: &str,
    command: &[String],
) -> Result<u8, CoreError> {
    let engine = load_engine(manifest, work_root)?;
    let exit_code = engine.run(container, command)?;
    // The inner command's exit code is the user's result, not ours.
    Ok(u8::try_from(exit_code).unwrap_or(1))
}
