use super::{load_engine, EXIT_SUCCESS};
use pressbox_core::CoreError;
use std::path::Path;

pub fn run(manifest: &Path, work_root: &Path) -> Result<u8, CoreError> {
    let engine = load_engine(manifest, work_root)?;
    engine.stop()?;
    println!("stopped {} environments", engine.config().name);
    Ok(EXIT_SUCCESS)
}
