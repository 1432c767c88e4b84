use super::EXIT_SUCCESS;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use pressbox_core::CoreError;

pub fn run<C: CommandFactory>(shell: Shell) -> Result<u8, CoreError> {
    let mut cmd = C::command();
    let name = cmd.get_name().to_owned();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(EXIT_SUCCESS)
}
