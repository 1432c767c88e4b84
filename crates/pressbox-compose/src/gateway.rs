use crate::ComposeError;
use pressbox_config::Config;

/// Outcome of a one-shot container command with exit code zero.
///
/// Non-zero exits never reach callers as a `CommandResult` from
/// [`ComposeGateway::run_once`]; they surface as
/// [`ComposeError::CommandFailed`] carrying the same three fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// The core's sole integration point with the orchestration backend.
pub trait ComposeGateway: Send + Sync {
    fn name(&self) -> &str;

    /// Run a command in a fresh one-shot container for `service`, capturing
    /// both output streams. A non-zero exit is an error.
    fn run_once(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError>;

    /// Run a command against a running `service` with inherited stdio.
    /// The child's exit code is passed through in the result, zero or not.
    fn exec(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError>;

    /// Bring the described stack up, detached.
    fn up(&self) -> Result<(), ComposeError>;

    /// Bring the stack down. Not an error if nothing is running.
    fn down(&self) -> Result<(), ComposeError>;
}

// Shared handles forward to the inner gateway, so tests can keep a handle
// on a mock they hand to the engine.
impl<T: ComposeGateway + ?Sized> ComposeGateway for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run_once(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError> {
        (**self).run_once(service, command)
    }

    fn exec(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError> {
        (**self).exec(service, command)
    }

    fn up(&self) -> Result<(), ComposeError> {
        (**self).up()
    }

    fn down(&self) -> Result<(), ComposeError> {
        (**self).down()
    }
}

impl std::fmt::Debug for dyn ComposeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeGateway")
            .field("name", &self.name())
            .finish()
    }
}

pub fn select_gateway(config: &Config) -> Result<Box<dyn ComposeGateway>, ComposeError> {
    match config.backend.as_str() {
        "docker" => Ok(Box::new(crate::docker::DockerCompose::detect(config)?)),
        "mock" => Ok(Box::new(crate::mock::MockGateway::new())),
        other => Err(ComposeError::UnknownBackend(other.to_owned())),
    }
}
