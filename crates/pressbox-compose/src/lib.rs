//! Container command gateway for Pressbox.
//!
//! Every subprocess invocation against the orchestration backend passes
//! through the [`ComposeGateway`] trait: one-shot commands in a service,
//! interactive exec against a running service, and bringing the stack up or
//! down. The `docker` backend shells out to docker-compose; the `mock`
//! backend records invocations for tests.

pub mod docker;
pub mod gateway;
pub mod mock;

pub use docker::{ComposeBin, DockerCompose};
pub use gateway::{select_gateway, CommandResult, ComposeGateway};
pub use mock::{MockCall, MockGateway};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to spawn compose process: {0}")]
    Spawn(#[from] std::io::Error),
    /// A backend command ran and exited non-zero. Carries the captured
    /// streams so the failure can be replayed to the user verbatim.
    #[error("compose command exited with status {exit_code}")]
    CommandFailed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    #[error("no compose binary found; install the docker compose plugin or docker-compose")]
    ComposeUnavailable,
    #[error("unknown gateway backend '{0}'")]
    UnknownBackend(String),
}
