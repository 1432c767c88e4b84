//! Failure classification for user-visible exit behavior.
//!
//! A pure function from error to classification: the CLI decides how to
//! report and which code to exit with, this module only answers "what kind
//! of failure was this". Matching is exhaustive over tagged variants rather
//! than probing for field shapes.

use crate::CoreError;
use pressbox_compose::ComposeError;

/// What kind of failure a lifecycle operation ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Bad user input. Reported directly, exit code 1, no stack trace.
    Validation(String),
    /// An orchestration-backend command failed. The captured streams are
    /// replayed and the backend's own exit code is propagated verbatim.
    Backend {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// Unexpected defect. Full detail surfaced for diagnosis, exit code 1.
    Internal(String),
}

pub fn classify(error: &CoreError) -> Outcome {
    match error {
        CoreError::Validation(message) => Outcome::Validation(message.clone()),
        // Config resolution failures are bad user input, whatever else they
        // happen to carry.
        CoreError::Config(config_error) => Outcome::Validation(config_error.to_string()),
        // A bad backend name comes straight from the manifest.
        CoreError::Compose(backend @ ComposeError::UnknownBackend(_)) => {
            Outcome::Validation(backend.to_string())
        }
        CoreError::Compose(ComposeError::CommandFailed {
            exit_code,
            stdout,
            stderr,
        }) => Outcome::Backend {
            exit_code: *exit_code,
            stdout: stdout.clone(),
            stderr: stderr.clone(),
        },
        other => Outcome::Internal(format!("{other:?}")),
    }
}
