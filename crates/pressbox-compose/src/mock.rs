//! In-memory gateway for tests and offline dry runs.
//!
//! Records every invocation and answers through a scripted handler. The
//! default handler succeeds with empty output, except for the theme-list
//! query which returns a plausible header-plus-name listing so the install
//! sequence can run end to end.

use crate::gateway::{CommandResult, ComposeGateway};
use crate::ComposeError;
use std::sync::{Mutex, PoisonError};

type Handler = Box<dyn Fn(&str, &[String]) -> Result<CommandResult, ComposeError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    RunOnce { service: String, command: Vec<String> },
    Exec { service: String, command: Vec<String> },
    Up,
    Down,
}

pub struct MockGateway {
    calls: Mutex<Vec<MockCall>>,
    handler: Handler,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::with_handler(default_handler)
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(
        handler: impl Fn(&str, &[String]) -> Result<CommandResult, ComposeError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Every invocation seen so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock_calls().clone()
    }

    /// One-shot commands only, as `(service, command)` pairs.
    pub fn run_once_calls(&self) -> Vec<(String, Vec<String>)> {
        self.lock_calls()
            .iter()
            .filter_map(|call| match call {
                MockCall::RunOnce { service, command } => {
                    Some((service.clone(), command.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: MockCall) {
        self.lock_calls().push(call);
    }
}

pub fn success(stdout: &str) -> Result<CommandResult, ComposeError> {
    Ok(CommandResult {
        exit_code: 0,
        stdout: stdout.to_owned(),
        stderr: String::new(),
    })
}

pub fn failure(exit_code: i32, stderr: &str) -> Result<CommandResult, ComposeError> {
    Err(ComposeError::CommandFailed {
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_owned(),
    })
}

fn default_handler(_service: &str, command: &[String]) -> Result<CommandResult, ComposeError> {
    if command.len() >= 3 && command[0] == "wp" && command[1] == "theme" && command[2] == "list" {
        return success("name\ntwentytwentyone\n");
    }
    success("")
}

impl ComposeGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn run_once(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError> {
        self.record(MockCall::RunOnce {
            service: service.to_owned(),
            command: command.to_vec(),
        });
        (self.handler)(service, command)
    }

    fn exec(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError> {
        self.record(MockCall::Exec {
            service: service.to_owned(),
            command: command.to_vec(),
        });
        // Exec semantics: the inner command's exit code is data, not an error.
        match (self.handler)(service, command) {
            Ok(result) => Ok(result),
            Err(ComposeError::CommandFailed {
                exit_code,
                stdout,
                stderr,
            }) => Ok(CommandResult {
                exit_code,
                stdout,
                stderr,
            }),
            Err(other) => Err(other),
        }
    }

    fn up(&self) -> Result<(), ComposeError> {
        self.record(MockCall::Up);
        Ok(())
    }

    fn down(&self) -> Result<(), ComposeError> {
        self.record(MockCall::Down);
        Ok(())
    }
}
