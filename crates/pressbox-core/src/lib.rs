//! Core orchestration for the Pressbox environment lifecycle.
//!
//! This crate ties the config snapshot and the command gateway together into
//! the `Engine` — start, stop, clean, and run against the two-environment
//! WordPress stack. It also provides the install/configure sequencer state
//! machine, source-tree synchronization, and the outcome classifier that
//! drives user-visible exit behavior.

pub mod classify;
pub mod engine;
pub mod sequencer;
pub mod signal;
pub mod sync;

pub use classify::{classify, Outcome};
pub use engine::{Engine, StartSummary};
pub use sequencer::{
    check_database, is_installed, repair_content_ownership, reset_database, Sequencer, SetupState,
};
pub use signal::{install_signal_handler, shutdown_requested};
pub use sync::copy_tree;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad user input, reported directly without a stack trace.
    #[error("{0}")]
    Validation(String),
    #[error("config error: {0}")]
    Config(#[from] pressbox_config::ConfigError),
    #[error("compose error: {0}")]
    Compose(#[from] pressbox_compose::ComposeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database was not ready after {0} connection attempts")]
    DatabaseTimeout(u32),
    #[error("database reset worker panicked")]
    ResetWorker,
    #[error("interrupted, stopped after the current step")]
    Interrupted,
}
