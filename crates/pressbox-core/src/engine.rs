use crate::sequencer::{
    check_database, is_installed, repair_content_ownership, reset_database, Sequencer,
};
use crate::signal::shutdown_requested;
use crate::sync::copy_tree;
use crate::CoreError;
use pressbox_compose::ComposeGateway;
use pressbox_config::{Config, EnvSelector, Environment};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

const DB_PROBE_ATTEMPTS: u32 = 30;
const DB_PROBE_DELAY: Duration = Duration::from_secs(1);

/// Central lifecycle controller for the two-environment stack.
///
/// Owns the descriptor and working tree for the duration of one top-level
/// operation. Concurrent top-level operations against the same working
/// directory are the caller's responsibility to avoid; no file locking is
/// enforced.
pub struct Engine {
    config: Config,
    gateway: Box<dyn ComposeGateway>,
    db_probe_attempts: u32,
    db_probe_delay: Duration,
}

/// Human-readable result of a successful `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSummary {
    pub already_installed: bool,
    pub development_url: String,
    pub tests_url: String,
}

impl fmt::Display for StartSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "WordPress development site {} at {}",
            if self.already_installed {
                "running"
            } else {
                "started"
            },
            self.development_url
        )?;
        write!(f, "WordPress tests site at {}", self.tests_url)
    }
}

impl Engine {
    pub fn new(config: Config, gateway: Box<dyn ComposeGateway>) -> Self {
        Self {
            config,
            gateway,
            db_probe_attempts: DB_PROBE_ATTEMPTS,
            db_probe_delay: DB_PROBE_DELAY,
        }
    }

    /// Override the database readiness probe bounds (tests shrink these).
    pub fn with_database_probe(mut self, attempts: u32, delay: Duration) -> Self {
        self.db_probe_attempts = attempts;
        self.db_probe_delay = delay;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bring the stack up and drive both environments to readiness.
    ///
    /// Never proceeds to configuration before the database probe succeeds.
    /// If the application is already installed the configuration sequence is
    /// skipped entirely.
    pub fn start(&self) -> Result<StartSummary, CoreError> {
        info!("starting {} environments", self.config.name);
        self.gateway.up()?;

        if let Some(core_source) = &self.config.core_source {
            for env in Environment::ALL {
                copy_tree(core_source, &self.config.tree_dir(env))?;
            }
        }

        for env in Environment::ALL {
            repair_content_ownership(self.gateway.as_ref(), env)?;
        }

        self.wait_for_database(Environment::Development)?;

        let already_installed = is_installed(self.gateway.as_ref(), Environment::Development)?;
        if already_installed {
            debug!("application already installed, skipping configuration");
        } else {
            for env in Environment::ALL {
                if shutdown_requested() {
                    return Err(CoreError::Interrupted);
                }
                Sequencer::new(self.gateway.as_ref(), &self.config, env).run_to_ready()?;
            }
        }

        Ok(StartSummary {
            already_installed,
            development_url: self.config.site_url(Environment::Development),
            tests_url: self.config.site_url(Environment::Tests),
        })
    }

    /// Bring the stack down. Safe to call regardless of prior state.
    pub fn stop(&self) -> Result<(), CoreError> {
        info!("stopping {} environments", self.config.name);
        self.gateway.down()?;
        Ok(())
    }

    /// Reset the database(s) selected by `selector`.
    pub fn clean(&self, selector: EnvSelector) -> Result<(), CoreError> {
        reset_database(self.gateway.as_ref(), selector)
    }

    /// Execute a command in a running container, handing its exit code back
    /// unmodified.
    pub fn run(&self, container: &str, command: &[String]) -> Result<i32, CoreError> {
        if command.is_empty() {
            return Err(CoreError::Validation(
                "run requires a command to execute".to_owned(),
            ));
        }
        let result = self.gateway.exec(container, command)?;
        Ok(result.exit_code)
    }

    fn wait_for_database(&self, env: Environment) -> Result<(), CoreError> {
        for attempt in 1..=self.db_probe_attempts {
            if check_database(self.gateway.as_ref(), env)? {
                debug!("database ready after {attempt} attempt(s)");
                return Ok(());
            }
            if shutdown_requested() {
                return Err(CoreError::Interrupted);
            }
            debug!(
                "database not ready (attempt {attempt}/{})",
                self.db_probe_attempts
            );
            std::thread::sleep(self.db_probe_delay);
        }
        Err(CoreError::DatabaseTimeout(self.db_probe_attempts))
    }
}
