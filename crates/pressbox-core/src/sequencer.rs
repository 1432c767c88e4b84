//! Readiness and configuration sequencer.
//!
//! Drives one environment from freshly-started containers to a fully
//! configured instance through an explicit state machine, one gateway
//! command per transition. Also hosts the independent flows that are safe to
//! invoke without the install sequence having completed: database reset,
//! content-ownership repair, and the database connectivity probe.

use crate::CoreError;
use pressbox_compose::{ComposeError, ComposeGateway};
use pressbox_config::{Config, EnvSelector, Environment};
use tracing::{debug, info};

const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "password";
const ADMIN_EMAIL: &str = "wordpress@example.com";
const CONTENT_DIR: &str = "/var/www/html/wp-content";

/// Configuration progress of one environment. States only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupState {
    NotInstalled,
    Installed,
    Configured,
    PluginsActive,
    ThemeResolved,
    Ready,
}

/// State machine driving install → configure → activate-plugins →
/// activate-theme for a single environment.
///
/// Transitions run strictly sequentially: each step issues one command batch
/// against the environment's CLI runner and only advances on success.
pub struct Sequencer<'a> {
    gateway: &'a dyn ComposeGateway,
    config: &'a Config,
    env: Environment,
    state: SetupState,
    theme: Option<String>,
}

impl<'a> Sequencer<'a> {
    pub fn new(gateway: &'a dyn ComposeGateway, config: &'a Config, env: Environment) -> Self {
        Self {
            gateway,
            config,
            env,
            state: SetupState::NotInstalled,
            theme: None,
        }
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    /// The theme picked during the `ThemeResolved` transition, if any.
    pub fn resolved_theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Perform one transition and return the new state. Calling on `Ready`
    /// is a no-op.
    pub fn step(&mut self) -> Result<SetupState, CoreError> {
        let next = match self.state {
            SetupState::NotInstalled => {
                self.install()?;
                SetupState::Installed
            }
            SetupState::Installed => {
                self.configure()?;
                SetupState::Configured
            }
            SetupState::Configured => {
                self.activate_plugins()?;
                SetupState::PluginsActive
            }
            SetupState::PluginsActive => {
                self.theme = self.resolve_theme()?;
                SetupState::ThemeResolved
            }
            SetupState::ThemeResolved => {
                self.activate_theme()?;
                SetupState::Ready
            }
            SetupState::Ready => SetupState::Ready,
        };
        self.state = next;
        Ok(next)
    }

    /// Run transitions until the environment is `Ready`.
    pub fn run_to_ready(&mut self) -> Result<(), CoreError> {
        info!("configuring {} environment", self.env);
        while self.state != SetupState::Ready {
            self.step()?;
        }
        Ok(())
    }

    fn run_wp(&self, command: &[String]) -> Result<(), CoreError> {
        self.gateway.run_once(self.env.cli_service(), command)?;
        Ok(())
    }

    fn install(&self) -> Result<(), CoreError> {
        debug!("installing core for {}", self.env);
        self.run_wp(&install_command(self.config, self.env))
    }

    fn configure(&self) -> Result<(), CoreError> {
        for (key, value) in &self.config.wp_config {
            let mut command = vec![
                "wp".to_owned(),
                "config".to_owned(),
                "set".to_owned(),
                key.clone(),
                value.as_str().to_owned(),
            ];
            if value.is_raw() {
                command.push("--raw".to_owned());
            }
            self.run_wp(&command)?;
        }
        Ok(())
    }

    fn activate_plugins(&self) -> Result<(), CoreError> {
        self.run_wp(&to_args(&["wp", "plugin", "activate", "--all"]))
    }

    /// Pick the theme to activate. An explicit source list always wins and
    /// skips the backend query entirely; otherwise the installed-theme
    /// listing is consulted, where the first line is a column header. A
    /// failing query is a deliberate soft-failure: no theme, not an error.
    fn resolve_theme(&self) -> Result<Option<String>, CoreError> {
        if let Some(first) = self.config.theme_slugs.first() {
            return Ok(Some(first.clone()));
        }

        let query = to_args(&["wp", "theme", "list", "--fields=name"]);
        match self.gateway.run_once(self.env.cli_service(), &query) {
            Ok(result) => Ok(result
                .stdout
                .lines()
                .nth(1)
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)),
            Err(ComposeError::CommandFailed { exit_code, .. }) => {
                debug!("theme query exited {exit_code}, activating no theme");
                Ok(None)
            }
            Err(other) => Err(other.into()),
        }
    }

    fn activate_theme(&self) -> Result<(), CoreError> {
        match &self.theme {
            Some(theme) => self.run_wp(&to_args(&["wp", "theme", "activate", theme.as_str()])),
            None => Ok(()),
        }
    }
}

fn install_command(config: &Config, env: Environment) -> Vec<String> {
    vec![
        "wp".to_owned(),
        "core".to_owned(),
        "install".to_owned(),
        format!("--url=localhost:{}", config.port(env)),
        format!("--title={}", config.name),
        format!("--admin_user={ADMIN_USER}"),
        format!("--admin_password={ADMIN_PASSWORD}"),
        format!("--admin_email={ADMIN_EMAIL}"),
        "--skip-email".to_owned(),
    ]
}

fn to_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_owned()).collect()
}

/// Reset the database(s) matched by `selector` with no confirmation prompt.
///
/// The `all` selector resets development and tests concurrently: the two
/// databases are fully disjoint, so neither reset blocks on the other.
pub fn reset_database(
    gateway: &dyn ComposeGateway,
    selector: EnvSelector,
) -> Result<(), CoreError> {
    match selector.environments() {
        [env] => reset_one(gateway, *env),
        envs => std::thread::scope(|scope| {
            let handles: Vec<_> = envs
                .iter()
                .map(|env| scope.spawn(move || reset_one(gateway, *env)))
                .collect();
            for handle in handles {
                handle.join().map_err(|_| CoreError::ResetWorker)??;
            }
            Ok(())
        }),
    }
}

fn reset_one(gateway: &dyn ComposeGateway, env: Environment) -> Result<(), CoreError> {
    info!("resetting {} database", env);
    gateway.run_once(env.cli_service(), &to_args(&["wp", "db", "reset", "--yes"]))?;
    Ok(())
}

/// Recursively hand the content directory back to the web user. Volume
/// auto-provisioning leaves these directories root-owned.
pub fn repair_content_ownership(
    gateway: &dyn ComposeGateway,
    env: Environment,
) -> Result<(), CoreError> {
    gateway.run_once(
        env.web_service(),
        &to_args(&[
            "chown",
            "-R",
            "www-data:www-data",
            CONTENT_DIR,
            &format!("{CONTENT_DIR}/plugins"),
            &format!("{CONTENT_DIR}/themes"),
        ]),
    )?;
    Ok(())
}

/// Lightweight connectivity probe. `Ok(false)` means the stack is not ready
/// yet and the caller should retry; only a spawn failure is an error.
pub fn check_database(gateway: &dyn ComposeGateway, env: Environment) -> Result<bool, CoreError> {
    match gateway.run_once(env.cli_service(), &to_args(&["wp", "db", "check"])) {
        Ok(_) => Ok(true),
        Err(ComposeError::CommandFailed { .. }) => Ok(false),
        Err(other) => Err(other.into()),
    }
}

/// Whether core is already installed for the environment. Non-zero exit
/// means "not installed", not a failure.
pub fn is_installed(gateway: &dyn ComposeGateway, env: Environment) -> Result<bool, CoreError> {
    match gateway.run_once(env.cli_service(), &to_args(&["wp", "core", "is-installed"])) {
        Ok(_) => Ok(true),
        Err(ComposeError::CommandFailed { .. }) => Ok(false),
        Err(other) => Err(other.into()),
    }
}
