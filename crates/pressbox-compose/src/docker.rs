use crate::gateway::{CommandResult, ComposeGateway};
use crate::ComposeError;
use pressbox_config::Config;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Which compose entry point is installed on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeBin {
    /// `docker compose` (plugin shipped with modern docker).
    Plugin,
    /// Legacy standalone `docker-compose`.
    Standalone,
}

impl ComposeBin {
    pub fn program(self) -> &'static str {
        match self {
            ComposeBin::Plugin => "docker",
            ComposeBin::Standalone => "docker-compose",
        }
    }

    fn leading_args(self) -> &'static [&'static str] {
        match self {
            ComposeBin::Plugin => &["compose"],
            ComposeBin::Standalone => &[],
        }
    }

    /// Probe the host for a compose entry point, plugin first.
    pub fn detect() -> Option<ComposeBin> {
        if probe("docker", &["compose", "version"]) {
            return Some(ComposeBin::Plugin);
        }
        if probe("docker-compose", &["--version"]) {
            return Some(ComposeBin::Standalone);
        }
        None
    }
}

fn probe(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Gateway backed by docker-compose subprocess invocation.
pub struct DockerCompose {
    bin: ComposeBin,
    descriptor: PathBuf,
    debug: bool,
}

impl DockerCompose {
    pub fn detect(config: &Config) -> Result<Self, ComposeError> {
        let bin = ComposeBin::detect().ok_or(ComposeError::ComposeUnavailable)?;
        Ok(Self::with_bin(bin, config))
    }

    pub fn with_bin(bin: ComposeBin, config: &Config) -> Self {
        Self {
            bin,
            descriptor: config.descriptor_path.clone(),
            debug: config.debug,
        }
    }

    /// Arguments for a one-shot `run` invocation, without the program name.
    fn run_args(&self, service: &str, command: &[String]) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(["run", "--rm", service].map(str::to_owned));
        args.extend(command.iter().cloned());
        args
    }

    fn exec_args(&self, service: &str, command: &[String]) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(["exec", service].map(str::to_owned));
        args.extend(command.iter().cloned());
        args
    }

    fn base_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .bin
            .leading_args()
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        args.push("-f".to_owned());
        args.push(self.descriptor.to_string_lossy().into_owned());
        args
    }

    fn captured(&self, args: &[String]) -> Result<CommandResult, ComposeError> {
        debug!("compose: {} {}", self.bin.program(), args.join(" "));
        let output = Command::new(self.bin.program()).args(args).output()?;

        let result = CommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if self.debug {
            debug!("compose stdout: {}", result.stdout);
            debug!("compose stderr: {}", result.stderr);
        }
        if result.exit_code == 0 {
            Ok(result)
        } else {
            Err(ComposeError::CommandFailed {
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            })
        }
    }
}

impl ComposeGateway for DockerCompose {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn run_once(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError> {
        self.captured(&self.run_args(service, command))
    }

    fn exec(&self, service: &str, command: &[String]) -> Result<CommandResult, ComposeError> {
        let args = self.exec_args(service, command);
        debug!("compose exec: {} {}", self.bin.program(), args.join(" "));
        // Inherited stdio: the inner command owns the terminal, and its
        // exit code is passed through untouched.
        let status = Command::new(self.bin.program()).args(&args).status()?;
        Ok(CommandResult {
            exit_code: status.code().unwrap_or(-1),
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn up(&self) -> Result<(), ComposeError> {
        let mut args = self.base_args();
        args.extend(["up", "-d"].map(str::to_owned));
        self.captured(&args)?;
        Ok(())
    }

    fn down(&self) -> Result<(), ComposeError> {
        let mut args = self.base_args();
        args.push("down".to_owned());
        self.captured(&args)?;
        Ok(())
    }
}
