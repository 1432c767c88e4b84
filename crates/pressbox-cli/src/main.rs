mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::EXIT_FAILURE;
use pressbox_core::{classify, install_signal_handler, Outcome};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pressbox",
    version,
    about = "Local WordPress environment manager for development and testing"
)]
struct Cli {
    /// Path to the pressbox.toml manifest.
    #[arg(long, default_value = "pressbox.toml", global = true)]
    manifest: PathBuf,

    /// Base directory instances live under.
    #[arg(long, default_value = "~/.local/share/pressbox", global = true)]
    work_dir: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start both environments and configure them on first run.
    Start,
    /// Stop the running environments. Safe to call when already stopped.
    Stop,
    /// Reset the database of the given environment.
    Clean {
        /// Environment to reset: all, development, or tests.
        #[arg(default_value = "tests")]
        environment: String,
    },
    /// Run a command inside a container (after --).
    Run {
        /// Container to run in (e.g. cli, tests-cli, wordpress).
        container: String,
        /// Command and arguments to run.
        #[arg(required = true, last = true)]
        command: Vec<String>,
    },
    /// Run diagnostic checks on the host and manifest.
    Doctor,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PRESSBOX_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    install_signal_handler();

    let work_root = expand_tilde(&cli.work_dir);
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Start => commands::start::run(&cli.manifest, &work_root, json_output),
        Commands::Stop => commands::stop::run(&cli.manifest, &work_root),
        Commands::Clean { environment } => {
            commands::clean::run(&cli.manifest, &work_root, &environment, json_output)
        }
        Commands::Run { container, command } => {
            commands::run::run(&cli.manifest, &work_root, &container, &command)
        }
        Commands::Doctor => commands::doctor::run(&cli.manifest, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(error) => match classify(&error) {
            Outcome::Validation(message) => {
                eprintln!("error: {message}");
                ExitCode::from(EXIT_FAILURE)
            }
            Outcome::Backend {
                exit_code,
                stdout,
                stderr,
            } => {
                // Replay the backend's captured streams, then propagate its
                // exit code verbatim.
                print!("{stdout}");
                eprint!("{stderr}");
                let _ = std::io::stdout().flush();
                let _ = std::io::stderr().flush();
                ExitCode::from(u8::try_from(exit_code).unwrap_or(EXIT_FAILURE))
            }
            Outcome::Internal(detail) => {
                eprintln!("internal error: {detail}");
                ExitCode::from(EXIT_FAILURE)
            }
        },
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        if path == "~" {
            return PathBuf::from(home);
        }
        if let Some(stripped) = path.strip_prefix("~/") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
