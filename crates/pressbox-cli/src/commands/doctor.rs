use super::{EXIT_FAILURE, EXIT_SUCCESS};
use pressbox_compose::ComposeBin;
use pressbox_config::parse_manifest_file;
use pressbox_core::CoreError;
use std::path::Path;
use std::process::{Command, Stdio};

pub fn run(manifest_path: &Path, json_output: bool) -> Result<u8, CoreError> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    check_docker(&mut checks, &mut all_pass);
    check_compose(&mut checks, &mut all_pass);
    check_manifest(manifest_path, &mut checks, &mut all_pass);

    print_results(&checks, all_pass, json_output)
}

fn check_docker(checks: &mut Vec<Check>, all_pass: &mut bool) {
    let available = Command::new("docker")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if available {
        checks.push(Check::pass("docker", "Docker is installed"));
    } else {
        *all_pass = false;
        checks.push(Check::fail("docker", "Docker not found on PATH"));
    }
}

fn check_compose(checks: &mut Vec<Check>, all_pass: &mut bool) {
    match ComposeBin::detect() {
        Some(ComposeBin::Plugin) => {
            checks.push(Check::pass("compose", "docker compose plugin available"));
        }
        Some(ComposeBin::Standalone) => {
            checks.push(Check::pass("compose", "docker-compose available"));
        }
        None => {
            *all_pass = false;
            checks.push(Check::fail(
                "compose",
                "No compose binary found (docker compose plugin or docker-compose)",
            ));
        }
    }
}

fn check_manifest(path: &Path, checks: &mut Vec<Check>, all_pass: &mut bool) {
    if !path.exists() {
        checks.push(Check::info(
            "manifest",
            "No manifest found (defaults will be used)",
        ));
        return;
    }
    match parse_manifest_file(path) {
        Ok(_) => checks.push(Check::pass("manifest", "Manifest parses cleanly")),
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail("manifest", &format!("Manifest invalid: {e}")));
        }
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, CoreError> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!("{}", super::json_pretty(&json)?);
    } else {
        use console::Style;
        println!("Pressbox Doctor\n");
        for check in checks {
            let icon = match check.status.as_str() {
                "pass" => Style::new().green().apply_to("✓").to_string(),
                "fail" => Style::new().red().apply_to("✗").to_string(),
                _ => "ℹ".to_owned(),
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: String,
    status: String,
    message: String,
}

impl Check {
    fn pass(name: &str, message: &str) -> Self {
        Self::with_status(name, "pass", message)
    }

    fn fail(name: &str, message: &str) -> Self {
        Self::with_status(name, "fail", message)
    }

    fn info(name: &str, message: &str) -> Self {
        Self::with_status(name, "info", message)
    }

    fn with_status(name: &str, status: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: status.to_owned(),
            message: message.to_owned(),
        }
    }
}
