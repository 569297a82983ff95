use std::process::Command;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::common::{Workspace, BINARY_PATH};

#[test]
fn help_lists_subcommands() -> Result<()> {
    let output = Command::new(BINARY_PATH).arg("--help").output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for needle in ["plan", "certs", "config", "--config", "--workdir"] {
        assert!(stdout.contains(needle), "help should mention {needle}: {stdout}");
    }
    Ok(())
}

#[test]
fn plan_prints_ordered_steps_without_side_effects() -> Result<()> {
    let workspace = Workspace::new()?;

    let output = workspace.command().arg("plan").output()?;

    assert!(
        output.status.success(),
        "plan should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let plan: Value = serde_json::from_slice(&output.stdout).context("plan output is JSON")?;
    let steps: Vec<&str> = plan["steps"]
        .as_array()
        .context("steps array")?
        .iter()
        .filter_map(|step| step["step"].as_str())
        .collect();
    assert_eq!(
        steps,
        vec![
            "ensure_environment",
            "activate_environment",
            "install_dependencies",
            "check_port",
            "launch_server"
        ]
    );
    let launch = plan["steps"][4]["command"]["args"]
        .as_array()
        .context("launch args")?;
    assert_eq!(launch[1], "--host");
    assert_eq!(launch[2], "0.0.0.0");
    assert_eq!(launch[3], "--port");
    assert_eq!(launch[4], "8000");
    assert!(!workspace.path().join("venv").exists());
    assert!(workspace.calls().is_empty());
    Ok(())
}

#[test]
fn config_prints_effective_defaults() -> Result<()> {
    let workspace = Workspace::new()?;

    let output = workspace.command().arg("config").output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("host = \"0.0.0.0\""), "stdout: {stdout}");
    assert!(stdout.contains("port = 8000"), "stdout: {stdout}");
    assert!(stdout.contains("manifest = \"requirements.txt\""), "stdout: {stdout}");
    Ok(())
}

#[test]
fn explicit_missing_config_is_an_error() -> Result<()> {
    let workspace = Workspace::new()?;

    let output = workspace
        .command()
        .arg("--config")
        .arg(workspace.path().join("absent.toml"))
        .arg("plan")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.toml"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<()> {
    let workspace = Workspace::new()?;
    std::fs::write(workspace.config_path(), "[server]\napp = \"no-attribute\"\n")?;

    let output = workspace.command().arg("config").output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("server.app"), "stderr: {stderr}");
    Ok(())
}
