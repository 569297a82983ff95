#![cfg(unix)]

use std::{
    process::{ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};

use crate::common::Workspace;

const LAUNCH_ARGS: &str = "vision_server.main:app --host 0.0.0.0 --port 8000";

#[test]
fn first_run_creates_installs_then_launches() -> Result<()> {
    let workspace = Workspace::new()?;
    workspace.write_config("supervise")?;

    let output = workspace.run(&[])?;

    assert!(
        output.status.success(),
        "launcher should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let calls = workspace.calls();
    assert_eq!(calls.len(), 3, "calls: {calls:?}");
    assert!(calls[0].starts_with("python -m venv "), "calls: {calls:?}");
    assert!(calls[0].ends_with("/venv"), "calls: {calls:?}");
    assert!(calls[1].starts_with("pip install -r "), "calls: {calls:?}");
    assert!(calls[1].contains("requirements.txt"), "calls: {calls:?}");
    assert!(
        calls[1].contains("VIRTUAL_ENV=") && calls[1].ends_with("/venv"),
        "install must run inside the activated environment: {calls:?}"
    );
    assert!(
        calls[2].starts_with(&format!("uvicorn {LAUNCH_ARGS} ")),
        "calls: {calls:?}"
    );
    Ok(())
}

#[test]
fn second_run_reuses_existing_environment() -> Result<()> {
    let workspace = Workspace::new()?;
    workspace.write_config("supervise")?;

    let first = workspace.run(&[])?;
    let second = workspace.run(&[])?;

    assert!(first.status.success());
    assert!(
        second.status.success(),
        "second run must not fail: {}",
        String::from_utf8_lossy(&second.stderr)
    );
    let calls = workspace.calls();
    let programs: Vec<&str> = calls
        .iter()
        .map(|line| line.split_whitespace().next().unwrap_or_default())
        .collect();
    assert_eq!(programs, vec!["python", "pip", "uvicorn", "pip", "uvicorn"]);
    Ok(())
}

#[test]
fn failed_install_propagates_exit_code_without_launch() -> Result<()> {
    let workspace = Workspace::new()?;
    workspace.write_config("supervise")?;

    let output = workspace.run(&[("STUB_PIP_EXIT", "3")])?;

    assert_eq!(output.status.code(), Some(3));
    assert!(
        !workspace.calls().iter().any(|line| line.starts_with("uvicorn")),
        "server must not start after a failed install: {:?}",
        workspace.calls()
    );
    Ok(())
}

#[test]
fn supervised_server_exit_code_is_propagated() -> Result<()> {
    let workspace = Workspace::new()?;
    workspace.write_config("supervise")?;

    let output = workspace.run(&[("STUB_UVICORN_EXIT", "5")])?;

    assert_eq!(output.status.code(), Some(5));
    Ok(())
}

#[test]
fn exec_mode_hands_process_to_server() -> Result<()> {
    let workspace = Workspace::new()?;
    workspace.write_config("exec")?;

    let output = workspace.run(&[("STUB_UVICORN_EXIT", "6")])?;

    assert_eq!(output.status.code(), Some(6));
    let calls = workspace.calls();
    assert!(
        calls
            .last()
            .is_some_and(|line| line.starts_with(&format!("uvicorn {LAUNCH_ARGS} "))),
        "calls: {calls:?}"
    );
    Ok(())
}

#[test]
fn missing_manifest_stops_before_install() -> Result<()> {
    let workspace = Workspace::new()?;
    workspace.write_config("supervise")?;
    std::fs::remove_file(workspace.path().join("requirements.txt"))?;

    let output = workspace.run(&[])?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("requirements.txt"), "stderr: {stderr}");
    let calls = workspace.calls();
    assert_eq!(calls.len(), 1, "only the environment is created: {calls:?}");
    Ok(())
}

#[test]
fn occupied_port_exits_before_launch() -> Result<()> {
    let workspace = Workspace::new()?;
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    std::fs::write(
        workspace.config_path(),
        format!(
            "[environment]\npython = \"{}\"\n\n[server]\nhost = \"127.0.0.1\"\nport = {port}\nmode = \"supervise\"\n",
            workspace.stub_python().display()
        ),
    )?;

    let output = workspace.run(&[])?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(&format!("127.0.0.1:{port}")), "stderr: {stderr}");
    assert!(
        !workspace.calls().iter().any(|line| line.starts_with("uvicorn")),
        "calls: {:?}",
        workspace.calls()
    );
    drop(listener);
    Ok(())
}

fn wait_until(deadline: Duration, mut ready: impl FnMut() -> Result<bool>) -> Result<bool> {
    let started = Instant::now();
    while started.elapsed() < deadline {
        if ready()? {
            return Ok(true);
        }
        thread::sleep(Duration::from_millis(50));
    }
    Ok(false)
}

/// Start a supervised launch whose server waits for a signal, then signal only the launcher.
fn signal_supervised_launcher(workspace: &Workspace, signal: libc::c_int) -> Result<ExitStatus> {
    workspace.write_config("supervise")?;
    let mut child = workspace
        .command()
        .arg("--config")
        .arg(workspace.config_path())
        .env("STUB_UVICORN_READY", workspace.ready_path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to spawn vision-launch")?;

    let ready_path = workspace.ready_path();
    if !wait_until(Duration::from_secs(20), || Ok(ready_path.exists()))? {
        child.kill().ok();
        bail!("server stub never became ready: {:?}", workspace.calls());
    }

    let pid = libc::pid_t::try_from(child.id()).context("pid fits pid_t")?;
    let result = unsafe { libc::kill(pid, signal) };
    assert_eq!(result, 0, "failed to signal launcher");

    let mut status = None;
    let exited = wait_until(Duration::from_secs(10), || {
        status = child.try_wait()?;
        Ok(status.is_some())
    })?;
    if !exited {
        child.kill().ok();
        child.wait().ok();
        bail!("launcher kept waiting after the signal: {:?}", workspace.calls());
    }
    status.context("launcher exit status")
}

#[test]
fn supervised_launch_forwards_interrupt_to_server() -> Result<()> {
    let workspace = Workspace::new()?;

    let status = signal_supervised_launcher(&workspace, libc::SIGINT)?;

    assert_eq!(status.code(), Some(130));
    assert!(
        workspace.calls().iter().any(|line| line == "uvicorn received INT"),
        "calls: {:?}",
        workspace.calls()
    );
    Ok(())
}

#[test]
fn supervised_launch_forwards_terminate_to_server() -> Result<()> {
    let workspace = Workspace::new()?;

    let status = signal_supervised_launcher(&workspace, libc::SIGTERM)?;

    assert_eq!(status.code(), Some(143));
    assert!(
        workspace.calls().iter().any(|line| line == "uvicorn received TERM"),
        "calls: {:?}",
        workspace.calls()
    );
    Ok(())
}
