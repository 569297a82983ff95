//! Child process execution seam.
use std::{io, process::ExitStatus};

use serde::Serialize;
use tracing::{info, warn};

use crate::{launcher::config::LaunchMode, lib::command::CommandSpec};

/// Portable exit summary of a finished child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ProcessOutcome {
    pub const fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Shell-style exit code: the child's own code, or `128 + signal`.
    pub fn exit_code(&self) -> u8 {
        match (self.code, self.signal) {
            (Some(code), _) => (code & 0xff) as u8,
            (None, Some(signal)) => (128 + (signal & 0x7f)) as u8,
            (None, None) => 1,
        }
    }
}

/// Runs the child processes of the launch pipeline.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    /// Run a preparation command to completion with inherited stdio.
    async fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutcome>;

    /// Hand control to the server. In `Exec` mode a successful call does not return.
    async fn launch(&self, spec: &CommandSpec, mode: LaunchMode) -> io::Result<ProcessOutcome>;
}

/// Runner that operates against the real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutcome> {
        let status = spec.to_tokio_command().status().await?;
        Ok(ProcessOutcome::from_status(status))
    }

    async fn launch(&self, spec: &CommandSpec, mode: LaunchMode) -> io::Result<ProcessOutcome> {
        match mode {
            LaunchMode::Exec => exec(spec).await,
            LaunchMode::Supervise => supervise(spec).await,
        }
    }
}

#[cfg(unix)]
async fn exec(spec: &CommandSpec) -> io::Result<ProcessOutcome> {
    use std::os::unix::process::CommandExt;

    Err(spec.to_std_command().exec())
}

#[cfg(not(unix))]
async fn exec(spec: &CommandSpec) -> io::Result<ProcessOutcome> {
    warn!(
        target: "vision_launch::serve",
        "exec mode is unavailable on this platform; supervising instead"
    );
    supervise(spec).await
}

#[cfg(unix)]
async fn supervise(spec: &CommandSpec) -> io::Result<ProcessOutcome> {
    use tokio::signal::unix::{signal, SignalKind};

    // Listeners exist before the child so no signal can arrive unhandled.
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut child = spec.to_tokio_command().spawn()?;
    info!(
        target: "vision_launch::serve",
        pid = child.id(),
        "Supervising server process"
    );

    loop {
        let forwarded = tokio::select! {
            status = child.wait() => return Ok(ProcessOutcome::from_status(status?)),
            _ = interrupt.recv() => libc::SIGINT,
            _ = terminate.recv() => libc::SIGTERM,
        };
        if let Some(pid) = child.id() {
            forward_signal(pid, forwarded);
        }
    }
}

#[cfg(not(unix))]
async fn supervise(spec: &CommandSpec) -> io::Result<ProcessOutcome> {
    let status = spec.to_tokio_command().status().await?;
    Ok(ProcessOutcome::from_status(status))
}

#[cfg(unix)]
fn forward_signal(pid: u32, signal: libc::c_int) {
    let result = unsafe { libc::kill(pid as libc::pid_t, signal) };
    if result == 0 {
        info!(target: "vision_launch::serve", pid, signal, "Forwarded signal to server");
    } else {
        warn!(
            target: "vision_launch::serve",
            pid,
            signal,
            error = %io::Error::last_os_error(),
            "Failed to forward signal to server"
        );
    }
}
