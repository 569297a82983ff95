//! Telemetry initialization and launch run span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
///
/// Logs go to stderr so the launched server owns stdout.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper to record start and finish of a launch run.
pub struct RunSpan {
    span: Span,
    started_at: Instant,
    run_id: Uuid,
}

impl RunSpan {
    /// Start a run span.
    pub fn start(run_id: Uuid) -> Self {
        let span = info_span!(target: "vision_launch::runtime", "launch_run", %run_id);
        Self {
            span,
            started_at: Instant::now(),
            run_id,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Underlying span, for instrumenting the run's future.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Close the span while recording status and completion info.
    pub fn finish(self, status: &'static str, exit_code: Option<i32>) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "vision_launch::runtime",
            run_id = %self.run_id,
            status = status,
            exit_code = exit_code,
            elapsed_ms = elapsed_ms,
            "Completed launch run"
        );
    }
}

/// Payload for logging the server launch as structured telemetry.
#[derive(Debug, Serialize)]
pub struct LaunchModeTelemetry<'a> {
    pub mode: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub tls: bool,
    pub env_dir: &'a str,
    pub command: &'a str,
}

/// Emit launch mode to `tracing`.
pub fn emit_launch_mode(telemetry: &LaunchModeTelemetry<'_>) {
    info!(
        target: "vision_launch::serve",
        mode = telemetry.mode,
        host = telemetry.host,
        port = telemetry.port,
        tls = telemetry.tls,
        env_dir = telemetry.env_dir,
        command = telemetry.command,
        "Starting ASGI server"
    );
}
