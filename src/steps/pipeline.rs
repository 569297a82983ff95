//! Ordered launch pipeline and its side-effect-free plan.
use std::path::Path;

use serde::Serialize;
use tracing::{info, Instrument};
use uuid::Uuid;

use super::{
    environment::{
        activate_environment, ensure_environment, environment_dir, environment_present,
        venv_create_command,
    },
    install::{install_command, install_dependencies, install_is_current},
    runner::{ProcessOutcome, ProcessRunner},
    serve::{launch_server, preflight_port, server_command},
    tls::{certificate_command, certificates_present, ensure_certificates},
};
use crate::{
    launcher::config::LauncherConfig,
    lib::{
        command::CommandSpec, errors::LaunchError, paths, telemetry::RunSpan, venv::ActivatedEnv,
    },
};

/// Steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    EnsureEnvironment,
    ActivateEnvironment,
    InstallDependencies,
    EnsureCertificates,
    CheckPort,
    LaunchServer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    Run,
    Skip { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub step: StepKind,
    #[serde(flatten)]
    pub action: StepAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandSpec>,
}

/// What a run would do, computed without touching anything.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchPlan {
    pub base_dir: String,
    pub activation: ActivatedEnv,
    pub steps: Vec<PlannedStep>,
}

impl LaunchPlan {
    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|step| step.step).collect()
    }
}

fn planned(step: StepKind, command: Option<CommandSpec>) -> PlannedStep {
    PlannedStep {
        step,
        action: StepAction::Run,
        command,
    }
}

fn skipped(step: StepKind, reason: &str) -> PlannedStep {
    PlannedStep {
        step,
        action: StepAction::Skip {
            reason: reason.to_string(),
        },
        command: None,
    }
}

/// Build the plan for a run rooted at `base_dir`.
pub fn build_plan(config: &LauncherConfig, base_dir: &Path) -> Result<LaunchPlan, LaunchError> {
    let activation =
        ActivatedEnv::from_process_env(&environment_dir(&config.environment, base_dir));
    let mut steps = Vec::with_capacity(6);

    steps.push(if environment_present(&config.environment, base_dir) {
        skipped(StepKind::EnsureEnvironment, "activation script already present")
    } else {
        planned(
            StepKind::EnsureEnvironment,
            Some(venv_create_command(&config.environment, base_dir)),
        )
    });
    steps.push(planned(StepKind::ActivateEnvironment, None));

    let manifest_present = paths::absolutize(&config.install.manifest, base_dir).is_file();
    let current = manifest_present && install_is_current(&config.install, base_dir, &activation)?;
    steps.push(if current {
        skipped(StepKind::InstallDependencies, "manifest unchanged since last install")
    } else {
        planned(
            StepKind::InstallDependencies,
            Some(install_command(&config.install, base_dir, &activation)),
        )
    });

    if config.tls.enabled {
        steps.push(if certificates_present(&config.tls, base_dir) {
            skipped(StepKind::EnsureCertificates, "certificate and key already exist")
        } else {
            planned(
                StepKind::EnsureCertificates,
                Some(certificate_command(&config.tls, base_dir)),
            )
        });
    }
    if config.server.preflight_port_check {
        steps.push(planned(StepKind::CheckPort, None));
    }
    steps.push(planned(
        StepKind::LaunchServer,
        Some(server_command(config, base_dir, &activation)),
    ));

    Ok(LaunchPlan {
        base_dir: base_dir.to_string_lossy().into_owned(),
        activation,
        steps,
    })
}

/// Execute every step in order; the server launch is always last.
pub async fn run_pipeline<R: ProcessRunner>(
    config: &LauncherConfig,
    base_dir: &Path,
    runner: &R,
) -> Result<ProcessOutcome, LaunchError> {
    let span = RunSpan::start(Uuid::new_v4());
    let result = run_steps(config, base_dir, runner, &span)
        .instrument(span.span().clone())
        .await;
    match &result {
        Ok(outcome) => span.finish(
            if outcome.success() { "succeeded" } else { "server_failed" },
            outcome.code,
        ),
        Err(err) => span.finish(err.kind(), err.child_exit_code()),
    }
    result
}

async fn run_steps<R: ProcessRunner>(
    config: &LauncherConfig,
    base_dir: &Path,
    runner: &R,
    span: &RunSpan,
) -> Result<ProcessOutcome, LaunchError> {
    info!(
        target: "vision_launch::runtime",
        run_id = %span.run_id(),
        base_dir = %base_dir.display(),
        "Starting launch run"
    );

    let ensured = ensure_environment(&config.environment, base_dir, runner).await?;
    info!(target: "vision_launch::runtime", step = "ensure_environment", outcome = ?ensured, "Step finished");

    let activated = activate_environment(&config.environment, base_dir);

    let installed = install_dependencies(&config.install, base_dir, &activated, runner).await?;
    info!(target: "vision_launch::runtime", step = "install_dependencies", outcome = ?installed, "Step finished");

    if config.tls.enabled {
        let certs = ensure_certificates(&config.tls, base_dir, runner).await?;
        info!(target: "vision_launch::runtime", step = "ensure_certificates", outcome = ?certs, "Step finished");
    }

    if config.server.preflight_port_check {
        let (host, port) = config.bind_target();
        preflight_port(host, port)?;
    }

    launch_server(config, base_dir, &activated, runner).await
}
