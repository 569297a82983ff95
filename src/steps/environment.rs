//! Ensure and activate the virtual environment.
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::runner::ProcessRunner;
use crate::{
    launcher::config::EnvironmentSection,
    lib::{command::CommandSpec, errors::LaunchError, paths, venv::ActivatedEnv},
};

/// Result of the ensure step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsureOutcome {
    AlreadyPresent,
    Created,
}

/// Absolute environment directory for this run.
pub fn environment_dir(section: &EnvironmentSection, base_dir: &Path) -> PathBuf {
    paths::absolutize(&section.dir, base_dir)
}

/// True when the activation entry point already exists.
pub fn environment_present(section: &EnvironmentSection, base_dir: &Path) -> bool {
    paths::activation_script(&environment_dir(section, base_dir)).exists()
}

/// `<python> -m venv <dir>`.
pub fn venv_create_command(section: &EnvironmentSection, base_dir: &Path) -> CommandSpec {
    CommandSpec::new(section.python.as_str())
        .args(["-m", "venv"])
        .arg(environment_dir(section, base_dir).to_string_lossy())
}

/// Create the environment unless its activation entry point is already present.
pub async fn ensure_environment<R: ProcessRunner>(
    section: &EnvironmentSection,
    base_dir: &Path,
    runner: &R,
) -> Result<EnsureOutcome, LaunchError> {
    let env_dir = environment_dir(section, base_dir);
    if environment_present(section, base_dir) {
        debug!(
            target: "vision_launch::env",
            env_dir = %env_dir.display(),
            "Virtual environment already present"
        );
        return Ok(EnsureOutcome::AlreadyPresent);
    }

    let command = venv_create_command(section, base_dir);
    info!(
        target: "vision_launch::env",
        env_dir = %env_dir.display(),
        command = %command.display_line(),
        "Creating virtual environment"
    );
    let outcome = runner
        .run(&command)
        .await
        .map_err(|source| LaunchError::Spawn {
            program: section.python.clone(),
            source,
        })?;
    if !outcome.success() {
        return Err(LaunchError::EnvironmentCreation {
            path: env_dir,
            exit_code: outcome.code,
        });
    }

    Ok(EnsureOutcome::Created)
}

/// Compute the activated environment for every later child process.
///
/// A missing bin directory is logged but does not stop the run; later steps
/// resolve whatever `PATH` yields.
pub fn activate_environment(section: &EnvironmentSection, base_dir: &Path) -> ActivatedEnv {
    let env_dir = environment_dir(section, base_dir);
    let activated = ActivatedEnv::from_process_env(&env_dir);
    if !activated.bin_dir.is_dir() {
        warn!(
            target: "vision_launch::env",
            bin_dir = %activated.bin_dir.display(),
            "Virtual environment has no executable directory; falling back to PATH lookup"
        );
    } else {
        info!(
            target: "vision_launch::env",
            env_dir = %env_dir.display(),
            "Activated virtual environment"
        );
    }
    activated
}
