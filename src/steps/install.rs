//! Install the declared dependencies into the activated environment.
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::runner::ProcessRunner;
use crate::{
    launcher::config::InstallSection,
    lib::{
        command::CommandSpec,
        errors::LaunchError,
        fs as launch_fs,
        paths,
        venv::ActivatedEnv,
    },
};

/// Result of the install step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    Installed,
    SkippedUnchanged,
}

/// `<program> install -r <manifest> [extra_args...]` under the activated environment.
pub fn install_command(
    section: &InstallSection,
    base_dir: &Path,
    activated: &ActivatedEnv,
) -> CommandSpec {
    let manifest = paths::absolutize(&section.manifest, base_dir);
    let spec = CommandSpec::new(section.program.as_str())
        .args(["install", "-r"])
        .arg(manifest.to_string_lossy())
        .args(section.extra_args.iter().cloned());
    activated.apply(spec)
}

/// True when `skip_unchanged` is on and the stamp matches the manifest hash.
pub fn install_is_current(
    section: &InstallSection,
    base_dir: &Path,
    activated: &ActivatedEnv,
) -> Result<bool, LaunchError> {
    if !section.skip_unchanged {
        return Ok(false);
    }
    let manifest = paths::absolutize(&section.manifest, base_dir);
    let Some(stamp) = launch_fs::read_install_stamp(&paths::install_stamp(&activated.env_dir))
    else {
        return Ok(false);
    };
    Ok(stamp.manifest == manifest && stamp.sha256 == launch_fs::compute_sha256(&manifest)?)
}

/// Run the dependency installer against the manifest.
pub async fn install_dependencies<R: ProcessRunner>(
    section: &InstallSection,
    base_dir: &Path,
    activated: &ActivatedEnv,
    runner: &R,
) -> Result<InstallOutcome, LaunchError> {
    let manifest = paths::absolutize(&section.manifest, base_dir);
    if !manifest.is_file() {
        return Err(LaunchError::ManifestMissing { path: manifest });
    }

    if install_is_current(section, base_dir, activated)? {
        info!(
            target: "vision_launch::install",
            manifest = %manifest.display(),
            "Manifest unchanged since last install; skipping"
        );
        return Ok(InstallOutcome::SkippedUnchanged);
    }

    let command = install_command(section, base_dir, activated);
    info!(
        target: "vision_launch::install",
        manifest = %manifest.display(),
        command = %command.display_line(),
        "Installing dependencies"
    );
    let outcome = runner
        .run(&command)
        .await
        .map_err(|source| LaunchError::Spawn {
            program: section.program.clone(),
            source,
        })?;
    if !outcome.success() {
        return Err(LaunchError::InstallFailed {
            exit_code: outcome.code,
        });
    }

    if section.skip_unchanged {
        let stamp = launch_fs::InstallStamp {
            sha256: launch_fs::compute_sha256(&manifest)?,
            manifest,
            installed_at: Utc::now(),
        };
        launch_fs::write_install_stamp(&paths::install_stamp(&activated.env_dir), &stamp)?;
    }

    Ok(InstallOutcome::Installed)
}
