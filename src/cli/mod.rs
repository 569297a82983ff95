//! CLI entrypoint module structure.
use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde_json::json;

use crate::{
    launcher::config::{LauncherConfig, TlsSection},
    lib::paths,
    steps::{build_plan, ensure_certificates, CertificateOutcome, ProcessRunner, SystemRunner},
};

pub mod args;
pub mod profile;

pub use args::{CertsArgs, CliCommand, LaunchProfileArgs, ParsedCommand};
pub use profile::{resolve_base_dir, resolve_config_path, ConfigSource, LaunchProfile};

/// Execute CLI command mode and return a user-facing result payload.
pub async fn execute_cli_command(
    command: CliCommand,
    profile: &LaunchProfile,
    config: &LauncherConfig,
) -> Result<String> {
    match command {
        CliCommand::Plan => {
            let plan = build_plan(config, &profile.base_dir)?;
            Ok(serde_json::to_string_pretty(&plan)?)
        }
        CliCommand::Certs(args) => {
            generate_certificates(&config.tls, &profile.base_dir, args.force, &SystemRunner).await
        }
        CliCommand::Config => config
            .to_toml()
            .context("failed to render effective configuration"),
    }
}

/// Generate certificates and format a JSON response payload.
async fn generate_certificates<R: ProcessRunner>(
    tls: &TlsSection,
    base_dir: &Path,
    force: bool,
    runner: &R,
) -> Result<String> {
    let cert_file = paths::absolutize(&tls.cert_file, base_dir);
    let key_file = paths::absolutize(&tls.key_file, base_dir);

    if force {
        for file in [&cert_file, &key_file] {
            if file.exists() {
                fs::remove_file(file)
                    .with_context(|| format!("failed to remove {}", file.display()))?;
            }
        }
    }

    let outcome = ensure_certificates(tls, base_dir, runner).await?;
    let (status, message) = match outcome {
        CertificateOutcome::Generated => ("generated", "certificate and key created"),
        CertificateOutcome::AlreadyPresent => (
            "already_present",
            "certificate and key already exist; re-run with --force to regenerate",
        ),
    };

    let payload = json!({
        "status": status,
        "cert_file": cert_file.to_string_lossy(),
        "key_file": key_file.to_string_lossy(),
        "tls_enabled": tls.enabled,
        "message": message
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}
