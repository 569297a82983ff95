//! Self-signed certificate generation for HTTPS launches.
use std::{fs, io, path::Path};

use serde::Serialize;
use tracing::{info, warn};

use super::runner::ProcessRunner;
use crate::{
    launcher::config::TlsSection,
    lib::{
        certgen::generate_self_signed,
        command::CommandSpec,
        errors::LaunchError,
        fs as launch_fs,
        openssl::{build_self_signed_command, SelfSignedRequest},
        paths,
    },
};

/// Result of the certificate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateOutcome {
    AlreadyPresent,
    Generated,
}

/// True when both the certificate and the key already exist.
pub fn certificates_present(section: &TlsSection, base_dir: &Path) -> bool {
    let cert = paths::absolutize(&section.cert_file, base_dir);
    let key = paths::absolutize(&section.key_file, base_dir);
    launch_fs::all_exist(&[cert.as_path(), key.as_path()])
}

pub fn certificate_command(section: &TlsSection, base_dir: &Path) -> CommandSpec {
    let cert = paths::absolutize(&section.cert_file, base_dir);
    let key = paths::absolutize(&section.key_file, base_dir);
    build_self_signed_command(SelfSignedRequest {
        openssl: &section.openssl,
        key_file: &key,
        cert_file: &cert,
        days: section.days,
        common_name: &section.common_name,
        subject_alt_names: &section.subject_alt_names,
    })
}

/// Generate the certificate pair unless both files already exist.
pub async fn ensure_certificates<R: ProcessRunner>(
    section: &TlsSection,
    base_dir: &Path,
    runner: &R,
) -> Result<CertificateOutcome, LaunchError> {
    if certificates_present(section, base_dir) {
        info!(
            target: "vision_launch::tls",
            cert_file = %section.cert_file.display(),
            key_file = %section.key_file.display(),
            "Certificates already exist"
        );
        return Ok(CertificateOutcome::AlreadyPresent);
    }

    let command = certificate_command(section, base_dir);
    info!(
        target: "vision_launch::tls",
        common_name = %section.common_name,
        days = section.days,
        "Generating self-signed certificate"
    );
    let outcome = match runner.run(&command).await {
        Ok(outcome) => outcome,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            warn!(
                target: "vision_launch::tls",
                openssl = %section.openssl,
                "openssl not found; generating certificate in-process"
            );
            write_generated_certificates(section, base_dir)?;
            return Ok(CertificateOutcome::Generated);
        }
        Err(source) => {
            return Err(LaunchError::Spawn {
                program: section.openssl.clone(),
                source,
            })
        }
    };
    if !outcome.success() {
        return Err(LaunchError::CertificateFailed {
            exit_code: outcome.code,
        });
    }

    Ok(CertificateOutcome::Generated)
}

fn write_generated_certificates(section: &TlsSection, base_dir: &Path) -> Result<(), LaunchError> {
    let generated = generate_self_signed(
        &section.common_name,
        section.days,
        &section.subject_alt_names,
    )?;
    let key = paths::absolutize(&section.key_file, base_dir);
    let cert = paths::absolutize(&section.cert_file, base_dir);
    write_pem(&key, &generated.key_pem, 0o600)?;
    write_pem(&cert, &generated.cert_pem, 0o644)
}

fn write_pem(path: &Path, pem: &str, mode: u32) -> Result<(), LaunchError> {
    let io_error = |source: io::Error| LaunchError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::write(path, pem).map_err(io_error)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(io_error)?;
    }
    #[cfg(not(unix))]
    let _ = mode;
    Ok(())
}
