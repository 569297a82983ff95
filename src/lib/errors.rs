use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file {path} does not exist")]
    NotFound { path: PathBuf },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures raised by the launch pipeline, one family per step.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Virtual environment creation exited abnormally (exit={exit_code:?}) for {path}")]
    EnvironmentCreation {
        path: PathBuf,
        exit_code: Option<i32>,
    },
    #[error("Dependency manifest {path} not found")]
    ManifestMissing { path: PathBuf },
    #[error("Dependency installation exited abnormally (exit={exit_code:?})")]
    InstallFailed { exit_code: Option<i32> },
    #[error("Certificate generation exited abnormally (exit={exit_code:?})")]
    CertificateFailed { exit_code: Option<i32> },
    #[error("In-process certificate generation failed: {message}")]
    CertificateGeneration { message: String },
    #[error("Cannot bind {addr}: {source}")]
    PortUnavailable {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O failed for file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    /// Exit code reported by the failing child process, if any.
    pub fn child_exit_code(&self) -> Option<i32> {
        match self {
            LaunchError::EnvironmentCreation { exit_code, .. }
            | LaunchError::InstallFailed { exit_code }
            | LaunchError::CertificateFailed { exit_code } => *exit_code,
            _ => None,
        }
    }

    /// Short machine-readable name used in telemetry.
    pub const fn kind(&self) -> &'static str {
        match self {
            LaunchError::Spawn { .. } => "spawn_failed",
            LaunchError::EnvironmentCreation { .. } => "environment_creation_failed",
            LaunchError::ManifestMissing { .. } => "manifest_missing",
            LaunchError::InstallFailed { .. } => "install_failed",
            LaunchError::CertificateFailed { .. } => "certificate_failed",
            LaunchError::CertificateGeneration { .. } => "certificate_generation_failed",
            LaunchError::PortUnavailable { .. } => "port_unavailable",
            LaunchError::Io { .. } => "io",
        }
    }
}
