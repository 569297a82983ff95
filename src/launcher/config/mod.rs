//! Load and validate launcher configuration.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod environment;
pub mod install;
pub mod server;
pub mod telemetry;
pub mod tls;

pub use environment::{
    parse_environment_section, EnvironmentSection, RawEnvironmentSection, DEFAULT_ENV_DIR,
    DEFAULT_PYTHON,
};
pub use install::{
    parse_install_section, InstallSection, RawInstallSection, DEFAULT_INSTALL_PROGRAM,
    DEFAULT_MANIFEST,
};
pub use server::{
    parse_server_section, LaunchMode, RawServerSection, ServerSection, DEFAULT_APP, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_SERVER_PROGRAM,
};
pub use tls::{parse_tls_section, RawTlsSection, TlsSection, DEFAULT_TLS_PORT};

pub const DEFAULT_CONFIG_PATH: &str = "vision-launch.toml";

/// Top-level configuration container.
#[derive(Debug, Clone, Serialize)]
pub struct LauncherConfig {
    pub environment: EnvironmentSection,
    pub install: InstallSection,
    pub server: ServerSection,
    pub tls: TlsSection,
    #[serde(skip)]
    pub source_path: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
struct RawLauncherConfig {
    environment: Option<RawEnvironmentSection>,
    install: Option<RawInstallSection>,
    server: Option<RawServerSection>,
    tls: Option<RawTlsSection>,
}

impl LauncherConfig {
    /// Load configuration from a specific path.
    ///
    /// A missing file yields the built-in defaults unless `required` is set.
    pub fn load_from_path(path: PathBuf, required: bool) -> Result<Self, ConfigError> {
        info!(
            target: "vision_launch::config",
            path = %path.display(),
            required,
            "Starting configuration load"
        );

        if !path.exists() {
            if required {
                let error = ConfigError::NotFound { path: path.clone() };
                error!(
                    target: "vision_launch::config",
                    path = %path.display(),
                    reason = %error,
                    "Configuration file is missing"
                );
                return Err(error);
            }
            telemetry::log_defaults(&path);
            let config = Self::from_raw(RawLauncherConfig::default(), path)?;
            telemetry::log_loaded(&config);
            return Ok(config);
        }

        let builder = config::Config::builder().add_source(
            config::File::from(path.clone()).format(config::FileFormat::Toml),
        );
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "vision_launch::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawLauncherConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "vision_launch::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "vision_launch::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    /// Built-in defaults, identical to loading an absent optional file.
    pub fn defaults() -> Self {
        Self::from_raw(RawLauncherConfig::default(), PathBuf::from(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|err| unreachable!("built-in defaults are valid: {err}"))
    }

    /// Host and port the server will bind, accounting for TLS.
    pub fn bind_target(&self) -> (&str, u16) {
        let port = if self.tls.enabled {
            self.tls.port
        } else {
            self.server.port
        };
        (self.server.host.as_str(), port)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn from_raw(raw: RawLauncherConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let environment = parse_environment_section(raw.environment, &path)?;
        let install = parse_install_section(raw.install, &path)?;
        let server = parse_server_section(raw.server, &path)?;
        let tls = parse_tls_section(raw.tls, &path)?;

        Ok(Self {
            environment,
            install,
            server,
            tls,
            source_path: path,
        })
    }
}

pub(crate) fn require_non_empty(
    value: &str,
    field: &'static str,
    path: &Path,
) -> Result<(), ConfigError> {
    if !value.trim().is_empty() {
        return Ok(());
    }

    Err(ConfigError::InvalidField {
        path: path.to_path_buf(),
        field,
        message: "Value must not be empty".into(),
    })
}
