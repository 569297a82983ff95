use std::path::Path;

use serde::{Deserialize, Serialize};

use super::require_non_empty;
use crate::lib::errors::ConfigError;

pub const DEFAULT_SERVER_PROGRAM: &str = "uvicorn";
pub const DEFAULT_APP: &str = "vision_server.main:app";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// How the launcher hands control to the ASGI server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Replace the launcher process with the server.
    Exec,
    /// Keep the launcher as parent, forward signals, propagate the exit code.
    Supervise,
}

impl LaunchMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LaunchMode::Exec => "exec",
            LaunchMode::Supervise => "supervise",
        }
    }
}

impl Default for LaunchMode {
    fn default() -> Self {
        if cfg!(unix) {
            LaunchMode::Exec
        } else {
            LaunchMode::Supervise
        }
    }
}

/// ASGI server launch settings.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSection {
    pub program: String,
    pub app: String,
    pub host: String,
    pub port: u16,
    pub mode: LaunchMode,
    pub preflight_port_check: bool,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawServerSection {
    pub program: Option<String>,
    pub app: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub mode: Option<LaunchMode>,
    pub preflight_port_check: Option<bool>,
    pub extra_args: Option<Vec<String>>,
}

pub fn parse_server_section(
    raw: Option<RawServerSection>,
    path: &Path,
) -> Result<ServerSection, ConfigError> {
    let server_raw = raw.unwrap_or_default();
    let program = server_raw
        .program
        .unwrap_or_else(|| DEFAULT_SERVER_PROGRAM.to_string());
    require_non_empty(&program, "server.program", path)?;

    let app = server_raw.app.unwrap_or_else(|| DEFAULT_APP.to_string());
    validate_app(&app, path)?;

    let host = server_raw.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    require_non_empty(&host, "server.host", path)?;

    let port = server_raw.port.unwrap_or(DEFAULT_PORT);
    validate_port(port, "server.port", path)?;

    Ok(ServerSection {
        program,
        app,
        host,
        port,
        mode: server_raw.mode.unwrap_or_default(),
        preflight_port_check: server_raw.preflight_port_check.unwrap_or(true),
        extra_args: server_raw.extra_args.unwrap_or_default(),
    })
}

/// Accepts `module.path:attribute` with both halves present.
fn validate_app(app: &str, path: &Path) -> Result<(), ConfigError> {
    let valid = app
        .split_once(':')
        .map(|(module, attr)| {
            !module.trim().is_empty() && !attr.trim().is_empty() && !attr.contains(':')
        })
        .unwrap_or(false);
    if valid {
        return Ok(());
    }

    Err(ConfigError::InvalidField {
        path: path.to_path_buf(),
        field: "server.app",
        message: format!("Use the `module:attribute` form (got `{app}`)"),
    })
}

pub(crate) fn validate_port(port: u16, field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if port != 0 {
        return Ok(());
    }

    Err(ConfigError::InvalidField {
        path: path.to_path_buf(),
        field,
        message: "Use a port in the range 1-65535".into(),
    })
}
