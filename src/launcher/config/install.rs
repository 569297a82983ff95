use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::require_non_empty;
use crate::lib::errors::ConfigError;

pub const DEFAULT_INSTALL_PROGRAM: &str = "pip";
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Dependency installation settings.
#[derive(Debug, Clone, Serialize)]
pub struct InstallSection {
    pub program: String,
    pub manifest: PathBuf,
    pub skip_unchanged: bool,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawInstallSection {
    pub program: Option<String>,
    pub manifest: Option<PathBuf>,
    pub skip_unchanged: Option<bool>,
    pub extra_args: Option<Vec<String>>,
}

pub fn parse_install_section(
    raw: Option<RawInstallSection>,
    path: &Path,
) -> Result<InstallSection, ConfigError> {
    let install_raw = raw.unwrap_or_default();
    let program = install_raw
        .program
        .unwrap_or_else(|| DEFAULT_INSTALL_PROGRAM.to_string());
    require_non_empty(&program, "install.program", path)?;

    let manifest = install_raw
        .manifest
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
    if manifest.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "install.manifest",
            message: "Set the path of the requirements file".into(),
        });
    }

    Ok(InstallSection {
        program,
        manifest,
        skip_unchanged: install_raw.skip_unchanged.unwrap_or(false),
        extra_args: install_raw.extra_args.unwrap_or_default(),
    })
}
