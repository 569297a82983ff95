use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::require_non_empty;
use crate::lib::errors::ConfigError;

pub const DEFAULT_ENV_DIR: &str = "venv";
pub const DEFAULT_PYTHON: &str = "python3";

/// Virtual environment location and the interpreter used to create it.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentSection {
    pub dir: PathBuf,
    pub python: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawEnvironmentSection {
    pub dir: Option<PathBuf>,
    pub python: Option<String>,
}

pub fn parse_environment_section(
    raw: Option<RawEnvironmentSection>,
    path: &Path,
) -> Result<EnvironmentSection, ConfigError> {
    let env_raw = raw.unwrap_or_default();
    let dir = env_raw
        .dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_DIR));
    if dir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "environment.dir",
            message: "Set a non-empty directory for the virtual environment".into(),
        });
    }
    let python = env_raw.python.unwrap_or_else(|| DEFAULT_PYTHON.to_string());
    require_non_empty(&python, "environment.python", path)?;

    Ok(EnvironmentSection { dir, python })
}
