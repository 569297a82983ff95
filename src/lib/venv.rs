//! Environment mutations equivalent to sourcing a venv activation script.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::lib::{command::CommandSpec, paths};

pub const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";
pub const PATH_VAR: &str = "PATH";
pub const PYTHONHOME_VAR: &str = "PYTHONHOME";

/// Variables to set and unset so children resolve to the environment's executables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivatedEnv {
    pub env_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub path: String,
}

impl ActivatedEnv {
    /// Compute activation for `env_dir` (absolute) on top of the given `PATH`.
    pub fn compute(env_dir: &Path, current_path: Option<OsString>) -> Self {
        let bin_dir = paths::bin_dir(env_dir);
        let mut entries = vec![bin_dir.clone()];
        if let Some(current) = current_path {
            entries.extend(env::split_paths(&current).filter(|entry| entry != &bin_dir));
        }
        let path = env::join_paths(&entries)
            .map(|joined| joined.to_string_lossy().into_owned())
            .unwrap_or_else(|_| bin_dir.to_string_lossy().into_owned());

        Self {
            env_dir: env_dir.to_path_buf(),
            bin_dir,
            path,
        }
    }

    /// Compute activation against the launcher's own `PATH`.
    pub fn from_process_env(env_dir: &Path) -> Self {
        Self::compute(env_dir, env::var_os(PATH_VAR))
    }

    /// Apply the activation to a command description.
    pub fn apply(&self, spec: CommandSpec) -> CommandSpec {
        spec.env(VIRTUAL_ENV_VAR, self.env_dir.to_string_lossy())
            .env(PATH_VAR, self.path.clone())
            .env_remove(PYTHONHOME_VAR)
    }
}
