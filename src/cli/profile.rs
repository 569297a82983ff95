//! LaunchProfile and config/working-directory resolution.
use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::launcher::config::DEFAULT_CONFIG_PATH;

const CONFIG_ENV: &str = "VISION_LAUNCH_CONFIG";

/// Where the config path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    Env,
    Default,
}

impl ConfigSource {
    /// Explicitly named files must exist; the default file is optional.
    pub const fn is_required(&self) -> bool {
        !matches!(self, ConfigSource::Default)
    }
}

/// Resolved launch profile.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub config_path: PathBuf,
    pub config_source: ConfigSource,
    pub base_dir: PathBuf,
}

/// Resolve config path in the order: CLI override → env var → default.
pub fn resolve_config_path(
    override_path: Option<PathBuf>,
    base_dir: &Path,
) -> (PathBuf, ConfigSource) {
    resolve_config_path_from(override_path, env::var_os(CONFIG_ENV).map(PathBuf::from), base_dir)
}

fn resolve_config_path_from(
    override_path: Option<PathBuf>,
    env_path: Option<PathBuf>,
    base_dir: &Path,
) -> (PathBuf, ConfigSource) {
    let (path, source) = match (override_path, env_path) {
        (Some(path), _) => (path, ConfigSource::Cli),
        (None, Some(path)) if !path.as_os_str().is_empty() => (path, ConfigSource::Env),
        _ => (PathBuf::from(DEFAULT_CONFIG_PATH), ConfigSource::Default),
    };

    if path.is_absolute() {
        return (path, source);
    }
    (base_dir.join(path), source)
}

/// Resolve the directory every relative path is anchored to.
pub fn resolve_base_dir(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    let cwd = env::current_dir().context("failed to obtain current directory")?;
    Ok(match override_dir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}
