//! Layout of a Python virtual environment on disk.

use std::path::{Path, PathBuf};

/// Directory holding the environment's executables.
#[cfg(not(windows))]
pub const BIN_DIR_NAME: &str = "bin";
#[cfg(windows)]
pub const BIN_DIR_NAME: &str = "Scripts";

/// Activation entry point whose presence marks an existing environment.
pub const ACTIVATE_SCRIPT_NAME: &str = "activate";

/// Launcher-owned bookkeeping directory inside the environment.
pub const STATE_DIR_NAME: &str = ".vision-launch";

/// Returns `<env>/bin` (or `<env>\Scripts` on Windows).
pub fn bin_dir(env_dir: &Path) -> PathBuf {
    env_dir.join(BIN_DIR_NAME)
}

/// Returns the activation script path for an environment.
pub fn activation_script(env_dir: &Path) -> PathBuf {
    bin_dir(env_dir).join(ACTIVATE_SCRIPT_NAME)
}

/// Returns the path of the install stamp.
pub fn install_stamp(env_dir: &Path) -> PathBuf {
    env_dir.join(STATE_DIR_NAME).join("install.json")
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
