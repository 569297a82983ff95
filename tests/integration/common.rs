use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Result};
use tempfile::TempDir;

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_vision-launch");
pub const LOG_ENV: &str = "VISION_LAUNCH_TEST_LOG";

/// Stand-in for `python3 -m venv <dir>` that lays down recording `pip` and `uvicorn` stubs.
#[cfg(unix)]
const STUB_PYTHON: &str = r#"#!/bin/sh
echo "python $*" >> "$VISION_LAUNCH_TEST_LOG"
dir="$3"
mkdir -p "$dir/bin"
printf '# activate\n' > "$dir/bin/activate"
cat > "$dir/bin/pip" <<'STUB'
#!/bin/sh
echo "pip $* VIRTUAL_ENV=$VIRTUAL_ENV" >> "$VISION_LAUNCH_TEST_LOG"
exit "${STUB_PIP_EXIT:-0}"
STUB
cat > "$dir/bin/uvicorn" <<'STUB'
#!/bin/sh
echo "uvicorn $* cwd=$(pwd)" >> "$VISION_LAUNCH_TEST_LOG"
if [ -n "$STUB_UVICORN_READY" ]; then
  sleep 30 >/dev/null 2>&1 &
  sleeper=$!
  trap 'kill $sleeper; echo "uvicorn received INT" >> "$VISION_LAUNCH_TEST_LOG"; exit 130' INT
  trap 'kill $sleeper; echo "uvicorn received TERM" >> "$VISION_LAUNCH_TEST_LOG"; exit 143' TERM
  : > "$STUB_UVICORN_READY"
  wait $sleeper
  exit 0
fi
exit "${STUB_UVICORN_EXIT:-0}"
STUB
chmod +x "$dir/bin/pip" "$dir/bin/uvicorn"
"#;

/// Temporary project directory with a manifest, a stub interpreter, and a call log.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create workspace")?;
        fs::write(dir.path().join("requirements.txt"), "fastapi\nuvicorn\npillow\n")
            .context("failed to write manifest")?;
        let workspace = Self { dir };
        #[cfg(unix)]
        workspace.install_stub_python()?;
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("vision-launch.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.path().join("calls.log")
    }

    pub fn stub_python(&self) -> PathBuf {
        self.path().join("stub-python")
    }

    /// Write a config using the stub interpreter, with preflight disabled.
    pub fn write_config(&self, mode: &str) -> Result<()> {
        let content = format!(
            "[environment]\npython = \"{}\"\n\n[server]\nmode = \"{mode}\"\npreflight_port_check = false\n",
            self.stub_python().display()
        );
        fs::write(self.config_path(), content).context("failed to write config")
    }

    /// Recorded child invocations, one per line.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(BINARY_PATH);
        command
            .current_dir(self.path())
            .env(LOG_ENV, self.log_path())
            .env("RUST_LOG", "warn")
            .env_remove("VISION_LAUNCH_CONFIG")
            .env_remove("STUB_PIP_EXIT")
            .env_remove("STUB_UVICORN_EXIT")
            .env_remove("STUB_UVICORN_READY");
        command
    }

    /// Path the waiting server stub touches once its signal traps are installed.
    pub fn ready_path(&self) -> PathBuf {
        self.path().join("uvicorn.ready")
    }

    pub fn run(&self, envs: &[(&str, &str)]) -> Result<Output> {
        let mut command = self.command();
        command.arg("--config").arg(self.config_path());
        for (key, value) in envs {
            command.env(key, value);
        }
        command.output().context("failed to run vision-launch")
    }

    #[cfg(unix)]
    fn install_stub_python(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.stub_python();
        fs::write(&path, STUB_PYTHON).context("failed to write stub interpreter")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .context("failed to mark stub interpreter executable")
    }
}
