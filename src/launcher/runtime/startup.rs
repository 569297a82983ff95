use std::process::ExitCode;

use anyhow::Error;

use crate::{
    cli::LaunchProfile,
    launcher::config::LauncherConfig,
    lib::errors::LaunchError,
    steps::{run_pipeline, ProcessOutcome, SystemRunner},
};

/// Bundles a runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: Option<String>,
    exit_code: ExitCode,
    code: u8,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: Some(format!("{err:?}")),
            exit_code: ExitCode::FAILURE,
            code: 1,
        }
    }

    /// A failing child's exit code is propagated; other failures exit with 1.
    pub fn from_launch_error(err: LaunchError) -> Self {
        let code = err
            .child_exit_code()
            .map(|code| ProcessOutcome::exited(code).exit_code())
            .filter(|code| *code != 0)
            .unwrap_or(1);
        Self {
            message: Some(err.to_string()),
            exit_code: ExitCode::from(code),
            code,
        }
    }

    /// The server already reported its own failure; only the status is carried.
    pub fn from_outcome(outcome: ProcessOutcome) -> Self {
        let code = outcome.exit_code();
        Self {
            message: None,
            exit_code: ExitCode::from(code),
            code,
        }
    }

    pub fn report(self) -> ExitCode {
        if let Some(message) = self.message {
            eprintln!("{message}");
        }
        self.exit_code
    }

    /// Numeric form of the exit code.
    pub fn code(&self) -> u8 {
        self.code
    }
}

/// Run the full pipeline and map its result onto the process exit status.
pub async fn run_launcher(profile: LaunchProfile, config: LauncherConfig) -> Result<(), RuntimeExit> {
    let outcome = run_pipeline(&config, &profile.base_dir, &SystemRunner)
        .await
        .map_err(RuntimeExit::from_launch_error)?;
    if outcome.success() {
        Ok(())
    } else {
        Err(RuntimeExit::from_outcome(outcome))
    }
}
