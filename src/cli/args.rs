//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use tracing::debug;

use super::{resolve_base_dir, resolve_config_path, LaunchProfile};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunLauncher(LaunchProfile),
    Cli(CliCommand, LaunchProfile),
}

/// Top-level optional CLI commands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Print the ordered steps a launch would perform, without running them.
    #[command(about = "Print the launch plan as JSON without running anything")]
    Plan,
    /// Generate the self-signed certificate used for HTTPS launches.
    #[command(about = "Generate the self-signed TLS certificate and key")]
    Certs(CertsArgs),
    /// Print the effective configuration.
    #[command(about = "Print the effective configuration as TOML")]
    Config,
}

/// Arguments for `certs`.
#[derive(Debug, Clone, Args)]
#[command(
    after_help = "Hint: set `[tls] enabled = true` in vision-launch.toml to serve over HTTPS with the generated files."
)]
pub struct CertsArgs {
    /// Regenerate even if both files already exist.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Create the venv, install requirements, and start vision_server under uvicorn",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Path to vision-launch.toml (overrides VISION_LAUNCH_CONFIG).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Directory relative paths are resolved against (defaults to the current directory).
    #[arg(long = "workdir")]
    pub workdir: Option<PathBuf>,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(&self) -> Result<LaunchProfile> {
        let base_dir = resolve_base_dir(self.workdir.clone())?;
        let (config_path, config_source) =
            resolve_config_path(self.config_override.clone(), &base_dir);
        debug!(
            target: "vision_launch::config",
            path = %config_path.display(),
            source = ?config_source,
            base_dir = %base_dir.display(),
            "Resolved configuration path"
        );

        Ok(LaunchProfile {
            config_path,
            config_source,
            base_dir,
        })
    }

    /// Parse CLI args into either launch mode or utility command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        let profile = self.build()?;
        Ok(match self.command {
            Some(command) => ParsedCommand::Cli(command, profile),
            None => ParsedCommand::RunLauncher(profile),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        LaunchProfileArgs::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_run_launcher() {
        let args = LaunchProfileArgs::try_parse_from(["vision-launch"]).expect("parses");
        assert!(args.command.is_none());
        assert!(args.config_override.is_none());
    }

    #[test]
    fn certs_force_flag_parses() {
        let args = LaunchProfileArgs::try_parse_from(["vision-launch", "certs", "--force"])
            .expect("parses");
        match args.command {
            Some(CliCommand::Certs(certs)) => assert!(certs.force),
            other => panic!("Unexpected command: {other:?}"),
        }
    }
}
