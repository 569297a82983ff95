//! Entry point for vision-launch.
use std::process::ExitCode;

use anyhow::Error;
use clap::Parser;
use vision_launch::{
    cli::{execute_cli_command, CliCommand, LaunchProfile, LaunchProfileArgs, ParsedCommand},
    launcher::{
        config::LauncherConfig,
        runtime::{self, RuntimeExit},
    },
    lib::telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<(), RuntimeExit> {
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;
    let args = LaunchProfileArgs::parse();
    let command = args.into_command().map_err(RuntimeExit::from_error)?;

    match command {
        ParsedCommand::RunLauncher(profile) => {
            let config = load_config(&profile)?;
            runtime::run_launcher(profile, config).await
        }
        ParsedCommand::Cli(command, profile) => handle_cli_command(command, profile).await,
    }
}

fn load_config(profile: &LaunchProfile) -> Result<LauncherConfig, RuntimeExit> {
    LauncherConfig::load_from_path(
        profile.config_path.clone(),
        profile.config_source.is_required(),
    )
    .map_err(|err| RuntimeExit::from_error(Error::new(err)))
}

async fn handle_cli_command(command: CliCommand, profile: LaunchProfile) -> Result<(), RuntimeExit> {
    let config = load_config(&profile)?;
    let message = execute_cli_command(command, &profile, &config)
        .await
        .map_err(RuntimeExit::from_error)?;
    println!("{message}");
    Ok(())
}
