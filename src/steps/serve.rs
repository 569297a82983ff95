//! Start the ASGI server as the final action of a run.
use std::{net::TcpListener, path::Path};

use tracing::{debug, info};

use super::runner::{ProcessOutcome, ProcessRunner};
use crate::{
    launcher::config::LauncherConfig,
    lib::{
        command::CommandSpec,
        errors::LaunchError,
        paths,
        telemetry::{emit_launch_mode, LaunchModeTelemetry},
        uvicorn::{build_uvicorn_command, UvicornRequest, UvicornTlsFiles},
        venv::ActivatedEnv,
    },
};

/// Server command under the activated environment.
pub fn server_command(config: &LauncherConfig, base_dir: &Path, activated: &ActivatedEnv) -> CommandSpec {
    let (host, port) = config.bind_target();
    let key_file = paths::absolutize(&config.tls.key_file, base_dir);
    let cert_file = paths::absolutize(&config.tls.cert_file, base_dir);
    let tls = config.tls.enabled.then(|| UvicornTlsFiles {
        key_file: &key_file,
        cert_file: &cert_file,
    });

    let mut spec = activated.apply(build_uvicorn_command(UvicornRequest {
        program: &config.server.program,
        app: &config.server.app,
        host,
        port,
        tls,
        extra_args: &config.server.extra_args,
    }));
    // The app module is imported relative to the working directory.
    spec.current_dir = Some(base_dir.to_path_buf());
    spec
}

/// Bind and release `host:port` to surface an occupied port before launch.
pub fn preflight_port(host: &str, port: u16) -> Result<(), LaunchError> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).map_err(|source| LaunchError::PortUnavailable {
        addr: addr.clone(),
        source,
    })?;
    drop(listener);
    debug!(target: "vision_launch::serve", bind_addr = %addr, "Port is available");
    Ok(())
}

/// Hand control to the server.
pub async fn launch_server<R: ProcessRunner>(
    config: &LauncherConfig,
    base_dir: &Path,
    activated: &ActivatedEnv,
    runner: &R,
) -> Result<ProcessOutcome, LaunchError> {
    let (host, port) = config.bind_target();
    let command = server_command(config, base_dir, activated);
    let env_dir = activated.env_dir.to_string_lossy();
    let line = command.display_line();
    emit_launch_mode(&LaunchModeTelemetry {
        mode: config.server.mode.as_str(),
        host,
        port,
        tls: config.tls.enabled,
        env_dir: &env_dir,
        command: &line,
    });

    let outcome = runner
        .launch(&command, config.server.mode)
        .await
        .map_err(|source| LaunchError::Spawn {
            program: config.server.program.clone(),
            source,
        })?;
    info!(
        target: "vision_launch::serve",
        exit_code = outcome.code,
        signal = outcome.signal,
        "Server process exited"
    );
    Ok(outcome)
}
