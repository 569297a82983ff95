use tracing::{debug, info};

use super::LauncherConfig;

pub fn log_defaults(path: &std::path::Path) {
    debug!(
        target: "vision_launch::config",
        path = %path.display(),
        "Configuration file not found; using built-in defaults"
    );
}

pub fn log_loaded(config: &LauncherConfig) {
    let (host, port) = config.bind_target();
    info!(
        target: "vision_launch::config",
        path = %config.source_path.display(),
        env_dir = %config.environment.dir.display(),
        manifest = %config.install.manifest.display(),
        app = %config.server.app,
        host = %host,
        port = port,
        mode = config.server.mode.as_str(),
        tls = config.tls.enabled,
        "Configuration loaded successfully"
    );
}
