//! Shared helpers for building `uvicorn` commands.

use std::path::Path;

use crate::lib::command::CommandSpec;

pub struct UvicornTlsFiles<'a> {
    pub key_file: &'a Path,
    pub cert_file: &'a Path,
}

pub struct UvicornRequest<'a> {
    pub program: &'a str,
    pub app: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub tls: Option<UvicornTlsFiles<'a>>,
    pub extra_args: &'a [String],
}

/// Build the ASGI server launch command.
pub fn build_uvicorn_command(request: UvicornRequest<'_>) -> CommandSpec {
    let mut spec = CommandSpec::new(request.program)
        .arg(request.app)
        .arg("--host")
        .arg(request.host)
        .arg("--port")
        .arg(request.port.to_string());

    if let Some(tls) = request.tls {
        spec = spec
            .arg(format!("--ssl-keyfile={}", tls.key_file.display()))
            .arg(format!("--ssl-certfile={}", tls.cert_file.display()));
    }

    spec.args(request.extra_args.iter().cloned())
}
