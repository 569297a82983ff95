//! Shared helpers for building the self-signed certificate command.

use std::path::Path;

use crate::lib::command::CommandSpec;

pub struct SelfSignedRequest<'a> {
    pub openssl: &'a str,
    pub key_file: &'a Path,
    pub cert_file: &'a Path,
    pub days: u32,
    pub common_name: &'a str,
    pub subject_alt_names: &'a [String],
}

/// Build an `openssl req -x509` command producing an unencrypted RSA-2048 key pair.
pub fn build_self_signed_command(request: SelfSignedRequest<'_>) -> CommandSpec {
    let mut spec = CommandSpec::new(request.openssl)
        .args(["req", "-x509", "-newkey", "rsa:2048", "-keyout"])
        .arg(request.key_file.display().to_string())
        .arg("-out")
        .arg(request.cert_file.display().to_string())
        .arg("-days")
        .arg(request.days.to_string())
        .arg("-nodes")
        .arg("-subj")
        .arg(format!("/CN={}", request.common_name));

    if !request.subject_alt_names.is_empty() {
        spec = spec
            .arg("-addext")
            .arg(format!("subjectAltName={}", request.subject_alt_names.join(",")));
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_signed_command_matches_openssl_req_layout() {
        let sans = vec!["DNS:localhost".to_string(), "IP:10.0.0.5".to_string()];
        let spec = build_self_signed_command(SelfSignedRequest {
            openssl: "openssl",
            key_file: Path::new("key.pem"),
            cert_file: Path::new("cert.pem"),
            days: 365,
            common_name: "localhost",
            subject_alt_names: &sans,
        });

        assert_eq!(
            spec.display_line(),
            "openssl req -x509 -newkey rsa:2048 -keyout key.pem -out cert.pem -days 365 \
             -nodes -subj /CN=localhost -addext subjectAltName=DNS:localhost,IP:10.0.0.5"
        );
    }

    #[test]
    fn empty_sans_omit_addext() {
        let spec = build_self_signed_command(SelfSignedRequest {
            openssl: "openssl",
            key_file: Path::new("key.pem"),
            cert_file: Path::new("cert.pem"),
            days: 30,
            common_name: "vision.local",
            subject_alt_names: &[],
        });

        assert!(!spec.args.iter().any(|arg| arg == "-addext"));
        assert_eq!(spec.args.last().map(String::as_str), Some("/CN=vision.local"));
    }
}
