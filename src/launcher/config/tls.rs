use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{require_non_empty, server::validate_port};
use crate::lib::errors::ConfigError;

pub const DEFAULT_CERT_FILE: &str = "cert.pem";
pub const DEFAULT_KEY_FILE: &str = "key.pem";
pub const DEFAULT_TLS_PORT: u16 = 8443;
pub const DEFAULT_CERT_DAYS: u32 = 365;
pub const DEFAULT_COMMON_NAME: &str = "localhost";
pub const DEFAULT_OPENSSL: &str = "openssl";

/// Self-signed HTTPS settings.
#[derive(Debug, Clone, Serialize)]
pub struct TlsSection {
    pub enabled: bool,
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
    pub port: u16,
    pub days: u32,
    pub common_name: String,
    pub subject_alt_names: Vec<String>,
    pub openssl: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawTlsSection {
    pub enabled: Option<bool>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub days: Option<u32>,
    pub common_name: Option<String>,
    pub subject_alt_names: Option<Vec<String>>,
    pub openssl: Option<String>,
}

pub fn parse_tls_section(raw: Option<RawTlsSection>, path: &Path) -> Result<TlsSection, ConfigError> {
    let tls_raw = raw.unwrap_or_default();

    let port = tls_raw.port.unwrap_or(DEFAULT_TLS_PORT);
    validate_port(port, "tls.port", path)?;

    let days = tls_raw.days.unwrap_or(DEFAULT_CERT_DAYS);
    if days == 0 {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "tls.days",
            message: "Certificates must be valid for at least one day".into(),
        });
    }

    let common_name = tls_raw
        .common_name
        .unwrap_or_else(|| DEFAULT_COMMON_NAME.to_string());
    require_non_empty(&common_name, "tls.common_name", path)?;

    let openssl = tls_raw.openssl.unwrap_or_else(|| DEFAULT_OPENSSL.to_string());
    require_non_empty(&openssl, "tls.openssl", path)?;

    let subject_alt_names = tls_raw
        .subject_alt_names
        .unwrap_or_else(|| vec![format!("DNS:{DEFAULT_COMMON_NAME}")]);
    if let Some(bad) = subject_alt_names
        .iter()
        .find(|name| !is_subject_alt_name(name))
    {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "tls.subject_alt_names",
            message: format!("Use `DNS:<name>` or `IP:<address>` (got `{bad}`)"),
        });
    }

    Ok(TlsSection {
        enabled: tls_raw.enabled.unwrap_or(false),
        cert_file: tls_raw
            .cert_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CERT_FILE)),
        key_file: tls_raw
            .key_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE)),
        port,
        days,
        common_name,
        subject_alt_names,
        openssl,
    })
}
fn is_subject_alt_name(entry: &str) -> bool {
    if let Some(address) = entry.strip_prefix("IP:") {
        return address.parse::<IpAddr>().is_ok();
    }
    entry
        .strip_prefix("DNS:")
        .is_some_and(|name| !name.trim().is_empty())
}

