//! In-process self-signed certificate generation for hosts without `openssl`.

use std::net::IpAddr;

use chrono::{DateTime, Datelike, Duration, Utc};
use rcgen::{
    date_time_ymd, CertificateParams, DistinguishedName, DnType, Ia5String, KeyPair, SanType,
};

use crate::lib::errors::LaunchError;

/// PEM-encoded certificate and its unencrypted private key.
#[derive(Debug, Clone)]
pub struct GeneratedCertificate {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Generate a self-signed certificate valid from today for `days` days.
///
/// `subject_alt_names` entries use the `DNS:<name>` / `IP:<address>` form.
pub fn generate_self_signed(
    common_name: &str,
    days: u32,
    subject_alt_names: &[String],
) -> Result<GeneratedCertificate, LaunchError> {
    let mut params = CertificateParams::default();
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, common_name);
    params.distinguished_name = name;
    params.subject_alt_names = subject_alt_names
        .iter()
        .map(|entry| san_entry(entry))
        .collect::<Result<_, _>>()?;

    let not_before = Utc::now();
    let not_after = not_before + Duration::days(i64::from(days));
    let ymd = |at: DateTime<Utc>| date_time_ymd(at.year(), at.month() as u8, at.day() as u8);
    params.not_before = ymd(not_before);
    params.not_after = ymd(not_after);

    let key_pair = KeyPair::generate().map_err(generation_error)?;
    let cert = params.self_signed(&key_pair).map_err(generation_error)?;

    Ok(GeneratedCertificate {
        cert_pem: cert.pem(),
        key_pem: key_pair.serialize_pem(),
    })
}

fn san_entry(entry: &str) -> Result<SanType, LaunchError> {
    if let Some(address) = entry.strip_prefix("IP:") {
        let address: IpAddr = address.parse().map_err(|_| LaunchError::CertificateGeneration {
            message: format!("invalid IP subject alternative name `{entry}`"),
        })?;
        return Ok(SanType::IpAddress(address));
    }
    let name = entry.strip_prefix("DNS:").unwrap_or(entry);
    let name = Ia5String::try_from(name.to_string()).map_err(generation_error)?;
    Ok(SanType::DnsName(name))
}

fn generation_error(err: rcgen::Error) -> LaunchError {
    LaunchError::CertificateGeneration {
        message: err.to_string(),
    }
}
