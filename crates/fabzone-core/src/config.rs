// ── Runtime session configuration ──
//
// These types describe *how* to reach a switch. They carry credential
// data and connection tuning, but never touch disk. The CLI builds a
// `SessionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use fabzone_api::{TlsMode, TransportConfig};

use crate::error::CoreError;

/// Transport security for the REST API.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Security {
    /// Plain HTTP.
    #[default]
    #[strum(serialize = "none")]
    #[serde(rename = "none", alias = "None", alias = "NONE")]
    None,
    /// HTTPS verified against trusted roots.
    #[strum(to_string = "ca", serialize = "CA")]
    #[serde(rename = "ca", alias = "CA")]
    Ca,
    /// HTTPS with the switch's self-signed certificate.
    #[strum(serialize = "self")]
    #[serde(rename = "self", alias = "SELF", alias = "Self")]
    SelfSigned,
}

impl Security {
    pub fn scheme(self) -> &'static str {
        match self {
            Self::None => "http",
            Self::Ca | Self::SelfSigned => "https",
        }
    }
}

/// Configuration for one switch session.
///
/// Built by the CLI, passed to `Session` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Switch management address (`10.0.0.10`, `switch.example.com:8443`).
    pub address: String,
    pub username: String,
    pub password: SecretString,
    pub security: Security,
    /// CA bundle used with `Security::Ca` instead of the system roots.
    pub ca_cert: Option<PathBuf>,
    /// Request timeout.
    pub timeout: Duration,
}

impl SessionConfig {
    /// `{scheme}://{address}`.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        let raw = format!("{}://{}", self.security.scheme(), self.address.trim());
        Url::parse(&raw).map_err(|e| CoreError::Config {
            message: format!("invalid switch address {:?}: {e}", self.address),
        })
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = match (self.security, &self.ca_cert) {
            (Security::Ca, Some(path)) => TlsMode::CustomCa(path.clone()),
            (Security::Ca | Security::None, _) => TlsMode::System,
            (Security::SelfSigned, _) => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(security: Security) -> SessionConfig {
        SessionConfig {
            address: "10.0.0.10".into(),
            username: "admin".into(),
            password: SecretString::from("password".to_string()),
            security,
            ca_cert: None,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn scheme_follows_security() {
        assert_eq!(config(Security::None).base_url().unwrap().as_str(), "http://10.0.0.10/");
        assert_eq!(config(Security::Ca).base_url().unwrap().as_str(), "https://10.0.0.10/");
    }

    #[test]
    fn self_signed_accepts_any_certificate() {
        let transport = config(Security::SelfSigned).transport();
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn security_parses_classic_spellings() {
        assert_eq!("CA".parse::<Security>().unwrap(), Security::Ca);
        assert_eq!("self".parse::<Security>().unwrap(), Security::SelfSigned);
        assert_eq!("None".parse::<Security>().unwrap(), Security::None);
        assert!("tls".parse::<Security>().is_err());
    }
}
