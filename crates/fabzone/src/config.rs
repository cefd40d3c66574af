//! CLI configuration -- thin wrapper around `fabzone_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--address, --user, --security, ...).

use std::time::Duration;

use secrecy::SecretString;

use fabzone_core::{Security, SessionConfig};

use crate::cli::{GlobalOpts, SecurityArg};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fabzone_config::{
    Config, Defaults, PASSWORD_ENV, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

impl From<SecurityArg> for Security {
    fn from(arg: SecurityArg) -> Self {
        match arg {
            SecurityArg::None => Security::None,
            SecurityArg::Ca => Security::Ca,
            SecurityArg::SelfSigned => Security::SelfSigned,
        }
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Comma-separated profile names for error help.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Where to connect, plus the fabric ID the profile defaults to.
#[derive(Debug)]
pub struct Target {
    pub session: SessionConfig,
    pub fid: Option<u16>,
}

/// Build the session target from the config file, profile, and CLI
/// overrides.
///
/// With no profile, `--address` and `--user` plus `FABZONE_PASSWORD` are
/// enough. An explicitly requested profile must exist.
pub fn resolve_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, &cfg.defaults);
    }
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    // No profile found -- build from CLI flags / env vars alone
    let address = global.address.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let username = global.user.clone().ok_or_else(|| CliError::Validation {
        field: "user".into(),
        reason: "--user is required when no profile is configured".into(),
    })?;
    let password = std::env::var(PASSWORD_ENV)
        .map(SecretString::from)
        .map_err(|_| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;

    Ok(Target {
        session: SessionConfig {
            address,
            username,
            password,
            security: global.security.map(Security::from).unwrap_or_default(),
            ca_cert: None,
            timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
        },
        fid: global.fid,
    })
}

/// Translate a `Profile` + global flags into a session target.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<Target, CliError> {
    let mut profile = profile.clone();
    if let Some(ref address) = global.address {
        profile.address.clone_from(address);
    }
    if let Some(ref user) = global.user {
        profile.username.clone_from(user);
    }
    if let Some(security) = global.security {
        profile.security = security.into();
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let session = fabzone_config::profile_to_session_config(&profile, profile_name, defaults.timeout)?;
    Ok(Target {
        session,
        fid: global.fid.or(profile.fid),
    })
}
