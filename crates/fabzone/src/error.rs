//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fabzone_config::ConfigError;
use fabzone_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const BATCH_FAILED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to switch at {url}")]
    #[diagnostic(
        code(fabzone::connection_failed),
        help(
            "Check that the switch's REST API is enabled and reachable.\n\
             Reason: {reason}\n\
             Try: fabzone --security self show effective"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the switch timed out")]
    #[diagnostic(
        code(fabzone::timeout),
        help("Increase the timeout with --timeout or check the switch's load.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fabzone::auth_failed),
        help(
            "Verify the login name and password.\n\
             Run: fabzone config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(fabzone::no_credentials),
        help(
            "Store one with: fabzone config set-password\n\
             Or set the FABZONE_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Fabric ───────────────────────────────────────────────────────
    #[error("Fabric ID {fid} not found on the switch")]
    #[diagnostic(
        code(fabzone::fabric_not_found),
        help("Check --fid or the profile's `fid` against the switch's logical switches.")
    )]
    FabricNotFound { fid: u16 },

    #[error("No fabric ID given")]
    #[diagnostic(
        code(fabzone::missing_fid),
        help("Pass --fid, set `fid` on the profile, or put \"fid\" in the batch file.")
    )]
    MissingFid,

    #[error("Zoning batch failed: {failures} of {total} results reported an error")]
    #[diagnostic(
        code(fabzone::batch_failed),
        help("Results are listed above. Re-run with --test to check a fix without touching the switch.")
    )]
    BatchFailed { failures: usize, total: usize },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(fabzone::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fabzone::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fabzone::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fabzone config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No switch configured")]
    #[diagnostic(
        code(fabzone::no_config),
        help(
            "Create a profile with: fabzone config init\n\
             Expected at: {path}\n\
             Or pass --address and --user with FABZONE_PASSWORD set."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fabzone::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON batch: {0}")]
    #[diagnostic(code(fabzone::json), help("Check the batch file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML batch: {0}")]
    #[diagnostic(code(fabzone::yaml), help("Check the batch file contents and try again."))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::FabricNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::BatchFailed { .. } => exit_code::BATCH_FAILED,
            Self::Validation { .. } | Self::MissingFid | Self::Json(_) | Self::Yaml(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::FabricNotFound { fid } => CliError::FabricNotFound { fid },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "api".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: fabzone config profiles)".into(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
