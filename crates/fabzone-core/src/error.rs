// ── Core error types ──
//
// `CoreError` covers session-level failures (connecting, logging in,
// capturing the fabric). `ZoneError` is the per-operation failure that
// ends up in a batch result. Both translate transport-layer errors from
// `fabzone_api` so consumers never match on HTTP details directly.

use serde::Serialize;
use thiserror::Error;

/// Unified error type for session management.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to switch at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Switch connection timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Fabric ID {fid} not found on the switch")]
    FabricNotFound { fid: u16 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fabzone_api::Error> for CoreError {
    fn from(err: fabzone_api::Error) -> Self {
        match err {
            fabzone_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            fabzone_api::Error::NotLoggedIn => CoreError::AuthenticationFailed {
                message: "no active session -- log in first".into(),
            },
            fabzone_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            fabzone_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fabzone_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fabzone_api::Error::Fos {
                status,
                reason,
                messages,
            } => CoreError::Api {
                message: if messages.is_empty() {
                    reason
                } else {
                    format!("{reason}: {}", messages.join("; "))
                },
                status: Some(status),
            },
            fabzone_api::Error::MissingField(field) => {
                CoreError::Internal(format!("Missing: {field}"))
            }
            fabzone_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

// ── Per-operation errors ─────────────────────────────────────────────

/// Classification of a failed operation. Each kind maps to the HTTP-like
/// status reported in the batch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneErrorKind {
    /// Malformed request: missing operand, bad name, bad member.
    BadRequest,
    /// The named object or member does not exist.
    NotFound,
    /// Already exists, in use, or member/principal overlap.
    Conflict,
    /// `cfg-save` with nothing to save.
    NoPending,
    /// Changes were sent to the switch but never saved.
    PendingUpdates,
    /// The switch rejected a request.
    Remote { status: u16 },
    /// Unexpected failure inside this program.
    Internal,
}

impl ZoneErrorKind {
    pub fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::NoPending => 204,
            Self::PendingUpdates => 428,
            Self::Remote { status } => status,
            Self::Internal => 500,
        }
    }
}

/// A failed zoning operation: kind, short reason, and detail lines that
/// locate the offending operand or members.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ZoneError {
    pub kind: ZoneErrorKind,
    pub reason: String,
    pub detail: Vec<String>,
}

impl ZoneError {
    pub fn new(kind: ZoneErrorKind, reason: impl Into<String>, detail: Vec<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            detail,
        }
    }

    pub fn bad_request(reason: impl Into<String>, detail: Vec<String>) -> Self {
        Self::new(ZoneErrorKind::BadRequest, reason, detail)
    }

    pub fn not_found(reason: impl Into<String>, detail: Vec<String>) -> Self {
        Self::new(ZoneErrorKind::NotFound, reason, detail)
    }

    pub fn conflict(reason: impl Into<String>, detail: Vec<String>) -> Self {
        Self::new(ZoneErrorKind::Conflict, reason, detail)
    }

    pub fn internal(reason: impl Into<String>, detail: Vec<String>) -> Self {
        Self::new(ZoneErrorKind::Internal, reason, detail)
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }
}

impl From<fabzone_api::Error> for ZoneError {
    fn from(err: fabzone_api::Error) -> Self {
        let status = err.status().unwrap_or(500);
        match err {
            fabzone_api::Error::Fos {
                reason, messages, ..
            } => Self::new(ZoneErrorKind::Remote { status }, reason, messages),
            other => Self::new(
                ZoneErrorKind::Remote { status },
                other.to_string(),
                Vec::new(),
            ),
        }
    }
}

impl From<CoreError> for ZoneError {
    fn from(err: CoreError) -> Self {
        let kind = match &err {
            CoreError::AuthenticationFailed { .. } => ZoneErrorKind::Remote { status: 401 },
            CoreError::Timeout => ZoneErrorKind::Remote { status: 408 },
            CoreError::FabricNotFound { .. } => ZoneErrorKind::NotFound,
            CoreError::Api {
                status: Some(status),
                ..
            } => ZoneErrorKind::Remote { status: *status },
            CoreError::Config { .. } => ZoneErrorKind::BadRequest,
            CoreError::ConnectionFailed { .. } | CoreError::Api { .. } | CoreError::Internal(_) => {
                ZoneErrorKind::Internal
            }
        };
        Self::new(kind, err.to_string(), Vec::new())
    }
}

impl From<crate::model::ModelError> for ZoneError {
    fn from(err: crate::model::ModelError) -> Self {
        match err {
            crate::model::ModelError::NotFound { ref name, .. } => {
                Self::not_found("Not Found", vec![name.clone()])
            }
            crate::model::ModelError::AlreadyExists { .. } => {
                Self::conflict(err.to_string(), Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_errors_keep_status_and_messages() {
        let err = ZoneError::from(fabzone_api::Error::Fos {
            status: 400,
            reason: "Bad Request".into(),
            messages: vec!["Invalid zone member".into()],
        });
        assert_eq!(err.kind, ZoneErrorKind::Remote { status: 400 });
        assert_eq!(err.status(), 400);
        assert_eq!(err.reason, "Bad Request");
        assert_eq!(err.detail, vec!["Invalid zone member".to_owned()]);
    }

    #[test]
    fn missing_checksum_is_a_server_side_failure() {
        let err = ZoneError::from(fabzone_api::Error::MissingField("checksum"));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(ZoneErrorKind::NoPending.status(), 204);
        assert_eq!(ZoneErrorKind::PendingUpdates.status(), 428);
        assert_eq!(ZoneErrorKind::Conflict.status(), 409);
    }

    #[test]
    fn api_auth_failure_becomes_core_auth_failure() {
        let err = CoreError::from(fabzone_api::Error::Authentication {
            message: "bad password".into(),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }
}
