use thiserror::Error;

/// Top-level error type for the `fabzone-api` crate.
///
/// Covers every failure mode of the switch REST API: authentication,
/// transport, error bodies returned by the switch, and payload decoding.
/// `fabzone-core` maps these into per-operation results.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the session token was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A request was attempted before `login()` produced a session token.
    #[error("Not logged in -- call login() first")]
    NotLoggedIn,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Switch API ──────────────────────────────────────────────────
    /// Error reported by the switch (parsed from the `{errors: {error: [...]}}` body).
    #[error("Switch API error (HTTP {status}): {reason}")]
    Fos {
        status: u16,
        reason: String,
        messages: Vec<String>,
    },

    /// A response decoded fine but lacked a field the caller depends on.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the session is no longer valid.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::NotLoggedIn | Self::Fos { status: 401, .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Fos { status, .. } => *status == 503,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Fos { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status associated with this error, if one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fos { status, .. } => Some(*status),
            Self::Authentication { .. } | Self::NotLoggedIn => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Detail lines reported by the switch (empty for local failures).
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Fos { messages, .. } => messages,
            _ => &[],
        }
    }
}
