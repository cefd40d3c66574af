// Switch REST API HTTP client
//
// Wraps `reqwest::Client` with FOS URL construction, session-token
// handling, and error-body decoding. Endpoint groups (auth, zoning) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Raw HTTP client for a switch's `/rest` API.
///
/// `base_url` is the switch root (e.g. `https://10.0.0.10`); every path is
/// resolved under `{base_url}/rest/`. Running-configuration responses are
/// wrapped as `{"Response": {...}}`; the wrapper is stripped before the
/// caller sees the payload.
pub struct FosClient {
    http: reqwest::Client,
    base_url: Url,
    /// Session token returned in the `Authorization` header of the login
    /// response. Sent back verbatim on every subsequent request.
    auth_token: RwLock<Option<String>>,
}

impl FosClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            auth_token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The switch base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a session token is currently held.
    pub fn is_logged_in(&self) -> bool {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // ── Session token management ─────────────────────────────────────

    pub(crate) fn set_auth_token(&self, token: Option<String>) {
        trace!(present = token.is_some(), "updating session token");
        *self
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Apply the stored session token to a request builder.
    fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self
            .auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(token) => builder.header(AUTHORIZATION, token),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/rest/{path}`.
    pub(crate) fn rest_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/rest/{path}"))?)
    }

    /// Build `{base}/rest/running/{resource}?vf-id={fid}`.
    pub(crate) fn running_url(&self, resource: &str, fid: u16) -> Result<Url, Error> {
        let mut url = self.rest_url(&format!("running/{resource}"))?;
        url.query_pairs_mut().append_pair("vf-id", &fid.to_string());
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the `Response` wrapper.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .apply_token(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        let body = Self::check_status(resp).await?;
        Self::decode(&body)
    }

    /// Send a POST request with a JSON body.
    pub(crate) async fn post(&self, url: Url, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .apply_token(self.http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await.map(drop)
    }

    /// Send a PATCH request with a JSON body.
    pub(crate) async fn patch(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("PATCH {}", url);

        let resp = self
            .apply_token(self.http.patch(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await.map(drop)
    }

    /// Send a DELETE request with a JSON body naming what to remove.
    pub(crate) async fn delete(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("DELETE {}", url);

        let resp = self
            .apply_token(self.http.delete(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await.map(drop)
    }

    /// Map non-success statuses to `Error`, returning the raw body otherwise.
    ///
    /// The switch reports failures as `{"errors": {"error": [...]}}`; every
    /// `error-message` found is carried in `Error::Fos::messages`.
    pub(crate) async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let messages = serde_json::from_str::<ErrorBody>(&body)
                .map(|parsed| {
                    parsed
                        .errors
                        .error
                        .into_iter()
                        .filter_map(|item| item.error_message)
                        .collect()
                })
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        Vec::new()
                    } else {
                        vec![body.chars().take(200).collect()]
                    }
                });
            return Err(Error::Fos {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_owned(),
                messages,
            });
        }

        Ok(body)
    }

    /// Decode `{"Response": T}`.
    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
        #[derive(serde::Deserialize)]
        struct Wrapper<T> {
            #[serde(rename = "Response")]
            response: T,
        }

        serde_json::from_str::<Wrapper<T>>(body)
            .map(|w| w.response)
            .map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.to_owned(),
                }
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> FosClient {
        FosClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://10.0.0.10/").unwrap(),
        )
    }

    #[test]
    fn running_url_carries_fabric_id() {
        let url = client()
            .running_url("brocade-zone/effective-configuration", 128)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://10.0.0.10/rest/running/brocade-zone/effective-configuration?vf-id=128"
        );
    }

    #[test]
    fn new_client_has_no_session() {
        let c = client();
        assert!(!c.is_logged_in());
        c.set_auth_token(Some("Custom_Basic abc".into()));
        assert!(c.is_logged_in());
    }
}
