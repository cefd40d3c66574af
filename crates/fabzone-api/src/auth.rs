// Session authentication
//
// FOS issues a session token in the `Authorization` header of the login
// response. The client keeps it and replays it on every later request;
// logout invalidates it on the switch.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::FosClient;
use crate::error::Error;

impl FosClient {
    /// Authenticate with the switch using HTTP Basic credentials.
    ///
    /// `POST /rest/login`. On success the returned session token is stored
    /// and used for all subsequent requests.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.rest_url("login")?;

        debug!("logging in at {}", url);

        let resp = self
            .http()
            .post(url)
            .basic_auth(username, Some(password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let token = resp
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| Error::Authentication {
                message: "login response carried no session token".into(),
            })?;
        self.set_auth_token(Some(token));

        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// `POST /rest/logout`. The stored token is dropped even when the switch
    /// rejects the request, since it can no longer be trusted.
    pub async fn logout(&self) -> Result<(), Error> {
        if !self.is_logged_in() {
            return Err(Error::NotLoggedIn);
        }

        let url = self.rest_url("logout")?;

        debug!("logging out at {}", url);

        let result = self.post(url, &serde_json::json!({})).await;
        self.set_auth_token(None);
        result?;

        debug!("logout complete");
        Ok(())
    }
}
