// ── Session facade ──
//
// A logged-in connection to one switch. Cheaply cloneable; every clone
// shares the same client and token.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use fabzone_api::FosClient;

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::model::Fabric;

#[derive(Clone)]
pub struct Session {
    client: Arc<FosClient>,
    config: Arc<SessionConfig>,
}

impl Session {
    /// Build the client and log in.
    pub async fn open(config: SessionConfig) -> Result<Self, CoreError> {
        let url = config.base_url()?;
        let client = FosClient::new(url.clone(), &config.transport())?;
        debug!(%url, user = %config.username, "logging in to switch");
        client.login(&config.username, &config.password).await?;
        info!(%url, "session established");
        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
        })
    }

    pub fn client(&self) -> &FosClient {
        &self.client
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Capture the zoning state of `fid`.
    pub async fn fetch_fabric(&self, fid: u16) -> Result<Fabric, CoreError> {
        let snapshot = self
            .client
            .zoning_snapshot(fid)
            .await
            .map_err(|e| match e.status() {
                Some(404) => CoreError::FabricNotFound { fid },
                _ => e.into(),
            })?;
        Ok(Fabric::from_snapshot(fid, &snapshot))
    }

    /// Log out. Failures are logged, never returned.
    pub async fn close(&self) {
        match self.client.logout().await {
            Ok(()) => debug!("session closed"),
            Err(e) => warn!(error = %e, "logout failed"),
        }
    }

    /// Open a session, run `f`, then close the session regardless of the
    /// outcome.
    pub async fn oneshot<F, Fut, T>(config: SessionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let session = Session::open(config).await?;
        let result = f(session.clone()).await;
        session.close().await;
        result
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("url", self.client.base_url())
            .field("logged_in", &self.client.is_logged_in())
            .finish_non_exhaustive()
    }
}
