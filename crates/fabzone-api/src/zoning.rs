// Zoning endpoints
//
// `brocade-zone/defined-configuration` and
// `brocade-zone/effective-configuration`, scoped to one virtual fabric.
// Request bodies are wrapped in the container name, as the switch expects.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::FosClient;
use crate::error::Error;
use crate::models::{
    DefaultZoneAccess, DefinedConfiguration, EffectiveConfiguration, ZoneAction, ZoningSnapshot,
};

const DEFINED: &str = "brocade-zone/defined-configuration";
const EFFECTIVE: &str = "brocade-zone/effective-configuration";

#[derive(Serialize, Deserialize)]
struct DefinedContainer<T> {
    #[serde(rename = "defined-configuration", default)]
    defined: T,
}

#[derive(Serialize, Deserialize)]
struct EffectiveContainer<T> {
    #[serde(rename = "effective-configuration", default)]
    effective: T,
}

impl FosClient {
    // ── Reads ────────────────────────────────────────────────────────

    /// Read the defined zone database.
    ///
    /// An empty database is reported by the switch as 404; it decodes as
    /// an empty `DefinedConfiguration`.
    pub async fn defined_configuration(&self, fid: u16) -> Result<DefinedConfiguration, Error> {
        let url = self.running_url(DEFINED, fid)?;
        match self.get::<DefinedContainer<DefinedConfiguration>>(url).await {
            Ok(container) => Ok(container.defined),
            Err(e) if e.is_not_found() => {
                debug!(fid, "defined zone database is empty");
                Ok(DefinedConfiguration::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Read the effective configuration (active zone set, checksum, default zone).
    pub async fn effective_configuration(
        &self,
        fid: u16,
    ) -> Result<EffectiveConfiguration, Error> {
        let url = self.running_url(EFFECTIVE, fid)?;
        let container: EffectiveContainer<EffectiveConfiguration> = self.get(url).await?;
        Ok(container.effective)
    }

    /// Read both zoning resources.
    pub async fn zoning_snapshot(&self, fid: u16) -> Result<ZoningSnapshot, Error> {
        let defined = self.defined_configuration(fid).await?;
        let effective = self.effective_configuration(fid).await?;
        Ok(ZoningSnapshot { defined, effective })
    }

    /// Current zone database checksum, required by save and enable.
    pub async fn zone_checksum(&self, fid: u16) -> Result<String, Error> {
        self.effective_configuration(fid)
            .await?
            .checksum
            .ok_or(Error::MissingField(
                "brocade-zone/effective-configuration/checksum",
            ))
    }

    // ── Transaction control ──────────────────────────────────────────

    /// Issue a `cfg-action` against the effective configuration.
    ///
    /// `checksum` is sent only for actions that require it.
    pub async fn zone_action(
        &self,
        fid: u16,
        action: ZoneAction,
        checksum: Option<&str>,
    ) -> Result<(), Error> {
        let body = match (action.needs_checksum(), checksum) {
            (true, Some(sum)) => json!({ "cfg-action": action.code(), "checksum": sum }),
            (true, None) => return Err(Error::MissingField("checksum")),
            (false, _) => json!({ "cfg-action": action.code() }),
        };
        debug!(fid, ?action, "zone transaction action");
        let url = self.running_url(EFFECTIVE, fid)?;
        self.patch(url, &EffectiveContainer { effective: body }).await
    }

    /// Commit the transaction buffer (`cfgsave`).
    pub async fn save_zone_db(&self, fid: u16, checksum: &str) -> Result<(), Error> {
        self.zone_action(fid, ZoneAction::Save, Some(checksum)).await
    }

    /// Clear every defined object (`cfgclear`). Takes effect on the next save.
    pub async fn clear_zone_db(&self, fid: u16) -> Result<(), Error> {
        self.zone_action(fid, ZoneAction::Clear, None).await
    }

    /// Discard outstanding changes and release the zoning lock (`cfgtransabort`).
    pub async fn abort_zone_transaction(&self, fid: u16) -> Result<(), Error> {
        self.zone_action(fid, ZoneAction::Abort, None).await
    }

    /// Make `cfg_name` the effective configuration (`cfgenable`).
    ///
    /// Enabling implies a save of any outstanding defined changes.
    pub async fn enable_zone_configuration(
        &self,
        fid: u16,
        cfg_name: &str,
        checksum: &str,
    ) -> Result<(), Error> {
        debug!(fid, cfg_name, "enabling zone configuration");
        let url = self.running_url(EFFECTIVE, fid)?;
        let body = json!({ "cfg-name": cfg_name, "checksum": checksum });
        self.patch(url, &EffectiveContainer { effective: body }).await
    }

    /// Set default zone access (`defzone --noaccess | --allaccess`).
    pub async fn set_default_zone_access(
        &self,
        fid: u16,
        access: DefaultZoneAccess,
    ) -> Result<(), Error> {
        let url = self.running_url(EFFECTIVE, fid)?;
        let body = json!({ "default-zone-access": access.code() });
        self.patch(url, &EffectiveContainer { effective: body }).await
    }

    // ── Defined database edits ───────────────────────────────────────

    /// Create objects, or add members to existing ones (POST).
    pub async fn create_defined(
        &self,
        fid: u16,
        content: &DefinedConfiguration,
    ) -> Result<(), Error> {
        let url = self.running_url(DEFINED, fid)?;
        self.post(url, &DefinedContainer { defined: content }).await
    }

    /// Delete objects by name, or remove the listed members (DELETE).
    pub async fn delete_defined(
        &self,
        fid: u16,
        content: &DefinedConfiguration,
    ) -> Result<(), Error> {
        let url = self.running_url(DEFINED, fid)?;
        self.delete(url, &DefinedContainer { defined: content }).await
    }

    /// Replace the listed objects wholesale (PATCH).
    pub async fn replace_defined(
        &self,
        fid: u16,
        content: &DefinedConfiguration,
    ) -> Result<(), Error> {
        let url = self.running_url(DEFINED, fid)?;
        self.patch(url, &DefinedContainer { defined: content }).await
    }
}
