// ── Remote zoning seam ──
//
// The handlers, the sync protocol and the driver talk to the switch only
// through `ZoningRemote`. `FosClient` is the production implementation;
// tests substitute an in-memory switch.

use fabzone_api::{
    DefaultZoneAccess, DefinedConfiguration, Error, FosClient, ZoningSnapshot,
};

/// Zoning calls needed to run a batch against one switch.
#[allow(async_fn_in_trait)]
pub trait ZoningRemote {
    async fn fetch_zoning(&self, fid: u16) -> Result<ZoningSnapshot, Error>;
    async fn checksum(&self, fid: u16) -> Result<String, Error>;
    async fn clear(&self, fid: u16) -> Result<(), Error>;
    async fn abort(&self, fid: u16) -> Result<(), Error>;
    async fn save(&self, fid: u16, checksum: &str) -> Result<(), Error>;
    async fn enable(&self, fid: u16, cfg_name: &str, checksum: &str) -> Result<(), Error>;
    async fn set_default_zone(&self, fid: u16, access: DefaultZoneAccess) -> Result<(), Error>;
    /// Create objects or add members.
    async fn create(&self, fid: u16, content: &DefinedConfiguration) -> Result<(), Error>;
    /// Delete objects, or the listed members of them.
    async fn delete(&self, fid: u16, content: &DefinedConfiguration) -> Result<(), Error>;
    /// Replace whole objects.
    async fn replace(&self, fid: u16, content: &DefinedConfiguration) -> Result<(), Error>;
}

impl ZoningRemote for FosClient {
    async fn fetch_zoning(&self, fid: u16) -> Result<ZoningSnapshot, Error> {
        self.zoning_snapshot(fid).await
    }

    async fn checksum(&self, fid: u16) -> Result<String, Error> {
        self.zone_checksum(fid).await
    }

    async fn clear(&self, fid: u16) -> Result<(), Error> {
        self.clear_zone_db(fid).await
    }

    async fn abort(&self, fid: u16) -> Result<(), Error> {
        self.abort_zone_transaction(fid).await
    }

    async fn save(&self, fid: u16, checksum: &str) -> Result<(), Error> {
        self.save_zone_db(fid, checksum).await
    }

    async fn enable(&self, fid: u16, cfg_name: &str, checksum: &str) -> Result<(), Error> {
        self.enable_zone_configuration(fid, cfg_name, checksum).await
    }

    async fn set_default_zone(&self, fid: u16, access: DefaultZoneAccess) -> Result<(), Error> {
        self.set_default_zone_access(fid, access).await
    }

    async fn create(&self, fid: u16, content: &DefinedConfiguration) -> Result<(), Error> {
        self.create_defined(fid, content).await
    }

    async fn delete(&self, fid: u16, content: &DefinedConfiguration) -> Result<(), Error> {
        self.delete_defined(fid, content).await
    }

    async fn replace(&self, fid: u16, content: &DefinedConfiguration) -> Result<(), Error> {
        self.replace_defined(fid, content).await
    }
}

// ── In-memory switch for tests ───────────────────────────────────────
