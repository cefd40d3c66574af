// ── Batch state ──
//
// Everything one batch carries between operations: the remote seam, the
// fabric model, mode flags, the held checksum and the bookkeeping lists
// the driver inspects at the end.

use tracing::debug;

use crate::error::ZoneError;
use crate::model::Fabric;
use crate::operation::OperationRequest;
use crate::remote::ZoningRemote;

/// Mode flags of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BatchOptions {
    /// Override conflicts, create missing targets, ignore absent objects.
    pub force: bool,
    /// Validate and mutate the model only.
    pub test: bool,
    /// Defer every remote change to one full replace at the end.
    pub bulk: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            force: true,
            test: false,
            bulk: false,
        }
    }
}

/// Mutable state threaded through every handler of one batch.
pub struct BatchContext<'a, R> {
    pub remote: &'a R,
    pub fabric: Fabric,
    pub fid: u16,
    pub options: BatchOptions,
    /// Zone database checksum held for save and enable.
    pub checksum: Option<String>,
    /// Changes sent to the switch and not yet saved.
    pub pending: Vec<OperationRequest>,
    /// Model changes not sent to the switch (test or bulk mode).
    pub staged: Vec<OperationRequest>,
    /// Configuration to enable when a bulk batch commits.
    pub enable_on_commit: Option<String>,
    /// The zone database was saved or enabled during this batch.
    pub saved: bool,
}

impl<'a, R: ZoningRemote> BatchContext<'a, R> {
    pub fn new(remote: &'a R, fabric: Fabric, options: BatchOptions) -> Self {
        Self {
            remote,
            fid: fabric.fid(),
            fabric,
            options,
            checksum: None,
            pending: Vec::new(),
            staged: Vec::new(),
            enable_on_commit: None,
            saved: false,
        }
    }

    pub fn force(&self) -> bool {
        self.options.force
    }

    /// No remote calls are made by handlers.
    pub fn offline(&self) -> bool {
        self.options.test || self.options.bulk
    }

    /// The held checksum, required for save and enable.
    pub fn held_checksum(&self) -> Result<String, ZoneError> {
        self.checksum.clone().ok_or_else(|| {
            ZoneError::internal(
                "Unexpected response",
                vec!["Missing: brocade-zone/effective-configuration/checksum".into()],
            )
        })
    }

    /// Re-capture the whole zoning database from the switch.
    pub async fn refresh(&mut self) -> Result<(), fabzone_api::Error> {
        let snapshot = self.remote.fetch_zoning(self.fid).await?;
        self.fabric.load_snapshot(&snapshot);
        debug!(fid = self.fid, "zoning database refreshed");
        Ok(())
    }

    /// Fetch a fresh checksum after the switch committed a transaction.
    pub async fn refresh_checksum(&mut self) -> Result<(), fabzone_api::Error> {
        self.checksum = Some(self.remote.checksum(self.fid).await?);
        Ok(())
    }
}
