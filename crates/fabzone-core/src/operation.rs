// ── Operation API ──
//
// Every zoning change in a batch is an `OperationRequest`. Its kind is
// resolved into a closed `OperationKind` at dispatch time; each handler
// answers with an `OpOutcome` or a `ZoneError`, which the driver folds
// into the `OpResult` reported to the caller.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use fabzone_api::models::one_or_many;

use crate::error::ZoneError;

/// Zoning operations recognized by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum OperationKind {
    // ── Aliases ──────────────────────────────────────────────────────
    AliasAdd,
    AliasCreate,
    AliasDelete,
    AliasRemove,

    // ── Zone configurations ──────────────────────────────────────────
    CfgAdd,
    CfgCreate,
    CfgDelete,
    CfgEnable,
    CfgRemove,
    CfgSave,

    // ── Zones ────────────────────────────────────────────────────────
    Defzone,
    ZoneAdd,
    ZoneCreate,
    ZoneDelete,
    ZoneRemove,

    // ── Any object kind ──────────────────────────────────────────────
    ZoneObjectCopy,
    ZoneObjectRename,
}

impl OperationKind {
    /// Operations whose remote call commits the transaction on its own,
    /// so they never leave anything pending.
    pub fn implies_save(self) -> bool {
        matches!(self, Self::CfgEnable | Self::CfgSave | Self::Defzone)
    }
}

/// One requested change, as read from a batch file.
///
/// `p0` carries members (or the new name for copy/rename), `p1` carries
/// principal members of a peer zone. Either may be a single string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Operation kind. `None` marks a placeholder line that does nothing.
    #[serde(rename = "c-type", alias = "kind", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub operand: Option<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub p0: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub p1: Vec<String>,
    #[serde(default)]
    pub peer: bool,
}

impl OperationRequest {
    pub fn new(kind: OperationKind, operand: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.to_string()),
            operand: Some(operand.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.p0 = members.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn principals<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.p1 = principals.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn peer(mut self, peer: bool) -> Self {
        self.peer = peer;
        self
    }

    /// `Request: <kind> Operand: <operand>`, as listed for pending changes.
    pub fn describe(&self) -> String {
        format!(
            "Request: {} Operand: {}",
            self.kind.as_deref().unwrap_or("None"),
            self.operand.as_deref().unwrap_or("None"),
        )
    }
}

/// Successful handler result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpOutcome {
    pub changed: bool,
    pub remote_call_made: bool,
}

impl OpOutcome {
    /// The model changed; nothing was sent to the switch.
    pub fn applied() -> Self {
        Self {
            changed: true,
            remote_call_made: false,
        }
    }

    /// Nothing to do.
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            remote_call_made: false,
        }
    }

    /// The model changed and the switch accepted the change.
    pub fn remote() -> Self {
        Self {
            changed: true,
            remote_call_made: true,
        }
    }
}

/// Per-operation entry of a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpResult {
    pub succeeded: bool,
    pub changed: bool,
    pub remote_call_made: bool,
    pub status_code: u16,
    pub reason: Option<String>,
    pub error_detail: Vec<String>,
}

impl OpResult {
    pub fn is_failure(&self) -> bool {
        !self.succeeded
    }
}

impl From<OpOutcome> for OpResult {
    fn from(outcome: OpOutcome) -> Self {
        Self {
            succeeded: true,
            changed: outcome.changed,
            remote_call_made: outcome.remote_call_made,
            status_code: 200,
            reason: None,
            error_detail: Vec::new(),
        }
    }
}

impl From<ZoneError> for OpResult {
    fn from(err: ZoneError) -> Self {
        Self {
            succeeded: false,
            changed: false,
            remote_call_made: false,
            status_code: err.status(),
            reason: Some(err.reason),
            error_detail: err.detail,
        }
    }
}
