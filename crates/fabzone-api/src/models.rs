// Wire types for the `brocade-zone` resources.
//
// Field names follow the switch's kebab-case YANG leaves. Lists are
// accepted either as arrays or as a single bare value, since the switch
// collapses one-element lists on some firmware levels.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

// ── List helper ─────────────────────────────────────────────────────

/// Deserialize a field that may be `null`, a single value, or an array.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: de::DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
        Nothing(()),
    }

    Ok(
        match Option::<OneOrMany<T>>::deserialize(deserializer)? {
            Some(OneOrMany::Many(items)) => items,
            Some(OneOrMany::One(item)) => vec![item],
            Some(OneOrMany::Nothing(())) | None => Vec::new(),
        },
    )
}

// ── Defined configuration ───────────────────────────────────────────

/// Body of `brocade-zone/defined-configuration`.
///
/// Used both for reads and as the payload of POST / PATCH / DELETE;
/// empty sections are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinedConfiguration {
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub cfg: Vec<CfgEntry>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub zone: Vec<ZoneEntry>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<AliasEntry>,
}

impl DefinedConfiguration {
    pub fn is_empty(&self) -> bool {
        self.cfg.is_empty() && self.zone.is_empty() && self.alias.is_empty()
    }

    pub fn with_aliases(alias: Vec<AliasEntry>) -> Self {
        Self {
            alias,
            ..Self::default()
        }
    }

    pub fn with_zones(zone: Vec<ZoneEntry>) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }

    pub fn with_cfgs(cfg: Vec<CfgEntry>) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AliasEntry {
    pub alias_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_entry: Option<AliasMembers>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AliasMembers {
    #[serde(default, deserialize_with = "one_or_many")]
    pub alias_entry_name: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZoneEntry {
    pub zone_name: String,
    /// 0 = standard, 1 = user-created peer, 2 = target-driven peer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_entry: Option<ZoneMembers>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZoneMembers {
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub entry_name: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub principal_entry_name: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CfgEntry {
    pub cfg_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_zone: Option<CfgMembers>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CfgMembers {
    #[serde(default, deserialize_with = "one_or_many")]
    pub zone_name: Vec<String>,
}

// ── Effective configuration ─────────────────────────────────────────

/// Body of `brocade-zone/effective-configuration`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveConfiguration {
    /// Name of the enabled configuration; absent when zoning is disabled.
    #[serde(default)]
    pub cfg_name: Option<String>,
    /// Opaque token for optimistic concurrency on save / enable.
    #[serde(default)]
    pub checksum: Option<String>,
    /// 0 = no access, 1 = all access.
    #[serde(default)]
    pub default_zone_access: Option<u8>,
    #[serde(default)]
    pub db_transaction: Option<u32>,
    #[serde(default)]
    pub transaction_token: Option<u32>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub enabled_zone: Vec<ZoneEntry>,
}

/// Both zoning resources captured together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoningSnapshot {
    pub defined: DefinedConfiguration,
    pub effective: EffectiveConfiguration,
}

// ── Actions ─────────────────────────────────────────────────────────

/// Transaction actions accepted in the `cfg-action` leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneAction {
    /// Commit the transaction buffer to the defined database.
    Save,
    /// Disable the effective configuration.
    Disable,
    /// Clear every defined object (aliases, zones, configurations).
    Clear,
    /// Discard the outstanding transaction and release the lock.
    Abort,
}

impl ZoneAction {
    pub fn code(self) -> u8 {
        match self {
            Self::Save => 1,
            Self::Disable => 2,
            Self::Clear => 3,
            Self::Abort => 4,
        }
    }

    /// Whether the switch requires the database checksum with this action.
    pub fn needs_checksum(self) -> bool {
        matches!(self, Self::Save | Self::Disable)
    }
}

/// Default zone access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultZoneAccess {
    NoAccess,
    AllAccess,
}

impl DefaultZoneAccess {
    pub fn code(self) -> u8 {
        match self {
            Self::NoAccess => 0,
            Self::AllAccess => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NoAccess),
            1 => Some(Self::AllAccess),
            _ => None,
        }
    }
}

// ── Error body ──────────────────────────────────────────────────────

/// `{"errors": {"error": [...]}}` returned with a 4xx/5xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub errors: ErrorList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorList {
    #[serde(default, deserialize_with = "one_or_many")]
    pub error: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ErrorItem {
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_info: Option<serde_json::Value>,
}
