// ── Zone database entities ──
//
// Aliases, zones and zone configurations reference each other by name
// only. The owning `Fabric` resolves every reference.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Name of the internal zone configuration that mirrors the effective
/// zone set. Not a legal switch object name, so it can never collide
/// with a defined configuration.
pub const EFFECTIVE_CFG_MARKER: &str = "_effective_zone_cfg";

/// Peer zoning type as reported by the switch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ZoneType {
    #[default]
    Standard,
    /// Peer zone created by a user.
    UserPeer,
    /// Peer zone created by a target through the fabric; never edited here.
    TargetPeer,
}

impl ZoneType {
    pub fn code(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::UserPeer => 1,
            Self::TargetPeer => 2,
        }
    }

    /// Unknown codes are treated as standard zones.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::UserPeer,
            2 => Self::TargetPeer,
            _ => Self::Standard,
        }
    }

    pub fn is_peer(self) -> bool {
        !matches!(self, Self::Standard)
    }
}

/// Named group of device addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub members: Vec<String>,
}

/// Named set of members. Peer zones split members into principal and
/// non-principal sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub zone_type: ZoneType,
    pub members: Vec<String>,
    pub principal_members: Vec<String>,
}

impl Zone {
    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name) || self.principal_members.iter().any(|m| m == name)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.principal_members.is_empty()
    }
}

/// Named ordered set of zone names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    pub members: Vec<String>,
}

impl ZoneConfig {
    pub fn has_member(&self, zone: &str) -> bool {
        self.members.iter().any(|m| m == zone)
    }

    pub fn is_effective_marker(&self) -> bool {
        self.name == EFFECTIVE_CFG_MARKER
    }
}

/// Which kind of zone object a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ObjectKind {
    #[strum(serialize = "alias")]
    Alias,
    #[strum(serialize = "zone")]
    Zone,
    #[strum(serialize = "zonecfg")]
    ZoneConfig,
}

/// Append every entry of `add` not already in `list`, keeping order.
pub(crate) fn merge_unique(list: &mut Vec<String>, add: &[String]) {
    for item in add {
        if !list.contains(item) {
            list.push(item.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_type_codes_round_trip() {
        for t in [ZoneType::Standard, ZoneType::UserPeer, ZoneType::TargetPeer] {
            assert_eq!(ZoneType::from_code(t.code()), t);
        }
        assert_eq!(ZoneType::from_code(9), ZoneType::Standard);
        assert!(ZoneType::UserPeer.is_peer());
    }

    #[test]
    fn merge_keeps_order_and_skips_duplicates() {
        let mut list = vec!["a".to_owned(), "b".to_owned()];
        merge_unique(&mut list, &["b".to_owned(), "c".to_owned(), "c".to_owned()]);
        assert_eq!(list, ["a", "b", "c"]);
    }
}
