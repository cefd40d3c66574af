// ── API-to-domain type conversions ──
//
// Bridges the `fabzone_api` wire entries and the canonical model. Reads
// normalize member spellings; writes produce the entry shapes the
// switch expects in POST / DELETE / PATCH bodies.

use fabzone_api::{
    AliasEntry, AliasMembers, CfgEntry, CfgMembers, DefaultZoneAccess, ZoneEntry, ZoneMembers,
    ZoningSnapshot,
};

use crate::model::{Alias, Fabric, Zone, ZoneConfig, ZoneType, normalize_member};

fn normalized(list: &[String]) -> Vec<String> {
    list.iter().map(|m| normalize_member(m)).collect()
}

// ── Wire → model ────────────────────────────────────────────────────

impl From<&AliasEntry> for Alias {
    fn from(entry: &AliasEntry) -> Self {
        Self {
            name: entry.alias_name.clone(),
            members: entry
                .member_entry
                .as_ref()
                .map(|m| normalized(&m.alias_entry_name))
                .unwrap_or_default(),
        }
    }
}

impl From<&ZoneEntry> for Zone {
    fn from(entry: &ZoneEntry) -> Self {
        let members = entry.member_entry.clone().unwrap_or_default();
        Self {
            name: entry.zone_name.clone(),
            zone_type: ZoneType::from_code(entry.zone_type.unwrap_or_default()),
            members: normalized(&members.entry_name),
            principal_members: normalized(&members.principal_entry_name),
        }
    }
}

impl From<&CfgEntry> for ZoneConfig {
    fn from(entry: &CfgEntry) -> Self {
        Self {
            name: entry.cfg_name.clone(),
            members: entry
                .member_zone
                .as_ref()
                .map(|m| m.zone_name.clone())
                .unwrap_or_default(),
        }
    }
}

impl Fabric {
    /// Build the model of fabric `fid` from a switch capture.
    pub fn from_snapshot(fid: u16, snapshot: &ZoningSnapshot) -> Self {
        let mut fabric = Self::new(fid);
        fabric.load_snapshot(snapshot);
        fabric
    }

    /// Replace the whole database with a fresh capture.
    pub fn load_snapshot(&mut self, snapshot: &ZoningSnapshot) {
        *self = Self::new(self.fid());

        let defined = &snapshot.defined;
        for entry in &defined.alias {
            let alias = Alias::from(entry);
            self.add_alias(&alias.name, &alias.members);
        }
        for entry in &defined.zone {
            let zone = Zone::from(entry);
            self.add_zone(&zone.name, zone.zone_type, &zone.members, &zone.principal_members);
        }
        for entry in &defined.cfg {
            let cfg = ZoneConfig::from(entry);
            self.add_zone_config(&cfg.name, &cfg.members);
        }

        let effective = &snapshot.effective;
        self.set_effective(
            effective.cfg_name.clone(),
            effective.enabled_zone.iter().map(Zone::from).collect(),
        );
        if let Some(access) = effective
            .default_zone_access
            .and_then(DefaultZoneAccess::from_code)
        {
            self.set_default_zone_access(access);
        }
    }
}

// ── Model → wire ────────────────────────────────────────────────────

/// Alias with the given members.
pub fn alias_entry(name: &str, members: &[String]) -> AliasEntry {
    AliasEntry {
        alias_name: name.to_owned(),
        member_entry: Some(AliasMembers {
            alias_entry_name: members.to_vec(),
        }),
    }
}

/// Zone with the given members. The type is sent only for peer zones.
pub fn zone_entry(
    name: &str,
    zone_type: ZoneType,
    members: &[String],
    principal_members: &[String],
) -> ZoneEntry {
    ZoneEntry {
        zone_name: name.to_owned(),
        zone_type: zone_type.is_peer().then(|| zone_type.code()),
        member_entry: Some(ZoneMembers {
            entry_name: members.to_vec(),
            principal_entry_name: principal_members.to_vec(),
        }),
    }
}

/// Zone configuration with the given member zones.
pub fn cfg_entry(name: &str, zones: &[String]) -> CfgEntry {
    CfgEntry {
        cfg_name: name.to_owned(),
        member_zone: Some(CfgMembers {
            zone_name: zones.to_vec(),
        }),
    }
}

/// Name-only entries, as used when deleting whole objects.
pub fn alias_ref(name: &str) -> AliasEntry {
    AliasEntry {
        alias_name: name.to_owned(),
        member_entry: None,
    }
}

pub fn zone_ref(name: &str) -> ZoneEntry {
    ZoneEntry {
        zone_name: name.to_owned(),
        zone_type: None,
        member_entry: None,
    }
}

pub fn cfg_ref(name: &str) -> CfgEntry {
    CfgEntry {
        cfg_name: name.to_owned(),
        member_zone: None,
    }
}

impl From<&Alias> for AliasEntry {
    fn from(alias: &Alias) -> Self {
        alias_entry(&alias.name, &alias.members)
    }
}

impl From<&Zone> for ZoneEntry {
    fn from(zone: &Zone) -> Self {
        zone_entry(
            &zone.name,
            zone.zone_type,
            &zone.members,
            &zone.principal_members,
        )
    }
}

impl From<&ZoneConfig> for CfgEntry {
    fn from(cfg: &ZoneConfig) -> Self {
        cfg_entry(&cfg.name, &cfg.members)
    }
}
