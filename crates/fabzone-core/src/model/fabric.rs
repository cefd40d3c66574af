// ── Fabric zoning database ──
//
// The `Fabric` owns every alias, zone and zone configuration of one
// virtual fabric, each indexed by name. Cross references are names
// resolved through these indexes, never pointers. The effective zone
// set is a separate snapshot that only a capture from the switch
// replaces.

use indexmap::IndexMap;
use serde::Serialize;

use fabzone_api::DefaultZoneAccess;

use super::zoning::{
    Alias, EFFECTIVE_CFG_MARKER, ObjectKind, Zone, ZoneConfig, ZoneType, merge_unique,
};

/// Failure of a structural model edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{kind} {name} not found")]
    NotFound { kind: ObjectKind, name: String },

    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: ObjectKind, name: String },
}

/// In-memory zoning database for one fabric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fabric {
    fid: u16,
    aliases: IndexMap<String, Alias>,
    zones: IndexMap<String, Zone>,
    zone_configs: IndexMap<String, ZoneConfig>,
    /// Name of the configuration the switch reports as enabled.
    effective_cfg_name: Option<String>,
    /// Zones of the effective configuration, as enforced.
    effective_zones: IndexMap<String, Zone>,
    default_zone_access: Option<DefaultZoneAccess>,
}

impl Fabric {
    pub fn new(fid: u16) -> Self {
        Self {
            fid,
            ..Self::default()
        }
    }

    pub fn fid(&self) -> u16 {
        self.fid
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.zones.is_empty() && self.zone_configs.is_empty()
    }

    // ── Lookups ─────────────────────────────────────────────────────

    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.get(name)
    }

    pub fn zone_config(&self, name: &str) -> Option<&ZoneConfig> {
        self.zone_configs.get(name)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.values()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn zone_configs(&self) -> impl Iterator<Item = &ZoneConfig> {
        self.zone_configs.values()
    }

    /// Locate `name` among configurations, then zones, then aliases.
    pub fn find_object(&self, name: &str) -> Option<ObjectKind> {
        if self.zone_configs.contains_key(name) {
            Some(ObjectKind::ZoneConfig)
        } else if self.zones.contains_key(name) {
            Some(ObjectKind::Zone)
        } else if self.aliases.contains_key(name) {
            Some(ObjectKind::Alias)
        } else {
            None
        }
    }

    pub fn contains(&self, kind: ObjectKind, name: &str) -> bool {
        match kind {
            ObjectKind::Alias => self.aliases.contains_key(name),
            ObjectKind::Zone => self.zones.contains_key(name),
            ObjectKind::ZoneConfig => self.zone_configs.contains_key(name),
        }
    }

    // ── Effective zone set ──────────────────────────────────────────

    pub fn effective_cfg_name(&self) -> Option<&str> {
        self.effective_cfg_name.as_deref()
    }

    pub fn effective_zones(&self) -> impl Iterator<Item = &Zone> {
        self.effective_zones.values()
    }

    pub fn is_effective_zone(&self, name: &str) -> bool {
        self.effective_zones.contains_key(name)
    }

    /// The effective zone set as a configuration under the internal
    /// marker name, or `None` when zoning is disabled.
    pub fn effective_zone_config(&self) -> Option<ZoneConfig> {
        self.effective_cfg_name.as_ref().map(|_| ZoneConfig {
            name: EFFECTIVE_CFG_MARKER.to_owned(),
            members: self.effective_zones.keys().cloned().collect(),
        })
    }

    pub(crate) fn set_effective(&mut self, cfg_name: Option<String>, zones: Vec<Zone>) {
        self.effective_cfg_name = cfg_name;
        self.effective_zones = zones.into_iter().map(|z| (z.name.clone(), z)).collect();
    }

    pub fn default_zone_access(&self) -> Option<DefaultZoneAccess> {
        self.default_zone_access
    }

    pub fn set_default_zone_access(&mut self, access: DefaultZoneAccess) {
        self.default_zone_access = Some(access);
    }

    // ── Aliases ─────────────────────────────────────────────────────

    /// Create `name`, or extend it with the members it does not have yet.
    pub fn add_alias(&mut self, name: &str, members: &[String]) -> &[String] {
        let alias = self
            .aliases
            .entry(name.to_owned())
            .or_insert_with(|| Alias {
                name: name.to_owned(),
                members: Vec::new(),
            });
        merge_unique(&mut alias.members, members);
        &alias.members
    }

    pub fn delete_alias(&mut self, name: &str) -> Option<Alias> {
        self.aliases.shift_remove(name)
    }

    /// Drop `members` from an alias, returning what remains.
    pub fn remove_alias_members(&mut self, name: &str, members: &[String]) -> Option<&[String]> {
        let alias = self.aliases.get_mut(name)?;
        alias.members.retain(|m| !members.contains(m));
        Some(&alias.members)
    }

    // ── Zones ───────────────────────────────────────────────────────

    /// Create `name`, or extend it. The type of an existing zone is kept.
    pub fn add_zone(
        &mut self,
        name: &str,
        zone_type: ZoneType,
        members: &[String],
        principal_members: &[String],
    ) -> &Zone {
        let zone = self.zones.entry(name.to_owned()).or_insert_with(|| Zone {
            name: name.to_owned(),
            zone_type,
            members: Vec::new(),
            principal_members: Vec::new(),
        });
        merge_unique(&mut zone.members, members);
        merge_unique(&mut zone.principal_members, principal_members);
        zone
    }

    pub fn delete_zone(&mut self, name: &str) -> Option<Zone> {
        self.zones.shift_remove(name)
    }

    pub fn remove_zone_members(
        &mut self,
        name: &str,
        members: &[String],
        principal_members: &[String],
    ) -> Option<&Zone> {
        let zone = self.zones.get_mut(name)?;
        zone.members.retain(|m| !members.contains(m));
        zone.principal_members
            .retain(|m| !principal_members.contains(m));
        Some(zone)
    }

    // ── Zone configurations ─────────────────────────────────────────

    pub fn add_zone_config(&mut self, name: &str, members: &[String]) -> &[String] {
        let cfg = self
            .zone_configs
            .entry(name.to_owned())
            .or_insert_with(|| ZoneConfig {
                name: name.to_owned(),
                members: Vec::new(),
            });
        merge_unique(&mut cfg.members, members);
        &cfg.members
    }

    pub fn delete_zone_config(&mut self, name: &str) -> Option<ZoneConfig> {
        self.zone_configs.shift_remove(name)
    }

    pub fn remove_zone_config_members(
        &mut self,
        name: &str,
        members: &[String],
    ) -> Option<&[String]> {
        let cfg = self.zone_configs.get_mut(name)?;
        cfg.members.retain(|m| !members.contains(m));
        Some(&cfg.members)
    }

    // ── Copy / rename ───────────────────────────────────────────────

    /// Duplicate `source` under `target`. The destination must be free
    /// within the same kind.
    pub fn copy(&mut self, kind: ObjectKind, source: &str, target: &str) -> Result<(), ModelError> {
        if self.contains(kind, target) {
            return Err(ModelError::AlreadyExists {
                kind,
                name: target.to_owned(),
            });
        }
        let not_found = || ModelError::NotFound {
            kind,
            name: source.to_owned(),
        };
        match kind {
            ObjectKind::Alias => {
                let mut alias = self.aliases.get(source).cloned().ok_or_else(not_found)?;
                target.clone_into(&mut alias.name);
                self.aliases.insert(target.to_owned(), alias);
            }
            ObjectKind::Zone => {
                let mut zone = self.zones.get(source).cloned().ok_or_else(not_found)?;
                target.clone_into(&mut zone.name);
                self.zones.insert(target.to_owned(), zone);
            }
            ObjectKind::ZoneConfig => {
                let mut cfg = self.zone_configs.get(source).cloned().ok_or_else(not_found)?;
                target.clone_into(&mut cfg.name);
                self.zone_configs.insert(target.to_owned(), cfg);
            }
        }
        Ok(())
    }

    /// Copy `source` to `target`, point every reference at `target`,
    /// then delete `source`. Returns the names of the objects whose
    /// membership was rewritten (zones for an alias, configurations for
    /// a zone).
    pub fn rename(
        &mut self,
        kind: ObjectKind,
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, ModelError> {
        self.copy(kind, source, target)?;
        let rewritten = match kind {
            ObjectKind::Alias => {
                let zones = self.replace_alias_refs(source, target);
                self.delete_alias(source);
                zones
            }
            ObjectKind::Zone => {
                let cfgs = self.replace_zone_refs(source, target);
                self.delete_zone(source);
                cfgs
            }
            ObjectKind::ZoneConfig => {
                self.delete_zone_config(source);
                Vec::new()
            }
        };
        Ok(rewritten)
    }

    /// Replace alias `old` by `new` in every zone, in place.
    pub fn replace_alias_refs(&mut self, old: &str, new: &str) -> Vec<String> {
        let mut touched = Vec::new();
        for zone in self.zones.values_mut() {
            let mut hit = false;
            for m in zone
                .members
                .iter_mut()
                .chain(zone.principal_members.iter_mut())
            {
                if m.as_str() == old {
                    new.clone_into(m);
                    hit = true;
                }
            }
            if hit {
                touched.push(zone.name.clone());
            }
        }
        touched
    }

    /// Replace zone `old` by `new` in every zone configuration, in place.
    pub fn replace_zone_refs(&mut self, old: &str, new: &str) -> Vec<String> {
        let mut touched = Vec::new();
        for cfg in self.zone_configs.values_mut() {
            if let Some(slot) = cfg.members.iter_mut().find(|m| m.as_str() == old) {
                new.clone_into(slot);
                touched.push(cfg.name.clone());
            }
        }
        touched
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Zones that use `alias` as a member or principal member.
    pub fn zones_for_alias(&self, alias: &str) -> Vec<String> {
        self.zones
            .values()
            .filter(|z| z.has_member(alias))
            .map(|z| z.name.clone())
            .collect()
    }

    /// Defined configurations that contain `zone`.
    pub fn zone_configs_for_zone(&self, zone: &str) -> Vec<String> {
        self.zone_configs
            .values()
            .filter(|c| c.has_member(zone))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Aliases that contain the address `member`.
    pub fn aliases_for_address(&self, member: &str) -> Vec<String> {
        self.aliases
            .values()
            .filter(|a| a.members.iter().any(|m| m == member))
            .map(|a| a.name.clone())
            .collect()
    }
}
