// ── Full zoning replace ──
//
// Translate the fabric model into `defined-configuration` sections and
// push them in one transaction: clear, one PATCH per section, then save
// (or enable) against the checksum captured with the snapshot. Any
// failure after the clear aborts the transaction so the switch keeps its
// committed database.

use fabzone_api::{
    AliasEntry, CfgEntry, DefaultZoneAccess, DefinedConfiguration, EffectiveConfiguration,
    ZoneEntry,
};
use tracing::{debug, info, warn};

use crate::error::ZoneError;
use crate::model::{Fabric, Zone, ZoneType};
use crate::remote::ZoningRemote;

// ── Section builders ────────────────────────────────────────────────

/// Alias section. Aliases with no members are left out.
pub fn build_alias_content(fabric: &Fabric) -> Option<Vec<AliasEntry>> {
    let entries: Vec<AliasEntry> = fabric
        .aliases()
        .filter(|a| !a.members.is_empty())
        .map(AliasEntry::from)
        .collect();
    (!entries.is_empty()).then_some(entries)
}

/// Zone section. Target driven peer zones belong to the fabric and are
/// never sent.
pub fn build_zone_content(fabric: &Fabric) -> Option<Vec<ZoneEntry>> {
    let entries: Vec<ZoneEntry> = fabric
        .zones()
        .filter(|z| z.zone_type != ZoneType::TargetPeer && !z.is_empty())
        .map(ZoneEntry::from)
        .collect();
    (!entries.is_empty()).then_some(entries)
}

/// Configuration section. Configurations with no zones are left out.
pub fn build_cfg_content(fabric: &Fabric) -> Option<Vec<CfgEntry>> {
    let entries: Vec<CfgEntry> = fabric
        .zone_configs()
        .filter(|c| !c.members.is_empty() && !c.is_effective_marker())
        .map(CfgEntry::from)
        .collect();
    (!entries.is_empty()).then_some(entries)
}

/// All three sections in one body.
pub fn build_all(fabric: &Fabric) -> DefinedConfiguration {
    DefinedConfiguration {
        alias: build_alias_content(fabric).unwrap_or_default(),
        zone: build_zone_content(fabric).unwrap_or_default(),
        cfg: build_cfg_content(fabric).unwrap_or_default(),
    }
}

/// Copy of `fabric` that also defines every zone the switch currently
/// enforces. Clearing the defined database would otherwise orphan an
/// effective zone that the outgoing database dropped.
pub fn plus_effective_zones(fabric: &Fabric, effective: &EffectiveConfiguration) -> Fabric {
    let mut out = fabric.clone();
    for entry in &effective.enabled_zone {
        if out.zone(&entry.zone_name).is_none() {
            let zone = Zone::from(entry);
            debug!(zone = %zone.name, "keeping effective zone in outgoing database");
            out.add_zone(&zone.name, zone.zone_type, &zone.members, &zone.principal_members);
        }
    }
    out
}

// ── Transaction ─────────────────────────────────────────────────────

async fn abort_with<R: ZoningRemote>(
    remote: &R,
    fid: u16,
    err: fabzone_api::Error,
) -> ZoneError {
    warn!(fid, error = %err, "zone transaction failed, aborting");
    if let Err(abort_err) = remote.abort(fid).await {
        warn!(fid, error = %abort_err, "zone transaction abort failed");
    }
    ZoneError::from(err)
}

/// Replace the switch's defined database with `fabric`.
///
/// With `enable`, the first pass finishes by enabling that configuration
/// instead of saving; a second pass then saves without the preserved
/// effective zones that are no longer enforced. `default_zone` is set in
/// the first pass so the same commit carries it.
pub async fn replace_zoning<R: ZoningRemote>(
    remote: &R,
    fabric: &Fabric,
    enable: Option<&str>,
    default_zone: Option<DefaultZoneAccess>,
) -> Result<(), ZoneError> {
    let fid = fabric.fid();
    if let Some(cfg) = enable {
        if fabric.zone_config(cfg).is_none() {
            return Err(ZoneError::bad_request(
                "Effective zone configuration does not exist",
                vec![cfg.to_owned()],
            ));
        }
    }

    let mut enable = enable;
    let mut default_zone = default_zone;
    loop {
        let snapshot = remote.fetch_zoning(fid).await?;
        let Some(checksum) = snapshot.effective.checksum.clone() else {
            return Err(fabzone_api::Error::MissingField("checksum").into());
        };
        let outgoing = plus_effective_zones(fabric, &snapshot.effective);
        let content = build_all(&outgoing);
        if content.is_empty() {
            return Err(ZoneError::bad_request(
                format!("No zone database in fabric {fid}"),
                Vec::new(),
            ));
        }

        if let Err(e) = remote.clear(fid).await {
            return Err(abort_with(remote, fid, e).await);
        }

        let sections = [
            DefinedConfiguration::with_aliases(content.alias),
            DefinedConfiguration::with_zones(content.zone),
            DefinedConfiguration::with_cfgs(content.cfg),
        ];
        for section in sections.iter().filter(|s| !s.is_empty()) {
            if let Err(e) = remote.replace(fid, section).await {
                return Err(abort_with(remote, fid, e).await);
            }
        }
        if let Some(access) = default_zone.take() {
            if let Err(e) = remote.set_default_zone(fid, access).await {
                return Err(abort_with(remote, fid, e).await);
            }
            debug!(fid, ?access, "default zone access staged with replace");
        }

        match enable.take() {
            Some(cfg) => {
                if let Err(e) = remote.enable(fid, cfg, &checksum).await {
                    return Err(abort_with(remote, fid, e).await);
                }
                info!(fid, cfg, "zone database replaced and configuration enabled");
            }
            None => {
                if let Err(e) = remote.save(fid, &checksum).await {
                    return Err(abort_with(remote, fid, e).await);
                }
                info!(fid, "zone database replaced and saved");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fabzone_api::ZoningSnapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handlers::testing::{WWN_A, switch};
    use crate::remote::fake::FakeRemote;

    async fn captured(remote: &FakeRemote) -> Fabric {
        let snapshot: ZoningSnapshot = remote.fetch_zoning(128).await.unwrap();
        Fabric::from_snapshot(128, &snapshot)
    }

    fn names<T>(items: impl Iterator<Item = T>, name: impl Fn(T) -> String) -> Vec<String> {
        let mut out: Vec<String> = items.map(name).collect();
        out.sort();
        out
    }

    #[test]
    fn builders_skip_empty_and_fabric_owned_objects() {
        let mut fabric = Fabric::new(128);
        fabric.add_alias("empty", &[]);
        fabric.add_alias("host", &[WWN_A.to_owned()]);
        fabric.add_zone("tp", ZoneType::TargetPeer, &["host".to_owned()], &[]);
        fabric.add_zone_config("idle", &[]);

        assert_eq!(build_alias_content(&fabric).unwrap().len(), 1);
        assert_eq!(build_zone_content(&fabric), None);
        assert_eq!(build_cfg_content(&fabric), None);
        assert!(build_all(&Fabric::new(1)).is_empty());
    }

    #[test]
    fn effective_zones_missing_from_the_model_are_kept() {
        let mut fabric = Fabric::new(128);
        fabric.add_alias("host", &[WWN_A.to_owned()]);
        let effective = EffectiveConfiguration {
            cfg_name: Some("old".into()),
            enabled_zone: vec![crate::convert::zone_entry(
                "legacy",
                ZoneType::Standard,
                &["host".to_owned()],
                &[],
            )],
            ..EffectiveConfiguration::default()
        };
        let outgoing = plus_effective_zones(&fabric, &effective);
        assert!(outgoing.zone("legacy").is_some());
        assert!(fabric.zone("legacy").is_none());
    }

    #[tokio::test]
    async fn replace_reproduces_the_captured_database() {
        let remote = switch();
        let fabric = captured(&remote).await;
        replace_zoning(&remote, &fabric, None, None).await.unwrap();

        let again = captured(&remote).await;
        assert_eq!(
            names(again.aliases(), |a| a.name.clone()),
            names(fabric.aliases(), |a| a.name.clone())
        );
        for zone in fabric.zones() {
            assert_eq!(again.zone(&zone.name), Some(zone));
        }
        for cfg in fabric.zone_configs() {
            assert_eq!(again.zone_config(&cfg.name), Some(cfg));
        }
        assert_eq!(
            remote.calls(),
            ["fetch", "fetch", "clear", "replace", "replace", "replace", "save", "fetch"]
        );
    }

    #[tokio::test]
    async fn failed_section_aborts() {
        let remote = switch();
        let fabric = captured(&remote).await;
        remote.fail_on("replace");
        let err = replace_zoning(&remote, &fabric, None, None).await.unwrap_err();
        assert_eq!(err.status(), 400);
        let calls = remote.calls();
        assert_eq!(calls.last().map(String::as_str), Some("abort"));
        assert!(!calls.contains(&"save".to_owned()));
    }

    #[tokio::test]
    async fn enable_on_commit_runs_a_second_pass() {
        let remote = switch();
        let mut fabric = captured(&remote).await;
        fabric.add_zone("z2", ZoneType::Standard, &["host_b".to_owned(), "array_c".to_owned()], &[]);
        fabric.add_zone_config("dev", &["z2".to_owned()]);
        replace_zoning(&remote, &fabric, Some("dev"), None).await.unwrap();

        assert_eq!(remote.effective_cfg().as_deref(), Some("dev"));
        let calls = remote.calls();
        assert_eq!(calls.iter().filter(|c| *c == "clear").count(), 2);
        assert_eq!(calls.iter().filter(|c| *c == "enable").count(), 1);
        assert_eq!(calls.last().map(String::as_str), Some("save"));
    }

    #[tokio::test]
    async fn default_zone_access_is_committed_with_the_replace() {
        let remote = switch();
        let fabric = captured(&remote).await;
        replace_zoning(&remote, &fabric, None, Some(DefaultZoneAccess::AllAccess))
            .await
            .unwrap();

        assert_eq!(remote.default_zone(), Some(DefaultZoneAccess::AllAccess.code()));
        assert_eq!(
            remote.calls(),
            ["fetch", "fetch", "clear", "replace", "replace", "replace", "defzone", "save"]
        );
    }

    #[tokio::test]
    async fn rejected_default_zone_aborts_before_save() {
        let remote = switch();
        let fabric = captured(&remote).await;
        remote.fail_on("defzone");
        let err = replace_zoning(&remote, &fabric, None, Some(DefaultZoneAccess::NoAccess))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
        let calls = remote.calls();
        assert_eq!(calls.last().map(String::as_str), Some("abort"));
        assert!(!calls.contains(&"save".to_owned()));
    }

    #[tokio::test]
    async fn enabling_an_unknown_configuration_is_rejected() {
        let remote = switch();
        let fabric = captured(&remote).await;
        let err = replace_zoning(&remote, &fabric, Some("ghost"), None).await.unwrap_err();
        assert_eq!(err.reason, "Effective zone configuration does not exist");
        assert_eq!(remote.calls(), ["fetch"]);
    }

    #[tokio::test]
    async fn empty_database_is_rejected() {
        let remote = FakeRemote::default();
        let err = replace_zoning(&remote, &Fabric::new(128), None, None).await.unwrap_err();
        assert_eq!(err.reason, "No zone database in fabric 128");
    }
}
