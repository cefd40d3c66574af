// ── Operation handlers ──
//
// One async handler per operation kind. Handlers validate their operands,
// check the fabric model, make the remote call (unless the batch is
// offline) and only then mutate the model.

mod alias;
mod cfg;
mod control;
mod object;
mod zone;

pub use alias::{alias_add, alias_create, alias_delete, alias_remove};
pub use cfg::{cfg_add, cfg_create, cfg_delete, cfg_remove};
pub use control::{cfg_enable, cfg_save, defzone};
pub use object::{zone_object_copy, zone_object_rename};
pub use zone::{zone_add, zone_create, zone_delete, zone_remove};

use fabzone_api::DefinedConfiguration;

use crate::context::BatchContext;
use crate::convert::{alias_ref, cfg_ref, zone_ref};
use crate::error::ZoneError;
use crate::model::ObjectKind;
use crate::operation::{OpOutcome, OperationKind, OperationRequest};
use crate::remote::ZoningRemote;

/// Route `req` to its handler. A request without a kind does nothing.
pub async fn dispatch<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let Some(raw) = req.kind.as_deref() else {
        return Ok(OpOutcome::unchanged());
    };
    let kind: OperationKind = raw.parse().map_err(|_| {
        ZoneError::not_found("Not Found", vec![format!("Unknown change request: {raw}")])
    })?;

    match kind {
        OperationKind::AliasAdd => alias_add(ctx, req).await,
        OperationKind::AliasCreate => alias_create(ctx, req).await,
        OperationKind::AliasDelete => alias_delete(ctx, req).await,
        OperationKind::AliasRemove => alias_remove(ctx, req).await,
        OperationKind::CfgAdd => cfg_add(ctx, req).await,
        OperationKind::CfgCreate => cfg_create(ctx, req).await,
        OperationKind::CfgDelete => cfg_delete(ctx, req).await,
        OperationKind::CfgEnable => cfg_enable(ctx, req).await,
        OperationKind::CfgRemove => cfg_remove(ctx, req).await,
        OperationKind::CfgSave => cfg_save(ctx, req).await,
        OperationKind::Defzone => defzone(ctx, req).await,
        OperationKind::ZoneAdd => zone_add(ctx, req).await,
        OperationKind::ZoneCreate => zone_create(ctx, req).await,
        OperationKind::ZoneDelete => zone_delete(ctx, req).await,
        OperationKind::ZoneObjectCopy => zone_object_copy(ctx, req).await,
        OperationKind::ZoneObjectRename => zone_object_rename(ctx, req).await,
        OperationKind::ZoneRemove => zone_remove(ctx, req).await,
    }
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Drop repeated entries, keeping first occurrences.
pub(crate) fn unique(list: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(list.len());
    for item in list {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Split `requested` into (already in `existing`, not in `existing`).
pub(crate) fn partition(existing: &[String], requested: &[String]) -> (Vec<String>, Vec<String>) {
    requested
        .iter()
        .cloned()
        .partition(|m| existing.contains(m))
}

/// `existing` without the entries in `removed`.
pub(crate) fn without(existing: &[String], removed: &[String]) -> Vec<String> {
    existing
        .iter()
        .filter(|m| !removed.contains(m))
        .cloned()
        .collect()
}

/// Conflict returned when a removal would leave an object with no members.
pub(crate) fn would_be_empty(name: &str) -> ZoneError {
    ZoneError::conflict(
        format!("Removing every member would leave {name} empty"),
        vec![name.to_owned()],
    )
}

/// Make way for a create of `name`. An existing object is a conflict
/// unless the batch forces, in which case it is deleted so the create
/// starts from scratch.
///
/// The object comes back under the same name, so configurations and zones
/// referring to it stay valid and the delete handlers' in-use checks do not
/// apply here.
pub(crate) async fn replace_existing<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    kind: ObjectKind,
    name: &str,
    exists: &str,
) -> Result<(), ZoneError> {
    if !ctx.fabric.contains(kind, name) {
        return Ok(());
    }
    if !ctx.force() {
        return Err(ZoneError::conflict(exists, vec![name.to_owned()]));
    }
    if !ctx.offline() {
        let content = match kind {
            ObjectKind::Alias => DefinedConfiguration::with_aliases(vec![alias_ref(name)]),
            ObjectKind::Zone => DefinedConfiguration::with_zones(vec![zone_ref(name)]),
            ObjectKind::ZoneConfig => DefinedConfiguration::with_cfgs(vec![cfg_ref(name)]),
        };
        ctx.remote.delete(ctx.fid, &content).await?;
    }
    match kind {
        ObjectKind::Alias => {
            ctx.fabric.delete_alias(name);
        }
        ObjectKind::Zone => {
            ctx.fabric.delete_zone(name);
        }
        ObjectKind::ZoneConfig => {
            ctx.fabric.delete_zone_config(name);
        }
    }
    Ok(())
}

/// Outcome of a handler that changed the model.
pub(crate) fn changed<R: ZoningRemote>(ctx: &BatchContext<'_, R>) -> OpOutcome {
    if ctx.offline() {
        OpOutcome::applied()
    } else {
        OpOutcome::remote()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use fabzone_api::{DefinedConfiguration, ZoningSnapshot};

    use crate::context::{BatchContext, BatchOptions};
    use crate::model::Fabric;
    use crate::remote::fake::FakeRemote;

    pub(crate) const WWN_A: &str = "10:00:00:00:00:00:00:0a";
    pub(crate) const WWN_B: &str = "10:00:00:00:00:00:00:0b";
    pub(crate) const WWN_C: &str = "50:00:00:00:00:00:00:0c";

    /// Switch holding aliases `host_a`, `host_b`, `array_c`, zone `z1`
    /// (`host_a`, `array_c`) and configuration `prod` (`z1`), with `prod`
    /// effective.
    pub(crate) fn switch() -> FakeRemote {
        let defined: DefinedConfiguration = serde_json::from_value(serde_json::json!({
            "alias": [
                {"alias-name": "host_a", "member-entry": {"alias-entry-name": [WWN_A]}},
                {"alias-name": "host_b", "member-entry": {"alias-entry-name": [WWN_B]}},
                {"alias-name": "array_c", "member-entry": {"alias-entry-name": [WWN_C]}}
            ],
            "zone": [
                {"zone-name": "z1", "member-entry": {"entry-name": ["host_a", "array_c"]}}
            ],
            "cfg": [{"cfg-name": "prod", "member-zone": {"zone-name": ["z1"]}}]
        }))
        .unwrap();
        let fake = FakeRemote::with_defined(defined.clone());
        fake.set_effective("prod", defined.zone);
        fake
    }

    pub(crate) async fn context(remote: &FakeRemote, options: BatchOptions) -> BatchContext<'_, FakeRemote> {
        use crate::remote::ZoningRemote;

        let snapshot: ZoningSnapshot = remote.fetch_zoning(128).await.unwrap();
        let mut ctx = BatchContext::new(remote, Fabric::from_snapshot(128, &snapshot), options);
        ctx.checksum = snapshot.effective.checksum;
        ctx
    }

    pub(crate) fn live(force: bool) -> BatchOptions {
        BatchOptions {
            force,
            test: false,
            bulk: false,
        }
    }

    pub(crate) fn test_mode(force: bool) -> BatchOptions {
        BatchOptions {
            force,
            test: true,
            bulk: false,
        }
    }
}
