// Object handlers: zone-object-copy, zone-object-rename.
//
// Both work on any object kind. The source is looked up among zone
// configurations first, then zones, then aliases.

use fabzone_api::{AliasEntry, CfgEntry, DefinedConfiguration, ZoneEntry};

use super::changed;
use crate::context::BatchContext;
use crate::convert::{alias_ref, cfg_ref, zone_ref};
use crate::error::ZoneError;
use crate::model::{Fabric, ObjectKind, is_valid_zone_name};
use crate::operation::{OpOutcome, OperationKind, OperationRequest};
use crate::remote::ZoningRemote;
use crate::validate;

struct Target {
    source: String,
    target: String,
    kind: ObjectKind,
}

/// Validate `operand -> p0[0]` and locate the source object.
fn resolve(
    fabric: &Fabric,
    op: OperationKind,
    req: &OperationRequest,
) -> Result<Target, ZoneError> {
    let ops = validate::with_members(op, req, true)?;
    let [target] = ops.members.as_slice() else {
        return Err(ZoneError::bad_request("Too many parameters", ops.members));
    };
    if !is_valid_zone_name(target) {
        return Err(ZoneError::bad_request(
            "Invalid zone object name",
            vec![target.clone()],
        ));
    }
    let Some(kind) = fabric.find_object(&ops.operand) else {
        return Err(ZoneError::not_found("Not Found", vec![ops.operand]));
    };
    if let Some(taken) = fabric.find_object(target) {
        return Err(ZoneError::conflict(
            format!("{taken} {target} already exists"),
            vec![target.clone()],
        ));
    }
    Ok(Target {
        target: target.clone(),
        source: ops.operand,
        kind,
    })
}

/// Full definition of `name` as it exists in `fabric`.
fn object_content(fabric: &Fabric, kind: ObjectKind, name: &str) -> DefinedConfiguration {
    match kind {
        ObjectKind::Alias => {
            DefinedConfiguration::with_aliases(fabric.alias(name).map(AliasEntry::from).into_iter().collect())
        }
        ObjectKind::Zone => {
            DefinedConfiguration::with_zones(fabric.zone(name).map(ZoneEntry::from).into_iter().collect())
        }
        ObjectKind::ZoneConfig => DefinedConfiguration::with_cfgs(
            fabric.zone_config(name).map(CfgEntry::from).into_iter().collect(),
        ),
    }
}

fn object_ref(kind: ObjectKind, name: &str) -> DefinedConfiguration {
    match kind {
        ObjectKind::Alias => DefinedConfiguration::with_aliases(vec![alias_ref(name)]),
        ObjectKind::Zone => DefinedConfiguration::with_zones(vec![zone_ref(name)]),
        ObjectKind::ZoneConfig => DefinedConfiguration::with_cfgs(vec![cfg_ref(name)]),
    }
}

/// Copy an alias, zone or configuration under a new name.
pub async fn zone_object_copy<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let Target {
        source,
        target,
        kind,
    } = resolve(&ctx.fabric, OperationKind::ZoneObjectCopy, req)?;

    let mut copied = ctx.fabric.clone();
    copied.copy(kind, &source, &target)?;
    if !ctx.offline() {
        let content = object_content(&copied, kind, &target);
        ctx.remote.create(ctx.fid, &content).await?;
    }
    ctx.fabric = copied;
    Ok(changed(ctx))
}

/// Rename an alias, zone or configuration.
///
/// The object is copied, every zone or configuration that referenced the
/// old name is rewritten to the new one, then the old object is deleted.
/// The effective configuration is only renamed with force.
pub async fn zone_object_rename<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    if let Some(effective) = ctx.fabric.effective_cfg_name() {
        if req.operand.as_deref().map(str::trim) == Some(effective) && !ctx.force() {
            return Err(ZoneError::conflict(
                "Renaming the effective zone configuration is not permitted",
                vec![effective.to_owned()],
            ));
        }
    }
    let Target {
        source,
        target,
        kind,
    } = resolve(&ctx.fabric, OperationKind::ZoneObjectRename, req)?;

    let mut renamed = ctx.fabric.clone();
    let rewritten = renamed.rename(kind, &source, &target)?;

    if !ctx.offline() {
        let content = object_content(&renamed, kind, &target);
        ctx.remote.create(ctx.fid, &content).await?;

        if !rewritten.is_empty() {
            let referrers = match kind {
                ObjectKind::Alias => DefinedConfiguration::with_zones(
                    rewritten
                        .iter()
                        .filter_map(|z| renamed.zone(z))
                        .map(ZoneEntry::from)
                        .collect(),
                ),
                ObjectKind::Zone => DefinedConfiguration::with_cfgs(
                    rewritten
                        .iter()
                        .filter_map(|c| renamed.zone_config(c))
                        .map(CfgEntry::from)
                        .collect(),
                ),
                ObjectKind::ZoneConfig => DefinedConfiguration::default(),
            };
            ctx.remote.replace(ctx.fid, &referrers).await?;
        }

        ctx.remote.delete(ctx.fid, &object_ref(kind, &source)).await?;
    }
    ctx.fabric = renamed;
    Ok(changed(ctx))
}
