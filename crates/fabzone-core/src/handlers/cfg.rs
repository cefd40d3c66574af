// Zone configuration handlers: cfg-add, cfg-create, cfg-delete, cfg-remove.

use fabzone_api::DefinedConfiguration;

use super::{changed, partition, replace_existing, unique, without, would_be_empty};
use crate::context::BatchContext;
use crate::convert::{cfg_entry, cfg_ref};
use crate::error::ZoneError;
use crate::model::{Fabric, ObjectKind};
use crate::operation::{OpOutcome, OperationKind, OperationRequest};
use crate::remote::ZoningRemote;
use crate::validate;

fn zones_exist(fabric: &Fabric, zones: &[String]) -> Result<(), ZoneError> {
    let missing: Vec<String> = zones
        .iter()
        .filter(|z| fabric.zone(z).is_none())
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ZoneError::conflict("Zone member(s) do not exist", missing))
    }
}

/// Create a zone configuration from existing zones.
pub async fn cfg_create<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_members(OperationKind::CfgCreate, req, true)?;
    let name = ops.operand.as_str();
    let zones = unique(&ops.members);
    zones_exist(&ctx.fabric, &zones)?;

    replace_existing(
        ctx,
        ObjectKind::ZoneConfig,
        name,
        "Zone configuration already exists",
    )
    .await?;

    if !ctx.offline() {
        let content = DefinedConfiguration::with_cfgs(vec![cfg_entry(name, &zones)]);
        ctx.remote.create(ctx.fid, &content).await?;
    }
    ctx.fabric.add_zone_config(name, &zones);
    Ok(changed(ctx))
}

/// Add zones to a configuration. With force, a missing configuration is
/// created.
pub async fn cfg_add<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_members(OperationKind::CfgAdd, req, true)?;
    let name = ops.operand.as_str();

    let Some(cfg) = ctx.fabric.zone_config(name) else {
        if ctx.force() {
            return cfg_create(ctx, req).await;
        }
        return Err(ZoneError::not_found("Not Found", vec![name.to_owned()]));
    };

    let (present, new) = partition(&cfg.members, &unique(&ops.members));
    if !present.is_empty() && !ctx.force() {
        return Err(ZoneError::conflict(
            format!("{name} member already exists"),
            present,
        ));
    }
    zones_exist(&ctx.fabric, &new)?;
    if new.is_empty() {
        return Ok(OpOutcome::unchanged());
    }

    if !ctx.offline() {
        let content = DefinedConfiguration::with_cfgs(vec![cfg_entry(name, &new)]);
        ctx.remote.create(ctx.fid, &content).await?;
    }
    ctx.fabric.add_zone_config(name, &new);
    Ok(changed(ctx))
}

/// Delete a zone configuration.
pub async fn cfg_delete<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::operand_only(OperationKind::CfgDelete, req, true)?;
    let name = ops.operand.as_str();

    if ctx.fabric.zone_config(name).is_none() {
        if ctx.force() {
            return Ok(OpOutcome::unchanged());
        }
        return Err(ZoneError::not_found(
            "Zone configuration not found",
            vec![name.to_owned()],
        ));
    }

    if !ctx.offline() {
        let content = DefinedConfiguration::with_cfgs(vec![cfg_ref(name)]);
        ctx.remote.delete(ctx.fid, &content).await?;
    }
    ctx.fabric.delete_zone_config(name);
    Ok(changed(ctx))
}

/// Remove zones from a configuration. The switch deletes configuration
/// members directly.
pub async fn cfg_remove<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_members(OperationKind::CfgRemove, req, true)?;
    let name = ops.operand.as_str();

    let Some(cfg) = ctx.fabric.zone_config(name) else {
        if ctx.force() {
            return Ok(OpOutcome::unchanged());
        }
        return Err(ZoneError::not_found(
            "Zone configuration not found",
            vec![name.to_owned()],
        ));
    };

    let (present, missing) = partition(&cfg.members, &unique(&ops.members));
    if !missing.is_empty() && !ctx.force() {
        return Err(ZoneError::not_found("Not Found", missing));
    }
    if present.is_empty() {
        return Ok(OpOutcome::unchanged());
    }
    if without(&cfg.members, &present).is_empty() {
        return Err(would_be_empty(name));
    }

    if !ctx.offline() {
        let content = DefinedConfiguration::with_cfgs(vec![cfg_entry(name, &present)]);
        ctx.remote.delete(ctx.fid, &content).await?;
    }
    ctx.fabric.remove_zone_config_members(name, &present);
    Ok(changed(ctx))
}
