// Alias handlers: alias-add, alias-create, alias-delete, alias-remove.

use fabzone_api::DefinedConfiguration;

use super::{changed, partition, replace_existing, unique, without, would_be_empty};
use crate::context::BatchContext;
use crate::convert::{alias_entry, alias_ref};
use crate::error::ZoneError;
use crate::model::{ObjectKind, is_address};
use crate::operation::{OpOutcome, OperationKind, OperationRequest};
use crate::remote::ZoningRemote;
use crate::validate;

fn invalid_addresses(members: &[String]) -> Result<(), ZoneError> {
    let invalid: Vec<String> = members.iter().filter(|m| !is_address(m)).cloned().collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ZoneError::bad_request("Invalid WWN", invalid))
    }
}

/// Create an alias. With force, an existing alias is deleted and
/// recreated with exactly the requested members.
pub async fn alias_create<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_members(OperationKind::AliasCreate, req, true)?;
    let name = ops.operand.as_str();
    let members = unique(&ops.members);
    invalid_addresses(&members)?;

    replace_existing(ctx, ObjectKind::Alias, name, "Alias already exists").await?;

    if !ctx.offline() {
        let content = DefinedConfiguration::with_aliases(vec![alias_entry(name, &members)]);
        ctx.remote.create(ctx.fid, &content).await?;
    }
    ctx.fabric.add_alias(name, &members);
    Ok(changed(ctx))
}

/// Add members to an alias. With force, a missing alias is created.
pub async fn alias_add<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_members(OperationKind::AliasAdd, req, true)?;
    let name = ops.operand.as_str();

    let Some(alias) = ctx.fabric.alias(name) else {
        if ctx.force() {
            return alias_create(ctx, req).await;
        }
        return Err(ZoneError::not_found("Not Found", vec![name.to_owned()]));
    };

    let (present, new) = partition(&alias.members, &unique(&ops.members));
    if !present.is_empty() && !ctx.force() {
        return Err(ZoneError::conflict(
            format!("{name} member already exists"),
            present,
        ));
    }
    invalid_addresses(&new)?;
    if new.is_empty() {
        return Ok(OpOutcome::unchanged());
    }

    if !ctx.offline() {
        let content = DefinedConfiguration::with_aliases(vec![alias_entry(name, &new)]);
        ctx.remote.create(ctx.fid, &content).await?;
    }
    ctx.fabric.add_alias(name, &new);
    Ok(changed(ctx))
}

/// Delete an alias that no zone uses.
pub async fn alias_delete<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::operand_only(OperationKind::AliasDelete, req, true)?;
    let name = ops.operand.as_str();

    if ctx.fabric.alias(name).is_none() {
        if ctx.force() {
            return Ok(OpOutcome::unchanged());
        }
        return Err(ZoneError::not_found("Alias not found", vec![name.to_owned()]));
    }
    let zones = ctx.fabric.zones_for_alias(name);
    if !zones.is_empty() {
        return Err(ZoneError::conflict("Alias in use", zones));
    }

    if !ctx.offline() {
        let content = DefinedConfiguration::with_aliases(vec![alias_ref(name)]);
        ctx.remote.delete(ctx.fid, &content).await?;
    }
    ctx.fabric.delete_alias(name);
    Ok(changed(ctx))
}

/// Remove members from an alias. The switch has no member-level delete
/// for aliases, so the alias is recreated with what remains.
pub async fn alias_remove<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_members(OperationKind::AliasRemove, req, true)?;
    let name = ops.operand.as_str();

    let Some(alias) = ctx.fabric.alias(name) else {
        if ctx.force() {
            return Ok(OpOutcome::unchanged());
        }
        return Err(ZoneError::not_found(format!("{name} does not exist"), Vec::new()));
    };

    let (present, missing) = partition(&alias.members, &unique(&ops.members));
    if !missing.is_empty() && !ctx.force() {
        return Err(ZoneError::not_found(format!("Members not in {name}"), missing));
    }
    if present.is_empty() {
        return Ok(OpOutcome::unchanged());
    }
    let remaining = without(&alias.members, &present);
    if remaining.is_empty() {
        return Err(would_be_empty(name));
    }

    if !ctx.offline() {
        let old = DefinedConfiguration::with_aliases(vec![alias_ref(name)]);
        ctx.remote.delete(ctx.fid, &old).await?;
        let new = DefinedConfiguration::with_aliases(vec![alias_entry(name, &remaining)]);
        ctx.remote.create(ctx.fid, &new).await?;
    }
    ctx.fabric.remove_alias_members(name, &present);
    Ok(changed(ctx))
}
