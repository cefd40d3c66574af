// Zone handlers: zone-add, zone-create, zone-delete, zone-remove.

use fabzone_api::DefinedConfiguration;
use indexmap::IndexMap;

use super::{changed, partition, replace_existing, unique, without, would_be_empty};
use crate::context::BatchContext;
use crate::convert::{zone_entry, zone_ref};
use crate::error::ZoneError;
use crate::model::{Fabric, ObjectKind, ZoneType, is_address, is_zone_member};
use crate::operation::{OpOutcome, OperationKind, OperationRequest};
use crate::remote::ZoningRemote;
use crate::validate;

fn invalid_members<'a>(lists: impl IntoIterator<Item = &'a [String]>) -> Result<(), ZoneError> {
    let invalid: Vec<String> = lists
        .into_iter()
        .flatten()
        .filter(|m| !is_zone_member(m))
        .cloned()
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ZoneError::bad_request("Invalid zone member(s)", invalid))
    }
}

/// Check the final member and principal lists of `zone`.
///
/// The two lists must not share an entry. Every entry is then resolved
/// through at most one alias to its addresses; an address reached twice,
/// from either list, is a duplicate and every origin is named.
pub(crate) fn check_exclusive(
    fabric: &Fabric,
    zone: &str,
    members: &[String],
    principals: &[String],
) -> Result<(), ZoneError> {
    let overlap: Vec<String> = members
        .iter()
        .filter(|m| principals.contains(m))
        .cloned()
        .collect();
    if !overlap.is_empty() {
        return Err(ZoneError::conflict(
            "Members and principal members must be exclusive",
            overlap,
        ));
    }

    let mut problems = Vec::new();
    let mut origins: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for entry in members.iter().chain(principals) {
        if is_address(entry) {
            origins.entry(entry.as_str()).or_default().push(entry.as_str());
            continue;
        }
        match fabric.alias(entry) {
            Some(alias) => {
                for address in &alias.members {
                    origins.entry(address.as_str()).or_default().push(entry.as_str());
                }
            }
            None => problems.push(format!("Alias {entry} does not exist")),
        }
    }
    for (address, from) in &origins {
        if from.len() > 1 {
            problems.push(format!(
                "Duplicate member: {address} appears in: {}",
                from.join(", ")
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ZoneError::bad_request(
            format!("Zone: {zone} contains invalid members"),
            problems,
        ))
    }
}

/// Create a zone. Peer zones take principals in `p1` and members in `p0`.
pub async fn zone_create<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let kind = OperationKind::ZoneCreate;
    let (ops, zone_type) = if req.peer {
        (validate::with_principals(kind, req, false)?, ZoneType::UserPeer)
    } else {
        (validate::with_members(kind, req, true)?, ZoneType::Standard)
    };
    let name = ops.operand.as_str();
    let members = unique(&ops.members);
    let principals = unique(&ops.principals);

    invalid_members([members.as_slice(), principals.as_slice()])?;
    check_exclusive(&ctx.fabric, name, &members, &principals)?;

    replace_existing(ctx, ObjectKind::Zone, name, "Zone already exists").await?;

    if !ctx.offline() {
        let entry = zone_entry(name, zone_type, &members, &principals);
        let content = DefinedConfiguration::with_zones(vec![entry]);
        ctx.remote.create(ctx.fid, &content).await?;
    }
    ctx.fabric.add_zone(name, zone_type, &members, &principals);
    Ok(changed(ctx))
}

/// Add members and/or principals to a zone. With force, a missing zone
/// is created.
pub async fn zone_add<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_either(OperationKind::ZoneAdd, req, false)?;
    let name = ops.operand.as_str();

    let Some(zone) = ctx.fabric.zone(name).cloned() else {
        if ctx.force() {
            return zone_create(ctx, req).await;
        }
        return Err(ZoneError::not_found("Not Found", vec![name.to_owned()]));
    };
    if zone.zone_type == ZoneType::TargetPeer {
        return Err(ZoneError::bad_request(
            format!("{name} is a target driven peer zone"),
            vec![name.to_owned()],
        ));
    }

    let (present, new_members) = partition(&zone.members, &unique(&ops.members));
    if !present.is_empty() && !ctx.force() {
        return Err(ZoneError::conflict(
            format!("{name} member already exists"),
            present,
        ));
    }
    let (present, new_principals) = partition(&zone.principal_members, &unique(&ops.principals));
    if !present.is_empty() && !ctx.force() {
        return Err(ZoneError::conflict(
            format!("{name} principal already exists"),
            present,
        ));
    }

    invalid_members([new_members.as_slice(), new_principals.as_slice()])?;
    if !new_principals.is_empty() && !zone.zone_type.is_peer() {
        return Err(ZoneError::bad_request(
            format!("{name} is not a peer zone"),
            new_principals,
        ));
    }
    if new_members.is_empty() && new_principals.is_empty() {
        return Ok(OpOutcome::unchanged());
    }

    let mut all_members = zone.members.clone();
    all_members.extend(new_members.iter().cloned());
    let mut all_principals = zone.principal_members.clone();
    all_principals.extend(new_principals.iter().cloned());
    check_exclusive(&ctx.fabric, name, &all_members, &all_principals)?;

    if !ctx.offline() {
        let entry = zone_entry(name, zone.zone_type, &new_members, &new_principals);
        let content = DefinedConfiguration::with_zones(vec![entry]);
        ctx.remote.create(ctx.fid, &content).await?;
    }
    ctx.fabric
        .add_zone(name, zone.zone_type, &new_members, &new_principals);
    Ok(changed(ctx))
}

/// Delete a zone that no configuration uses.
pub async fn zone_delete<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::operand_only(OperationKind::ZoneDelete, req, true)?;
    let name = ops.operand.as_str();

    if ctx.fabric.zone(name).is_none() {
        if ctx.force() {
            return Ok(OpOutcome::unchanged());
        }
        return Err(ZoneError::not_found("Zone not found", vec![name.to_owned()]));
    }
    let cfgs = ctx.fabric.zone_configs_for_zone(name);
    if !cfgs.is_empty() {
        return Err(ZoneError::conflict("Zone in use", cfgs));
    }

    if !ctx.offline() {
        let content = DefinedConfiguration::with_zones(vec![zone_ref(name)]);
        ctx.remote.delete(ctx.fid, &content).await?;
    }
    ctx.fabric.delete_zone(name);
    Ok(changed(ctx))
}

/// Remove members and/or principals from a zone, recreating it with what
/// remains.
pub async fn zone_remove<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::with_either(OperationKind::ZoneRemove, req, false)?;
    let name = ops.operand.as_str();

    let Some(zone) = ctx.fabric.zone(name).cloned() else {
        if ctx.force() {
            return Ok(OpOutcome::unchanged());
        }
        return Err(ZoneError::not_found(format!("{name} does not exist"), Vec::new()));
    };

    let (members, mut missing) = partition(&zone.members, &unique(&ops.members));
    let (principals, missing_principals) =
        partition(&zone.principal_members, &unique(&ops.principals));
    missing.extend(missing_principals);
    if !missing.is_empty() && !ctx.force() {
        return Err(ZoneError::not_found(format!("Members not in {name}"), missing));
    }
    if members.is_empty() && principals.is_empty() {
        return Ok(OpOutcome::unchanged());
    }

    let remaining = without(&zone.members, &members);
    let remaining_principals = without(&zone.principal_members, &principals);
    if remaining.is_empty() && remaining_principals.is_empty() {
        return Err(would_be_empty(name));
    }

    if !ctx.offline() {
        let old = DefinedConfiguration::with_zones(vec![zone_ref(name)]);
        ctx.remote.delete(ctx.fid, &old).await?;
        let entry = zone_entry(name, zone.zone_type, &remaining, &remaining_principals);
        ctx.remote
            .create(ctx.fid, &DefinedConfiguration::with_zones(vec![entry]))
            .await?;
    }
    ctx.fabric.remove_zone_members(name, &members, &principals);
    Ok(changed(ctx))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handlers::testing::{WWN_A, WWN_B, WWN_C, context, live, switch, test_mode};

    fn create(name: &str, members: &[&str]) -> OperationRequest {
        OperationRequest::new(OperationKind::ZoneCreate, name).members(members.iter().copied())
    }

    fn peer(name: &str, members: &[&str], principals: &[&str]) -> OperationRequest {
        create(name, members)
            .principals(principals.iter().copied())
            .peer(true)
    }

    #[tokio::test]
    async fn create_standard_zone() {
        let remote = switch();
        let mut ctx = context(&remote, live(false)).await;
        let outcome = zone_create(&mut ctx, &create("z2", &["host_b", "array_c"]))
            .await
            .unwrap();
        assert_eq!(outcome, OpOutcome::remote());
        let z2 = ctx.fabric.zone("z2").unwrap();
        assert_eq!(z2.zone_type, ZoneType::Standard);
        assert_eq!(z2.members, ["host_b", "array_c"]);
        assert_eq!(remote.calls(), ["fetch", "create"]);
    }

    #[tokio::test]
    async fn create_peer_zone() {
        let remote = switch();
        let mut ctx = context(&remote, test_mode(false)).await;
        zone_create(&mut ctx, &peer("pz", &["host_a", "host_b"], &["array_c"]))
            .await
            .unwrap();
        let pz = ctx.fabric.zone("pz").unwrap();
        assert_eq!(pz.zone_type, ZoneType::UserPeer);
        assert_eq!(pz.principal_members, ["array_c"]);
    }

    #[tokio::test]
    async fn literal_overlap_is_a_conflict() {
        let remote = switch();
        let mut ctx = context(&remote, test_mode(true)).await;
        let err = zone_create(&mut ctx, &peer("pz", &["host_a"], &["host_a"]))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 409);
        assert_eq!(err.reason, "Members and principal members must be exclusive");
        assert!(ctx.fabric.zone("pz").is_none());
    }

    #[tokio::test]
    async fn alias_resolving_to_a_listed_address_is_a_duplicate() {
        let remote = switch();
        let mut ctx = context(&remote, test_mode(true)).await;
        let err = zone_create(&mut ctx, &peer("pz", &[WWN_A], &["host_a"]))
            .await
            .unwrap_err();
        assert_eq!(err.reason, "Zone: pz contains invalid members");
        assert_eq!(
            err.detail,
            [format!("Duplicate member: {WWN_A} appears in: {WWN_A}, host_a")]
        );
    }

    #[tokio::test]
    async fn differently_named_aliases_with_one_address_are_duplicates() {
        let remote = switch();
        let mut ctx = context(&remote, test_mode(true)).await;
        ctx.fabric.add_alias("host_a2", &[WWN_A.to_owned()]);
        let err = zone_create(&mut ctx, &create("z9", &["host_a", "host_a2", "ghost"]))
            .await
            .unwrap_err();
        assert_eq!(
            err.detail,
            [
                "Alias ghost does not exist".to_owned(),
                format!("Duplicate member: {WWN_A} appears in: host_a, host_a2"),
            ]
        );
    }

    #[tokio::test]
    async fn create_existing_zone() {
        let remote = switch();
        let mut ctx = context(&remote, live(false)).await;
        let err = zone_create(&mut ctx, &create("z1", &["host_b"])).await.unwrap_err();
        assert_eq!(err.reason, "Zone already exists");

        let mut forced = context(&remote, live(true)).await;
        zone_create(&mut forced, &create("z1", &["host_b"])).await.unwrap();
        assert_eq!(forced.fabric.zone("z1").unwrap().members, ["host_b"]);
    }

    #[tokio::test]
    async fn add_member_and_check_whole_zone() {
        let remote = switch();
        let mut ctx = context(&remote, live(false)).await;
        let add = OperationRequest::new(OperationKind::ZoneAdd, "z1").members(["host_b"]);
        zone_add(&mut ctx, &add).await.unwrap();
        assert_eq!(ctx.fabric.zone("z1").unwrap().members, ["host_a", "array_c", "host_b"]);

        let dup = OperationRequest::new(OperationKind::ZoneAdd, "z1").members([WWN_B]);
        let err = zone_add(&mut ctx, &dup).await.unwrap_err();
        assert_eq!(err.reason, "Zone: z1 contains invalid members");
    }

    #[tokio::test]
    async fn add_existing_member_without_force() {
        let remote = switch();
        let mut ctx = context(&remote, live(false)).await;
        let add = OperationRequest::new(OperationKind::ZoneAdd, "z1").members(["host_a"]);
        let err = zone_add(&mut ctx, &add).await.unwrap_err();
        assert_eq!(err.reason, "z1 member already exists");
        assert_eq!(err.detail, ["host_a"]);
    }

    #[tokio::test]
    async fn principals_need_a_peer_zone() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        let add = OperationRequest::new(OperationKind::ZoneAdd, "z1").principals(["host_b"]);
        let err = zone_add(&mut ctx, &add).await.unwrap_err();
        assert_eq!(err.reason, "z1 is not a peer zone");
    }

    #[tokio::test]
    async fn add_to_missing_zone_with_force_creates_it() {
        let remote = switch();
        let mut ctx = context(&remote, test_mode(true)).await;
        let add = OperationRequest::new(OperationKind::ZoneAdd, "z5").members(["host_b", WWN_C]);
        zone_add(&mut ctx, &add).await.unwrap();
        assert_eq!(ctx.fabric.zone("z5").unwrap().members, ["host_b", WWN_C]);
    }

    #[tokio::test]
    async fn delete_refuses_zone_in_use() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        let err = zone_delete(&mut ctx, &OperationRequest::new(OperationKind::ZoneDelete, "z1"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, "Zone in use");
        assert_eq!(err.detail, ["prod"]);
        assert_eq!(ctx.fabric.zone_config("prod").unwrap().members, ["z1"]);
    }

    #[tokio::test]
    async fn remove_member_recreates_zone() {
        let remote = switch();
        let mut ctx = context(&remote, live(false)).await;
        let rm = OperationRequest::new(OperationKind::ZoneRemove, "z1").members(["array_c"]);
        zone_remove(&mut ctx, &rm).await.unwrap();
        assert_eq!(ctx.fabric.zone("z1").unwrap().members, ["host_a"]);
        assert_eq!(remote.calls(), ["fetch", "delete", "create"]);

        let last = OperationRequest::new(OperationKind::ZoneRemove, "z1").members(["host_a"]);
        let err = zone_remove(&mut ctx, &last).await.unwrap_err();
        assert_eq!(err.status(), 409);

        let missing = OperationRequest::new(OperationKind::ZoneRemove, "z1").members(["host_b"]);
        let err = zone_remove(&mut ctx, &missing).await.unwrap_err();
        assert_eq!(err.reason, "Members not in z1");
    }
}
