// Transaction control handlers: cfg-enable, cfg-save, defzone.

use fabzone_api::DefaultZoneAccess;
use tracing::{error, info};

use crate::context::BatchContext;
use crate::error::{ZoneError, ZoneErrorKind};
use crate::operation::{OpOutcome, OperationKind, OperationRequest};
use crate::remote::ZoningRemote;
use crate::validate;

/// Make a configuration effective.
///
/// In bulk mode the enable is deferred to the final replace. Live, the
/// whole zoning database is re-read afterwards since the effective set
/// changed, and a fresh checksum is taken for later operations.
pub async fn cfg_enable<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::force_flag_only(OperationKind::CfgEnable, req)?;
    let name = ops.operand;

    if ctx.fabric.zone_config(&name).is_none() {
        return Err(ZoneError::not_found("Not Found", vec![name]));
    }
    if ctx.options.bulk {
        ctx.enable_on_commit = Some(name);
        return Ok(OpOutcome::applied());
    }
    if ctx.options.test {
        return Ok(OpOutcome::applied());
    }

    let checksum = ctx.held_checksum()?;
    ctx.remote.enable(ctx.fid, &name, &checksum).await?;
    info!(fid = ctx.fid, cfg = %name, "zone configuration enabled");

    if let Err(e) = ctx.refresh().await {
        error!(error = %e, "zone database refresh after enable failed");
        return Err(ZoneError::bad_request(
            "API error occurred while refreshing the zone DB",
            e.messages().to_vec(),
        ));
    }
    ctx.pending.clear();
    ctx.saved = true;

    if let Err(e) = ctx.refresh_checksum().await {
        error!(error = %e, "checksum refresh after enable failed");
        return Err(ZoneError::bad_request(
            format!("Successfully enabled {name}, but could not refresh the checksum"),
            vec!["Check the log for details".into()],
        ));
    }
    Ok(OpOutcome::remote())
}

/// Commit outstanding changes.
///
/// Offline there is nothing to send; without force an empty staging list
/// is reported as a no-op error so scripts notice a stray save.
pub async fn cfg_save<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    _req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    if ctx.offline() {
        if !ctx.force() && ctx.staged.is_empty() {
            return Err(ZoneError::new(
                ZoneErrorKind::NoPending,
                "No pending zone transactions",
                Vec::new(),
            ));
        }
        ctx.staged.clear();
        return Ok(OpOutcome::applied());
    }

    let checksum = ctx.held_checksum()?;
    ctx.remote.save(ctx.fid, &checksum).await?;
    info!(fid = ctx.fid, "zone database saved");
    ctx.pending.clear();
    ctx.saved = true;
    ctx.refresh_checksum().await?;
    Ok(OpOutcome::remote())
}

/// Set default zone access, or show it (`--show` never contacts the switch).
///
/// Offline only the model changes; a bulk batch sends the new access with
/// its final replace.
pub async fn defzone<R: ZoningRemote>(
    ctx: &mut BatchContext<'_, R>,
    req: &OperationRequest,
) -> Result<OpOutcome, ZoneError> {
    let ops = validate::operand_only(OperationKind::Defzone, req, true)?;
    let access = match ops.operand.as_str() {
        "--noaccess" => DefaultZoneAccess::NoAccess,
        "--allaccess" => DefaultZoneAccess::AllAccess,
        _ => return Ok(OpOutcome::unchanged()),
    };

    if ctx.offline() {
        ctx.fabric.set_default_zone_access(access);
        return Ok(OpOutcome::applied());
    }
    ctx.remote.set_default_zone(ctx.fid, access).await?;
    ctx.fabric.set_default_zone_access(access);
    Ok(OpOutcome::remote())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::BatchOptions;
    use crate::handlers::testing::{context, live, switch, test_mode};
    use crate::model::ZoneType;

    fn enable(name: &str) -> OperationRequest {
        OperationRequest::new(OperationKind::CfgEnable, name)
    }

    #[tokio::test]
    async fn enable_missing_configuration_makes_no_remote_call() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        let err = cfg_enable(&mut ctx, &enable("nope")).await.unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(err.detail, ["nope"]);
        assert_eq!(remote.calls(), ["fetch"]);
    }

    #[tokio::test]
    async fn enable_refreshes_model_and_checksum() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        ctx.fabric
            .add_zone("z2", ZoneType::Standard, &["host_b".to_owned()], &[]);
        ctx.fabric.add_zone_config("dev", &["z2".to_owned()]);
        remote
            .create(
                128,
                &fabzone_api::DefinedConfiguration {
                    zone: vec![crate::convert::zone_entry(
                        "z2",
                        ZoneType::Standard,
                        &["host_b".to_owned()],
                        &[],
                    )],
                    cfg: vec![crate::convert::cfg_entry("dev", &["z2".to_owned()])],
                    alias: Vec::new(),
                },
            )
            .await
            .unwrap();
        ctx.pending.push(enable("dev"));

        let outcome = cfg_enable(&mut ctx, &enable("dev")).await.unwrap();
        assert_eq!(outcome, OpOutcome::remote());
        assert_eq!(ctx.fabric.effective_cfg_name(), Some("dev"));
        assert!(ctx.fabric.is_effective_zone("z2"));
        assert!(ctx.pending.is_empty());
        assert!(ctx.saved);
        assert_eq!(ctx.checksum.as_deref(), Some("sum-1"));
        assert_eq!(remote.effective_cfg().as_deref(), Some("dev"));
    }

    #[tokio::test]
    async fn enable_with_stale_checksum_fails() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        ctx.checksum = Some("stale".into());
        let err = cfg_enable(&mut ctx, &enable("prod")).await.unwrap_err();
        assert_eq!(err.kind, ZoneErrorKind::Remote { status: 400 });
        assert!(!ctx.saved);
    }

    #[tokio::test]
    async fn enable_refresh_failure() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        remote.fail_on("fetch");
        let err = cfg_enable(&mut ctx, &enable("prod")).await.unwrap_err();
        assert_eq!(err.reason, "API error occurred while refreshing the zone DB");
    }

    #[tokio::test]
    async fn enable_in_bulk_mode_is_deferred() {
        let remote = switch();
        let options = BatchOptions {
            force: true,
            test: false,
            bulk: true,
        };
        let mut ctx = context(&remote, options).await;
        let outcome = cfg_enable(&mut ctx, &enable("prod")).await.unwrap();
        assert_eq!(outcome, OpOutcome::applied());
        assert_eq!(ctx.enable_on_commit.as_deref(), Some("prod"));
        assert_eq!(remote.calls(), ["fetch"]);
    }

    #[tokio::test]
    async fn enable_accepts_lone_force_flag() {
        let remote = switch();
        let mut ctx = context(&remote, test_mode(false)).await;
        let forced = enable("prod").members(["-f"]);
        assert_eq!(cfg_enable(&mut ctx, &forced).await.unwrap(), OpOutcome::applied());
    }

    #[tokio::test]
    async fn offline_save_without_staged_changes() {
        let remote = switch();
        let mut ctx = context(&remote, test_mode(false)).await;
        let save = OperationRequest {
            kind: Some("cfg-save".into()),
            ..OperationRequest::default()
        };
        let err = cfg_save(&mut ctx, &save).await.unwrap_err();
        assert_eq!(err.status(), 204);
        assert_eq!(err.reason, "No pending zone transactions");

        ctx.staged.push(enable("prod"));
        assert_eq!(cfg_save(&mut ctx, &save).await.unwrap(), OpOutcome::applied());
        assert!(ctx.staged.is_empty());
    }

    #[tokio::test]
    async fn live_save_takes_new_checksum() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        ctx.pending.push(enable("prod"));
        let save = OperationRequest {
            kind: Some("cfg-save".into()),
            ..OperationRequest::default()
        };
        cfg_save(&mut ctx, &save).await.unwrap();
        assert!(ctx.pending.is_empty());
        assert_eq!(ctx.checksum.as_deref(), Some("sum-1"));
        assert_eq!(remote.calls(), ["fetch", "save", "checksum"]);
    }

    #[tokio::test]
    async fn defzone_show_never_calls_the_switch() {
        let remote = switch();
        let mut ctx = context(&remote, live(true)).await;
        let show = OperationRequest::new(OperationKind::Defzone, "--show");
        assert_eq!(defzone(&mut ctx, &show).await.unwrap(), OpOutcome::unchanged());

        let all = OperationRequest::new(OperationKind::Defzone, "--allaccess");
        assert_eq!(defzone(&mut ctx, &all).await.unwrap(), OpOutcome::remote());
        assert_eq!(remote.default_zone(), Some(1));
        assert_eq!(ctx.fabric.default_zone_access(), Some(DefaultZoneAccess::AllAccess));
        assert_eq!(remote.calls(), ["fetch", "defzone"]);
    }
}
