// ── Batch driver ──
//
// Runs one batch of zoning operations end to end: capture the fabric,
// dispatch every operation in order (stopping at the first failure),
// push a bulk batch in one replace, report unsaved changes, then always
// abort whatever transaction is still open on the switch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{Security, SessionConfig};
use crate::context::{BatchContext, BatchOptions};
use crate::error::{ZoneError, ZoneErrorKind};
use crate::handlers;
use crate::model::Fabric;
use crate::operation::{OpResult, OperationKind, OperationRequest};
use crate::remote::ZoningRemote;
use crate::session::Session;
use crate::sync;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

fn default_force() -> bool {
    true
}

/// One batch of changes for one fabric, with the session parameters
/// needed when no session is supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    #[serde(default, alias = "ip-addr")]
    pub address: Option<String>,
    #[serde(default, alias = "id")]
    pub username: Option<String>,
    #[serde(default, alias = "pw")]
    pub password: Option<SecretString>,
    #[serde(default, alias = "sec")]
    pub security: Option<Security>,
    #[serde(default)]
    pub fid: Option<u16>,
    #[serde(default = "default_force")]
    pub force: bool,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub bulk: bool,
    #[serde(default, alias = "changes")]
    pub operations: Vec<OperationRequest>,
}

impl BatchRequest {
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            force: self.force,
            test: self.test,
            bulk: self.bulk,
        }
    }

    /// Session settings, or the list of missing parameters.
    fn session_config(&self) -> Result<SessionConfig, Vec<String>> {
        let mut missing = Vec::new();
        if self.address.as_deref().is_none_or(str::is_empty) {
            missing.push("Missing ip-addr".to_owned());
        }
        if self.username.as_deref().is_none_or(str::is_empty) {
            missing.push("Missing id".to_owned());
        }
        if self.password.is_none() {
            missing.push("Missing pw".to_owned());
        }
        match (&self.address, &self.username, &self.password) {
            (Some(address), Some(username), Some(password)) if missing.is_empty() => {
                Ok(SessionConfig {
                    address: address.clone(),
                    username: username.clone(),
                    password: password.clone(),
                    security: self.security.unwrap_or_default(),
                    ca_cert: None,
                    timeout: DEFAULT_TIMEOUT,
                })
            }
            _ => Err(missing),
        }
    }
}

/// Totals of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Operations attempted (stops at the first failure).
    pub operations: usize,
    pub failures: usize,
    pub changed: usize,
    /// The zone database was committed on the switch.
    pub saved: bool,
}

/// Ordered results of a batch plus batch-level entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub captured_at: DateTime<Utc>,
    pub fid: Option<u16>,
    pub results: Vec<OpResult>,
    pub summary: BatchSummary,
    /// Model after the batch, when the fabric could be captured.
    #[serde(skip)]
    pub fabric: Option<Fabric>,
}

impl BatchReport {
    fn new(fid: Option<u16>) -> Self {
        Self {
            captured_at: Utc::now(),
            fid,
            results: Vec::new(),
            summary: BatchSummary::default(),
            fabric: None,
        }
    }

    fn failed(fid: Option<u16>, err: ZoneError) -> Self {
        let mut report = Self::new(fid);
        report.push_batch_error(err);
        report
    }

    fn push_batch_error(&mut self, err: ZoneError) {
        self.summary.failures += 1;
        self.results.push(err.into());
    }

    pub fn succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }
}

fn implies_save(req: &OperationRequest) -> bool {
    req.kind
        .as_deref()
        .and_then(|k| k.parse::<OperationKind>().ok())
        .is_some_and(OperationKind::implies_save)
}

/// Run `operations` against fabric `fid` over an established remote.
pub async fn run_batch<R: ZoningRemote>(
    remote: &R,
    fid: u16,
    options: BatchOptions,
    operations: &[OperationRequest],
) -> BatchReport {
    let mut report = BatchReport::new(Some(fid));

    let snapshot = match remote.fetch_zoning(fid).await {
        Ok(s) => s,
        Err(e) => {
            report.push_batch_error(e.into());
            abort(remote, fid, &mut report).await;
            return report;
        }
    };
    let Some(checksum) = snapshot.effective.checksum.clone() else {
        report.push_batch_error(ZoneError::internal(
            "Unexpected response",
            vec!["Missing: brocade-zone/effective-configuration/checksum".into()],
        ));
        abort(remote, fid, &mut report).await;
        return report;
    };

    let mut ctx = BatchContext::new(remote, Fabric::from_snapshot(fid, &snapshot), options);
    ctx.checksum = Some(checksum);
    let captured_access = ctx.fabric.default_zone_access();
    info!(
        fid,
        operations = operations.len(),
        test = options.test,
        bulk = options.bulk,
        "running zoning batch"
    );

    let mut failed = false;
    for req in operations {
        report.summary.operations += 1;
        match handlers::dispatch(&mut ctx, req).await {
            Ok(outcome) => {
                if outcome.changed && !implies_save(req) {
                    if outcome.remote_call_made {
                        ctx.pending.push(req.clone());
                    } else {
                        ctx.staged.push(req.clone());
                    }
                }
                if outcome.changed {
                    report.summary.changed += 1;
                }
                report.results.push(outcome.into());
            }
            Err(e) => {
                if e.kind == ZoneErrorKind::Internal {
                    error!(request = %req.describe(), error = %e, "operation failed unexpectedly");
                } else {
                    debug!(request = %req.describe(), error = %e, status = e.status(), "operation failed");
                }
                report.summary.failures += 1;
                report.results.push(e.into());
                failed = true;
                break;
            }
        }
    }

    if options.bulk && !options.test && !failed {
        // A defzone staged during the batch rides along with the replace.
        let default_zone = ctx
            .fabric
            .default_zone_access()
            .filter(|access| Some(*access) != captured_access);
        let enable = ctx.enable_on_commit.as_deref();
        match sync::replace_zoning(remote, &ctx.fabric, enable, default_zone).await {
            Ok(()) => {
                ctx.saved = true;
                ctx.staged.clear();
            }
            Err(e) => report.push_batch_error(e),
        }
    }

    if !ctx.pending.is_empty() {
        let detail = ctx.pending.iter().map(OperationRequest::describe).collect();
        report.push_batch_error(ZoneError::new(
            ZoneErrorKind::PendingUpdates,
            "Pending updates",
            detail,
        ));
    }

    abort(remote, fid, &mut report).await;
    report.summary.saved = ctx.saved;
    report.fabric = Some(ctx.fabric);
    report
}

/// Release whatever transaction is still open. Harmless when none is.
async fn abort<R: ZoningRemote>(remote: &R, fid: u16, report: &mut BatchReport) {
    if let Err(e) = remote.abort(fid).await {
        warn!(fid, error = %e, "zone transaction abort failed");
        report.push_batch_error(e.into());
    }
}

/// Run a batch request, opening (and closing) a session unless one is
/// supplied.
pub async fn send_zoning(request: &BatchRequest, session: Option<&Session>) -> BatchReport {
    let mut missing = Vec::new();
    let config = match session {
        Some(_) => None,
        None => match request.session_config() {
            Ok(config) => Some(config),
            Err(m) => {
                missing = m;
                None
            }
        },
    };
    if request.fid.is_none() {
        missing.push("Missing fid".to_owned());
    }
    let Some(fid) = request.fid.filter(|_| missing.is_empty()) else {
        missing.push("All processing halted".to_owned());
        return BatchReport::failed(request.fid, ZoneError::bad_request("Missing parameter", missing));
    };

    if let Some(session) = session {
        return run_batch(session.client(), fid, request.options(), &request.operations).await;
    }
    let Some(config) = config else {
        return BatchReport::failed(Some(fid), ZoneError::internal("No session", Vec::new()));
    };

    let session = match Session::open(config).await {
        Ok(s) => s,
        Err(e) => return BatchReport::failed(Some(fid), e.into()),
    };
    let report = run_batch(session.client(), fid, request.options(), &request.operations).await;
    session.close().await;
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handlers::testing::{WWN_A, switch};

    fn options(force: bool, test: bool, bulk: bool) -> BatchOptions {
        BatchOptions { force, test, bulk }
    }

    fn scenario() -> Vec<OperationRequest> {
        vec![
            OperationRequest::new(OperationKind::AliasCreate, "srv1")
                .members(["10:00:00:00:00:00:00:01"]),
            OperationRequest::new(OperationKind::ZoneCreate, "zsrv").members(["srv1"]),
            OperationRequest::new(OperationKind::CfgCreate, "cfg1").members(["zsrv"]),
            OperationRequest::new(OperationKind::CfgEnable, "cfg1"),
        ]
    }

    #[tokio::test]
    async fn test_mode_batch_changes_only_the_model() {
        let remote = switch();
        let report = run_batch(&remote, 128, options(false, true, false), &scenario()).await;

        assert_eq!(report.results.len(), 4);
        for result in &report.results {
            assert!(result.succeeded);
            assert!(result.changed);
            assert!(!result.remote_call_made);
        }
        let fabric = report.fabric.unwrap();
        assert_eq!(fabric.alias("srv1").unwrap().members, ["10:00:00:00:00:00:00:01"]);
        assert_eq!(fabric.zone("zsrv").unwrap().members, ["srv1"]);
        assert_eq!(fabric.zone_config("cfg1").unwrap().members, ["zsrv"]);
        assert_eq!(fabric.effective_cfg_name(), Some("prod"));
        assert_eq!(remote.calls(), ["fetch", "abort"]);
    }

    #[tokio::test]
    async fn live_batch_with_enable_leaves_nothing_pending() {
        let remote = switch();
        let report = run_batch(&remote, 128, options(false, false, false), &scenario()).await;
        assert!(report.succeeded(), "{:?}", report.results);
        assert!(report.summary.saved);
        assert_eq!(remote.effective_cfg().as_deref(), Some("cfg1"));
    }

    #[tokio::test]
    async fn unsaved_changes_are_reported() {
        let remote = switch();
        let ops = vec![
            OperationRequest::new(OperationKind::AliasCreate, "srv1").members(["1,1"]),
            OperationRequest::new(OperationKind::AliasAdd, "host_b").members(["1,2"]),
        ];
        let report = run_batch(&remote, 128, options(false, false, false), &ops).await;
        assert_eq!(report.results.len(), 3);
        let pending = &report.results[2];
        assert_eq!(pending.status_code, 428);
        assert_eq!(pending.reason.as_deref(), Some("Pending updates"));
        assert_eq!(
            pending.error_detail,
            [
                "Request: alias-create Operand: srv1",
                "Request: alias-add Operand: host_b"
            ]
        );
        assert_eq!(remote.calls().last().map(String::as_str), Some("abort"));
    }

    #[tokio::test]
    async fn first_failure_halts_the_batch() {
        let remote = switch();
        let ops = vec![
            OperationRequest::new(OperationKind::AliasAdd, "bad name!").members([WWN_A]),
            OperationRequest::new(OperationKind::AliasCreate, "srv1").members(["1,1"]),
        ];
        let report = run_batch(&remote, 128, options(true, true, false), &ops).await;
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].status_code, 400);
        assert_eq!(report.summary.operations, 1);
        assert!(report.fabric.unwrap().alias("srv1").is_none());
    }

    #[tokio::test]
    async fn bulk_batch_commits_with_one_replace() {
        let remote = switch();
        let ops = vec![
            OperationRequest::new(OperationKind::AliasCreate, "srv1").members(["1,1"]),
            OperationRequest::new(OperationKind::ZoneAdd, "z1").members(["srv1"]),
        ];
        let report = run_batch(&remote, 128, options(false, false, true), &ops).await;
        assert!(report.succeeded(), "{:?}", report.results);
        assert!(report.summary.saved);
        assert!(remote.defined().alias.iter().any(|a| a.alias_name == "srv1"));
        let calls = remote.calls();
        assert_eq!(calls.iter().filter(|c| *c == "create").count(), 0);
        assert_eq!(calls.iter().filter(|c| *c == "save").count(), 1);
    }

    #[tokio::test]
    async fn bulk_defzone_reaches_the_switch() {
        let remote = switch();
        let ops = vec![OperationRequest::new(OperationKind::Defzone, "--allaccess")];
        let report = run_batch(&remote, 128, options(true, false, true), &ops).await;

        assert!(report.succeeded(), "{:?}", report.results);
        assert_eq!(report.summary.changed, 1);
        assert!(report.summary.saved);
        assert_eq!(remote.default_zone(), Some(1));
        let calls = remote.calls();
        let defzone = calls.iter().position(|c| c == "defzone").unwrap();
        let save = calls.iter().position(|c| c == "save").unwrap();
        assert!(defzone < save, "{calls:?}");
    }

    #[tokio::test]
    async fn bulk_without_defzone_leaves_access_alone() {
        let remote = switch();
        let ops = vec![OperationRequest::new(OperationKind::AliasCreate, "srv1").members(["1,1"])];
        let report = run_batch(&remote, 128, options(true, false, true), &ops).await;

        assert!(report.succeeded(), "{:?}", report.results);
        assert_eq!(remote.default_zone(), None);
        assert!(!remote.calls().contains(&"defzone".to_owned()));
    }

    #[tokio::test]
    async fn abort_failure_is_appended() {
        let remote = switch();
        remote.fail_on("abort");
        let report = run_batch(&remote, 128, options(true, true, false), &[]).await;
        assert_eq!(report.results.len(), 1);
        assert!(!report.results[0].succeeded);
    }

    #[tokio::test]
    async fn missing_parameters_halt_everything() {
        let request: BatchRequest = serde_json::from_value(serde_json::json!({
            "id": "admin",
            "changes": [{"c-type": "cfg-save"}]
        }))
        .unwrap();
        assert!(request.force);
        let report = send_zoning(&request, None).await;
        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.reason.as_deref(), Some("Missing parameter"));
        assert_eq!(
            result.error_detail,
            ["Missing ip-addr", "Missing pw", "Missing fid", "All processing halted"]
        );
    }
}
