//! `apply`: run a batch file of zoning changes against a switch.

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use fabzone_core::{BatchReport, BatchRequest, OpResult, OperationRequest, Session, send_zoning};

use crate::cli::{ApplyArgs, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Batch file ──────────────────────────────────────────────────────

/// Read a batch from JSON or YAML (by extension). `-` reads JSON from stdin.
pub fn read_batch(path: &Path) -> Result<BatchRequest, CliError> {
    if path == Path::new("-") {
        let mut contents = String::new();
        std::io::stdin().read_to_string(&mut contents)?;
        return Ok(serde_json::from_str(&contents)?);
    }
    let contents = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&contents)?),
        _ => Ok(serde_json::from_str(&contents)?),
    }
}

/// Command-line mode flags win over the batch file.
fn apply_flags(request: &mut BatchRequest, args: &ApplyArgs) {
    if args.test {
        request.test = true;
    }
    if args.bulk {
        request.bulk = true;
    }
    if let Some(force) = args.force_override() {
        request.force = force;
    }
}

// ── Rendering ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "Request")]
    request: String,
    #[tabled(rename = "Status")]
    status: u16,
    #[tabled(rename = "Changed")]
    changed: &'static str,
    #[tabled(rename = "Sent")]
    sent: &'static str,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Label for result `i`. Results past the attempted operations are
/// batch-level entries (pending updates, abort or replace failures).
fn request_label(report: &BatchReport, operations: &[OperationRequest], i: usize) -> String {
    if i < report.summary.operations {
        operations
            .get(i)
            .map_or_else(|| "-".into(), OperationRequest::describe)
    } else {
        "(batch)".into()
    }
}

fn reason_cell(result: &OpResult) -> String {
    let mut parts: Vec<&str> = result.reason.iter().map(String::as_str).collect();
    parts.extend(result.error_detail.iter().map(String::as_str));
    if parts.is_empty() {
        "-".into()
    } else {
        parts.join("; ")
    }
}

fn render_report(format: &OutputFormat, report: &BatchReport, operations: &[OperationRequest]) -> String {
    output::render_single(
        format,
        report,
        |r| {
            let rows: Vec<ResultRow> = r
                .results
                .iter()
                .enumerate()
                .map(|(i, result)| ResultRow {
                    index: (i + 1).to_string(),
                    request: request_label(r, operations, i),
                    status: result.status_code,
                    changed: yes_no(result.changed),
                    sent: yes_no(result.remote_call_made),
                    reason: reason_cell(result),
                })
                .collect();
            output::render_table(&rows)
        },
        |r| {
            r.results
                .iter()
                .map(|result| {
                    format!(
                        "{}\t{}",
                        result.status_code,
                        result.reason.as_deref().unwrap_or("ok")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

fn spinner(global: &GlobalOpts, message: String) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ApplyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut request = read_batch(&args.file)?;
    apply_flags(&mut request, &args);

    let report = match config::resolve_target(global) {
        Ok(target) => {
            request.fid = global.fid.or(request.fid).or(target.fid);
            let fid = request.fid.ok_or(CliError::MissingFid)?;

            let bar = spinner(
                global,
                format!(
                    "Applying {} operation(s) to fabric {fid} on {}",
                    request.operations.len(),
                    target.session.address
                ),
            );
            let batch = &request;
            let report = Session::oneshot(target.session, |session| async move {
                Ok(send_zoning(batch, Some(&session)).await)
            })
            .await;
            bar.finish_and_clear();
            report?
        }
        // The batch file may carry its own switch parameters
        Err(CliError::NoConfig { .. }) if request.address.is_some() => {
            request.fid = global.fid.or(request.fid);
            send_zoning(&request, None).await
        }
        Err(e) => return Err(e),
    };

    let out = render_report(&global.output, &report, &request.operations);
    output::print_output(&out, global.quiet);

    if !global.quiet {
        let s = &report.summary;
        let mut message = format!("{} operation(s), {} changed", s.operations, s.changed);
        if request.test {
            message.push_str(", test mode");
        } else if s.saved {
            message.push_str(", zone database saved");
        }
        eprintln!(
            "{}",
            output::status_line(report.succeeded(), &message, output::should_color(&global.color))
        );
    }

    if report.succeeded() {
        Ok(())
    } else {
        Err(CliError::BatchFailed {
            failures: report.results.iter().filter(|r| r.is_failure()).count(),
            total: report.results.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_yaml_and_json_batches() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("batch.yaml");
        let mut f = std::fs::File::create(&yaml).unwrap();
        writeln!(
            f,
            "fid: 10\nbulk: true\nchanges:\n  - c-type: alias-create\n    operand: srv1\n    p0: 1,1\n"
        )
        .unwrap();
        let batch = read_batch(&yaml).unwrap();
        assert_eq!(batch.fid, Some(10));
        assert!(batch.bulk);
        assert!(batch.force);
        assert_eq!(batch.operations[0].p0, ["1,1"]);

        let json = dir.path().join("batch.json");
        std::fs::write(&json, r#"{"operations": [{"c-type": "cfg-save"}], "force": false}"#)
            .unwrap();
        let batch = read_batch(&json).unwrap();
        assert!(!batch.force);
        assert_eq!(batch.operations.len(), 1);
    }

    #[test]
    fn malformed_batch_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_batch(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
