//! Check command: fetch the status feed once, classify it, decide a verdict.
//!
//! fetch -> classify (only if the fetch succeeded) -> decide -> report.
//! A timed-out fetch skips classification and becomes a CRITICAL verdict;
//! every other fetch failure is returned to the caller (exit UNKNOWN).

use anyhow::Result;
use serde::Serialize;

use crate::classify::{classify, ClassificationCounts};
use crate::decide::{decide, Severity, ThresholdPolicy, Verdict};
use crate::fetch::{FetchError, StatusClient};
use crate::output::Output;
use crate::redact::{redact_secret, redact_url};
use crate::status::{EntityStatusRecord, Mode};

/// Everything that shapes one verdict besides the fetched records.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub mode: Mode,
    pub policy: ThresholdPolicy,
    pub exclude: Option<String>,
    pub honor_soft_state: bool,
    /// Printed in the timeout verdict
    pub timeout_secs: u64,
}

/// Result of one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub mode: Mode,
    pub counts: ClassificationCounts,
    pub policy: ThresholdPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    pub honor_soft_state: bool,
    pub severity: Severity,
    pub message: String,
}

impl CheckReport {
    fn new(request: &CheckRequest, counts: ClassificationCounts, verdict: Verdict) -> Self {
        Self {
            mode: request.mode,
            counts,
            policy: request.policy,
            exclude: request.exclude.clone(),
            honor_soft_state: request.honor_soft_state,
            severity: verdict.severity,
            message: verdict.message,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict {
            severity: self.severity,
            message: self.message.clone(),
        }
    }
}

/// Turn a fetch outcome into a report. Deterministic in its inputs.
pub fn evaluate(
    outcome: Result<Vec<EntityStatusRecord>, FetchError>,
    request: &CheckRequest,
) -> Result<CheckReport, FetchError> {
    let counts = match outcome {
        Ok(records) => classify(
            request.mode,
            &records,
            request.exclude.as_deref(),
            request.honor_soft_state,
        ),
        Err(FetchError::Timeout) => ClassificationCounts::timed_out(),
        Err(e) => return Err(e),
    };
    let verdict = decide(
        &counts,
        &request.policy,
        request.mode.label(),
        request.timeout_secs,
    );
    Ok(CheckReport::new(request, counts, verdict))
}

/// Fetch the feed for `request.mode` and evaluate it.
pub async fn run_check(
    client: &StatusClient,
    request: &CheckRequest,
    output: &Output,
) -> Result<CheckReport> {
    let settings = client.settings();
    let url = settings.request_url(request.mode)?;
    output.verbose(&format!("Will fetch: {}", redact_url(url.as_str())));
    output.verbose(&format!("With params: {}", url.query().unwrap_or_default()));
    output.verbose(&format!(
        "With auth: {} (user: {}, password: {}), timeout: {}s",
        if settings.sends_auth() { "basic" } else { "none" },
        settings.username.as_deref().unwrap_or("<unset>"),
        redact_secret(settings.password.as_deref()),
        settings.timeout_secs()
    ));

    let outcome = client.fetch(request.mode).await;
    match &outcome {
        Ok(records) => output.verbose(&format!("Fetched {} records", records.len())),
        Err(e) => output.verbose(&format!(
            "Fetch failed ({}): {}",
            e.reason_code().description(),
            e
        )),
    }

    let report = evaluate(outcome, request)?;
    if !report.counts.timed_out {
        output.verbose(&format!(
            "Classified {} records: ok={}, fail={}, other={}",
            report.counts.total(),
            report.counts.ok,
            report.counts.fail,
            report.counts.other
        ));
    }
    Ok(report)
}

/// Print the plugin status line.
pub fn print_human(report: &CheckReport, output: &Output) {
    output.data(&report.verdict().status_line());
}

/// Print the report as JSON with schema versioning
pub fn print_json(report: &CheckReport) -> Result<()> {
    use crate::output::{schema, CheckOutput};

    CheckOutput::new(schema::STATUS, report, report.severity).print()?;
    Ok(())
}
