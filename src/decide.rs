//! Threshold decision: turn classification counts into a verdict.
//!
//! Rules are evaluated in priority order and the first match wins:
//!
//! 1. fetch timed out                    -> CRITICAL "Timeout after N"
//! 2. `min > ok + fail`                  -> CRITICAL "Only X <label> found."
//! 3. `fail >= crit`                     -> CRITICAL "X <label> fail."
//! 4. `fail >= warn`                     -> WARNING  "X <label> fail."
//! 5. otherwise                          -> OK       "a=ok, b=fail, c=other"
//!
//! Critical is checked before warning, so `warn > crit` degrades to a plain
//! critical threshold instead of being rejected.

use serde::Serialize;

use crate::classify::ClassificationCounts;
use crate::exit_codes;

/// Verdict severity, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    /// Never produced by `decide`; reserved for caller misuse.
    Unknown,
}

impl Severity {
    pub fn exit_code(&self) -> i32 {
        match self {
            Severity::Ok => exit_codes::OK,
            Severity::Warning => exit_codes::WARNING,
            Severity::Critical => exit_codes::CRITICAL,
            Severity::Unknown => exit_codes::UNKNOWN,
        }
    }

    /// Prefix of the plugin status line.
    pub fn status_prefix(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARN",
            Severity::Critical => "CRIT",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

/// Caller-supplied thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdPolicy {
    /// Minimum number of judged entities; negative disables the check.
    pub minimum_expected: i64,
    pub warn_at: i64,
    pub crit_at: i64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            minimum_expected: -1,
            warn_at: 1,
            crit_at: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub severity: Severity,
    pub message: String,
}

impl Verdict {
    fn new(severity: Severity, message: String) -> Self {
        Self { severity, message }
    }

    /// `"CRIT: 2 hosts fail."`
    pub fn status_line(&self) -> String {
        format!("{}: {}", self.severity.status_prefix(), self.message)
    }
}

fn as_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Decide the verdict for one check. `label` only affects the message.
pub fn decide(
    counts: &ClassificationCounts,
    policy: &ThresholdPolicy,
    label: &str,
    timeout_secs: u64,
) -> Verdict {
    if counts.timed_out {
        return Verdict::new(Severity::Critical, format!("Timeout after {}", timeout_secs));
    }

    let judged = counts.judged();
    if policy.minimum_expected > as_i64(judged) {
        return Verdict::new(
            Severity::Critical,
            format!("Only {} {} found.", judged, label),
        );
    }

    let fail = as_i64(counts.fail);
    if fail >= policy.crit_at {
        return Verdict::new(Severity::Critical, format!("{} {} fail.", counts.fail, label));
    }
    if fail >= policy.warn_at {
        return Verdict::new(Severity::Warning, format!("{} {} fail.", counts.fail, label));
    }

    Verdict::new(
        Severity::Ok,
        format!(
            "{}=ok, {}=fail, {}=other",
            counts.ok, counts.fail, counts.other
        ),
    )
}
