//! Output layer for check-icinga.
//!
//! Centralizes stdout/stderr separation and human vs JSON output modes.
//! - stdout: data (the plugin status line, or the JSON envelope)
//! - stderr: diagnostics (debug tracing, human-mode errors)
//!
//! Icinga/Nagios read the first stdout line as the check result, so nothing
//! but the answer may ever be written there.

use serde::Serialize;

use crate::decide::Severity;
use crate::reason_codes::{ReasonCode, ReasonInfo};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Output helper that centralizes all CLI output
#[derive(Debug, Clone)]
pub struct Output {
    pub mode: OutputMode,
    pub quiet: bool,
    pub verbose: bool,
}

impl Output {
    pub fn new(json: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            mode: if json {
                OutputMode::Json
            } else {
                OutputMode::Human
            },
            quiet,
            verbose,
        }
    }

    /// Write data to stdout (the command's "answer")
    pub fn data(&self, message: &str) {
        println!("{}", message);
    }

    /// Write a verbose diagnostic message to stderr
    /// Only shown with --debug in human mode
    pub fn verbose(&self, message: &str) {
        if self.mode == OutputMode::Json || self.quiet || !self.verbose {
            return;
        }
        eprintln!("{}", message);
    }

    /// Write a warning to stderr
    /// Shown in human mode unless --quiet, suppressed in JSON mode
    pub fn warn(&self, message: &str) {
        if self.mode == OutputMode::Json || self.quiet {
            return;
        }
        eprintln!("{}", message);
    }

    /// Check if we're in JSON mode
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
}

// =============================================================================
// JSON envelope
// =============================================================================

/// Schema version for JSON outputs.
/// Follows semver: breaking=major, additive=minor, bugfix=patch.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Tool version from Cargo.toml.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema IDs for JSON outputs.
pub mod schema {
    pub const STATUS: &str = "check_icinga.status";
    pub const ERROR: &str = "check_icinga.error";
}

/// JSON error response using envelope structure (written to stdout with exit 3).
/// Matches CheckOutput structure so consumers get a consistent envelope.
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub ok: bool,
    pub schema_id: &'static str,
    pub schema_version: &'static str,
    pub tool_version: &'static str,
    pub generated_at: String,
    pub severity: Severity,
    pub exit_code: i32,
    pub errors: Vec<ReasonInfo>,
    /// Always null for error responses
    pub data: Option<()>,
}

impl JsonError {
    pub fn new(code: ReasonCode, message: impl Into<String>) -> Self {
        Self::from_reason(ReasonInfo::new(code, message))
    }

    pub fn with_details(
        code: ReasonCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::from_reason(ReasonInfo::with_details(code, message, details))
    }

    fn from_reason(reason: ReasonInfo) -> Self {
        Self {
            ok: false,
            schema_id: schema::ERROR,
            schema_version: SCHEMA_VERSION,
            tool_version: TOOL_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            severity: Severity::Unknown,
            exit_code: Severity::Unknown.exit_code(),
            errors: vec![reason],
            data: None,
        }
    }

    /// Print this error as JSON to stdout
    /// Panics if serialization fails (should never happen for JsonError)
    pub fn print(&self) {
        let json =
            serde_json::to_string_pretty(self).expect("JsonError serialization should never fail");
        println!("{}", json);
    }
}

/// Wrapper for a successful check's JSON output.
///
/// `ok` means "the plugin produced a verdict", not "the verdict is OK";
/// read `severity` for the latter.
#[derive(Debug, Serialize)]
pub struct CheckOutput<T: Serialize> {
    pub ok: bool,
    pub schema_id: &'static str,
    pub schema_version: &'static str,
    pub tool_version: &'static str,
    /// ISO 8601 timestamp when this output was generated
    pub generated_at: String,
    pub severity: Severity,
    pub exit_code: i32,
    /// Check-specific payload
    pub data: T,
}

impl<T: Serialize> CheckOutput<T> {
    pub fn new(schema_id: &'static str, data: T, severity: Severity) -> Self {
        Self {
            ok: true,
            schema_id,
            schema_version: SCHEMA_VERSION,
            tool_version: TOOL_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            severity,
            exit_code: severity.exit_code(),
            data,
        }
    }

    /// Print this output as JSON to stdout.
    pub fn print(&self) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string_pretty(self)?;
        println!("{}", json);
        Ok(())
    }
}

// =============================================================================
// Meta UX JSON Response Types (--help, --version)
// =============================================================================

/// JSON response for --help flag
#[derive(Debug, Serialize)]
pub struct HelpResponse {
    pub ok: bool,
    pub help: String,
}

impl HelpResponse {
    pub fn new(help_text: String) -> Self {
        Self {
            ok: true,
            help: help_text,
        }
    }

    pub fn print(&self) {
        let json = serde_json::to_string_pretty(self)
            .expect("HelpResponse serialization should never fail");
        println!("{}", json);
    }
}

/// JSON response for --version flag
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub ok: bool,
    pub version: String,
}

impl VersionResponse {
    pub fn new(version: String) -> Self {
        Self { ok: true, version }
    }

    pub fn print(&self) {
        let json = serde_json::to_string_pretty(self)
            .expect("VersionResponse serialization should never fail");
        println!("{}", json);
    }
}
