//! Reason codes for failed checks.
//!
//! Stable identifiers for automation consuming `--json` output. A reason code
//! explains why the plugin could not produce a verdict; threshold findings are
//! verdicts, not reasons.

use serde::Serialize;

/// Reason code taxonomy.
///
/// - **Operational**: the remote server or network misbehaved
/// - **Usage**: the plugin was invoked or configured incorrectly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    // =========================================================================
    // Operational
    // =========================================================================
    /// Could not connect or the request failed in transit
    ConnectionFailed,
    /// Server answered 401
    Unauthorized,
    /// Server answered something other than 200
    UnexpectedStatus,
    /// Body was not a status.cgi JSON document
    MalformedPayload,
    /// Unexpected internal error
    InternalError,

    // =========================================================================
    // Usage
    // =========================================================================
    /// Neither hosts nor services mode selected
    MissingMode,
    /// URL could not be parsed or joined
    InvalidUrl,
    /// Config file missing or unparseable
    InvalidConfig,
    /// Command-line arguments rejected
    InvalidArguments,
}

impl ReasonCode {
    /// Human-readable description of the reason code.
    pub fn description(&self) -> &'static str {
        match self {
            ReasonCode::ConnectionFailed => "connection failed",
            ReasonCode::Unauthorized => "authentication rejected",
            ReasonCode::UnexpectedStatus => "unexpected HTTP status",
            ReasonCode::MalformedPayload => "malformed status payload",
            ReasonCode::InternalError => "internal error",
            ReasonCode::MissingMode => "no check mode selected",
            ReasonCode::InvalidUrl => "invalid URL",
            ReasonCode::InvalidConfig => "invalid configuration",
            ReasonCode::InvalidArguments => "invalid arguments",
        }
    }

    pub fn category(&self) -> ReasonCategory {
        match self {
            ReasonCode::ConnectionFailed
            | ReasonCode::Unauthorized
            | ReasonCode::UnexpectedStatus
            | ReasonCode::MalformedPayload
            | ReasonCode::InternalError => ReasonCategory::Operational,

            ReasonCode::MissingMode
            | ReasonCode::InvalidUrl
            | ReasonCode::InvalidConfig
            | ReasonCode::InvalidArguments => ReasonCategory::Usage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonCategory {
    Operational,
    Usage,
}

/// Structured reason information for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ReasonInfo {
    /// Stable reason code for automation
    pub code: ReasonCode,
    pub category: ReasonCategory,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ReasonInfo {
    pub fn new(code: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        code: ReasonCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }
}
