//! Status feed model.
//!
//! Mirrors the JSON emitted by Icinga/Nagios `status.cgi` with `jsonoutput`:
//!
//! ```json
//! {"cgi_json_version": "1.5.0", "status": {"host_status": [ ... ]}}
//! {"cgi_json_version": "1.5.0", "status": {"service_status": [ ... ]}}
//! ```
//!
//! Only the fields the classifier needs are decoded; everything else in a row
//! (`last_check`, `duration`, `status_information`, ...) is ignored.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which half of the status feed a check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Hosts,
    Services,
}

impl Mode {
    /// Status literal that counts as healthy for this mode.
    pub fn good_status(&self) -> &'static str {
        match self {
            Mode::Hosts => "UP",
            Mode::Services => "OK",
        }
    }

    /// Entity-class word used in verdict messages.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Hosts => "hosts",
            Mode::Services => "services",
        }
    }

    /// Query string sent to status.cgi. `None` values are bare flags.
    pub fn query_params(&self) -> &'static [(&'static str, Option<&'static str>)] {
        match self {
            Mode::Hosts => &[
                ("hostgroup", Some("all")),
                ("style", Some("hostdetail")),
                ("nostatusheader", None),
                ("jsonoutput", None),
            ],
            Mode::Services => &[
                ("host", Some("all")),
                ("nostatusheader", None),
                ("jsonoutput", None),
            ],
        }
    }
}

/// One host or service row as reported at fetch time.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EntityStatusRecord {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub service: Option<String>,
    pub status: String,
    #[serde(default)]
    pub in_scheduled_downtime: bool,
    #[serde(default)]
    pub has_been_acknowledged: bool,
    /// Absent in older feeds; absent means enabled.
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub attempts: Option<String>,
}

impl EntityStatusRecord {
    /// Name used for exclusion matching: `host` or `host/service`.
    pub fn name(&self) -> String {
        match &self.service {
            Some(service) => format!("{}/{}", self.host, service),
            None => self.host.clone(),
        }
    }

    pub fn notifications_disabled(&self) -> bool {
        self.notifications_enabled == Some(false)
    }

    /// A soft state has not yet been confirmed by the configured number of retries.
    pub fn is_soft_state(&self) -> bool {
        self.attempts
            .as_deref()
            .and_then(Attempts::parse)
            .is_some_and(|a| a.current < a.max)
    }
}

/// Parsed `"current/max"` check attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempts {
    pub current: u32,
    pub max: u32,
}

impl Attempts {
    pub fn parse(s: &str) -> Option<Self> {
        let (current, max) = s.split_once('/')?;
        Some(Self {
            current: current.trim().parse().ok()?,
            max: max.trim().parse().ok()?,
        })
    }
}

/// Top-level status.cgi JSON document.
#[derive(Debug, Deserialize)]
pub struct StatusFeed {
    pub status: StatusSection,
}

#[derive(Debug, Deserialize)]
pub struct StatusSection {
    #[serde(default)]
    pub host_status: Option<Vec<EntityStatusRecord>>,
    #[serde(default)]
    pub service_status: Option<Vec<EntityStatusRecord>>,
}

impl StatusFeed {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Take the record list for `mode`, or `None` if the feed lacks it.
    pub fn into_records(self, mode: Mode) -> Option<Vec<EntityStatusRecord>> {
        match mode {
            Mode::Hosts => self.status.host_status,
            Mode::Services => self.status.service_status,
        }
    }
}
