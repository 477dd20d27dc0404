//! Bounded fetch of the remote status feed.
//!
//! One GET against `status.cgi` per invocation:
//! - The whole exchange (connect, headers, body) is bounded by the configured
//!   timeout; elapsing it yields [`FetchError::Timeout`], never a retry.
//! - Basic auth is sent only when both username and password are known.
//! - Anything other than HTTP 200 with a decodable feed is an error.

use std::time::Duration;

use url::Url;

use crate::reason_codes::ReasonCode;
use crate::status::{EntityStatusRecord, Mode, StatusFeed};

/// Default values for fetch settings.
pub mod defaults {
    use std::time::Duration;

    /// Base URL of the monitoring server
    pub const URL: &str = "http://localhost";

    /// Path of status.cgi below the base URL
    pub const STATUS_CGI: &str = "cgi-bin/icinga/status.cgi";

    /// Bound on the whole HTTP exchange
    pub const TIMEOUT: Duration = Duration::from_secs(10);
}

/// Errors from fetching and decoding the status feed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The bound elapsed before the exchange completed.
    #[error("request timed out")]
    Timeout,

    #[error("HTTP 401 - Password wrong?")]
    Unauthorized,

    #[error("Did not get HTTP 200 (but a {0}).")]
    UnexpectedStatus(u16),

    /// The request failed in transit (DNS, connect, TLS, reset, ...).
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Malformed status payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            FetchError::Timeout | FetchError::Transport(_) => ReasonCode::ConnectionFailed,
            FetchError::Unauthorized => ReasonCode::Unauthorized,
            FetchError::UnexpectedStatus(_) => ReasonCode::UnexpectedStatus,
            FetchError::MalformedPayload(_) => ReasonCode::MalformedPayload,
            FetchError::InvalidUrl { .. } => ReasonCode::InvalidUrl,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Where and how to fetch the feed.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub status_cgi: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: defaults::URL.to_string(),
            status_cgi: defaults::STATUS_CGI.to_string(),
            username: None,
            password: None,
            timeout: defaults::TIMEOUT,
        }
    }
}

impl FetchSettings {
    /// Whole seconds of the timeout, as printed in the timeout verdict.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    /// `base_url` and `status_cgi` joined by exactly one `/`.
    pub fn status_url(&self) -> Result<Url, FetchError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.status_cgi.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|source| FetchError::InvalidUrl {
            url: crate::redact::redact_url(&joined),
            source,
        })
    }

    /// Full request URL for `mode`, query string included.
    pub fn request_url(&self, mode: Mode) -> Result<Url, FetchError> {
        let mut url = self.status_url()?;
        let query = mode
            .query_params()
            .iter()
            .map(|(key, value)| match value {
                Some(v) => format!("{}={}", key, v),
                None => key.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
        Ok(url)
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    pub fn sends_auth(&self) -> bool {
        self.credentials().is_some()
    }
}

/// HTTP client for one monitoring server.
pub struct StatusClient {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl StatusClient {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("check-icinga/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Fetch and decode the records for `mode`, bounded by the timeout.
    pub async fn fetch(&self, mode: Mode) -> Result<Vec<EntityStatusRecord>, FetchError> {
        match tokio::time::timeout(self.settings.timeout, self.fetch_unbounded(mode)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    async fn fetch_unbounded(&self, mode: Mode) -> Result<Vec<EntityStatusRecord>, FetchError> {
        let url = self.settings.request_url(mode)?;

        let mut request = self.client.get(url);
        if let Some((user, pass)) = self.settings.credentials() {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(FetchError::from_reqwest)?;
        match response.status().as_u16() {
            200 => {}
            401 => return Err(FetchError::Unauthorized),
            other => return Err(FetchError::UnexpectedStatus(other)),
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        decode(&body, mode)
    }
}

/// Decode a status.cgi body into the records for `mode`.
pub fn decode(body: &str, mode: Mode) -> Result<Vec<EntityStatusRecord>, FetchError> {
    let feed =
        StatusFeed::from_json(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))?;
    let section = match mode {
        Mode::Hosts => "host_status",
        Mode::Services => "service_status",
    };
    feed.into_records(mode)
        .ok_or_else(|| FetchError::MalformedPayload(format!("missing status.{}", section)))
}

/// Exit with UNKNOWN on Ctrl+C (SIGINT) while the fetch is in flight.
///
/// Dropping the runtime on exit abandons the in-flight request.
pub fn setup_ctrlc_handler() {
    use crate::exit_codes;

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        eprintln!("\nInterrupted (Ctrl+C).");
        std::process::exit(exit_codes::UNKNOWN);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str, status_cgi: &str) -> FetchSettings {
        FetchSettings {
            base_url: base_url.to_string(),
            status_cgi: status_cgi.to_string(),
            ..FetchSettings::default()
        }
    }

    #[test]
    fn test_default_settings() {
        let s = FetchSettings::default();
        assert_eq!(s.timeout, Duration::from_secs(10));
        assert_eq!(s.timeout_secs(), 10);
        assert_eq!(
            s.status_url().unwrap().as_str(),
            "http://localhost/cgi-bin/icinga/status.cgi"
        );
    }

    #[test]
    fn test_status_url_single_slash() {
        let s = settings("http://monitor.example.com/icinga/", "/cgi-bin/status.cgi");
        assert_eq!(
            s.status_url().unwrap().as_str(),
            "http://monitor.example.com/icinga/cgi-bin/status.cgi"
        );
    }

    #[test]
    fn test_request_url_hosts() {
        let url = FetchSettings::default().request_url(Mode::Hosts).unwrap();
        assert_eq!(
            url.query(),
            Some("hostgroup=all&style=hostdetail&nostatusheader&jsonoutput")
        );
    }

    #[test]
    fn test_request_url_services() {
        let url = FetchSettings::default().request_url(Mode::Services).unwrap();
        assert_eq!(url.query(), Some("host=all&nostatusheader&jsonoutput"));
    }

    #[test]
    fn test_invalid_url_is_redacted() {
        let s = settings("not a url:secret@", "status.cgi");
        let err = s.status_url().unwrap_err();
        assert_eq!(err.reason_code(), ReasonCode::InvalidUrl);
    }

    #[test]
    fn test_credentials_require_both() {
        let mut s = FetchSettings::default();
        assert!(!s.sends_auth());
        s.username = Some("icinga".to_string());
        assert!(!s.sends_auth());
        s.password = Some("secret".to_string());
        assert!(s.sends_auth());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Unauthorized.to_string(), "HTTP 401 - Password wrong?");
        assert_eq!(
            FetchError::UnexpectedStatus(500).to_string(),
            "Did not get HTTP 200 (but a 500)."
        );
    }

    #[test]
    fn test_decode_ok() {
        let body = r#"{"status": {"host_status": [{"host": "h1", "status": "UP"}]}}"#;
        let records = decode(body, Mode::Hosts).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_decode_missing_section() {
        let body = r#"{"status": {"host_status": []}}"#;
        let err = decode(body, Mode::Services).unwrap_err();
        assert_eq!(err.reason_code(), ReasonCode::MalformedPayload);
        assert!(err.to_string().contains("service_status"));
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode("<html>login</html>", Mode::Hosts).unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }
}
