use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use std::path::PathBuf;

mod classify;
mod commands;
mod config;
mod decide;
mod exit_codes;
mod fetch;
mod output;
mod reason_codes;
mod redact;
mod status;
use config::{Config, ConfigError, ServerOverrides, ThresholdOverrides};
use decide::Severity;
use fetch::{FetchError, StatusClient};
use output::{HelpResponse, JsonError, Output, VersionResponse};
use reason_codes::ReasonCode;
use status::Mode;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Printed when neither hosts nor services mode was chosen.
const MISSING_MODE: &str = "Choose either hosts or services mode";

#[derive(Parser)]
#[command(name = "check-icinga")]
#[command(version = VERSION)]
#[command(
    about = "Check Icinga - Icinga/Nagios plugin to check remote Icinga/Nagios installations",
    long_about = None
)]
#[command(
    after_help = "Exit codes: 0=OK, 1=WARNING, 2=CRITICAL, 3=UNKNOWN.\nServer settings fall back to ICINGA_URL, ICINGA_STATUS_CGI, ICINGA_USERNAME, ICINGA_PASSWORD, then check-icinga.toml."
)]
struct Cli {
    /// Check mode. Either 'hosts' or 'services'.
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Number of hosts/services to expect (default: -1, no minimum)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    min: Option<i64>,

    /// Warning level: number of failing hosts/services (default: 1)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    warn: Option<i64>,

    /// Critical level: number of failing hosts/services (default: 1)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    crit: Option<i64>,

    /// HTTP username
    #[arg(long, value_name = "NAME")]
    username: Option<String>,

    /// HTTP password
    #[arg(long, value_name = "PASSWORD")]
    password: Option<String>,

    /// URL of the monitoring server (default: http://localhost)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Path to status.cgi below --url (default: cgi-bin/icinga/status.cgi)
    #[arg(long = "status-cgi", value_name = "PATH")]
    status_cgi: Option<String>,

    /// Timeout for the HTTP request in seconds (default: 10)
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Count hosts/services whose name contains PATTERN as 'other'
    #[arg(long, value_name = "PATTERN")]
    exclude: Option<String>,

    /// Count soft states (attempts below max) as failures (default)
    #[arg(long, conflicts_with = "suppress_soft_state")]
    trigger_soft_state: bool,

    /// Count soft states (attempts below max) as 'other' instead of failures
    #[arg(long)]
    suppress_soft_state: bool,

    /// Print request details to stderr
    #[arg(short = 'd', long, visible_alias = "verbose")]
    debug: bool,

    /// Minimal output (status line only)
    #[arg(long)]
    quiet: bool,

    /// Output as JSON instead of the plugin status line
    #[arg(long)]
    json: bool,

    /// Path to config file (default: ./check-icinga.toml)
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before parsing CLI so env vars are available)
    let _ = dotenvy::dotenv();

    // Check for --json flag early (before full parsing) for error handling
    let json_mode = std::env::args().any(|arg| arg == "--json");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp if json_mode => {
                HelpResponse::new(e.to_string()).print();
                std::process::exit(exit_codes::OK);
            }
            ErrorKind::DisplayVersion if json_mode => {
                VersionResponse::new(VERSION.to_string()).print();
                std::process::exit(exit_codes::OK);
            }
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // Usage errors are UNKNOWN for the monitoring framework, not clap's 2
                if json_mode {
                    JsonError::new(ReasonCode::InvalidArguments, e.to_string()).print();
                } else {
                    let _ = e.print();
                }
                std::process::exit(exit_codes::UNKNOWN);
            }
        },
    };

    let output = Output::new(cli.json, cli.quiet, cli.debug);

    let Some(mode) = cli.mode else {
        if output.is_json() {
            JsonError::new(ReasonCode::MissingMode, MISSING_MODE).print();
        } else {
            eprintln!("{}", MISSING_MODE);
        }
        std::process::exit(exit_codes::UNKNOWN);
    };

    match run(cli, mode, &output).await {
        Ok(severity) => std::process::exit(severity.exit_code()),
        Err(e) => {
            let code = reason_for(&e);
            if output.is_json() {
                let full_chain = format!("{e:#}");
                JsonError::with_details(code, e.to_string(), full_chain).print();
            } else {
                // Status line for the monitoring framework, chain for humans
                output.data(&format!("{}: {}", Severity::Unknown.status_prefix(), e));
                eprintln!("Error: {e:#}");
            }
            std::process::exit(Severity::Unknown.exit_code());
        }
    }
}

async fn run(cli: Cli, mode: Mode, output: &Output) -> Result<Severity> {
    let config =
        Config::load(cli.config_path.as_deref()).context("Failed to load configuration")?;

    let settings = config.fetch_settings(&ServerOverrides {
        url: cli.url,
        status_cgi: cli.status_cgi,
        username: cli.username,
        password: cli.password,
        timeout: cli.timeout,
    });
    if settings.username.is_some() != settings.password.is_some() {
        output.warn("Warning: basic auth needs both a username and a password; sending none");
    }

    let request = commands::CheckRequest {
        mode,
        policy: config.threshold_policy(&ThresholdOverrides {
            min: cli.min,
            warn: cli.warn,
            crit: cli.crit,
        }),
        exclude: config.exclude_pattern(cli.exclude),
        honor_soft_state: cli.suppress_soft_state && !cli.trigger_soft_state,
        timeout_secs: settings.timeout_secs(),
    };

    let client = StatusClient::new(settings).context("Failed to build HTTP client")?;
    fetch::setup_ctrlc_handler();

    let report = commands::run_check(&client, &request, output).await?;
    if output.is_json() {
        commands::print_json(&report)?;
    } else {
        commands::print_human(&report, output);
    }
    Ok(report.severity)
}

/// Map a run failure to its stable reason code.
fn reason_for(err: &anyhow::Error) -> ReasonCode {
    for cause in err.chain() {
        if let Some(fetch_err) = cause.downcast_ref::<FetchError>() {
            return fetch_err.reason_code();
        }
        if cause.is::<ConfigError>() {
            return ReasonCode::InvalidConfig;
        }
    }
    ReasonCode::InternalError
}
