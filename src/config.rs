use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::decide::ThresholdPolicy;
use crate::fetch::{defaults, FetchSettings};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "check-icinga.toml";

/// Environment variables consulted between CLI flags and the config file.
pub mod env {
    pub const URL: &str = "ICINGA_URL";
    pub const STATUS_CGI: &str = "ICINGA_STATUS_CGI";
    pub const USERNAME: &str = "ICINGA_USERNAME";
    pub const PASSWORD: &str = "ICINGA_PASSWORD";
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value in {}: {key} {reason}", path.display())]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        reason: &'static str,
    },
}

/// Main configuration structure loaded from check-icinga.toml
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub status_cgi: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Seconds
    pub timeout: Option<u64>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsConfig {
    pub min: Option<i64>,
    pub warn: Option<i64>,
    pub crit: Option<i64>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    pub exclude: Option<String>,
}

/// Server settings given on the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct ServerOverrides {
    pub url: Option<String>,
    pub status_cgi: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<u64>,
}

/// Threshold flags given on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdOverrides {
    pub min: Option<i64>,
    pub warn: Option<i64>,
    pub crit: Option<i64>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Load config from file, or return default if no config exists.
    /// If an explicit path is provided via --config, it MUST exist (error if not).
    /// If no path is provided, check ./check-icinga.toml (use default if not found).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                p
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    default_path
                } else {
                    return Ok(Config::default());
                }
            }
        };

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, config_path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Same bounds the CLI enforces on its flags.
    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if self.server.timeout == Some(0) {
            return Err(ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: "server.timeout",
                reason: "must be at least 1 second",
            });
        }
        Ok(())
    }

    /// Resolve fetch settings with resolution order: CLI > env > config > default
    pub fn fetch_settings(&self, cli: &ServerOverrides) -> FetchSettings {
        self.fetch_settings_with(cli, env_var)
    }

    fn fetch_settings_with(
        &self,
        cli: &ServerOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> FetchSettings {
        let server = &self.server;
        let pick = |flag: &Option<String>, var: &str, file: &Option<String>| {
            flag.clone().or_else(|| lookup(var)).or_else(|| file.clone())
        };

        FetchSettings {
            base_url: pick(&cli.url, env::URL, &server.url)
                .unwrap_or_else(|| defaults::URL.to_string()),
            status_cgi: pick(&cli.status_cgi, env::STATUS_CGI, &server.status_cgi)
                .unwrap_or_else(|| defaults::STATUS_CGI.to_string()),
            username: pick(&cli.username, env::USERNAME, &server.username),
            password: pick(&cli.password, env::PASSWORD, &server.password),
            timeout: cli
                .timeout
                .or(server.timeout)
                .map(Duration::from_secs)
                .unwrap_or(defaults::TIMEOUT),
        }
    }

    /// Resolve thresholds with resolution order: CLI > config > default
    pub fn threshold_policy(&self, cli: &ThresholdOverrides) -> ThresholdPolicy {
        let defaults = ThresholdPolicy::default();
        let file = &self.thresholds;
        ThresholdPolicy {
            minimum_expected: cli.min.or(file.min).unwrap_or(defaults.minimum_expected),
            warn_at: cli.warn.or(file.warn).unwrap_or(defaults.warn_at),
            crit_at: cli.crit.or(file.crit).unwrap_or(defaults.crit_at),
        }
    }

    /// Exclusion pattern: CLI > config. An empty pattern disables exclusion.
    pub fn exclude_pattern(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| self.filter.exclude.clone())
            .filter(|p| !p.is_empty())
    }
}
