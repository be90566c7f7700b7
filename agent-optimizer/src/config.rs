//! Runtime configuration.
//!
//! Resolution order: compiled-in defaults, then the build-time target flag
//! (`AGENT_OPTIMIZER_ENV=production` when compiling selects the deployed
//! service), then command-line overrides.

use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::utils::{default_log_path, default_output_dir};

pub const LOCAL_API_URL: &str = "http://127.0.0.1:5007";
pub const PRODUCTION_API_URL: &str = "https://ai-agent-optimizer.onrender.com";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TURN_DELAY_MS: u64 = 400;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Which analysis service deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Local,
    Production,
}

impl Target {
    /// The target selected when the binary was compiled
    pub fn from_build() -> Self {
        match option_env!("AGENT_OPTIMIZER_ENV") {
            Some("production") => Target::Production,
            _ => Target::Local,
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Target::Local => LOCAL_API_URL,
            Target::Production => PRODUCTION_API_URL,
        }
    }
}

/// Command-line overrides shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Service deployment to use (defaults to the build-time target)
    #[arg(long, value_enum, global = true)]
    pub target: Option<Target>,

    /// Explicit API base URL, wins over --target
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Timeout for backend requests, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Pause before the next question appears, in milliseconds
    #[arg(long, global = true)]
    pub turn_delay_ms: Option<u64>,

    /// Directory downloaded decks and flowcharts are saved to
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Log file used while the terminal UI is running
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL without a trailing slash
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub turn_delay: Duration,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Target::from_build().base_url().to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            turn_delay: Duration::from_millis(DEFAULT_TURN_DELAY_MS),
            output_dir: default_output_dir(),
            log_file: default_log_path(),
        }
    }
}

impl Config {
    /// Apply command-line overrides on top of the defaults
    pub fn resolve(args: &ConfigArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(target) = args.target {
            config.api_base_url = target.base_url().to_string();
        }
        if let Some(url) = &args.api_url {
            config.api_base_url = validate_url(url)?;
        }
        if let Some(secs) = args.timeout_secs {
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout);
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = args.turn_delay_ms {
            config.turn_delay = Duration::from_millis(ms);
        }
        if let Some(dir) = &args.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(path) = &args.log_file {
            config.log_file = path.clone();
        }

        Ok(config)
    }

    /// Full URL for an endpoint path such as `/chat`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn validate_url(url: &str) -> Result<String, ConfigError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(url.trim_end_matches('/').to_string())
}
