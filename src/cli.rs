//! Command-line interface.
//!
//! Flags override values from an optional config file, which in turn
//! override the built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::duration::parse_duration;
use crate::config::schema::parse_header_pair;
use crate::config::{read_config, validate_config, ConfigError, DeliveryConfig, MultipostConfig};

#[derive(Debug, Parser)]
#[command(name = "multipost", version)]
#[command(about = "POST one payload to many URLs concurrently, retrying each independently", long_about = None)]
pub struct Cli {
    /// Log every attempt, not only failures
    #[arg(short, long)]
    pub verbose: bool,

    /// How many times to try each post [default: 3]
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// How long to wait between retries [default: 30s]
    #[arg(long = "retrytime", value_name = "DURATION", value_parser = parse_duration)]
    pub retry_time: Option<Duration>,

    /// File from which to read the body, or '-' for stdin [default: -]
    #[arg(long, value_name = "PATH")]
    pub input: Option<String>,

    /// Form parameter name wrapping the body; empty sends it raw [default: payload]
    #[arg(long, value_name = "NAME")]
    pub param: Option<String>,

    /// The maximum amount of time this process may run [default: 15m]
    #[arg(long = "time-limit", alias = "timeLimit", value_name = "DURATION", value_parser = parse_duration)]
    pub time_limit: Option<Duration>,

    /// Extra request header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header_arg)]
    pub headers: Vec<(String, String)>,

    /// TOML config file supplying defaults
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Destination URLs
    #[arg(value_name = "URL", required = true)]
    pub targets: Vec<String>,
}

impl Cli {
    /// Merge defaults, the config file, and flags into a validated config.
    ///
    /// Only the merged result is validated, so a flag can replace a value
    /// the file gets wrong.
    pub fn resolve(&self) -> Result<MultipostConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => MultipostConfig::default(),
        };
        self.apply(&mut config.delivery);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, delivery: &mut DeliveryConfig) {
        if self.verbose {
            delivery.verbose = true;
        }
        if let Some(retries) = self.retries {
            delivery.retries = retries;
        }
        if let Some(retry_time) = self.retry_time {
            delivery.retry_time = retry_time;
        }
        if let Some(input) = &self.input {
            delivery.input = input.clone();
        }
        if let Some(param) = &self.param {
            delivery.param = param.clone();
        }
        if let Some(time_limit) = self.time_limit {
            delivery.time_limit = time_limit;
        }
        if !self.headers.is_empty() {
            // A name given with -H replaces every file entry of that name.
            delivery.headers.retain(|(name, _)| {
                !self.headers.iter().any(|(flag, _)| flag.eq_ignore_ascii_case(name))
            });
            delivery.headers.extend(self.headers.iter().cloned());
        }
    }
}

/// Parse `Name: value` into a checked header pair.
fn parse_header_arg(raw: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = raw.split_once(':').ok_or_else(|| ConfigError::InvalidHeader {
        name: raw.to_string(),
        reason: "expected 'Name: value'".to_string(),
    })?;
    parse_header_pair(name, value)?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}
