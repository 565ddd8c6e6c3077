//! Configuration loading
//!
//! Reads settings from the process environment, after loading a `.env`
//! file if one is present. Missing required settings are fatal.

use crate::error::ConfigError;
use crate::poller::DEFAULT_POLL_INTERVAL;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const DEFAULT_SUBSCRIBERS_FILE: &str = "subscribers.json";
const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(15);

/// Node connection and the contract being watched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub target_contract: String,
    pub rpc_timeout: Duration,
}

/// Everything the daemon needs.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub chain: ChainConfig,
    pub bot_token: String,
    pub subscribers_file: PathBuf,
    pub poll_interval: Duration,
}

// Keep the bot token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("chain", &self.chain)
            .field("bot_token", &"<redacted>")
            .field("subscribers_file", &self.subscribers_file)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Look up a variable under its name or an alias, ignoring blank values.
fn lookup<F>(get: &F, name: &'static str, alias: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(name)
        .or_else(|| get(alias))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional<F>(get: &F, name: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(get, name, name)
}

fn required<F>(get: &F, name: &'static str, alias: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(get, name, alias).ok_or(ConfigError::Missing(name))
}

fn seconds<F>(get: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(get, name) {
        None => Ok(default),
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}

impl ChainConfig {
    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            rpc_url: required(&get, "STARKNET_RPC_URL", "API_URL")?,
            target_contract: required(&get, "TARGET_CONTRACT", "MEMECOIN_CONTRACT")?,
            rpc_timeout: seconds(&get, "RPC_TIMEOUT_SECS", DEFAULT_RPC_TIMEOUT)?,
        })
    }

    /// Load from the environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

impl Config {
    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = required(&get, "BOT_TOKEN", "TELEGRAM_BOT_TOKEN")?;
        let chain = ChainConfig::from_lookup(&get)?;
        let subscribers_file = optional(&get, "SUBSCRIBERS_FILE")
            .unwrap_or_else(|| DEFAULT_SUBSCRIBERS_FILE.to_string())
            .into();
        let poll_interval = seconds(&get, "POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL)?;

        Ok(Self {
            chain,
            bot_token,
            subscribers_file,
            poll_interval,
        })
    }

    /// Load from the environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = Self::from_lookup(|k| std::env::var(k).ok())?;
        info!("Loaded config: {:?}", cfg);
        Ok(cfg)
    }
}
