use clap::Parser;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const USAGE: &str = "Usage example: ZERODHA_API_KEY=YOUR_API_KEY ZERODHA_API_SECRET=YOUR_API_SECRET kite-mcp";

#[derive(Parser)]
#[command(name = "kite-mcp")]
#[command(about = "Expose a Zerodha Kite account to AI agents as MCP tools over stdio")]
#[command(version)]
pub struct Cli {
    /// Kite Connect API key
    #[arg(long, env = "ZERODHA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Kite Connect API secret
    #[arg(long, env = "ZERODHA_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Port of the local login callback listener
    #[arg(short, long, env = "KITE_MCP_PORT", default_value_t = 5888)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Optional TOML file with timing and endpoint overrides
    #[arg(short, long, env = "KITE_MCP_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingSecret(&'static str),
    #[error("failed to load config file {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid setting in {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: &'static str },
}

/// Settings read from the optional config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_secs: u64,
    pub auth_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    pub bind_host: IpAddr,
    pub kite_api_url: String,
    pub kite_login_url: String,
    pub open_browser: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            auth_timeout_secs: 120,
            shutdown_grace_secs: 5,
            bind_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            kite_api_url: "https://api.kite.trade".to_string(),
            kite_login_url: "https://kite.zerodha.com/connect/login".to_string(),
            open_browser: true,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file_error = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::File {
            path: path.to_path_buf(),
            source,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| file_error(e.into()))?;
        let settings: Self = toml::from_str(&raw).map_err(|e| file_error(e.into()))?;

        if settings.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "poll_interval_secs must be at least 1",
            });
        }
        Ok(settings)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Everything the server needs to start.
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub port: u16,
    pub settings: Settings,
}

impl Config {
    /// Resolve secrets and load the config file. Empty secrets count as missing.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let api_key = non_empty(cli.api_key).ok_or(ConfigError::MissingSecret("ZERODHA_API_KEY"))?;
        let api_secret =
            non_empty(cli.api_secret).ok_or(ConfigError::MissingSecret("ZERODHA_API_SECRET"))?;
        let settings = match cli.config.as_deref() {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        Ok(Self {
            api_key,
            api_secret,
            port: cli.port,
            settings,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
