//! Process configuration.
//!
//! Configuration is resolved exactly once at startup into an immutable
//! [`Config`] value which the server receives by `Arc`. Values come from
//! three layers, highest precedence first:
//!
//! 1. Environment variables (`PORT`, `CONTEXT7_API_URL`, `CONTEXT7_API_KEY`)
//! 2. An optional TOML file passed with `--config`
//! 3. Built-in defaults
//!
//! The API key is only ever read from the environment and never logged.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8081
//!
//! [upstream]
//! api_url = "https://api.context7.com"
//! timeout_secs = 60
//! ```

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const PORT_VAR: &str = "PORT";
pub const API_URL_VAR: &str = "CONTEXT7_API_URL";
pub const API_KEY_VAR: &str = "CONTEXT7_API_KEY";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_API_URL: &str = "https://api.context7.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn new(server: ServerConfig, upstream: UpstreamConfig) -> Self {
        Self { server, upstream }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Address handed to the TCP listener, e.g. `0.0.0.0:8081`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Where and how to reach the Context7 API.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_url: Url,
    pub api_key: String,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Build an upstream config with the default timeout.
    ///
    /// # Errors
    ///
    /// Fails if `api_url` is not an absolute `http`/`https` URL or if
    /// `api_key` is blank.
    pub fn new(api_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            bail!("{} must not be empty", API_KEY_VAR);
        }
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============ TOML file layer ============

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: FileServerConfig,
    #[serde(default)]
    upstream: FileUpstreamConfig,
}

#[derive(Debug, Deserialize)]
struct FileServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileUpstreamConfig {
    #[serde(default = "default_api_url")]
    api_url: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for FileUpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// ============ Loading ============

/// Load configuration from the process environment and an optional TOML file.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration using `env` as the environment lookup.
///
/// The missing-key check runs first so a process without credentials
/// fails with that message even when other settings are also wrong.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = env(API_KEY_VAR)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| anyhow!("{} environment variable is required", API_KEY_VAR))?;

    let file = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<FileConfig>(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        }
        None => FileConfig::default(),
    };

    let port = match env(PORT_VAR).filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .with_context(|| format!("{} must be a valid port number, got '{}'", PORT_VAR, raw))?,
        None => file.server.port,
    };

    let api_url = env(API_URL_VAR)
        .filter(|raw| !raw.trim().is_empty())
        .unwrap_or(file.upstream.api_url);

    if file.upstream.timeout_secs == 0 {
        bail!("upstream.timeout_secs must be > 0");
    }

    let upstream = UpstreamConfig::new(&api_url, api_key)?
        .with_timeout(Duration::from_secs(file.upstream.timeout_secs));

    Ok(Config {
        server: ServerConfig {
            host: file.server.host,
            port,
        },
        upstream,
    })
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .with_context(|| format!("{} is not a valid URL: '{}'", API_URL_VAR, raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!(
            "{} must use http or https, got scheme '{}'",
            API_URL_VAR,
            other
        ),
    }
}
