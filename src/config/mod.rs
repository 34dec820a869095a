//! Web UI configuration
//!
//! The controller takes one [`WebUiConfig`] snapshot when the plugin is
//! constructed and never re-reads it. Hosts hand it over either as the JSON
//! plugin config section or through `WEBUI_*` environment variables collected
//! by [`ConfigService`].

use dashmap::DashMap;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Prefix of the environment variables read by [`ConfigService::from_env`]
pub const ENV_PREFIX: &str = "WEBUI_";

const DEFAULT_PORT: u16 = 8888;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Malformed web UI configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Web UI configuration not provided")]
    Missing,
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Key/value configuration source
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `WEBUI_*` variable of the process environment
    pub fn from_env() -> Self {
        let service = Self::new();
        for (key, value) in env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)) {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

/// Session signing key for the web UI
///
/// Never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// A fresh random key, used when the configuration leaves it empty
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// Read-only configuration snapshot of the embedded web UI
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebUiConfig {
    /// Port to listen on; `0` picks an ephemeral port
    pub port: u16,
    pub secret_key: SecretKey,
    /// When false, `start()` refuses to run the server
    pub enabled: bool,
    /// Bind host
    pub host: String,
    /// Host shown to operators in URLs, when it differs from the bind host
    pub public_host: Option<String>,
    /// Upper bound for draining the server during host teardown
    pub drain_timeout_ms: u64,
}

impl Default for WebUiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            secret_key: SecretKey::default(),
            enabled: true,
            host: DEFAULT_HOST.to_string(),
            public_host: None,
            drain_timeout_ms: DEFAULT_DRAIN_TIMEOUT_MS,
        }
    }
}

impl WebUiConfig {
    /// Parse the plugin's JSON config section; missing fields take defaults
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ConfigError> {
        Ok(Self::deserialize(value)?)
    }

    /// Read `WEBUI_*` keys; absent keys keep their defaults
    pub fn from_config_service(service: &ConfigService) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = service.get("WEBUI_PORT") {
            config.port = parse_key("WEBUI_PORT", &raw)?;
        }
        if let Some(raw) = service.get("WEBUI_SECRET_KEY") {
            config.secret_key = SecretKey::new(raw);
        }
        if let Some(raw) = service.get("WEBUI_ENABLED") {
            config.enabled = parse_bool("WEBUI_ENABLED", &raw)?;
        }
        if let Some(raw) = service.get("WEBUI_HOST") {
            let host = raw.trim();
            if host.is_empty() {
                return Err(ConfigError::invalid("WEBUI_HOST", "must not be empty"));
            }
            config.host = host.to_string();
        }
        if let Some(raw) = service.get("WEBUI_PUBLIC_HOST") {
            let host = raw.trim();
            config.public_host = (!host.is_empty()).then(|| host.to_string());
        }
        if let Some(raw) = service.get("WEBUI_DRAIN_TIMEOUT_MS") {
            config.drain_timeout_ms = parse_key("WEBUI_DRAIN_TIMEOUT_MS", &raw)?;
        }

        Ok(config)
    }

    /// Fill in what the controller needs before taking the snapshot
    pub(crate) fn normalized(mut self) -> Self {
        if self.secret_key.is_empty() {
            tracing::info!("No web UI secret key configured, generated a random one");
            self.secret_key = SecretKey::generate();
        }
        self
    }

    /// `host:port` string handed to the socket layer
    pub fn bind_address(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    /// Host name operators should type into a browser
    pub fn display_host(&self) -> String {
        if let Some(host) = &self.public_host {
            return host.clone();
        }
        match self.host.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() || ip.is_loopback() => "localhost".to_string(),
            Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
            _ => self.host.clone(),
        }
    }

    /// Operator-facing URL for a server listening on `port`
    pub fn url_for(&self, port: u16) -> String {
        format!("http://{}:{}", self.display_host(), port)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

fn parse_key<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, format!("'{}': {}", raw, e)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(
            key,
            format!("'{}' is not a boolean", other),
        )),
    }
}
