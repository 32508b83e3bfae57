//! Configuration module

use std::time::Duration;

use serde::Deserialize;

/// Legacy variable naming the device base URL, honoured over every other source.
pub const DEVICE_URL_ENV: &str = "ESP8266_IP";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DeviceConfig {
    #[cfg(test)]
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self {
            base_url,
            timeout_secs: default_timeout_secs(),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `{base}/status`
    pub fn status_url(&self) -> String {
        format!("{}/status", self.base_url)
    }

    /// `{base}/control`
    pub fn control_url(&self) -> String {
        format!("{}/control", self.base_url)
    }

    /// `{base}/control/{relay_id}`
    pub fn relay_control_url(&self, relay_id: usize) -> String {
        format!("{}/{}", self.control_url(), relay_id)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_base_url() -> String {
    "http://192.168.82.90".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

/// Validate an http(s) base URL and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| anyhow::anyhow!("invalid device base URL {:?}: {}", raw, e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("unsupported device URL scheme {:?} in {:?}", other, raw),
    }
    if parsed.host_str().is_none() {
        anyhow::bail!("device base URL {:?} has no host", raw);
    }

    Ok(trimmed.to_string())
}

/// Prefix for `RELAY_GATEWAY__SECTION__KEY` overrides.
const ENV_PREFIX: &str = "RELAY_GATEWAY";

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(environment(), std::env::var(DEVICE_URL_ENV).ok())
    }

    fn load_from(env: config::Environment, device_url: Option<String>) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(env)
            .build()?;

        let mut config: Config = settings.try_deserialize()?;

        if let Some(url) = device_url {
            config.device.base_url = url;
        }
        config.device.base_url = normalize_base_url(&config.device.base_url)?;

        if config.device.timeout_secs == 0 {
            anyhow::bail!("device.timeout_secs must be at least 1");
        }

        Ok(config)
    }
}
