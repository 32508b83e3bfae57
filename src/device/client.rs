//! DeviceClient - HTTP calls to the ESP8266 relay controller
//!
//! The firmware exposes:
//! - `GET  {base}/status`       → `{"relays": [bool; 4], ...}`
//! - `POST {base}/control/{id}` with `{"state": bool}` → `{"success": bool, "state": bool}`

use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::DeviceConfig;
use crate::models::{RelayControl, RelayId};

/// Everything that makes the device count as unreachable.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid response from {url}: {reason}")]
    InvalidBody { url: String, reason: String },
}

impl DeviceError {
    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DeviceError::Timeout {
                url: url.to_string(),
            }
        } else {
            DeviceError::Request {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

#[derive(Clone)]
pub struct DeviceClient {
    http_client: reqwest::Client,
    config: DeviceConfig,
}

impl DeviceClient {
    pub fn new(config: DeviceConfig) -> anyhow::Result<Self> {
        let timeout = config.timeout();
        Self::with_timeout(config, timeout)
    }

    pub fn with_timeout(config: DeviceConfig, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Fetch the device status object.
    pub async fn fetch_status(&self) -> Result<Map<String, Value>, DeviceError> {
        let url = self.config.status_url();
        tracing::info!("Fetching status from ESP8266 at {}", url);

        let resp = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| DeviceError::from_reqwest(&url, e))?;

        match read_json(&url, resp).await? {
            Value::Object(status) => Ok(status),
            other => Err(DeviceError::InvalidBody {
                url,
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    /// Ask the device to switch one relay. Returns the device reply unchanged.
    pub async fn set_relay(
        &self,
        relay: RelayId,
        control: RelayControl,
    ) -> Result<Value, DeviceError> {
        let url = self.config.relay_control_url(relay.index());
        tracing::info!("Setting relay {} to {} at {}", relay, control.label(), url);

        let resp = self
            .http_client
            .post(&url)
            .json(&control)
            .send()
            .await
            .map_err(|e| DeviceError::from_reqwest(&url, e))?;

        match read_json(&url, resp).await? {
            reply @ Value::Object(_) => Ok(reply),
            other => Err(DeviceError::InvalidBody {
                url,
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }
}

async fn read_json(url: &str, resp: reqwest::Response) -> Result<Value, DeviceError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(DeviceError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| DeviceError::from_reqwest(url, e))?;

    serde_json::from_slice(&bytes).map_err(|e| DeviceError::InvalidBody {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
