//! Shared handler state

use crate::cache::StatusCache;
use crate::config::DeviceConfig;
use crate::device::DeviceClient;

#[derive(Clone)]
pub struct AppState {
    pub device: DeviceClient,
    pub cache: StatusCache,
}

impl AppState {
    pub fn new(device_config: DeviceConfig) -> anyhow::Result<Self> {
        Ok(Self {
            device: DeviceClient::new(device_config)?,
            cache: StatusCache::new(),
        })
    }
}
