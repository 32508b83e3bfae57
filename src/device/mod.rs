//! Device module - ESP8266 relay controller access

mod client;
#[cfg(test)]
pub(crate) mod mock;

pub use self::client::{DeviceClient, DeviceError};
