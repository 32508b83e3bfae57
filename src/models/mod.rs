//! Data models

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Number of relays on the controller board.
pub const RELAY_COUNT: usize = 4;

/// A validated relay index in `0..RELAY_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelayId(usize);

impl RelayId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for RelayId {
    type Error = AppError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        usize::try_from(raw)
            .ok()
            .filter(|idx| *idx < RELAY_COUNT)
            .map(RelayId)
            .ok_or_else(|| AppError::BadRequest("Invalid relay ID".to_string()))
    }
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `POST /api/control/:relay_id`, forwarded to the device as-is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayControl {
    pub state: bool,
}

impl RelayControl {
    pub fn label(&self) -> &'static str {
        if self.state {
            "ON"
        } else {
            "OFF"
        }
    }
}

/// The fields of a control reply the gateway acts on.
///
/// The device reply is returned to the caller untouched; this is only a view of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOutcome {
    pub success: bool,
    pub state: Option<bool>,
}

impl ControlOutcome {
    pub fn from_reply(reply: &serde_json::Value) -> Self {
        Self {
            success: reply
                .get("success")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            state: reply.get("state").and_then(|v| v.as_bool()),
        }
    }
}
