//! Relay handlers - status polling and on/off control, proxied to the device

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{ControlOutcome, RelayControl, RelayId};
use crate::state::AppState;

/// GET /api/status - Device status, or the last cached status when the device is unreachable
pub async fn get_status(State(state): State<AppState>) -> Json<Value> {
    match state.device.fetch_status().await {
        Ok(status) => {
            state.cache.merge(&status).await;
            Json(Value::Object(status))
        }
        Err(e) => {
            tracing::error!("Error fetching status from ESP8266: {}", e);
            Json(state.cache.snapshot().await)
        }
    }
}

/// POST /api/control/:relay_id - Switch one relay on or off
pub async fn control_relay(
    State(state): State<AppState>,
    Path(relay_id): Path<i64>,
    Json(control): Json<RelayControl>,
) -> Result<Json<Value>, AppError> {
    let relay = RelayId::try_from(relay_id).map_err(|e| {
        tracing::warn!("Rejected control request for relay {}", relay_id);
        e
    })?;

    let reply = state
        .device
        .set_relay(relay, control)
        .await
        .map_err(|e| {
            tracing::error!("Error controlling relay {}: {}", relay, e);
            AppError::from(e)
        })?;

    let outcome = ControlOutcome::from_reply(&reply);
    if outcome.success {
        match outcome.state {
            Some(on) => state.cache.set_relay(relay, on).await,
            None => tracing::warn!(
                "ESP8266 reported success for relay {} without a boolean state, cache not updated",
                relay
            ),
        }
    } else {
        tracing::warn!("ESP8266 did not confirm relay {} change: {}", relay, reply);
    }

    Ok(Json(reply))
}
