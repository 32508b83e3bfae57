//! HTTP handlers module

mod relay;

pub use self::relay::*;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub last_device_contact: Option<DateTime<Utc>>,
}

/// Health check handler. Reports the gateway only; the device is not contacted.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        last_device_contact: state.cache.last_device_contact().await,
    })
}
