//! Curator settings API handlers
//!
//! Reads and updates the recipient and target times. Updates are validated,
//! normalized, persisted through the settings store, and written to the
//! shared in-memory settings so the scheduler picks them up on its next
//! tick.

use crate::api::AppState;
use crate::error::AppError;
use crate::scheduler::slots::TargetTime;
use crate::state::CuratorSettings;
use axum::{extract::State, response::Json};
use serde::Deserialize;
use std::sync::Arc;

/// Update settings request
#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    /// Recipient address for scheduled deliveries
    pub recipient: String,
    /// Times of day at which the pipeline fires
    pub target_times: Vec<TargetTimeRequest>,
}

/// A target time as submitted by the client, range-checked before use
#[derive(Deserialize)]
pub struct TargetTimeRequest {
    /// Hour of day, 0-23
    pub hour: u8,
    /// Minute of hour, 0-59
    pub minute: u8,
}

/// GET /api/config - Read the current curator settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<CuratorSettings> {
    Json(state.settings.read().await.clone())
}

/// POST /api/config - Update and persist the curator settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<CuratorSettings>, AppError> {
    let target_times = request
        .target_times
        .iter()
        .map(|t| TargetTime::new(t.hour, t.minute).map_err(AppError::Configuration))
        .collect::<Result<Vec<_>, _>>()?;

    let mut settings = CuratorSettings {
        recipient: request.recipient,
        target_times,
    };
    settings.validate()?;
    settings.normalize();

    state.store.save(&settings)?;

    let mut shared = state.settings.write().await;
    *shared = settings.clone();

    tracing::info!(
        recipient = %settings.recipient,
        target_count = settings.target_times.len(),
        "Curator settings updated"
    );

    Ok(Json(settings))
}
