//! Post content API handlers
//!
//! On-demand pipeline runs and deliveries. Unlike the scheduler loop, these
//! handlers propagate pipeline and delivery errors to the caller as typed
//! JSON errors.

use crate::api::AppState;
use crate::delivery::DeliveryReceipt;
use crate::error::AppError;
use crate::pipeline::types::ContentBundle;
use axum::{extract::State, response::Json};
use serde::Deserialize;
use std::sync::Arc;

/// Send post request
#[derive(Deserialize)]
pub struct SendPostRequest {
    /// The bundle to deliver
    pub bundle: ContentBundle,
    /// Recipient override; the configured recipient is used when omitted
    pub recipient: Option<String>,
}

/// POST /api/posts/generate - Run the full pipeline once
pub async fn generate_post(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContentBundle>, AppError> {
    tracing::info!("On-demand pipeline run requested");
    let bundle = state.orchestrator.run().await?;
    Ok(Json(bundle))
}

/// POST /api/posts/send - Deliver a bundle to the recipient
pub async fn send_post(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendPostRequest>,
) -> Result<Json<DeliveryReceipt>, AppError> {
    let recipient = match request.recipient {
        Some(recipient) => recipient,
        None => state.settings.read().await.recipient.clone(),
    };

    let receipt = state.dispatcher.deliver(&request.bundle, &recipient).await?;
    Ok(Json(receipt))
}
