//! Scheduler API handlers
//!
//! Advisory queries over the scheduler configuration. The firing decision
//! itself lives in the scheduler loop; these handlers never gate it.

use crate::api::AppState;
use crate::scheduler::slots::{next_fire, NextFire};
use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

/// Next-fire response
#[derive(Serialize)]
pub struct NextFireResponse {
    /// The upcoming fire time, absent when no targets are configured
    pub next_fire: Option<NextFire>,
}

/// GET /api/scheduler/next-fire - Compute the upcoming fire time
pub async fn get_next_fire(State(state): State<Arc<AppState>>) -> Json<NextFireResponse> {
    let targets = state.settings.read().await.target_times.clone();
    let now = chrono::Local::now().naive_local();

    Json(NextFireResponse {
        next_fire: next_fire(&targets, now),
    })
}
