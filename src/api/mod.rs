//! HTTP API handlers
//!
//! Contains the shared handler state and the request handlers for on-demand
//! generation, delivery, curator settings, and scheduler queries.

pub mod posts;
pub mod scheduler;
pub mod settings;

use crate::delivery::Dispatcher;
use crate::pipeline::PipelineOrchestrator;
use crate::state::{ConfigStore, CuratorSettings};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared state handed to every API handler
///
/// `settings` is the same lock the scheduler reads, so config updates made
/// through the API are visible to the scheduler on its next tick.
pub struct AppState {
    /// In-memory curator settings, shared with the scheduler loop
    pub settings: Arc<RwLock<CuratorSettings>>,
    /// Settings persistence
    pub store: Arc<dyn ConfigStore>,
    /// The content generation pipeline
    pub orchestrator: Arc<PipelineOrchestrator>,
    /// Notification delivery
    pub dispatcher: Arc<Dispatcher>,
}
