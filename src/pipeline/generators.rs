//! Generator collaborator traits
//!
//! Each pipeline stage is an external request/response call behind a trait,
//! so the orchestrator can be exercised with mock collaborators in tests.
//! Implementations return `anyhow::Result`; the orchestrator attaches the
//! failing stage when converting to an application error.

use crate::pipeline::types::ContentIdea;
use async_trait::async_trait;

/// Produces a single content idea (topic + detail). Takes no input.
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    /// Suggest one content idea
    async fn suggest_idea(&self) -> anyhow::Result<ContentIdea>;
}

/// Produces a long-form caption from a topic and its supporting detail.
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    /// Generate a caption for the given topic and detail
    async fn generate_caption(&self, topic: &str, detail: &str) -> anyhow::Result<String>;
}

/// Produces an image reference (URI or inline data reference) from a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image and return its reference
    async fn generate_image(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Produces a list of raw tags for a caption. An empty list is tolerated.
#[async_trait]
pub trait TagOptimizer: Send + Sync {
    /// Optimize tags for the given caption and topic
    async fn optimize_tags(&self, caption: &str, topic: &str) -> anyhow::Result<Vec<String>>;
}
