//! Pipeline configuration
//!
//! Centralized configuration for the generation pipeline.

use serde::{Deserialize, Serialize};

/// Which prompt the image stage receives
///
/// The source history of this system used both variants at different points,
/// so the choice is a configuration parameter rather than hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImagePromptMode {
    /// Prompt the image model with the short topic only
    #[default]
    TopicOnly,
    /// Prompt the image model with the full detail paragraph
    FullDetail,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Model used for idea, caption, and tag generation
    pub text_model: String,
    /// Image-capable model used for image generation
    pub image_model: String,
    /// Timeout applied to each individual stage call, in seconds
    pub stage_timeout_secs: u64,
    /// Which prompt the image stage receives
    pub image_prompt_mode: ImagePromptMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.0-flash-exp".to_string(),
            stage_timeout_secs: 60,
            image_prompt_mode: ImagePromptMode::default(),
        }
    }
}
