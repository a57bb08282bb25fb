//! Generation pipeline module
//!
//! Contains the four-stage content generation pipeline: idea, caption,
//! image, and tag generation, plus the orchestrator that sequences them
//! into a single run producing a [`types::ContentBundle`].

pub mod config;
pub mod gemini;
pub mod gemini_types;
pub mod generators;
pub mod orchestrator;
pub mod types;

pub use config::{ImagePromptMode, PipelineConfig};
pub use orchestrator::PipelineOrchestrator;
pub use types::{ContentBundle, ContentIdea, Stage};
