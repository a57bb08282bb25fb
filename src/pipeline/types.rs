//! Core pipeline data types
//!
//! Defines the content bundle assembled by the pipeline and the stage
//! identifiers used by the error taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies which generation stage produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Content idea generation (topic + detail)
    Idea,
    /// Caption generation
    Caption,
    /// Image generation
    Image,
    /// Tag optimization
    Tags,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idea => "Idea",
            Stage::Caption => "Caption",
            Stage::Image => "Image",
            Stage::Tags => "Tags",
        };
        write!(f, "{}", name)
    }
}

/// A content idea produced by the first pipeline stage
///
/// Both fields must be non-empty. The idea is produced once per pipeline run
/// and is immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentIdea {
    /// Short topic line (3-6 words), reused by the later stages
    pub topic: String,
    /// Rich factual paragraph the caption is built from
    pub detail: String,
}

/// The fully assembled content bundle, ready for delivery
///
/// Created only after every required stage has succeeded; a failed run never
/// produces a partially populated bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBundle {
    /// The idea the bundle was generated from
    pub idea: ContentIdea,
    /// Long-form caption text
    pub caption: String,
    /// Image reference: a URI or an inline `data:image/...` reference
    pub image_reference: String,
    /// Sanitized tags, in optimizer order, duplicates preserved
    pub tags: Vec<String>,
    /// When the bundle was assembled
    pub created_at: DateTime<Utc>,
}

/// Sanitize a list of raw tags returned by the tag optimizer
///
/// Strips leading `#` characters, trims surrounding whitespace, and drops
/// entries that end up empty. The original relative order is preserved and
/// duplicates are intentionally not removed.
pub fn sanitize_tags(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|tag| tag.trim_start_matches('#').trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
