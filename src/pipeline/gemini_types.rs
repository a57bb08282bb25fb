//! Gemini API wire types
//!
//! Structs that mirror the Gemini API JSON request/response format.
//! Used to serialize requests and deserialize API responses into typed
//! Rust structs.

use serde::{Deserialize, Serialize};

/// Top-level Gemini API response
#[derive(Deserialize, Debug)]
pub struct GeminiApiResponse {
    /// List of candidate responses from the model
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Optional feedback about the prompt (e.g., if it was blocked)
    #[serde(default, rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A single candidate response from the model
#[derive(Deserialize, Debug)]
pub struct Candidate {
    /// The content of this candidate
    pub content: Content,
    /// Why the model stopped generating (if applicable)
    #[serde(default, rename = "finishReason")]
    #[allow(dead_code)] // Part of API response format, may be used in future
    pub finish_reason: Option<String>,
}

/// Content structure containing parts of the response
#[derive(Deserialize, Debug)]
pub struct Content {
    /// List of content parts (text, or inline image data for image models)
    pub parts: Vec<Part>,
    /// Role of the content (e.g., "model")
    #[serde(default)]
    #[allow(dead_code)] // Part of API response format, may be used in future
    pub role: String,
}

/// A single part of content
///
/// Text models return a `text` part; image-capable models return an
/// `inline_data` part carrying base64-encoded image bytes.
#[derive(Deserialize, Debug)]
pub struct Part {
    /// The text content of this part, if any
    #[serde(default)]
    pub text: Option<String>,
    /// Inline binary data (images), if any
    #[serde(default, rename = "inlineData")]
    pub inline_data: Option<InlineData>,
}

/// Inline binary payload returned by image-capable models
#[derive(Deserialize, Debug)]
pub struct InlineData {
    /// MIME type of the payload (e.g., "image/png")
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Base64-encoded payload bytes
    pub data: String,
}

/// Feedback about the prompt (e.g., if it was blocked)
#[derive(Deserialize, Debug)]
pub struct PromptFeedback {
    /// Reason the prompt was blocked (if applicable)
    #[serde(default, rename = "blockReason")]
    pub block_reason: Option<String>,
}

/// Request structure for Gemini API
#[derive(Serialize, Debug)]
pub struct GeminiApiRequest {
    /// List of content items to send
    pub contents: Vec<RequestContent>,
    /// Optional generation configuration
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Content structure for requests
#[derive(Serialize, Debug)]
pub struct RequestContent {
    /// List of content parts
    pub parts: Vec<RequestPart>,
}

/// A single part for requests (typically text)
#[derive(Serialize, Debug)]
pub struct RequestPart {
    /// The text content
    pub text: String,
}

/// Generation configuration for requests
#[derive(Serialize, Debug)]
pub struct GenerationConfig {
    /// MIME type to force for response (e.g., "application/json")
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// Response modalities to request (e.g., ["IMAGE", "TEXT"] for image models)
    #[serde(rename = "responseModalities", skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}
