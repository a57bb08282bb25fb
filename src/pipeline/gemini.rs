//! Gemini API client and generator implementations
//!
//! Direct HTTP client for calling the Gemini `generateContent` API, plus the
//! four production generators built on top of it. The prompts steer the model
//! toward short factual science/technology content suitable for a social post.

use crate::pipeline::config::PipelineConfig;
use crate::pipeline::gemini_types::{
    GeminiApiRequest, GeminiApiResponse, GenerationConfig, RequestContent, RequestPart,
};
use crate::pipeline::generators::{CaptionGenerator, IdeaGenerator, ImageGenerator, TagOptimizer};
use crate::pipeline::types::ContentIdea;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fixed footer appended to every generated caption
const CAPTION_ATTRIBUTION: &str = "This post was generated by AI.";

const IDEA_PROMPT: &str = r#"You are a highly factual content creator AI specializing in surprising, verified facts about everyday technology, science, and human inventions. Produce EXACTLY ONE post idea for a social media account.

Return only a JSON object with these two fields and nothing else:
- "topic": a concise 3-6 word topic line for the post. It will also be reused as the prompt for caption, tag, and image generation.
- "detail": a RICH and DETAILED factual paragraph (roughly 100-150 words worth of source material) about the topic. All information must come from public, verifiable sources.

Example output format:
{
  "topic": "Everyday Tech: Origin of QWERTY",
  "detail": "The QWERTY keyboard layout was not designed to slow typists down but to keep the type bars of mechanical typewriters from jamming..."
}"#;

/// Shared client for the Gemini `generateContent` endpoint
///
/// One instance (one `reqwest::Client`) is shared by all four generators so
/// HTTP connections are pooled across stages.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client against the production Gemini endpoint
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self::with_base_url(http, api_key, GEMINI_API_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (for testing)
    pub fn with_base_url(http: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }

    /// Call the Gemini API with a text prompt and return the text response
    ///
    /// # Arguments
    /// * `model` - Model name (e.g., "gemini-2.5-flash")
    /// * `prompt` - The prompt to send
    /// * `force_json` - If true, request JSON response format
    ///
    /// # Errors
    /// Returns an error if the API key is missing, the HTTP request fails,
    /// the response cannot be parsed, the prompt was blocked, or no valid
    /// text content is found in the response.
    pub async fn generate_text(
        &self,
        model: &str,
        prompt: &str,
        force_json: bool,
    ) -> anyhow::Result<String> {
        let generation_config = force_json.then(|| GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_modalities: None,
        });

        let parsed = self.generate(model, prompt, generation_config).await?;

        let candidate = parsed
            .candidates
            .first()
            .ok_or_else(|| anyhow!("Gemini API response contains no candidates"))?;

        let text = candidate
            .content
            .parts
            .iter()
            .find_map(|part| part.text.as_deref())
            .ok_or_else(|| anyhow!("Gemini API response candidate contains no text part"))?;

        if text.is_empty() {
            return Err(anyhow!("Gemini API response text is empty"));
        }

        tracing::debug!(
            model = %model,
            response_len = text.len(),
            "Successfully received text response from Gemini API"
        );

        Ok(text.to_string())
    }

    /// Call an image-capable Gemini model and return the image as a data URI
    ///
    /// Requests both IMAGE and TEXT response modalities (the image models
    /// require both) and converts the inline payload into a
    /// `data:<mime>;base64,<data>` reference.
    pub async fn generate_image(&self, model: &str, prompt: &str) -> anyhow::Result<String> {
        let generation_config = Some(GenerationConfig {
            response_mime_type: None,
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
        });

        let parsed = self.generate(model, prompt, generation_config).await?;

        let candidate = parsed
            .candidates
            .first()
            .ok_or_else(|| anyhow!("Gemini API response contains no candidates"))?;

        let inline = candidate
            .content
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref())
            .ok_or_else(|| anyhow!("Gemini API response contains no inline image data"))?;

        if inline.data.is_empty() {
            return Err(anyhow!("Gemini API returned empty image data"));
        }

        tracing::debug!(
            model = %model,
            mime_type = %inline.mime_type,
            data_len = inline.data.len(),
            "Successfully received image response from Gemini API"
        );

        Ok(format!("data:{};base64,{}", inline.mime_type, inline.data))
    }

    /// Shared request/response handling for `generateContent` calls
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        generation_config: Option<GenerationConfig>,
    ) -> anyhow::Result<GeminiApiResponse> {
        if self.api_key.is_empty() {
            return Err(anyhow!("API key is empty"));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let request_body = GeminiApiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        };

        tracing::debug!(
            model = %model,
            prompt_len = prompt.len(),
            "Calling Gemini API"
        );

        let response = self
            .http
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send HTTP request to Gemini API: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                status_code = status_code,
                error_body = %error_body,
                "Gemini API returned error status"
            );

            if status_code == 429 {
                return Err(anyhow!(
                    "Gemini API rate limit exceeded (HTTP {}): {}",
                    status_code,
                    error_body
                ));
            }

            return Err(anyhow!(
                "Gemini API returned error status {}: {}",
                status_code,
                error_body
            ));
        }

        let response_body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body from Gemini API: {}", e))?;

        let parsed: GeminiApiResponse = serde_json::from_str(&response_body).map_err(|e| {
            anyhow!(
                "Failed to parse JSON response from Gemini API: {} - Response body: {}",
                e,
                response_body
            )
        })?;

        if let Some(feedback) = &parsed.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(anyhow!("Gemini API blocked the prompt: {}", reason));
            }
        }

        Ok(parsed)
    }
}

/// Idea generator backed by a JSON-mode Gemini call
pub struct GeminiIdeaGenerator {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiIdeaGenerator {
    /// Create a generator using the text model from the pipeline config
    pub fn new(client: Arc<GeminiClient>, config: &PipelineConfig) -> Self {
        Self {
            client,
            model: config.text_model.clone(),
        }
    }
}

/// JSON shape the idea prompt asks the model for
#[derive(Deserialize)]
struct IdeaResponse {
    topic: String,
    detail: String,
}

#[async_trait]
impl IdeaGenerator for GeminiIdeaGenerator {
    async fn suggest_idea(&self) -> anyhow::Result<ContentIdea> {
        let raw = self
            .client
            .generate_text(&self.model, IDEA_PROMPT, true)
            .await?;

        let idea: IdeaResponse = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Failed to parse idea JSON: {} - body: {}", e, raw))?;

        Ok(ContentIdea {
            topic: idea.topic,
            detail: idea.detail,
        })
    }
}

/// Caption generator backed by a plain-text Gemini call
pub struct GeminiCaptionGenerator {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiCaptionGenerator {
    /// Create a generator using the text model from the pipeline config
    pub fn new(client: Arc<GeminiClient>, config: &PipelineConfig) -> Self {
        Self {
            client,
            model: config.text_model.clone(),
        }
    }
}

#[async_trait]
impl CaptionGenerator for GeminiCaptionGenerator {
    async fn generate_caption(&self, topic: &str, detail: &str) -> anyhow::Result<String> {
        let prompt = format!(
            "You are an AI expert at writing highly engaging, informative, and easy-to-read \
             social media captions about technology, science, and human inventions.\n\n\
             Your task:\n\
             1. Open with a vivid hook.\n\
             2. Explain the topic in roughly 100-150 words using only the key information \
                provided below. Keep it factual and clear.\n\
             3. If an obscure scientific or technical term appears, briefly explain it in \
                parentheses in plain language.\n\
             4. Close with a creative question or statement that invites curiosity; avoid \
                stock phrases like \"let us know in the comments\".\n\
             5. Use fitting emoji throughout to make the caption engaging.\n\n\
             Topic: {}\n\
             Key information (base the caption on this): {}",
            topic, detail
        );

        let caption = self.client.generate_text(&self.model, &prompt, false).await?;
        Ok(format!("{}\n\n\n{}", caption.trim(), CAPTION_ATTRIBUTION))
    }
}

/// Image generator backed by an image-capable Gemini model
pub struct GeminiImageGenerator {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiImageGenerator {
    /// Create a generator using the image model from the pipeline config
    pub fn new(client: Arc<GeminiClient>, config: &PipelineConfig) -> Self {
        Self {
            client,
            model: config.image_model.clone(),
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate_image(&self, prompt: &str) -> anyhow::Result<String> {
        let full_prompt = format!(
            "Create a vivid, high-quality science/technology themed visual expressing the \
             topic \"{}\". Photorealistic or digital-art style. VERY IMPORTANT: the image \
             must contain absolutely NO text, letters, digits, numbers, or logos of any \
             kind. Purely visual elements only.",
            prompt
        );
        self.client.generate_image(&self.model, &full_prompt).await
    }
}

/// Tag optimizer backed by a JSON-mode Gemini call
pub struct GeminiTagOptimizer {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiTagOptimizer {
    /// Create an optimizer using the text model from the pipeline config
    pub fn new(client: Arc<GeminiClient>, config: &PipelineConfig) -> Self {
        Self {
            client,
            model: config.text_model.clone(),
        }
    }
}

/// JSON shape the tag prompt asks the model for
#[derive(Deserialize)]
struct TagsResponse {
    tags: Vec<String>,
}

#[async_trait]
impl TagOptimizer for GeminiTagOptimizer {
    async fn optimize_tags(&self, caption: &str, topic: &str) -> anyhow::Result<Vec<String>> {
        let prompt = format!(
            "You are a social media marketing expert specializing in hashtag optimization. \
             Given the post caption and topic below, provide a list of relevant, \
             high-engagement tags.\n\n\
             Topic: {}\n\
             Post caption: {}\n\n\
             Return only a JSON object of the form {{\"tags\": [\"...\"]}}. The tags must \
             NOT include the '#' symbol - just the words or phrases.",
            topic, caption
        );

        let raw = self.client.generate_text(&self.model, &prompt, true).await?;

        let parsed: TagsResponse = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Failed to parse tags JSON: {} - body: {}", e, raw))?;

        Ok(parsed.tags)
    }
}
