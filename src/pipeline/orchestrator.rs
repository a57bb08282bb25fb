//! Pipeline orchestrator
//!
//! Sequences the four generator calls into one pipeline run:
//! Idea -> (Caption || Image) -> Tags -> ContentBundle.
//!
//! Stage 2 is a two-way fan-out joined with `tokio::join!` - both calls run
//! concurrently and both complete (or fail) before stage 3 begins. One failure
//! anywhere aborts the whole run with a single typed error identifying the
//! failing stage; no stage is retried and no partial bundle is retained.

use crate::error::AppError;
use crate::pipeline::config::{ImagePromptMode, PipelineConfig};
use crate::pipeline::generators::{CaptionGenerator, IdeaGenerator, ImageGenerator, TagOptimizer};
use crate::pipeline::types::{sanitize_tags, ContentBundle, Stage};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

/// Orchestrates one full pipeline run
///
/// Holds no state between runs; every `run()` call is independent.
pub struct PipelineOrchestrator {
    idea: Arc<dyn IdeaGenerator>,
    caption: Arc<dyn CaptionGenerator>,
    image: Arc<dyn ImageGenerator>,
    tags: Arc<dyn TagOptimizer>,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    /// Create an orchestrator over the four generator collaborators
    pub fn new(
        idea: Arc<dyn IdeaGenerator>,
        caption: Arc<dyn CaptionGenerator>,
        image: Arc<dyn ImageGenerator>,
        tags: Arc<dyn TagOptimizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            idea,
            caption,
            image,
            tags,
            config,
        }
    }

    /// Execute one full pipeline run
    ///
    /// # Returns
    /// * `Ok(ContentBundle)` - fully populated bundle
    /// * `Err(AppError::Generation)` - the failing stage and underlying cause
    pub async fn run(&self) -> Result<ContentBundle, AppError> {
        let started = std::time::Instant::now();

        // Stage 1: idea. An empty topic or detail fails the run before any
        // later stage is attempted.
        let idea = self.bounded(Stage::Idea, self.idea.suggest_idea()).await?;
        if idea.topic.trim().is_empty() || idea.detail.trim().is_empty() {
            return Err(AppError::generation(
                Stage::Idea,
                "generator returned an empty topic or detail",
            ));
        }
        tracing::debug!(topic = %idea.topic, "Pipeline stage 1 complete");

        // Stage 2: caption and image fan-out. join!, not a race - both calls
        // complete before either result is inspected.
        let image_prompt = match self.config.image_prompt_mode {
            ImagePromptMode::TopicOnly => idea.topic.as_str(),
            ImagePromptMode::FullDetail => idea.detail.as_str(),
        };

        let (caption_result, image_result) = tokio::join!(
            self.bounded(
                Stage::Caption,
                self.caption.generate_caption(&idea.topic, &idea.detail),
            ),
            self.bounded(Stage::Image, self.image.generate_image(image_prompt)),
        );

        // A failure on either branch discards the other branch's result.
        let caption = caption_result?;
        let image_reference = image_result?;

        if caption.trim().is_empty() {
            return Err(AppError::generation(
                Stage::Caption,
                "generator returned an empty caption",
            ));
        }
        if image_reference.trim().is_empty() {
            return Err(AppError::generation(
                Stage::Image,
                "generator returned an empty image reference",
            ));
        }
        tracing::debug!(
            caption_len = caption.len(),
            image_ref_len = image_reference.len(),
            "Pipeline stage 2 complete"
        );

        // Stage 3: tags, sequential because it consumes the caption. An empty
        // tag list is tolerated.
        let raw_tags = self
            .bounded(Stage::Tags, self.tags.optimize_tags(&caption, &idea.topic))
            .await?;
        let tags = sanitize_tags(raw_tags);

        let bundle = ContentBundle {
            idea,
            caption,
            image_reference,
            tags,
            created_at: Utc::now(),
        };

        tracing::info!(
            topic = %bundle.idea.topic,
            tag_count = bundle.tags.len(),
            duration_ms = started.elapsed().as_millis(),
            "Pipeline run complete"
        );

        Ok(bundle)
    }

    /// Wrap a stage call with the configured per-stage timeout and attach the
    /// stage to any failure
    async fn bounded<T>(
        &self,
        stage: Stage,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, AppError> {
        let limit = Duration::from_secs(self.config.stage_timeout_secs);
        match timeout(limit, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(cause)) => {
                tracing::warn!(stage = %stage, cause = %cause, "Pipeline stage failed");
                Err(AppError::generation(stage, cause))
            }
            Err(_) => {
                tracing::warn!(stage = %stage, timeout_secs = limit.as_secs(), "Pipeline stage timed out");
                Err(AppError::generation(
                    stage,
                    format!("timed out after {} seconds", limit.as_secs()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generators::{
        CaptionGenerator, IdeaGenerator, ImageGenerator, TagOptimizer,
    };
    use crate::pipeline::types::ContentIdea;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedIdea {
        topic: String,
        detail: String,
        calls: AtomicUsize,
    }

    impl FixedIdea {
        fn new(topic: &str, detail: &str) -> Self {
            Self {
                topic: topic.to_string(),
                detail: detail.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdeaGenerator for FixedIdea {
        async fn suggest_idea(&self) -> anyhow::Result<ContentIdea> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ContentIdea {
                topic: self.topic.clone(),
                detail: self.detail.clone(),
            })
        }
    }

    struct FixedCaption {
        text: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CaptionGenerator for FixedCaption {
        async fn generate_caption(&self, _topic: &str, _detail: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    struct FailingCaption {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CaptionGenerator for FailingCaption {
        async fn generate_caption(&self, _topic: &str, _detail: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("caption model unavailable"))
        }
    }

    struct RecordingImage {
        reference: String,
        calls: Arc<AtomicUsize>,
        last_prompt: std::sync::Mutex<Option<String>>,
    }

    impl RecordingImage {
        fn new(reference: &str) -> Self {
            Self {
                reference: reference.to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
                last_prompt: std::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for RecordingImage {
        async fn generate_image(&self, prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.reference.clone())
        }
    }

    struct FixedTags {
        tags: Vec<String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TagOptimizer for FixedTags {
        async fn optimize_tags(&self, _caption: &str, _topic: &str) -> anyhow::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.tags.clone())
        }
    }

    fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    fn orchestrator_with(
        idea: Arc<dyn IdeaGenerator>,
        caption: Arc<dyn CaptionGenerator>,
        image: Arc<dyn ImageGenerator>,
        tags: Arc<dyn TagOptimizer>,
    ) -> PipelineOrchestrator {
        PipelineOrchestrator::new(idea, caption, image, tags, PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_successful_run_assembles_full_bundle() {
        let (caption_calls, tag_calls) = counters();
        let image = Arc::new(RecordingImage::new("data:image/png;base64,abc"));

        let orchestrator = orchestrator_with(
            Arc::new(FixedIdea::new("Black Holes", "Dense regions of spacetime.")),
            Arc::new(FixedCaption {
                text: "A caption about black holes.".to_string(),
                calls: caption_calls.clone(),
            }),
            image.clone(),
            Arc::new(FixedTags {
                tags: vec!["#space".to_string(), " science ".to_string()],
                calls: tag_calls.clone(),
            }),
        );

        let bundle = orchestrator.run().await.unwrap();

        assert_eq!(bundle.idea.topic, "Black Holes");
        assert_eq!(bundle.caption, "A caption about black holes.");
        assert_eq!(bundle.image_reference, "data:image/png;base64,abc");
        assert_eq!(bundle.tags, vec!["space", "science"]);
        assert_eq!(caption_calls.load(Ordering::SeqCst), 1);
        assert_eq!(image.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tag_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_topic_fails_idea_stage_without_later_calls() {
        let (caption_calls, tag_calls) = counters();
        let image = Arc::new(RecordingImage::new("ref"));

        let orchestrator = orchestrator_with(
            Arc::new(FixedIdea::new("", "Some detail text.")),
            Arc::new(FixedCaption {
                text: "caption".to_string(),
                calls: caption_calls.clone(),
            }),
            image.clone(),
            Arc::new(FixedTags {
                tags: vec![],
                calls: tag_calls.clone(),
            }),
        );

        let err = orchestrator.run().await.unwrap_err();
        match err {
            AppError::Generation { stage, .. } => assert_eq!(stage, Stage::Idea),
            other => panic!("expected Generation error, got: {}", other),
        }

        // No later stage may have been attempted.
        assert_eq!(caption_calls.load(Ordering::SeqCst), 0);
        assert_eq!(image.calls.load(Ordering::SeqCst), 0);
        assert_eq!(tag_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_caption_failure_discards_image_and_skips_tags() {
        let (caption_calls, tag_calls) = counters();
        let image = Arc::new(RecordingImage::new("ref"));

        let orchestrator = orchestrator_with(
            Arc::new(FixedIdea::new("Mars Rovers", "Robotic explorers on Mars.")),
            Arc::new(FailingCaption {
                calls: caption_calls.clone(),
            }),
            image.clone(),
            Arc::new(FixedTags {
                tags: vec!["mars".to_string()],
                calls: tag_calls.clone(),
            }),
        );

        let err = orchestrator.run().await.unwrap_err();
        match err {
            AppError::Generation { stage, cause } => {
                assert_eq!(stage, Stage::Caption);
                assert!(cause.contains("caption model unavailable"));
            }
            other => panic!("expected Generation error, got: {}", other),
        }

        // The image branch ran (join, not race) but its result was discarded
        // and the tag stage never started.
        assert_eq!(image.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tag_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_caption_result_fails_caption_stage() {
        let (caption_calls, tag_calls) = counters();

        let orchestrator = orchestrator_with(
            Arc::new(FixedIdea::new("Mars Rovers", "Robotic explorers on Mars.")),
            Arc::new(FixedCaption {
                text: "   ".to_string(),
                calls: caption_calls,
            }),
            Arc::new(RecordingImage::new("ref")),
            Arc::new(FixedTags {
                tags: vec![],
                calls: tag_calls.clone(),
            }),
        );

        let err = orchestrator.run().await.unwrap_err();
        match err {
            AppError::Generation { stage, .. } => assert_eq!(stage, Stage::Caption),
            other => panic!("expected Generation error, got: {}", other),
        }
        assert_eq!(tag_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_tag_list_is_tolerated() {
        let (caption_calls, tag_calls) = counters();

        let orchestrator = orchestrator_with(
            Arc::new(FixedIdea::new("CPU Clock Speeds", "How clock rates work.")),
            Arc::new(FixedCaption {
                text: "caption".to_string(),
                calls: caption_calls,
            }),
            Arc::new(RecordingImage::new("ref")),
            Arc::new(FixedTags {
                tags: vec![],
                calls: tag_calls,
            }),
        );

        let bundle = orchestrator.run().await.unwrap();
        assert!(bundle.tags.is_empty());
    }

    #[tokio::test]
    async fn test_image_prompt_mode_topic_only() {
        let (caption_calls, tag_calls) = counters();
        let image = Arc::new(RecordingImage::new("ref"));

        let orchestrator = orchestrator_with(
            Arc::new(FixedIdea::new("Deep Sea Cables", "Fiber optics under oceans.")),
            Arc::new(FixedCaption {
                text: "caption".to_string(),
                calls: caption_calls,
            }),
            image.clone(),
            Arc::new(FixedTags {
                tags: vec![],
                calls: tag_calls,
            }),
        );

        orchestrator.run().await.unwrap();
        let prompt = image.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, "Deep Sea Cables");
    }

    #[tokio::test]
    async fn test_image_prompt_mode_full_detail() {
        let (caption_calls, tag_calls) = counters();
        let image = Arc::new(RecordingImage::new("ref"));

        let config = PipelineConfig {
            image_prompt_mode: ImagePromptMode::FullDetail,
            ..PipelineConfig::default()
        };
        let orchestrator = PipelineOrchestrator::new(
            Arc::new(FixedIdea::new("Deep Sea Cables", "Fiber optics under oceans.")),
            Arc::new(FixedCaption {
                text: "caption".to_string(),
                calls: caption_calls,
            }),
            image.clone(),
            Arc::new(FixedTags {
                tags: vec![],
                calls: tag_calls,
            }),
            config,
        );

        orchestrator.run().await.unwrap();
        let prompt = image.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, "Fiber optics under oceans.");
    }

    #[tokio::test]
    async fn test_hung_stage_times_out() {
        struct HungIdea;

        #[async_trait]
        impl IdeaGenerator for HungIdea {
            async fn suggest_idea(&self) -> anyhow::Result<ContentIdea> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!()
            }
        }

        let (caption_calls, tag_calls) = counters();
        let config = PipelineConfig {
            stage_timeout_secs: 1,
            ..PipelineConfig::default()
        };
        let orchestrator = PipelineOrchestrator::new(
            Arc::new(HungIdea),
            Arc::new(FixedCaption {
                text: "caption".to_string(),
                calls: caption_calls,
            }),
            Arc::new(RecordingImage::new("ref")),
            Arc::new(FixedTags {
                tags: vec![],
                calls: tag_calls,
            }),
            config,
        );

        tokio::time::pause();
        let run = orchestrator.run();
        tokio::pin!(run);
        // Advance past the stage timeout while the idea call is hung.
        tokio::time::advance(Duration::from_secs(2)).await;
        let err = run.await.unwrap_err();

        match err {
            AppError::Generation { stage, cause } => {
                assert_eq!(stage, Stage::Idea);
                assert!(cause.contains("timed out"), "cause was: {}", cause);
            }
            other => panic!("expected Generation error, got: {}", other),
        }
    }
}
