//! Scheduler service
//!
//! Polls the configured target times on an interval and fires the pipeline
//! once per matching slot. Every error inside a tick is logged and
//! swallowed; the loop itself never dies before `stop()`.

use crate::delivery::Dispatcher;
use crate::pipeline::PipelineOrchestrator;
use crate::scheduler::slots::{SlotKey, SlotLedger};
use crate::state::CuratorSettings;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

/// Periodic pipeline scheduler
///
/// Owns the slot ledger; the settings it reads are shared with the config
/// API, so recipient and target-time updates are visible on the next tick
/// without a restart.
pub struct Scheduler {
    settings: Arc<RwLock<CuratorSettings>>,
    ledger: SlotLedger,
    orchestrator: Arc<PipelineOrchestrator>,
    dispatcher: Arc<Dispatcher>,
    poll_interval: Duration,
}

impl Scheduler {
    /// Create a scheduler over the shared settings and collaborators
    pub fn new(
        settings: Arc<RwLock<CuratorSettings>>,
        orchestrator: Arc<PipelineOrchestrator>,
        dispatcher: Arc<Dispatcher>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            settings,
            ledger: SlotLedger::new(),
            orchestrator,
            dispatcher,
            poll_interval,
        }
    }

    /// The shared settings handle this scheduler reads on each tick
    pub fn settings_handle(&self) -> Arc<RwLock<CuratorSettings>> {
        self.settings.clone()
    }

    /// Evaluate one poll instant
    ///
    /// Fires the earliest configured target whose hour:minute exactly matches
    /// `now` and whose slot has not fired today. At most one slot fires per
    /// tick. Returns the fired slot key, or `None` if nothing was due.
    ///
    /// Pipeline and delivery errors are logged and swallowed here; the slot
    /// stays marked either way, so a failed run is not retried the same day.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Option<SlotKey> {
        let (targets, recipient) = {
            let settings = self.settings.read().await;
            (settings.target_times.clone(), settings.recipient.clone())
        };

        let due = targets
            .iter()
            .copied()
            .find(|t| t.matches(now) && !self.ledger.contains(&SlotKey::new(now.date(), *t)))?;

        let key = SlotKey::new(now.date(), due);
        // Marked before the run starts, not after it succeeds.
        self.ledger.record(key);

        tracing::info!(slot = %key, "Scheduled slot due, starting pipeline run");

        let bundle = match self.orchestrator.run().await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::error!(slot = %key, error = %e, "Scheduled pipeline run failed");
                return Some(key);
            }
        };

        match self.dispatcher.deliver(&bundle, &recipient).await {
            Ok(receipt) => {
                tracing::info!(
                    slot = %key,
                    recipient = %receipt.recipient,
                    topic = %bundle.idea.topic,
                    "Scheduled delivery complete"
                );
            }
            Err(e) => {
                tracing::error!(slot = %key, error = %e, "Scheduled delivery failed");
            }
        }

        Some(key)
    }

    /// Spawn the background polling loop and return its handle
    ///
    /// The first tick runs immediately on start, then every poll interval.
    /// A shutdown requested mid-tick takes effect after that tick finishes;
    /// the in-flight run is never cancelled.
    pub fn start(mut self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let poll_interval = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            tracing::info!(
                poll_secs = poll_interval.as_secs(),
                "Scheduler loop started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = chrono::Local::now().naive_local();
                        self.tick(now).await;
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::info!("Scheduler loop stopping");
                        break;
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running scheduler loop
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{NotificationChannel, NotificationPayload};
    use crate::pipeline::config::PipelineConfig;
    use crate::pipeline::generators::{
        CaptionGenerator, IdeaGenerator, ImageGenerator, TagOptimizer,
    };
    use crate::pipeline::types::ContentIdea;
    use crate::scheduler::slots::TargetTime;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGenerators {
        idea_calls: Arc<AtomicUsize>,
        fail_idea: bool,
    }

    #[async_trait]
    impl IdeaGenerator for StubGenerators {
        async fn suggest_idea(&self) -> anyhow::Result<ContentIdea> {
            self.idea_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_idea {
                return Err(anyhow::anyhow!("model unavailable"));
            }
            Ok(ContentIdea {
                topic: "Pulsars".to_string(),
                detail: "Rotating neutron stars.".to_string(),
            })
        }
    }

    struct FixedCaption;

    #[async_trait]
    impl CaptionGenerator for FixedCaption {
        async fn generate_caption(&self, _topic: &str, _detail: &str) -> anyhow::Result<String> {
            Ok("A caption.".to_string())
        }
    }

    struct FixedImage;

    #[async_trait]
    impl ImageGenerator for FixedImage {
        async fn generate_image(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok("data:image/png;base64,abc".to_string())
        }
    }

    struct FixedTags;

    #[async_trait]
    impl TagOptimizer for FixedTags {
        async fn optimize_tags(&self, _caption: &str, _topic: &str) -> anyhow::Result<Vec<String>> {
            Ok(vec!["space".to_string()])
        }
    }

    struct CountingChannel {
        sends: AtomicUsize,
    }

    #[async_trait]
    impl NotificationChannel for CountingChannel {
        async fn send(
            &self,
            _recipient: &str,
            _payload: &NotificationPayload,
        ) -> anyhow::Result<()> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Harness {
        scheduler: Scheduler,
        idea_calls: Arc<AtomicUsize>,
        channel: Arc<CountingChannel>,
    }

    fn harness(targets: Vec<TargetTime>, fail_idea: bool) -> Harness {
        let idea_calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            Arc::new(StubGenerators {
                idea_calls: idea_calls.clone(),
                fail_idea,
            }),
            Arc::new(FixedCaption),
            Arc::new(FixedImage),
            Arc::new(FixedTags),
            PipelineConfig::default(),
        ));
        let channel = Arc::new(CountingChannel {
            sends: AtomicUsize::new(0),
        });
        let dispatcher = Arc::new(Dispatcher::new(channel.clone()));
        let settings = Arc::new(RwLock::new(CuratorSettings {
            recipient: "curator@example.com".to_string(),
            target_times: targets,
        }));

        Harness {
            scheduler: Scheduler::new(
                settings,
                orchestrator,
                dispatcher,
                Duration::from_secs(60),
            ),
            idea_calls,
            channel,
        }
    }

    fn t(hour: u8, minute: u8) -> TargetTime {
        TargetTime::new(hour, minute).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_matching_slot_fires_once_and_delivers() {
        let mut h = harness(vec![t(9, 0), t(21, 0)], false);

        let fired = h.scheduler.tick(at(21, 0)).await;

        assert!(fired.is_some());
        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.channel.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_tick_same_minute_does_not_refire() {
        let mut h = harness(vec![t(9, 0), t(21, 0)], false);

        assert!(h.scheduler.tick(at(21, 0)).await.is_some());
        assert!(h.scheduler.tick(at(21, 0)).await.is_none());

        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.channel.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_matching_minute_does_not_fire() {
        let mut h = harness(vec![t(9, 0), t(21, 0)], false);

        assert!(h.scheduler.tick(at(20, 59)).await.is_none());
        assert!(h.scheduler.tick(at(21, 1)).await.is_none());

        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_targets_never_fire() {
        let mut h = harness(vec![], false);

        for hour in 0..24 {
            assert!(h.scheduler.tick(at(hour, 0)).await.is_none());
        }
        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_run_still_marks_slot() {
        let mut h = harness(vec![t(21, 0)], true);

        // The run fails, the slot is consumed, delivery never happens.
        assert!(h.scheduler.tick(at(21, 0)).await.is_some());
        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.channel.sends.load(Ordering::SeqCst), 0);

        // No same-day retry.
        assert!(h.scheduler.tick(at(21, 0)).await.is_none());
        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_target_fires_again_next_day() {
        let mut h = harness(vec![t(9, 0)], false);

        let monday = NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 9, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        assert!(h.scheduler.tick(monday).await.is_some());
        assert!(h.scheduler.tick(tuesday).await.is_some());
        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_settings_update_visible_on_next_tick() {
        let mut h = harness(vec![], false);
        let settings = h.scheduler.settings.clone();

        assert!(h.scheduler.tick(at(21, 0)).await.is_none());

        settings.write().await.target_times = vec![t(21, 1)];

        assert!(h.scheduler.tick(at(21, 1)).await.is_some());
        assert_eq!(h.idea_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_and_stop_terminate_cleanly() {
        let h = harness(vec![], false);

        let handle = h.scheduler.start();
        // Give the loop a chance to run its startup tick.
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.stop().await;
    }
}
