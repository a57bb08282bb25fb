//! Notification delivery module
//!
//! The [`Dispatcher`] validates the recipient, formats a completed content
//! bundle into a notification payload, and hands it to the external delivery
//! channel. Transport failures are translated into a reportable error and
//! never abort the scheduler loop.

pub mod email;

use crate::error::AppError;
use crate::pipeline::types::ContentBundle;
use async_trait::async_trait;
use std::sync::Arc;

/// A formatted notification ready for transport
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    /// Subject / topic line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Result of a successful delivery attempt
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeliveryReceipt {
    /// The recipient the notification was sent to
    pub recipient: String,
    /// Human-readable outcome message
    pub message: String,
}

/// External delivery channel collaborator
///
/// Transport details (protocol, authentication) are entirely the
/// implementation's concern.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Send a payload to the recipient
    async fn send(&self, recipient: &str, payload: &NotificationPayload) -> anyhow::Result<()>;
}

/// Hands completed bundles to the delivery channel
pub struct Dispatcher {
    channel: Arc<dyn NotificationChannel>,
}

impl Dispatcher {
    /// Create a dispatcher over the given channel
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    /// Deliver a bundle to the recipient
    ///
    /// # Errors
    /// * `AppError::Configuration` - recipient empty or malformed; the
    ///   transport is never invoked in this case
    /// * `AppError::Delivery` - transport-level failure
    pub async fn deliver(
        &self,
        bundle: &ContentBundle,
        recipient: &str,
    ) -> Result<DeliveryReceipt, AppError> {
        validate_recipient(recipient)?;

        let payload = format_payload(bundle);

        tracing::debug!(
            recipient = %recipient,
            subject = %payload.subject,
            "Delivering content bundle"
        );

        self.channel
            .send(recipient, &payload)
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        tracing::info!(recipient = %recipient, topic = %bundle.idea.topic, "Bundle delivered");

        Ok(DeliveryReceipt {
            recipient: recipient.to_string(),
            message: format!("Content for \"{}\" sent to {}", bundle.idea.topic, recipient),
        })
    }
}

/// Basic recipient address validation, checked before any transport attempt
pub fn validate_recipient(recipient: &str) -> Result<(), AppError> {
    if recipient.trim().is_empty() {
        return Err(AppError::Configuration(
            "recipient address is empty".to_string(),
        ));
    }
    if recipient.chars().any(char::is_whitespace) {
        return Err(AppError::Configuration(format!(
            "recipient address contains whitespace: {}",
            recipient
        )));
    }
    let mut parts = recipient.split('@');
    let (local, domain) = (parts.next().unwrap_or(""), parts.next().unwrap_or(""));
    if local.is_empty() || domain.is_empty() || parts.next().is_some() || !domain.contains('.') {
        return Err(AppError::Configuration(format!(
            "recipient address is malformed: {}",
            recipient
        )));
    }
    Ok(())
}

/// Format a bundle into the notification payload
///
/// Subject carries the topic; the body lists the caption, the `#`-prefixed
/// tag line, and the image reference.
fn format_payload(bundle: &ContentBundle) -> NotificationPayload {
    let subject = format!("Cosmos Curator new post content: {}", bundle.idea.topic);

    let tag_line = if bundle.tags.is_empty() {
        "No tags were generated.".to_string()
    } else {
        bundle
            .tags
            .iter()
            .map(|tag| format!("#{}", tag))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let body = format!(
        "Hello,\n\nThe AI has prepared new post content for you:\n\n\
         Topic: {}\n\n\
         Suggested caption:\n{}\n\n\
         Suggested tags:\n{}\n\n\
         Image reference:\n{}\n\n\
         Regards,\nCosmos Curator",
        bundle.idea.topic, bundle.caption, tag_line, bundle.image_reference
    );

    NotificationPayload { subject, body }
}
