//! SMTP notification channel
//!
//! Sends the formatted notification as a plain-text email over SMTP with
//! STARTTLS. Credentials come from the process configuration (`SMTP_*`
//! environment variables); for Gmail this is the account address plus an
//! app password.

use crate::config::SmtpConfig;
use crate::delivery::{NotificationChannel, NotificationPayload};
use anyhow::anyhow;
use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

/// SMTP-backed delivery channel
#[derive(Debug)]
pub struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpChannel {
    /// Build a channel from SMTP configuration
    ///
    /// # Errors
    /// Returns an error if credentials or the sender address are missing, or
    /// if the relay host cannot be resolved.
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        if config.username.is_empty() || config.password.is_empty() {
            return Err(anyhow!(
                "SMTP credentials not configured. Set SMTP_USERNAME and SMTP_PASSWORD"
            ));
        }
        if config.from_address.is_empty() {
            return Err(anyhow!(
                "SMTP sender address not configured. Set SMTP_FROM_ADDRESS"
            ));
        }

        let credentials =
            Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| anyhow!("Invalid SMTP relay host '{}': {}", config.host, e))?
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl NotificationChannel for SmtpChannel {
    async fn send(&self, recipient: &str, payload: &NotificationPayload) -> anyhow::Result<()> {
        let from: Mailbox = format!("Cosmos Curator <{}>", self.from_address)
            .parse()
            .map_err(|e| anyhow!("Invalid sender address: {}", e))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| anyhow!("Invalid recipient address: {}", e))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&payload.subject)
            .body(payload.body.clone())
            .map_err(|e| anyhow!("Failed to build message: {}", e))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| anyhow!("SMTP send failed: {}", e))?;

        Ok(())
    }
}
