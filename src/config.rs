//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Scheduler configuration
    pub scheduler: SchedulerConfig,
    /// Gemini API configuration
    pub gemini: GeminiConfig,
    /// SMTP delivery configuration
    pub smtp: SmtpConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Poll interval in seconds. Must be <= the granularity of target times
    /// (minute granularity), otherwise an exact-minute match can be skipped.
    pub poll_interval_secs: u64,
}

/// Gemini API configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for the Gemini API
    pub api_key: String,
}

/// SMTP delivery configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,
    /// SMTP username (also the sender address unless overridden)
    pub username: String,
    /// SMTP password (app password for Gmail)
    pub password: String,
    /// Sender address shown in the From header
    pub from_address: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            scheduler: SchedulerConfig {
                poll_interval_secs: env::var("SCHEDULER_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(60),
            },
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            },
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                from_address: env::var("SMTP_FROM_ADDRESS")
                    .unwrap_or_else(|_| smtp_username.clone()),
                username: smtp_username,
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
