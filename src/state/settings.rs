//! Curator settings
//!
//! The settings the scheduler and dispatcher act on: who receives the
//! generated content and at which times of day runs fire. Updated through
//! the config API and persisted through the [`crate::state::ConfigStore`].

use crate::delivery::validate_recipient;
use crate::error::AppError;
use crate::scheduler::slots::TargetTime;
use serde::{Deserialize, Serialize};

/// Persisted curator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratorSettings {
    /// Recipient address for scheduled deliveries
    #[serde(default)]
    pub recipient: String,
    /// Times of day at which the pipeline fires
    #[serde(default)]
    pub target_times: Vec<TargetTime>,
}

impl CuratorSettings {
    /// Sort target times ascending and drop duplicates
    pub fn normalize(&mut self) {
        self.target_times.sort();
        self.target_times.dedup();
    }

    /// Validate the settings before persisting an update
    ///
    /// # Errors
    /// Returns `AppError::Configuration` if the recipient is empty or
    /// malformed.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_recipient(&self.recipient)
    }
}
