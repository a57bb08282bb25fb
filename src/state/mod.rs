//! State management module
//!
//! Curator settings and their JSON-file persistence.

pub mod settings;
pub mod store;

pub use settings::CuratorSettings;
pub use store::{ConfigStore, JsonConfigStore, StoreError};
