//! Cosmos Curator Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod delivery;
pub mod error;
pub mod pipeline;
pub mod scheduler;
/// Persisted curator settings and the configuration store
///
/// Handles the recipient address, target times, and file persistence.
pub mod state;
