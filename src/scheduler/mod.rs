//! Scheduling module
//!
//! Target-time slots, the per-day firing ledger, and the background loop
//! that polls them and runs the pipeline.

pub mod service;
pub mod slots;

pub use service::{Scheduler, SchedulerHandle};
pub use slots::{next_fire, NextFire, SlotKey, SlotLedger, TargetTime};
