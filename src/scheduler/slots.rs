//! Target times, the slot ledger, and next-fire computation
//!
//! A slot is a specific `(date, target time)` pairing eligible to fire the
//! pipeline once. The ledger is insert-only for the lifetime of the process;
//! entries are never mutated or removed, so a slot that fired (or failed)
//! cannot fire again the same day.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A configured hour:minute at which the scheduler should attempt a run
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TargetTime {
    /// Hour of day, 0-23
    pub hour: u8,
    /// Minute of hour, 0-59
    pub minute: u8,
}

impl TargetTime {
    /// Create a target time, validating the ranges
    pub fn new(hour: u8, minute: u8) -> Result<Self, String> {
        if hour > 23 {
            return Err(format!("hour out of range: {}", hour));
        }
        if minute > 59 {
            return Err(format!("minute out of range: {}", minute));
        }
        Ok(Self { hour, minute })
    }

    /// Whether this target matches the hour and minute of `now` exactly
    pub fn matches(&self, now: NaiveDateTime) -> bool {
        now.hour() == u32::from(self.hour) && now.minute() == u32::from(self.minute)
    }
}

impl std::fmt::Display for TargetTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Key marking a target time as fired for a specific date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    /// The calendar date the slot fired on
    pub date: NaiveDate,
    /// Hour of the target time
    pub hour: u8,
    /// Minute of the target time
    pub minute: u8,
}

impl SlotKey {
    /// Build the key for a target time on a given date
    pub fn new(date: NaiveDate, target: TargetTime) -> Self {
        Self {
            date,
            hour: target.hour,
            minute: target.minute,
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.hour, self.minute)
    }
}

/// Insert-only record of slots that have already fired
///
/// Scoped to the current process lifetime; a restart mid-day allows a slot
/// to fire again.
#[derive(Debug, Default)]
pub struct SlotLedger {
    fired: HashSet<SlotKey>,
}

impl SlotLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a slot as fired. Returns `true` if the slot was not already
    /// present, `false` if it had fired before.
    pub fn record(&mut self, key: SlotKey) -> bool {
        self.fired.insert(key)
    }

    /// Whether the slot has already fired
    pub fn contains(&self, key: &SlotKey) -> bool {
        self.fired.contains(key)
    }

    /// Number of recorded slots
    pub fn len(&self) -> usize {
        self.fired.len()
    }

    /// Whether no slot has fired yet
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

/// The upcoming fire time, advisory only
///
/// `tick`'s firing decision is always an exact-match test; this output does
/// not gate it.
#[derive(Debug, Clone, Serialize)]
pub struct NextFire {
    /// The target that will fire next
    pub target: TargetTime,
    /// The calendar date it will fire on
    pub date: NaiveDate,
    /// Seconds until the fire time
    pub wait_secs: i64,
}

/// Compute the earliest target strictly after `now` today, or the earliest
/// target tomorrow if none remain today
///
/// Returns `None` when no targets are configured. `targets` is expected
/// sorted ascending by (hour, minute).
pub fn next_fire(targets: &[TargetTime], now: NaiveDateTime) -> Option<NextFire> {
    let first = *targets.first()?;

    let today = now.date();
    let upcoming_today = targets.iter().copied().find(|t| {
        let at = today.and_hms_opt(u32::from(t.hour), u32::from(t.minute), 0);
        at.map(|at| at > now).unwrap_or(false)
    });

    let (target, date) = match upcoming_today {
        Some(target) => (target, today),
        None => (first, today + Duration::days(1)),
    };

    let fire_at = date.and_hms_opt(u32::from(target.hour), u32::from(target.minute), 0)?;
    Some(NextFire {
        target,
        date,
        wait_secs: (fire_at - now).num_seconds(),
    })
}
