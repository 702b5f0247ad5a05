//! Typed snapshots written to the store.
//!
//! Three keys are used:
//! - `timer_settings`: the [`TimerSettings`] blob
//! - `timer_stats`: lifetime statistics and the completed-task history
//! - `timer_today`: today's focus minutes plus the date marker used for
//!   day rollover
//!
//! Missing or corrupt entries load as defaults; failures are logged and
//! never returned to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{CompletedTask, TimerSettings};

use super::Store;

/// Key of the settings snapshot.
pub const SETTINGS_KEY: &str = "timer_settings";

/// Key of the statistics snapshot.
pub const STATS_KEY: &str = "timer_stats";

/// Key of today's focus-time snapshot.
pub const TODAY_KEY: &str = "timer_today";

/// Lifetime statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerStats {
    pub total_focus_minutes: u32,
    pub sessions_completed: u32,
    /// Most recent first
    pub completed_tasks: Vec<CompletedTask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Focus minutes accumulated on one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodayFocus {
    /// Calendar-day identifier (`YYYY-MM-DD`)
    pub date: String,
    pub focus_minutes: u32,
}

impl TodayFocus {
    /// Creates an empty record for `date`.
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            focus_minutes: 0,
        }
    }
}

/// Reads and writes timer snapshots through a [`Store`].
#[derive(Clone)]
pub struct TimerStorage {
    store: Arc<dyn Store>,
}

impl TimerStorage {
    /// Wraps `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Loads settings, falling back to defaults. Out-of-range fields are
    /// replaced by their defaults.
    pub fn load_settings(&self) -> TimerSettings {
        self.load::<TimerSettings>(SETTINGS_KEY)
            .map(|settings| match settings.validate() {
                Ok(()) => settings,
                Err(message) => {
                    warn!("Stored settings out of range ({}), repairing", message);
                    settings.sanitized()
                }
            })
            .unwrap_or_default()
    }

    /// Persists settings.
    pub fn save_settings(&self, settings: &TimerSettings) {
        self.save(SETTINGS_KEY, settings);
    }

    /// Loads statistics, falling back to empty statistics.
    pub fn load_stats(&self) -> TimerStats {
        self.load(STATS_KEY).unwrap_or_default()
    }

    /// Persists statistics.
    pub fn save_stats(&self, stats: &TimerStats) {
        self.save(STATS_KEY, stats);
    }

    /// Loads today's focus minutes for the day identified by `today`.
    ///
    /// A missing record, or one whose date marker differs from `today`,
    /// yields zero minutes; in that case the marker is rewritten
    /// immediately.
    pub fn load_today(&self, today: &str) -> TodayFocus {
        match self.load::<TodayFocus>(TODAY_KEY) {
            Some(record) if record.date == today => record,
            stale => {
                if let Some(record) = stale {
                    debug!(
                        "Day rolled over ({} -> {}), resetting today's focus minutes",
                        record.date, today
                    );
                }
                let fresh = TodayFocus::empty(today);
                self.save_today(&fresh);
                fresh
            }
        }
    }

    /// Persists today's focus minutes.
    pub fn save_today(&self, today: &TodayFocus) {
        self.save(TODAY_KEY, today);
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read {}, using defaults: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored {} is corrupt, using defaults: {}", key, e);
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, &json) {
            warn!("Could not persist {}: {}", key, e);
        }
    }
}

impl std::fmt::Debug for TimerStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerStorage").finish_non_exhaustive()
    }
}
