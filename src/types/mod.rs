//! Core data types for the StudyHive study timer.
//!
//! This module defines the data structures used for:
//! - Timer modes and activity states
//! - Timer settings with validation and partial updates
//! - Completed-task records and the read-only timer snapshot
//! - IPC request/response serialization

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length (in characters) of a task label.
pub const MAX_TASK_LABEL_LENGTH: usize = 100;

/// Accepted focus duration in minutes.
pub const FOCUS_MINUTES_RANGE: RangeInclusive<u32> = 1..=120;

/// Accepted short and long break durations in minutes.
pub const BREAK_MINUTES_RANGE: RangeInclusive<u32> = 1..=60;

/// Accepted number of focus sessions between long breaks.
pub const LONG_BREAK_INTERVAL_RANGE: RangeInclusive<u32> = 1..=12;

// ============================================================================
// TimerMode
// ============================================================================

/// The kind of interval the timer is counting down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Focused study interval
    #[default]
    Focus,
    /// Short break between focus sessions
    ShortBreak,
    /// Long break after every `long_break_interval` sessions
    LongBreak,
}

impl TimerMode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short break",
            TimerMode::LongBreak => "Long break",
        }
    }
}

// ============================================================================
// Activity
// ============================================================================

/// Whether the countdown for the current mode is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Not started, or stopped/reset
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Started but suspended
    Paused,
}

impl Activity {
    /// Returns the string representation of the activity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Running => "running",
            Activity::Paused => "paused",
        }
    }

    /// Returns true once the timer has been started, paused or not.
    pub fn is_active(&self) -> bool {
        matches!(self, Activity::Running | Activity::Paused)
    }

    /// Returns true if the countdown is currently progressing.
    pub fn is_running(&self) -> bool {
        *self == Activity::Running
    }
}

// ============================================================================
// TimerSettings
// ============================================================================

/// User-editable timer configuration.
///
/// Missing fields in a stored blob fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    /// Focus duration in minutes (1-120)
    pub focus_duration: u32,
    /// Short break duration in minutes (1-60)
    pub short_break_duration: u32,
    /// Long break duration in minutes (1-60)
    pub long_break_duration: u32,
    /// Start the break automatically after a focus session
    pub auto_start_breaks: bool,
    /// Start the next focus session automatically after a break
    pub auto_start_focus: bool,
    /// Play a tone when an interval completes
    pub sound_enabled: bool,
    /// Show a desktop notification when an interval completes
    pub notifications_enabled: bool,
    /// Focus sessions between long breaks (1-12)
    pub long_break_interval: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            auto_start_breaks: false,
            auto_start_focus: false,
            sound_enabled: true,
            notifications_enabled: true,
            long_break_interval: 4,
        }
    }
}

impl TimerSettings {
    /// Sets the focus duration.
    pub fn with_focus_duration(mut self, minutes: u32) -> Self {
        self.focus_duration = minutes;
        self
    }

    /// Sets the short break duration.
    pub fn with_short_break_duration(mut self, minutes: u32) -> Self {
        self.short_break_duration = minutes;
        self
    }

    /// Sets the long break duration.
    pub fn with_long_break_duration(mut self, minutes: u32) -> Self {
        self.long_break_duration = minutes;
        self
    }

    /// Sets the long break interval.
    pub fn with_long_break_interval(mut self, sessions: u32) -> Self {
        self.long_break_interval = sessions;
        self
    }

    /// Returns the configured duration of `mode` in minutes.
    pub fn duration_minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_duration,
            TimerMode::ShortBreak => self.short_break_duration,
            TimerMode::LongBreak => self.long_break_duration,
        }
    }

    /// Returns the configured duration of `mode` in seconds.
    pub fn duration_seconds(&self, mode: TimerMode) -> u32 {
        self.duration_minutes(mode) * 60
    }

    /// Validates the settings.
    ///
    /// Returns an error message for the first out-of-range field.
    pub fn validate(&self) -> Result<(), String> {
        check_range("focus duration", self.focus_duration, &FOCUS_MINUTES_RANGE)?;
        check_range(
            "short break duration",
            self.short_break_duration,
            &BREAK_MINUTES_RANGE,
        )?;
        check_range(
            "long break duration",
            self.long_break_duration,
            &BREAK_MINUTES_RANGE,
        )?;
        check_range(
            "long break interval",
            self.long_break_interval,
            &LONG_BREAK_INTERVAL_RANGE,
        )?;
        Ok(())
    }

    /// Replaces every out-of-range field with its default.
    ///
    /// Used for settings read back from the store, which may have been
    /// edited by hand.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !FOCUS_MINUTES_RANGE.contains(&self.focus_duration) {
            self.focus_duration = defaults.focus_duration;
        }
        if !BREAK_MINUTES_RANGE.contains(&self.short_break_duration) {
            self.short_break_duration = defaults.short_break_duration;
        }
        if !BREAK_MINUTES_RANGE.contains(&self.long_break_duration) {
            self.long_break_duration = defaults.long_break_duration;
        }
        if !LONG_BREAK_INTERVAL_RANGE.contains(&self.long_break_interval) {
            self.long_break_interval = defaults.long_break_interval;
        }
        self
    }

    /// Merges the fields present in `patch` into these settings.
    ///
    /// Out-of-range values are skipped and the previous value kept.
    /// Returns one message per rejected field.
    pub fn merge(&mut self, patch: &SettingsPatch) -> Vec<String> {
        let mut rejected = Vec::new();

        merge_minutes(
            &mut self.focus_duration,
            patch.focus_duration,
            "focus duration",
            &FOCUS_MINUTES_RANGE,
            &mut rejected,
        );
        merge_minutes(
            &mut self.short_break_duration,
            patch.short_break_duration,
            "short break duration",
            &BREAK_MINUTES_RANGE,
            &mut rejected,
        );
        merge_minutes(
            &mut self.long_break_duration,
            patch.long_break_duration,
            "long break duration",
            &BREAK_MINUTES_RANGE,
            &mut rejected,
        );
        merge_minutes(
            &mut self.long_break_interval,
            patch.long_break_interval,
            "long break interval",
            &LONG_BREAK_INTERVAL_RANGE,
            &mut rejected,
        );

        if let Some(value) = patch.auto_start_breaks {
            self.auto_start_breaks = value;
        }
        if let Some(value) = patch.auto_start_focus {
            self.auto_start_focus = value;
        }
        if let Some(value) = patch.sound_enabled {
            self.sound_enabled = value;
        }
        if let Some(value) = patch.notifications_enabled {
            self.notifications_enabled = value;
        }

        rejected
    }
}

fn check_range(name: &str, value: u32, range: &RangeInclusive<u32>) -> Result<(), String> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "{} must be between {} and {} (got {})",
            name,
            range.start(),
            range.end(),
            value
        ))
    }
}

fn merge_minutes(
    field: &mut u32,
    value: Option<u32>,
    name: &str,
    range: &RangeInclusive<u32>,
    rejected: &mut Vec<String>,
) {
    if let Some(value) = value {
        match check_range(name, value, range) {
            Ok(()) => *field = value,
            Err(message) => rejected.push(message),
        }
    }
}

// ============================================================================
// SettingsPatch
// ============================================================================

/// Partial settings update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_breaks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_focus: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break_interval: Option<u32>,
}

impl SettingsPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// CompletedTask
// ============================================================================

/// A task label recorded when the focus session it was attached to completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    /// Completion timestamp in milliseconds, used as identifier
    pub id: i64,
    /// Task label
    pub label: String,
    /// When the focus session completed
    pub completed_at: DateTime<Utc>,
    /// Length of the focus session in minutes
    pub duration_minutes: u32,
}

/// Normalizes a task label.
///
/// Control characters and surrounding whitespace are removed and the result
/// is truncated to [`MAX_TASK_LABEL_LENGTH`] characters. Returns `None` when
/// nothing is left.
pub fn normalize_task_label(label: &str) -> Option<String> {
    let cleaned: String = label.chars().filter(|c| !c.is_control()).collect();
    let truncated: String = cleaned.trim().chars().take(MAX_TASK_LABEL_LENGTH).collect();
    let truncated = truncated.trim_end().to_string();

    if truncated.is_empty() {
        None
    } else {
        Some(truncated)
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Number of completed tasks carried by a [`TimerSnapshot`].
pub const SNAPSHOT_TASK_LIMIT: usize = 10;

/// Read-only view of the timer handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub activity: Activity,
    pub time_left_seconds: u32,
    pub sessions_completed: u32,
    pub total_focus_minutes: u32,
    pub todays_focus_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    /// The most recent completed tasks, newest first, at most
    /// [`SNAPSHOT_TASK_LIMIT`]
    #[serde(default)]
    pub completed_tasks: Vec<CompletedTask>,
    /// Length of the full completed-task history
    #[serde(default)]
    pub completed_task_count: usize,
    pub settings: TimerSettings,
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Start or resume the countdown
    Start,
    /// Toggle pause
    Pause,
    /// Stop and rewind the current mode
    Stop,
    /// Return to an idle focus interval
    Reset,
    /// Switch to another mode
    Mode {
        /// Target mode
        mode: TimerMode,
    },
    /// Set or clear the current task label
    Task {
        /// New label; `None` clears it
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Forget the completed-task history
    ClearTasks,
    /// Update settings
    Settings {
        /// Fields to change
        #[serde(flatten)]
        patch: SettingsPatch,
    },
    /// Query the current status
    Status,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Timer state after the request was handled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TimerSnapshot>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<TimerSnapshot>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for a success response.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerMode / Activity Tests
    // ------------------------------------------------------------------------

    mod mode_tests {
        use super::*;

        #[test]
        fn test_default_is_focus() {
            assert_eq!(TimerMode::default(), TimerMode::Focus);
        }

        #[test]
        fn test_as_str_matches_serde() {
            for mode in [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak] {
                let json = serde_json::to_string(&mode).unwrap();
                assert_eq!(json, format!("\"{}\"", mode.as_str()));
            }
        }

        #[test]
        fn test_activity_flags() {
            assert!(!Activity::Idle.is_active());
            assert!(Activity::Running.is_active());
            assert!(Activity::Paused.is_active());

            assert!(!Activity::Idle.is_running());
            assert!(Activity::Running.is_running());
            assert!(!Activity::Paused.is_running());
        }
    }

    // ------------------------------------------------------------------------
    // TimerSettings Tests
    // ------------------------------------------------------------------------

    mod settings_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let settings = TimerSettings::default();
            assert_eq!(settings.focus_duration, 25);
            assert_eq!(settings.short_break_duration, 5);
            assert_eq!(settings.long_break_duration, 15);
            assert_eq!(settings.long_break_interval, 4);
            assert!(!settings.auto_start_breaks);
            assert!(!settings.auto_start_focus);
            assert!(settings.sound_enabled);
            assert!(settings.notifications_enabled);
        }

        #[test]
        fn test_duration_seconds() {
            let settings = TimerSettings::default();
            assert_eq!(settings.duration_seconds(TimerMode::Focus), 1500);
            assert_eq!(settings.duration_seconds(TimerMode::ShortBreak), 300);
            assert_eq!(settings.duration_seconds(TimerMode::LongBreak), 900);
        }

        #[test]
        fn test_validate_boundaries() {
            let min = TimerSettings::default()
                .with_focus_duration(1)
                .with_short_break_duration(1)
                .with_long_break_duration(1)
                .with_long_break_interval(1);
            assert!(min.validate().is_ok());

            let max = TimerSettings::default()
                .with_focus_duration(120)
                .with_short_break_duration(60)
                .with_long_break_duration(60)
                .with_long_break_interval(12);
            assert!(max.validate().is_ok());
        }

        #[test]
        fn test_validate_rejects_zero() {
            assert!(TimerSettings::default()
                .with_focus_duration(0)
                .validate()
                .is_err());
            assert!(TimerSettings::default()
                .with_long_break_interval(0)
                .validate()
                .is_err());
        }

        #[test]
        fn test_validate_rejects_too_high() {
            let err = TimerSettings::default()
                .with_short_break_duration(61)
                .validate()
                .unwrap_err();
            assert!(err.contains("short break duration"));
        }

        #[test]
        fn test_sanitized_restores_defaults() {
            let settings = TimerSettings {
                focus_duration: 0,
                short_break_duration: 500,
                long_break_interval: 0,
                ..TimerSettings::default().with_long_break_duration(20)
            }
            .sanitized();

            assert_eq!(settings.focus_duration, 25);
            assert_eq!(settings.short_break_duration, 5);
            assert_eq!(settings.long_break_duration, 20);
            assert_eq!(settings.long_break_interval, 4);
        }

        #[test]
        fn test_merge_applies_valid_fields() {
            let mut settings = TimerSettings::default();
            let rejected = settings.merge(&SettingsPatch {
                focus_duration: Some(30),
                auto_start_breaks: Some(true),
                sound_enabled: Some(false),
                ..Default::default()
            });

            assert!(rejected.is_empty());
            assert_eq!(settings.focus_duration, 30);
            assert!(settings.auto_start_breaks);
            assert!(!settings.sound_enabled);
            assert_eq!(settings.short_break_duration, 5);
        }

        #[test]
        fn test_merge_keeps_previous_value_on_invalid_input() {
            let mut settings = TimerSettings::default().with_focus_duration(40);
            let rejected = settings.merge(&SettingsPatch {
                focus_duration: Some(0),
                long_break_interval: Some(99),
                short_break_duration: Some(10),
                ..Default::default()
            });

            assert_eq!(rejected.len(), 2);
            assert_eq!(settings.focus_duration, 40);
            assert_eq!(settings.long_break_interval, 4);
            assert_eq!(settings.short_break_duration, 10);
        }

        #[test]
        fn test_deserialize_partial_blob_uses_defaults() {
            let json = r#"{"focusDuration":50,"soundEnabled":false}"#;
            let settings: TimerSettings = serde_json::from_str(json).unwrap();
            assert_eq!(settings.focus_duration, 50);
            assert!(!settings.sound_enabled);
            assert_eq!(settings.long_break_interval, 4);
        }

        #[test]
        fn test_serialize_uses_camel_case() {
            let json = serde_json::to_string(&TimerSettings::default()).unwrap();
            assert!(json.contains("\"focusDuration\":25"));
            assert!(json.contains("\"longBreakInterval\":4"));
        }

        #[test]
        fn test_patch_is_empty() {
            assert!(SettingsPatch::default().is_empty());
            assert!(!SettingsPatch {
                sound_enabled: Some(true),
                ..Default::default()
            }
            .is_empty());
        }
    }

    // ------------------------------------------------------------------------
    // Task Label Tests
    // ------------------------------------------------------------------------

    mod task_label_tests {
        use super::*;

        #[test]
        fn test_normalize_keeps_plain_label() {
            assert_eq!(
                normalize_task_label("Read chapter 3"),
                Some("Read chapter 3".to_string())
            );
        }

        #[test]
        fn test_normalize_truncates_to_max_length() {
            let long = "a".repeat(150);
            let label = normalize_task_label(&long).unwrap();
            assert_eq!(label.chars().count(), MAX_TASK_LABEL_LENGTH);
        }

        #[test]
        fn test_normalize_counts_characters_not_bytes() {
            let long = "数".repeat(120);
            let label = normalize_task_label(&long).unwrap();
            assert_eq!(label.chars().count(), MAX_TASK_LABEL_LENGTH);
        }

        #[test]
        fn test_normalize_strips_control_and_whitespace() {
            assert_eq!(
                normalize_task_label("  flash\ncards\t "),
                Some("flashcards".to_string())
            );
        }

        #[test]
        fn test_normalize_empty_is_none() {
            assert!(normalize_task_label("").is_none());
            assert!(normalize_task_label("   \n").is_none());
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_unit_requests_serialize() {
            assert_eq!(
                serde_json::to_string(&IpcRequest::Pause).unwrap(),
                r#"{"command":"pause"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::ClearTasks).unwrap(),
                r#"{"command":"clear_tasks"}"#
            );
        }

        #[test]
        fn test_mode_request_deserialize() {
            let json = r#"{"command":"mode","mode":"long_break"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert_eq!(
                request,
                IpcRequest::Mode {
                    mode: TimerMode::LongBreak
                }
            );
        }

        #[test]
        fn test_task_request_without_label_clears() {
            let request: IpcRequest = serde_json::from_str(r#"{"command":"task"}"#).unwrap();
            assert_eq!(request, IpcRequest::Task { label: None });
        }

        #[test]
        fn test_settings_request_flattens_patch() {
            let request = IpcRequest::Settings {
                patch: SettingsPatch {
                    focus_duration: Some(30),
                    ..Default::default()
                },
            };
            let json = serde_json::to_string(&request).unwrap();
            assert!(json.contains("\"command\":\"settings\""));
            assert!(json.contains("\"focusDuration\":30"));
            assert!(!json.contains("shortBreakDuration"));

            let back: IpcRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(back, request);
        }

        #[test]
        fn test_response_error_has_no_data() {
            let response = IpcResponse::error("daemon is shutting down");
            assert!(!response.is_success());
            assert!(response.data.is_none());

            let json = serde_json::to_string(&response).unwrap();
            assert!(!json.contains("data"));
        }

        #[test]
        fn test_response_success_deserialize() {
            let json = r#"{
                "status":"success",
                "message":"",
                "data":{
                    "mode":"focus",
                    "activity":"running",
                    "timeLeftSeconds":1200,
                    "sessionsCompleted":2,
                    "totalFocusMinutes":50,
                    "todaysFocusMinutes":25,
                    "settings":{}
                }
            }"#;
            let response: IpcResponse = serde_json::from_str(json).unwrap();
            assert!(response.is_success());

            let data = response.data.unwrap();
            assert_eq!(data.activity, Activity::Running);
            assert_eq!(data.time_left_seconds, 1200);
            assert!(data.completed_tasks.is_empty());
            assert_eq!(data.completed_task_count, 0);
            assert_eq!(data.settings, TimerSettings::default());
        }
    }
}
