//! Display utilities for the StudyHive CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Error messages
//! - Status, settings and statistics

use std::fmt::Write;

use chrono::Local;

use crate::types::{Activity, IpcResponse, TimerSettings, TimerSnapshot};

/// Number of completed tasks listed by `stats`.
const RECENT_TASKS_SHOWN: usize = 10;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a timer command.
    pub fn show_result(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
        if let Some(data) = &response.data {
            print!("{}", Self::render_summary(data));
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(data) => print!("{}", Self::render_status(data)),
            None => println!("No timer status available"),
        }
    }

    /// Shows the timer settings.
    pub fn show_settings(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
        if let Some(data) = &response.data {
            print!("{}", Self::render_settings(&data.settings));
        }
    }

    /// Shows focus statistics and recent completed tasks.
    pub fn show_stats(response: &IpcResponse) {
        if let Some(data) = &response.data {
            print!("{}", Self::render_stats(data));
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn render_summary(data: &TimerSnapshot) -> String {
        let mut out = String::new();
        let (minutes, seconds) = Self::format_time(data.time_left_seconds);
        let _ = writeln!(
            out,
            "  {} ({}) {}:{:02}",
            data.mode.label(),
            Self::activity_label(data.activity),
            minutes,
            seconds
        );
        if let Some(task) = &data.current_task {
            let _ = writeln!(out, "  Task: {}", task);
        }
        out
    }

    fn render_status(data: &TimerSnapshot) -> String {
        let mut out = String::new();
        let (minutes, seconds) = Self::format_time(data.time_left_seconds);
        let _ = writeln!(out, "StudyHive status");
        let _ = writeln!(out, "─────────────────────────────");
        let _ = writeln!(out, "Mode:      {}", data.mode.label());
        let _ = writeln!(out, "State:     {}", Self::activity_label(data.activity));
        let _ = writeln!(out, "Time left: {}:{:02}", minutes, seconds);
        let _ = writeln!(
            out,
            "Session:   {} of {} until long break",
            Self::sessions_into_cycle(data.sessions_completed, data.settings.long_break_interval),
            data.settings.long_break_interval
        );
        if let Some(task) = &data.current_task {
            let _ = writeln!(out, "Task:      {}", task);
        }
        let _ = writeln!(
            out,
            "Today:     {}",
            Self::format_minutes(data.todays_focus_minutes)
        );
        out
    }

    fn render_settings(settings: &TimerSettings) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Focus:              {} min", settings.focus_duration);
        let _ = writeln!(out, "Short break:        {} min", settings.short_break_duration);
        let _ = writeln!(out, "Long break:         {} min", settings.long_break_duration);
        let _ = writeln!(
            out,
            "Long break every:   {} sessions",
            settings.long_break_interval
        );
        let _ = writeln!(
            out,
            "Auto-start breaks:  {}",
            Self::on_off(settings.auto_start_breaks)
        );
        let _ = writeln!(
            out,
            "Auto-start focus:   {}",
            Self::on_off(settings.auto_start_focus)
        );
        let _ = writeln!(out, "Sound:              {}", Self::on_off(settings.sound_enabled));
        let _ = writeln!(
            out,
            "Notifications:      {}",
            Self::on_off(settings.notifications_enabled)
        );
        out
    }

    fn render_stats(data: &TimerSnapshot) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Sessions completed: {}", data.sessions_completed);
        let _ = writeln!(
            out,
            "Total focus time:   {}",
            Self::format_minutes(data.total_focus_minutes)
        );
        let _ = writeln!(
            out,
            "Focus time today:   {}",
            Self::format_minutes(data.todays_focus_minutes)
        );

        if data.completed_tasks.is_empty() {
            let _ = writeln!(out, "No completed tasks yet");
            return out;
        }

        let _ = writeln!(out, "Recent tasks:");
        for task in data.completed_tasks.iter().take(RECENT_TASKS_SHOWN) {
            let _ = writeln!(
                out,
                "  {}  {} ({} min)",
                task.completed_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M"),
                task.label,
                task.duration_minutes
            );
        }
        let shown = data.completed_tasks.len().min(RECENT_TASKS_SHOWN);
        let hidden = data.completed_task_count.saturating_sub(shown);
        if hidden > 0 {
            let _ = writeln!(out, "  ... and {} more", hidden);
        }
        out
    }

    fn activity_label(activity: Activity) -> &'static str {
        match activity {
            Activity::Idle => "idle",
            Activity::Running => "running",
            Activity::Paused => "paused",
        }
    }

    fn on_off(enabled: bool) -> &'static str {
        if enabled {
            "on"
        } else {
            "off"
        }
    }

    /// Focus sessions completed in the current long-break cycle. A finished
    /// cycle counts as full until the next session starts a new one.
    fn sessions_into_cycle(sessions_completed: u32, interval: u32) -> u32 {
        let interval = interval.max(1);
        match sessions_completed % interval {
            0 if sessions_completed > 0 => interval,
            done => done,
        }
    }

    /// Formats minutes as `1h 05m` or `25m`.
    fn format_minutes(total_minutes: u32) -> String {
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;
        if hours > 0 {
            format!("{}h {:02}m", hours, minutes)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
