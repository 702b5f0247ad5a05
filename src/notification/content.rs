//! Notification text for interval completions.

use crate::types::{normalize_task_label, TimerMode};

/// Title and body of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// Builds the notification shown when an interval of mode `completed` ends
/// and the timer moves on to `next`.
///
/// `task` is the label of the task the focus session was spent on, if any.
#[must_use]
pub fn completion_content(
    completed: TimerMode,
    next: TimerMode,
    task: Option<&str>,
) -> NotificationContent {
    match completed {
        TimerMode::Focus => {
            let next_step = match next {
                TimerMode::LongBreak => "Great work! Time for a long break.",
                _ => "Nice work! Take a short break.",
            };
            let body = match task.and_then(normalize_task_label) {
                Some(task) => format!("Finished \"{}\". {}", task, next_step),
                None => next_step.to_string(),
            };
            NotificationContent {
                title: "Focus session complete".to_string(),
                body,
            }
        }
        TimerMode::ShortBreak => NotificationContent {
            title: "Break is over".to_string(),
            body: "Ready to focus again?".to_string(),
        },
        TimerMode::LongBreak => NotificationContent {
            title: "Long break is over".to_string(),
            body: "Refreshed? Let's start the next focus session.".to_string(),
        },
    }
}
