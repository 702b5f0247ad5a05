//! User notifications for completed intervals.
//!
//! The timer talks to the platform through the [`Notifier`] trait:
//!
//! - [`DesktopNotifier`] sends desktop notifications via `notify-rust`
//! - [`MockNotifier`] records notifications for tests
//!
//! Notifications are best effort. The timer asks for permission once and
//! ignores delivery failures beyond logging them.

mod content;
mod desktop;
pub mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub use self::content::{completion_content, NotificationContent};
pub use self::desktop::DesktopNotifier;
pub use self::error::NotificationError;

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn is_granted(&self) -> bool {
        *self == NotificationPermission::Granted
    }
}

/// Host notification facility.
pub trait Notifier: Send + Sync {
    /// Asks the platform for permission to show notifications.
    fn request_permission(&self) -> NotificationPermission;

    /// Shows a notification. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be handed off.
    fn show(&self, title: &str, body: &str) -> Result<(), NotificationError>;
}

/// Mock notifier for testing.
#[derive(Debug)]
pub struct MockNotifier {
    shown: Mutex<Vec<NotificationContent>>,
    permission_requests: Mutex<u32>,
    granted: AtomicBool,
    should_fail: AtomicBool,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            permission_requests: Mutex::new(0),
            granted: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn shown(&self) -> Vec<NotificationContent> {
        self.shown.lock().unwrap().clone()
    }

    #[must_use]
    pub fn shown_count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }

    #[must_use]
    pub fn permission_requests(&self) -> u32 {
        *self.permission_requests.lock().unwrap()
    }

    pub fn clear(&self) {
        self.shown.lock().unwrap().clear();
    }
}

impl Notifier for MockNotifier {
    fn request_permission(&self) -> NotificationPermission {
        *self.permission_requests.lock().unwrap() += 1;
        if self.granted.load(Ordering::SeqCst) {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        }
    }

    fn show(&self, title: &str, body: &str) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.shown.lock().unwrap().push(NotificationContent {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
