//! Desktop notifications through `notify-rust`.

use notify_rust::Notification;
use tracing::{debug, warn};

use super::error::NotificationError;
use super::{NotificationPermission, Notifier};

/// Application name shown by the notification server.
const APP_NAME: &str = "studyhive";

/// Sends notifications to the desktop notification service.
///
/// Delivery runs on a detached thread so a slow notification server never
/// holds up the timer; delivery failures are logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for DesktopNotifier {
    fn request_permission(&self) -> NotificationPermission {
        // Desktop notification servers do not gate senders.
        NotificationPermission::Granted
    }

    fn show(&self, title: &str, body: &str) -> Result<(), NotificationError> {
        let title = title.to_string();
        let body = body.to_string();

        std::thread::Builder::new()
            .name("studyhive-notify".to_string())
            .spawn(move || {
                let result = Notification::new()
                    .appname(APP_NAME)
                    .summary(&title)
                    .body(&body)
                    .show();
                match result {
                    Ok(_) => debug!("Notification delivered: {}", title),
                    Err(e) => warn!("Notification delivery failed: {}", e),
                }
            })
            .map(|_| ())
            .map_err(|e| NotificationError::SendFailed(e.to_string()))
    }
}
